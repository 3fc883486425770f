//! Profile model

use serde::{Deserialize, Serialize};

/// Contact and summary fields of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub linkedin_username: String,
    pub portfolio_url: String,
    pub github_username: String,
    pub whatsapp_link: String,
    pub phone_number: String,
    pub country_code: String,
    pub summary: String,
    /// Base64 data URL for the profile photo
    pub photo_data_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub employment_type: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub currently_working: bool,
    pub location: String,
    pub location_type: String,
    pub description: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub id: String,
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    pub currently_studying: bool,
    pub grade: String,
    pub activities: String,
    pub description: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    pub id: String,
    pub name: String,
    pub issuing_organization: String,
    pub issue_date: String,
    pub expiration_date: String,
    pub no_expiration: bool,
    pub credential_id: String,
    pub credential_url: String,
    pub description: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub skills: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub currently_working: bool,
    pub associated_with: String,
}

/// Free-form or multiple-choice answer to an application question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionAnswer {
    Text(String),
    Choices(Vec<String>),
}

impl Default for QuestionAnswer {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomQuestion {
    pub id: String,
    pub question: String,
    pub kind: String,
    pub options: Vec<String>,
    pub answer: QuestionAnswer,
    pub required: bool,
}

/// Collection entry keyed by a stable id and ordered by an anchor date.
pub trait DatedEntry {
    fn entry_id(&self) -> &str;

    /// Raw anchor date (start or issue date) as entered by the user
    fn anchor_date(&self) -> &str;
}

impl DatedEntry for Experience {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn anchor_date(&self) -> &str {
        &self.start_date
    }
}

impl DatedEntry for Education {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn anchor_date(&self) -> &str {
        &self.start_date
    }
}

impl DatedEntry for Certification {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn anchor_date(&self) -> &str {
        &self.issue_date
    }
}

impl DatedEntry for Project {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn anchor_date(&self) -> &str {
        &self.start_date
    }
}

/// Full CV content of a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileBody {
    pub personal_info: PersonalInfo,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub certifications: Vec<Certification>,
    pub projects: Vec<Project>,
    pub custom_questions: Vec<CustomQuestion>,
}

/// A named, timestamped copy of a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// Profile identifier, shared by every copy of the same profile
    pub id: String,
    /// Display name
    pub name: String,
    pub body: ProfileBody,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl ProfileSnapshot {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        body: ProfileBody,
        updated_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            body,
            updated_at,
        }
    }

    /// Same identity with a replaced body and timestamp.
    #[must_use]
    pub fn with_body(&self, body: ProfileBody, updated_at: i64) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            body,
            updated_at,
        }
    }
}
