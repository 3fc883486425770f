//! Deterministic field-by-field merge of two profile bodies
//!
//! Rules:
//! - scalar personal-info fields keep the non-empty value, and the longer one
//!   when both are set (ties keep local);
//! - dated collections are keyed by entry id; a same-id entry only replaces
//!   the one already kept when its anchor date parses and is strictly later;
//! - skills are the case-sensitive set union, local order first.
//!
//! Only the skills union is commutative. Scalar ties and anchor-date ties
//! favour the first argument, so `smart_merge(a, b)` and `smart_merge(b, a)`
//! can differ.

use std::collections::{HashMap, HashSet};

use crate::models::{DatedEntry, PersonalInfo, ProfileBody};
use crate::util::{char_len, parse_anchor_date};

/// Merge `remote` into `local`.
///
/// Pure: every lookup table is built fresh per call and the output depends on
/// nothing but the two inputs.
#[must_use]
pub fn smart_merge(local: &ProfileBody, remote: &ProfileBody) -> ProfileBody {
    ProfileBody {
        personal_info: merge_personal_info(&local.personal_info, &remote.personal_info),
        skills: union_skills(&local.skills, &remote.skills),
        experience: merge_dated(&local.experience, &remote.experience),
        education: merge_dated(&local.education, &remote.education),
        certifications: merge_dated(&local.certifications, &remote.certifications),
        projects: merge_dated(&local.projects, &remote.projects),
        custom_questions: local.custom_questions.clone(),
    }
}

fn merge_personal_info(local: &PersonalInfo, remote: &PersonalInfo) -> PersonalInfo {
    PersonalInfo {
        first_name: more_complete(&local.first_name, &remote.first_name),
        middle_name: more_complete(&local.middle_name, &remote.middle_name),
        last_name: more_complete(&local.last_name, &remote.last_name),
        email: more_complete(&local.email, &remote.email),
        linkedin_username: more_complete(&local.linkedin_username, &remote.linkedin_username),
        portfolio_url: more_complete(&local.portfolio_url, &remote.portfolio_url),
        github_username: more_complete(&local.github_username, &remote.github_username),
        whatsapp_link: more_complete(&local.whatsapp_link, &remote.whatsapp_link),
        phone_number: more_complete(&local.phone_number, &remote.phone_number),
        country_code: more_complete(&local.country_code, &remote.country_code),
        summary: more_complete(&local.summary, &remote.summary),
        photo_data_url: match (&local.photo_data_url, &remote.photo_data_url) {
            (local_photo, Some(remote_photo)) => {
                let local_photo = local_photo.as_deref().unwrap_or_default();
                Some(more_complete(local_photo, remote_photo)).filter(|photo| !photo.is_empty())
            }
            (local_photo, None) => local_photo.clone(),
        },
    }
}

fn more_complete(local: &str, remote: &str) -> String {
    if !remote.is_empty() && (local.is_empty() || char_len(remote) > char_len(local)) {
        remote.to_string()
    } else {
        local.to_string()
    }
}

fn union_skills(local: &[String], remote: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(local.len() + remote.len());
    local
        .iter()
        .chain(remote)
        .filter(|skill| seen.insert(skill.as_str()))
        .cloned()
        .collect()
}

fn merge_dated<T: DatedEntry + Clone>(local: &[T], remote: &[T]) -> Vec<T> {
    let mut slots: HashMap<&str, usize> = HashMap::with_capacity(local.len() + remote.len());
    let mut merged: Vec<T> = Vec::with_capacity(local.len() + remote.len());

    for entry in local.iter().chain(remote) {
        if let Some(&slot) = slots.get(entry.entry_id()) {
            if supersedes(entry, &merged[slot]) {
                merged[slot] = entry.clone();
            }
        } else {
            slots.insert(entry.entry_id(), merged.len());
            merged.push(entry.clone());
        }
    }

    merged
}

fn supersedes<T: DatedEntry>(candidate: &T, kept: &T) -> bool {
    match (
        parse_anchor_date(candidate.anchor_date()),
        parse_anchor_date(kept.anchor_date()),
    ) {
        (Some(candidate_date), Some(kept_date)) => candidate_date > kept_date,
        _ => false,
    }
}
