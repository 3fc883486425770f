//! vitae-core - Core library for Vitae
//!
//! This crate holds the profile models, the multi-device sync subsystem
//! (conflict detection, smart merge, conflict registry, history ledger) and
//! the collaborative editing subsystem (sessions, presence, operational
//! transformation) shared by every Vitae interface.

pub mod collab;
pub mod config;
pub mod env;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod store;
pub mod sync;
pub mod util;

pub use env::{Clock, IdGenerator, SyncEnv};
pub use error::{Error, Result};
pub use models::{
    CollaborationSession, CollaborativeEdit, EditOperation, HistoryAction, HistoryEntry,
    Participant, ParticipantRole, ProfileBody, ProfileSnapshot, SyncConflict,
};
