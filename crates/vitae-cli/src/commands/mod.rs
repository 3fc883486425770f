pub mod backup;
pub mod common;
pub mod completions;
pub mod edit;
pub mod history;
pub mod sync;
