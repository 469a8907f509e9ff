//! Change aggregation
//!
//! Two mutually exclusive sources describe what changed since the last
//! release: conventional commit headers ([commits]) and change files deposited
//! in the repository between releases ([change_files]).

pub mod change_files;
pub mod commits;

pub use change_files::{
    generate_change_file, load_change_files, persist_change_file, reset_change_files,
    resolve_increment_levels, ChangeFile, LoadedChangeFiles, ProjectChange,
};
pub use commits::{categorize, commits_since, CommitScan};
