//! Subcommand handlers.
//!
//! Each handler has the shape `run_x(args, ctx) -> anyhow::Result<()>`. A
//! failure meant for the user is rendered through [`crate::output::fail`]
//! before it is returned, so `main` only has to set the exit status.

pub mod check;
pub mod create;
pub mod delete;
pub mod export;
pub mod init;
pub mod list;
pub mod moderate;
pub mod register;
pub mod seed;
pub mod show;
pub mod stats;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use eventhub_core::config::{self, DATA_DIR, ProjectConfig, UserConfig};
use eventhub_core::error::ErrorCode;
use eventhub_core::{EventStore, FileBackend, Session};

use crate::identity::{self, IdentitySources};
use crate::output::{CliError, OutputMode, fail};

/// The user's calendar date. Date comparisons follow the local clock, so an
/// event dated today stays upcoming until local midnight.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Everything a handler needs besides its own arguments.
#[derive(Debug)]
pub struct Context {
    /// Directory the command was started from.
    pub cwd: PathBuf,
    pub output: OutputMode,
    pub as_user: Option<String>,
    pub role: Option<String>,
    pub user_config: UserConfig,
}

/// An initialized project: its root and parsed config.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    pub fn store(&self) -> EventStore<FileBackend> {
        self.config.open_store(&self.root)
    }
}

/// Walk up from `start` to the nearest directory holding `.eventhub/`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(DATA_DIR).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

impl Context {
    fn sources(&self) -> IdentitySources<'_> {
        IdentitySources {
            as_flag: self.as_user.as_deref(),
            role_flag: self.role.as_deref(),
            config_user: self.user_config.user.as_deref(),
            config_role: self.user_config.role.as_deref(),
        }
    }

    /// Locate and load the enclosing project, or fail with `E1001`.
    pub fn project(&self) -> anyhow::Result<Project> {
        let Some(root) = find_project_root(&self.cwd) else {
            return Err(fail(
                self.output,
                &CliError::from_code(
                    ErrorCode::NotInitialized,
                    "Not an eventhub project: .eventhub directory not found",
                ),
            ));
        };

        let config = config::load_project_config(&root).map_err(|err| {
            fail(
                self.output,
                &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            )
        })?;

        Ok(Project { root, config })
    }

    /// The current session, failing when no identity is configured.
    pub fn require_session(&self) -> anyhow::Result<Session> {
        identity::require_session(&self.sources()).map_err(|err| {
            fail(
                self.output,
                &CliError {
                    message: err.message,
                    suggestion: Some("Set --as, EVENTHUB_USER, or `user` in the user config".into()),
                    error_code: Some(err.code.code().to_string()),
                    details: None,
                },
            )
        })
    }
}
