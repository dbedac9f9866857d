//! Session identity resolution for CLI commands.
//!
//! Identity chain: `--as` flag > `EVENTHUB_USER` env > user config `user` >
//! `USER` env (TTY only).
//! Role chain: `--role` flag > `EVENTHUB_ROLE` env > user config `role` >
//! participant.
//!
//! Read-only commands work without an identity; registering, creating and
//! moderating require one.

use eventhub_core::error::ErrorCode;
use eventhub_core::{Role, Session};
use std::env;

/// Errors from identity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityError {
    /// Human-readable description.
    pub message: String,
    pub code: ErrorCode,
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdentityError {}

/// Values that can seed a session, in addition to the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySources<'a> {
    pub as_flag: Option<&'a str>,
    pub role_flag: Option<&'a str>,
    pub config_user: Option<&'a str>,
    pub config_role: Option<&'a str>,
}

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
    fn is_tty(&self) -> bool;
}

/// Real environment reader.
struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    fn is_tty(&self) -> bool {
        use std::io::IsTerminal;
        std::io::stdin().is_terminal()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn resolve_user_with(sources: &IdentitySources<'_>, env: &dyn EnvReader) -> Option<String> {
    non_empty(sources.as_flag)
        .or_else(|| env.get("EVENTHUB_USER"))
        .or_else(|| non_empty(sources.config_user))
        .or_else(|| if env.is_tty() { env.get("USER") } else { None })
}

fn resolve_role_with(
    sources: &IdentitySources<'_>,
    env: &dyn EnvReader,
) -> Result<Role, IdentityError> {
    let raw = non_empty(sources.role_flag)
        .or_else(|| env.get("EVENTHUB_ROLE"))
        .or_else(|| non_empty(sources.config_role));

    match raw {
        None => Ok(Role::default()),
        Some(raw) => raw.parse().map_err(|_| IdentityError {
            message: format!("unknown role '{raw}' (expected participant, organizer or admin)"),
            code: ErrorCode::PermissionDenied,
        }),
    }
}

fn resolve_session_with(
    sources: &IdentitySources<'_>,
    env: &dyn EnvReader,
) -> Result<Option<Session>, IdentityError> {
    let role = resolve_role_with(sources, env)?;
    Ok(resolve_user_with(sources, env).map(|user| Session::from_identifier(&user, role)))
}

/// Resolve the current session, if any identity is available.
///
/// # Errors
///
/// Returns an error if a role was given but is not recognized.
pub fn resolve_session(sources: &IdentitySources<'_>) -> Result<Option<Session>, IdentityError> {
    resolve_session_with(sources, &RealEnv)
}

/// Resolve the current session, failing when no identity is available.
///
/// # Errors
///
/// Returns an error if no identity resolves or the role is unknown.
pub fn require_session(sources: &IdentitySources<'_>) -> Result<Session, IdentityError> {
    resolve_session(sources)?.ok_or_else(|| IdentityError {
        message: "An identity is required for this command. \
                  Set --as or the EVENTHUB_USER environment variable."
            .to_string(),
        code: ErrorCode::InvalidRegistrant,
    })
}
