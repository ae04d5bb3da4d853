//! Checks that downloaded content is fit to run before it is promoted.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Decides whether a staged file is well formed
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, path: &Path) -> bool;
}

/// Accepts every file
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait]
impl Validator for AcceptAll {
    async fn validate(&self, _path: &Path) -> bool {
        true
    }
}

/// Runs an external checker with the staged path as its last argument.
///
/// The file is valid when the checker exits with status 0, e.g.
/// `["python3", "-m", "py_compile"]`.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    program: String,
    args: Vec<String>,
}

impl CommandValidator {
    /// Build from an argv list. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait]
impl Validator for CommandValidator {
    async fn validate(&self, path: &Path) -> bool {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) => {
                debug!(path = %path.display(), %status, "Validator finished");
                status.success()
            }
            Err(e) => {
                warn!(program = %self.program, error = %e, "Failed to run validator");
                false
            }
        }
    }
}
