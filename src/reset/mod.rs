//! Restarting the device once new files are in place.

use std::path::PathBuf;
use std::process::Command;
use tracing::{error, info};

/// Restarts the host so freshly promoted files are picked up
pub trait DeviceReset: Send + Sync {
    fn reset(&self);
}

/// Replaces the running process with a fresh copy of the same executable
#[derive(Debug, Clone)]
pub struct ProcessRestart {
    exe_path: Option<PathBuf>,
    args: Vec<String>,
}

impl ProcessRestart {
    /// Restart with the current executable and command-line arguments
    pub fn current() -> Self {
        Self {
            exe_path: std::env::current_exe().ok(),
            args: std::env::args().skip(1).collect(),
        }
    }
}

impl DeviceReset for ProcessRestart {
    fn reset(&self) {
        if let Some(exe) = &self.exe_path {
            info!(exe = %exe.display(), "Restarting");
            if let Err(e) = Command::new(exe).args(&self.args).spawn() {
                error!(error = %e, "Failed to spawn replacement process");
            }
        } else {
            error!("Executable path unknown, exiting without restart");
        }
        std::process::exit(0);
    }
}
