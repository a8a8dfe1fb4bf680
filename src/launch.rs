//! Starting the program bound to a hotkey.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum LaunchError {
    /// The entry has no program configured.
    #[error("no program configured")]
    EmptyPath,
    /// The program could not be started.
    #[error("failed to start {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Starts programs on behalf of fired hotkeys.
pub trait Launcher {
    fn launch(&self, path: &Path) -> Result<(), LaunchError>;
}

/// Spawns the program as a detached child process.
///
/// The child is not awaited by the caller. A short-lived thread reaps it so
/// it does not linger as a zombie.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, path: &Path) -> Result<(), LaunchError> {
        if path.as_os_str().is_empty() {
            return Err(LaunchError::EmptyPath);
        }

        let child = Command::new(path).spawn().map_err(|source| LaunchError::Spawn {
            path: path.to_owned(),
            source,
        })?;
        info!(path = %path.display(), pid = child.id(), "program launched");
        reap(child);
        Ok(())
    }
}

fn reap(mut child: Child) {
    let pid = child.id();
    let spawned = thread::Builder::new()
        .name("launch-reaper".into())
        .spawn(move || match child.wait() {
            Ok(status) => debug!(pid, %status, "launched program exited"),
            Err(e) => warn!(pid, error = %e, "failed to wait for launched program"),
        });
    if let Err(e) = spawned {
        warn!(pid, error = %e, "failed to start reaper thread");
    }
}
