//! File-system event trigger for reload checks.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::ConfigError;
use crate::reloading::controller::ReloadingController;

/// Runs `check_for_reloading` whenever the watched file is modified or created.
///
/// The controller's detector still decides whether a reload is due, so
/// spurious or duplicate file-system events are harmless.
pub struct FileChangeTrigger {
    path: PathBuf,
    controller: Arc<ReloadingController>,
}

impl FileChangeTrigger {
    pub fn new(path: &Path, controller: Arc<ReloadingController>) -> Self {
        Self {
            path: path.to_path_buf(),
            controller,
        }
    }

    /// Start watching. Events stop arriving once the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, ConfigError> {
        let controller = Arc::clone(&self.controller);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::debug!(paths = ?event.paths, "Watched file changed");
                        if let Err(e) = controller.check_for_reloading(None) {
                            tracing::warn!(error = %e, "Reload check after file event failed");
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "File change trigger started");
        Ok(watcher)
    }
}
