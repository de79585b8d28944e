//! File-backed builder with reloading already wired in.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::builder::basic::BasicConfigurationBuilder;
use crate::builder::support::ReloadingBuilderSupportListener;
use crate::builder::ConfigurationBuilder;
use crate::error::ConfigError;
use crate::reloading::{FileModifiedDetector, ReloadingController};

/// Raw contents of a file at the time it was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    pub path: PathBuf,
    pub contents: String,
    pub modified: SystemTime,
}

impl FileSnapshot {
    /// Read `path` as UTF-8 text together with its modification time.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let contents = fs::read_to_string(path).map_err(io_err)?;
        let modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(io_err)?;
        Ok(Self {
            path: path.to_path_buf(),
            contents,
            modified,
        })
    }
}

/// A builder that loads its result from a file and resets itself when the
/// file's modification time changes.
///
/// Changes are noticed when someone calls
/// [`ReloadingController::check_for_reloading`] on [`controller`](Self::controller),
/// typically a [`PeriodicReloadingTrigger`](crate::reloading::PeriodicReloadingTrigger).
/// Dropping this value disconnects the builder from its controller.
pub struct ReloadingFileBasedBuilder<T: Send + Sync + 'static> {
    path: PathBuf,
    builder: Arc<BasicConfigurationBuilder<T>>,
    controller: Arc<ReloadingController>,
    support: Arc<ReloadingBuilderSupportListener<BasicConfigurationBuilder<T>>>,
}

impl<T: Send + Sync + 'static> ReloadingFileBasedBuilder<T> {
    /// Create the builder, its file detector and controller, and connect them.
    pub fn new<F>(
        path: impl Into<PathBuf>,
        refresh_delay: Duration,
        loader: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&Path) -> Result<T, ConfigError> + Send + Sync + 'static,
    {
        let path = path.into();
        let detector = FileModifiedDetector::new(path.clone(), refresh_delay)?;
        let controller = Arc::new(ReloadingController::new(detector));

        let source = path.clone();
        let builder = Arc::new(BasicConfigurationBuilder::from_fn(move || loader(&source)));
        let support = ReloadingBuilderSupportListener::connect(&builder, &controller);

        tracing::info!(path = ?path, builder = %builder.id(), "Reloading file builder created");
        Ok(Self {
            path,
            builder,
            controller,
            support,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying caching builder, for registering event listeners.
    pub fn builder(&self) -> &Arc<BasicConfigurationBuilder<T>> {
        &self.builder
    }

    /// The controller to hand to a trigger.
    pub fn controller(&self) -> &Arc<ReloadingController> {
        &self.controller
    }

    /// Current configuration; reloads the file if a change was detected.
    pub fn get_configuration(&self) -> Result<Arc<T>, ConfigError> {
        self.builder.get_configuration()
    }
}

impl ReloadingFileBasedBuilder<FileSnapshot> {
    /// Builder producing raw [`FileSnapshot`]s.
    pub fn snapshots(path: impl Into<PathBuf>, refresh_delay: Duration) -> Result<Self, ConfigError> {
        Self::new(path, refresh_delay, FileSnapshot::read)
    }
}

impl<T: Send + Sync + 'static> Drop for ReloadingFileBasedBuilder<T> {
    fn drop(&mut self) {
        self.support.disconnect();
    }
}
