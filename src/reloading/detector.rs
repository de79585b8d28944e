//! Change detection for monitored configuration resources.
//!
//! # Responsibilities
//! - Answer whether the monitored resource changed since the last acknowledge
//! - Move the baseline forward when a reload has been handled
//!
//! # Design Decisions
//! - Detectors are owned exclusively by one controller, which serializes all
//!   calls; methods therefore take `&mut self`
//! - A fresh detector never reports a change: the first observation becomes
//!   the baseline
//! - A missing file is an observable state (no modification time), not an
//!   error

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use crate::error::ConfigError;

/// Answers whether a monitored resource needs to be reloaded.
///
/// Implementations may be expensive (file-system stats, remote calls); the
/// controller calls them as rarely as the reload protocol allows.
pub trait ReloadingDetector: Send {
    /// Returns true if the resource changed since the last acknowledged baseline.
    fn is_reloading_required(&mut self) -> Result<bool, ConfigError>;

    /// Acknowledges a handled reload by moving the baseline to the current state.
    ///
    /// Calling this repeatedly without an intervening change has no further effect.
    fn reloading_performed(&mut self) -> Result<(), ConfigError>;
}

impl<D: ReloadingDetector + ?Sized> ReloadingDetector for Box<D> {
    fn is_reloading_required(&mut self) -> Result<bool, ConfigError> {
        (**self).is_reloading_required()
    }

    fn reloading_performed(&mut self) -> Result<(), ConfigError> {
        (**self).reloading_performed()
    }
}

/// Detects changes of a file through its modification time.
///
/// With a non-zero refresh delay the file is stat'ed at most once per delay;
/// checks in between report no change.
#[derive(Debug)]
pub struct FileModifiedDetector {
    path: PathBuf,
    refresh_delay: Duration,
    baseline: Option<SystemTime>,
    observed: bool,
    last_checked: Option<Instant>,
}

impl FileModifiedDetector {
    /// Create a detector for `path`. An empty path is rejected.
    pub fn new(path: impl Into<PathBuf>, refresh_delay: Duration) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::invalid_argument(
                "file detector requires a non-empty path",
            ));
        }
        Ok(Self {
            path,
            refresh_delay,
            baseline: None,
            observed: false,
            last_checked: None,
        })
    }

    /// The monitored file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay
    }

    /// The modification time the next check compares against.
    ///
    /// `None` before the first observation and while the file is missing.
    pub fn baseline(&self) -> Option<SystemTime> {
        self.baseline
    }

    /// Current modification time; `None` if the file does not exist.
    fn modified(&self) -> Result<Option<SystemTime>, ConfigError> {
        match fs::metadata(&self.path).and_then(|meta| meta.modified()) {
            Ok(modified) => Ok(Some(modified)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Detector {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn refresh_due(&self, now: Instant) -> bool {
        match self.last_checked {
            Some(last) => now.duration_since(last) >= self.refresh_delay,
            None => true,
        }
    }
}

impl ReloadingDetector for FileModifiedDetector {
    fn is_reloading_required(&mut self) -> Result<bool, ConfigError> {
        let now = Instant::now();
        if !self.refresh_due(now) {
            return Ok(false);
        }
        let modified = self.modified()?;
        self.last_checked = Some(now);

        if !self.observed {
            self.baseline = modified;
            self.observed = true;
            return Ok(false);
        }
        Ok(modified != self.baseline)
    }

    fn reloading_performed(&mut self) -> Result<(), ConfigError> {
        let modified = self.modified()?;
        if modified.is_none() {
            tracing::debug!(path = ?self.path, "Watched file missing at acknowledge, clearing baseline");
        }
        self.baseline = modified;
        self.observed = true;
        Ok(())
    }
}
