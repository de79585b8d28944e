//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs::{self, File};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use config_reload::builder::{BuilderEventType, BuilderListener, ConfigurationBuilderEvent};
use config_reload::reloading::{ReloadingDetector, ReloadingEvent, ReloadingListener};
use config_reload::ConfigError;

/// Counters shared between a [`ScriptedDetector`] and the test.
#[derive(Default)]
pub struct DetectorProbe {
    pub queries: AtomicUsize,
    pub acknowledged: AtomicUsize,
}

impl DetectorProbe {
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn acknowledged(&self) -> usize {
        self.acknowledged.load(Ordering::SeqCst)
    }
}

/// Detector replaying a fixed list of answers, then reporting no change.
pub struct ScriptedDetector {
    answers: VecDeque<bool>,
    probe: Arc<DetectorProbe>,
}

impl ScriptedDetector {
    pub fn new(answers: &[bool]) -> (Self, Arc<DetectorProbe>) {
        let probe = Arc::new(DetectorProbe::default());
        (
            Self {
                answers: answers.iter().copied().collect(),
                probe: probe.clone(),
            },
            probe,
        )
    }
}

impl ReloadingDetector for ScriptedDetector {
    fn is_reloading_required(&mut self) -> Result<bool, ConfigError> {
        self.probe.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.answers.pop_front().unwrap_or(false))
    }

    fn reloading_performed(&mut self) -> Result<(), ConfigError> {
        self.probe.acknowledged.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Records every builder event it receives.
#[derive(Default)]
pub struct BuilderEventRecorder {
    events: Mutex<VecDeque<BuilderEventType>>,
}

impl BuilderEventRecorder {
    /// Pop the oldest event and check its type.
    pub fn next_event(&self, expected: BuilderEventType) {
        let actual = self.events.lock().unwrap().pop_front();
        assert_eq!(actual, Some(expected), "unexpected builder event");
    }

    pub fn assert_no_more_events(&self) {
        let remaining = self.events.lock().unwrap();
        assert!(remaining.is_empty(), "unexpected builder events: {remaining:?}");
    }
}

impl BuilderListener for BuilderEventRecorder {
    fn on_event(&self, event: &ConfigurationBuilderEvent) -> Result<(), ConfigError> {
        self.events.lock().unwrap().push_back(event.event_type);
        Ok(())
    }
}

/// Counts reload notifications.
#[derive(Default)]
pub struct ReloadCounter(pub AtomicUsize);

impl ReloadCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl ReloadingListener for ReloadCounter {
    fn reloading_required(&self, _event: &ReloadingEvent<'_>) -> Result<(), ConfigError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Write `contents` and pin the modification time to `secs` after the epoch.
pub fn write_with_mtime(path: &Path, contents: &str, secs: u64) {
    fs::write(path, contents).unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}
