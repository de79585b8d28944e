//! Startup orchestration for the `reload-watch` daemon.
//!
//! # Responsibilities
//! - Build the reloading file builder for the watched file
//! - Start the periodic trigger and, optionally, the file-system trigger
//! - Run a reader task that picks up rebuilt configurations
//!
//! # Design Decisions
//! - Fail fast: the watched file must be readable at startup
//! - The reader plays the role of an application thread calling
//!   `get_configuration`; it is what actually rebuilds after a reload

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use notify::RecommendedWatcher;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::builder::{
    BuilderEventType, BuilderListener, ConfigurationBuilder, ConfigurationBuilderEvent,
    FileSnapshot, ReloadingFileBasedBuilder,
};
use crate::error::ConfigError;
use crate::lifecycle::Shutdown;
use crate::reloading::{FileChangeTrigger, PeriodicReloadingTrigger};
use crate::settings::WatchSettings;

/// Logs builder resets so operators can see reloads being scheduled.
struct ResetLogger;

impl BuilderListener for ResetLogger {
    fn on_event(&self, event: &ConfigurationBuilderEvent) -> Result<(), ConfigError> {
        tracing::info!(builder = %event.source, "Watched file changed, configuration marked stale");
        Ok(())
    }
}

/// Shared between the daemon handle and its reader task.
struct WatchState {
    file_builder: ReloadingFileBasedBuilder<FileSnapshot>,
    last_seen: Mutex<Option<Arc<FileSnapshot>>>,
}

impl WatchState {
    /// Fetch the current configuration; returns true if it is a new instance.
    fn refresh(&self) -> Result<bool, ConfigError> {
        let current = self.file_builder.get_configuration()?;
        let mut last = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = !last.as_ref().is_some_and(|seen| Arc::ptr_eq(seen, &current));
        if changed {
            tracing::info!(
                path = ?current.path,
                bytes = current.contents.len(),
                modified = ?current.modified,
                "Configuration loaded"
            );
            *last = Some(current);
        }
        Ok(changed)
    }
}

/// A running watch: builder, triggers and reader task.
pub struct ReloadWatch {
    state: Arc<WatchState>,
    trigger: PeriodicReloadingTrigger,
    _fs_watcher: Option<RecommendedWatcher>,
    shutdown: Shutdown,
    reader: JoinHandle<()>,
}

impl ReloadWatch {
    /// Wire everything up according to `settings`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(settings: &WatchSettings) -> Result<Self, ConfigError> {
        let file_builder =
            ReloadingFileBasedBuilder::snapshots(settings.path.clone(), settings.refresh_delay())?;
        file_builder
            .builder()
            .add_event_listener(BuilderEventType::Reset, Arc::new(ResetLogger));

        let state = Arc::new(WatchState {
            file_builder,
            last_seen: Mutex::new(None),
        });
        state.refresh()?;

        let controller = Arc::clone(state.file_builder.controller());
        // Establish the detector's baseline before the first timer tick.
        controller.check_for_reloading(None)?;

        let mut trigger =
            PeriodicReloadingTrigger::new(Arc::clone(&controller), None, settings.poll_interval())?;
        trigger.start()?;

        let fs_watcher = if settings.fs_events {
            Some(FileChangeTrigger::new(&settings.path, Arc::clone(&controller)).run()?)
        } else {
            None
        };

        let shutdown = Shutdown::new();
        let reader = tokio::spawn(read_loop(
            Arc::clone(&state),
            settings.poll_interval(),
            shutdown.subscribe(),
        ));

        tracing::info!(path = ?settings.path, fs_events = settings.fs_events, "Reload watch started");
        Ok(Self {
            state,
            trigger,
            _fs_watcher: fs_watcher,
            shutdown,
            reader,
        })
    }

    /// Run a reload check right away (e.g. on SIGHUP) and pick up the result.
    pub async fn check_now(&self) -> Result<bool, ConfigError> {
        let state = Arc::clone(&self.state);
        tokio::task::spawn_blocking(move || -> Result<bool, ConfigError> {
            let context = String::from("signal");
            let fired = state
                .file_builder
                .controller()
                .check_for_reloading(Some(&context))?;
            if fired {
                state.refresh()?;
            }
            Ok(fired)
        })
        .await
        .map_err(|e| ConfigError::Runtime(e.to_string()))?
    }

    /// The configuration the reader saw last.
    pub fn current(&self) -> Option<Arc<FileSnapshot>> {
        self.state
            .last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stop every background task.
    pub async fn stop(mut self) {
        self.trigger.stop().await;
        self.shutdown.trigger();
        if let Err(e) = (&mut self.reader).await {
            tracing::warn!(error = %e, "Reader task ended abnormally");
        }
        tracing::info!("Reload watch stopped");
    }
}

async fn read_loop(state: Arc<WatchState>, period: Duration, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = time::interval(period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let state = Arc::clone(&state);
                match tokio::task::spawn_blocking(move || state.refresh()).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => tracing::warn!(error = %e, "Failed to rebuild configuration, will retry"),
                    Err(e) => tracing::error!(error = %e, "Reader task panicked"),
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!("Reader received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
