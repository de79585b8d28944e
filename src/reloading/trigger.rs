//! Periodic reload checks.
//!
//! # Responsibilities
//! - Call `check_for_reloading` on a fixed interval
//! - Start and stop the background task on demand
//!
//! # Design Decisions
//! - The check runs on the blocking pool: detectors may stat files and
//!   listeners may rebuild configurations
//! - A failed check is logged and the next tick retries

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::error::ConfigError;
use crate::lifecycle::Shutdown;
use crate::reloading::controller::ReloadingController;

type Context = Arc<dyn Any + Send + Sync>;

/// Drives a [`ReloadingController`] from a tokio interval.
pub struct PeriodicReloadingTrigger {
    controller: Arc<ReloadingController>,
    context: Option<Context>,
    period: Duration,
    running: Option<(Shutdown, JoinHandle<()>)>,
}

impl PeriodicReloadingTrigger {
    /// Create a stopped trigger. A zero period is rejected.
    pub fn new(
        controller: Arc<ReloadingController>,
        context: Option<Context>,
        period: Duration,
    ) -> Result<Self, ConfigError> {
        if period.is_zero() {
            return Err(ConfigError::invalid_argument(
                "trigger period must be greater than zero",
            ));
        }
        Ok(Self {
            controller,
            context,
            period,
            running: None,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }

    /// Spawn the background task. Does nothing if it is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        if self.is_running() {
            return Ok(());
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ConfigError::Runtime(e.to_string()))?;

        let shutdown = Shutdown::new();
        let task = run(
            Arc::clone(&self.controller),
            self.context.clone(),
            self.period,
            shutdown.subscribe(),
        );
        let handle = runtime.spawn(task);
        self.running = Some((shutdown, handle));

        tracing::info!(period_ms = self.period.as_millis() as u64, "Periodic reloading trigger started");
        Ok(())
    }

    /// Stop the background task and wait for it to exit.
    pub async fn stop(&mut self) {
        if let Some((shutdown, handle)) = self.running.take() {
            shutdown.trigger();
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Reloading trigger task ended abnormally");
            }
            tracing::info!("Periodic reloading trigger stopped");
        }
    }
}

impl Drop for PeriodicReloadingTrigger {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.running.take() {
            handle.abort();
        }
    }
}

async fn run(
    controller: Arc<ReloadingController>,
    context: Option<Context>,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = time::interval(period);
    // The first tick completes immediately; skip it so checks start one period in.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                check_once(&controller, &context).await;
            }
            _ = shutdown.recv() => {
                tracing::debug!("Reloading trigger received shutdown signal, exiting loop");
                break;
            }
        }
    }
}

async fn check_once(controller: &Arc<ReloadingController>, context: &Option<Context>) {
    let controller = Arc::clone(controller);
    let context = context.clone();
    let outcome =
        tokio::task::spawn_blocking(move || controller.check_for_reloading(context.as_deref()))
            .await;

    match outcome {
        Ok(Ok(true)) => tracing::debug!("Periodic check fired a reload event"),
        Ok(Ok(false)) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "Periodic reload check failed"),
        Err(e) => tracing::error!(error = %e, "Periodic reload check panicked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reloading::detector::ReloadingDetector;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDetector(Arc<AtomicUsize>);

    impl ReloadingDetector for CountingDetector {
        fn is_reloading_required(&mut self) -> Result<bool, ConfigError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }

        fn reloading_performed(&mut self) -> Result<(), ConfigError> {
            Ok(())
        }
    }

    #[test]
    fn test_zero_period_rejected() {
        let controller = Arc::new(ReloadingController::new(CountingDetector(Default::default())));
        let result = PeriodicReloadingTrigger::new(controller, None, Duration::ZERO);
        assert!(matches!(result, Err(ConfigError::InvalidArgument(_))));
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let controller = Arc::new(ReloadingController::new(CountingDetector(Default::default())));
        let mut trigger =
            PeriodicReloadingTrigger::new(controller, None, Duration::from_millis(10)).unwrap();

        assert!(matches!(trigger.start(), Err(ConfigError::Runtime(_))));
        assert!(!trigger.is_running());
    }

    #[tokio::test]
    async fn test_trigger_checks_until_stopped() {
        let queries = Arc::new(AtomicUsize::new(0));
        let controller = Arc::new(ReloadingController::new(CountingDetector(queries.clone())));
        let mut trigger =
            PeriodicReloadingTrigger::new(controller, None, Duration::from_millis(10)).unwrap();

        trigger.start().unwrap();
        trigger.start().unwrap();
        assert!(trigger.is_running());

        time::sleep(Duration::from_millis(100)).await;
        trigger.stop().await;
        assert!(!trigger.is_running());

        let seen = queries.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected several checks, saw {seen}");

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(queries.load(Ordering::SeqCst), seen);
    }
}
