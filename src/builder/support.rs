//! Bridge between a reloading controller and a configuration builder.
//!
//! # State Transitions
//! ```text
//! controller fires reload event → builder.reset_result()
//! builder fires ResultCreated   → controller.reset_reloading_state()
//! ```
//!
//! # Design Decisions
//! - The detector is re-armed only once a fresh result exists; re-arming on
//!   the reload event itself would lose a change that lands before the rebuild
//! - Both sides are held weakly: the registries own the bridge, and the bridge
//!   must not keep a discarded builder or controller alive
//! - Registrations are removed explicitly with `disconnect`

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::builder::event::{BuilderEventType, BuilderListener, ConfigurationBuilderEvent};
use crate::builder::ConfigurationBuilder;
use crate::error::ConfigError;
use crate::reloading::{ReloadingController, ReloadingEvent, ReloadingListener};

/// Resets a builder when its controller detects a change, and re-arms the
/// controller when the builder has produced a new result.
pub struct ReloadingBuilderSupportListener<B: ConfigurationBuilder + 'static> {
    builder: Weak<B>,
    controller: Weak<ReloadingController>,
    connected: AtomicBool,
}

impl<B: ConfigurationBuilder + 'static> ReloadingBuilderSupportListener<B> {
    /// Register a new bridge with both `builder` and `controller`.
    pub fn connect(builder: &Arc<B>, controller: &Arc<ReloadingController>) -> Arc<Self> {
        let listener = Arc::new(Self {
            builder: Arc::downgrade(builder),
            controller: Arc::downgrade(controller),
            connected: AtomicBool::new(true),
        });

        controller.add_reloading_listener(listener.clone());
        builder.add_event_listener(BuilderEventType::ResultCreated, listener.clone());

        tracing::debug!(builder = %builder.id(), "Builder connected to reloading controller");
        listener
    }

    /// Remove both registrations. Returns false if already disconnected.
    pub fn disconnect(self: &Arc<Self>) -> bool {
        if !self.connected.swap(false, Ordering::AcqRel) {
            return false;
        }

        if let Some(controller) = self.controller.upgrade() {
            let handle: Arc<dyn ReloadingListener> = self.clone();
            controller.remove_reloading_listener(&handle);
        }
        if let Some(builder) = self.builder.upgrade() {
            let handle: Arc<dyn BuilderListener> = self.clone();
            builder.remove_event_listener(BuilderEventType::ResultCreated, &handle);
            tracing::debug!(builder = %builder.id(), "Builder disconnected from reloading controller");
        }
        true
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl<B: ConfigurationBuilder + 'static> ReloadingListener for ReloadingBuilderSupportListener<B> {
    fn reloading_required(&self, _event: &ReloadingEvent<'_>) -> Result<(), ConfigError> {
        match self.builder.upgrade() {
            Some(builder) => builder.reset_result(),
            None => Ok(()),
        }
    }
}

impl<B: ConfigurationBuilder + 'static> BuilderListener for ReloadingBuilderSupportListener<B> {
    fn on_event(&self, event: &ConfigurationBuilderEvent) -> Result<(), ConfigError> {
        if event.event_type != BuilderEventType::ResultCreated {
            return Ok(());
        }
        match self.controller.upgrade() {
            Some(controller) => controller.reset_reloading_state(),
            None => Ok(()),
        }
    }
}

impl<B: ConfigurationBuilder + 'static> fmt::Debug for ReloadingBuilderSupportListener<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadingBuilderSupportListener")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BasicConfigurationBuilder;
    use crate::reloading::ReloadingDetector;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct OnceDetector {
        pending: bool,
        acknowledged: Arc<AtomicUsize>,
    }

    impl ReloadingDetector for OnceDetector {
        fn is_reloading_required(&mut self) -> Result<bool, ConfigError> {
            Ok(std::mem::take(&mut self.pending))
        }

        fn reloading_performed(&mut self) -> Result<(), ConfigError> {
            self.acknowledged.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingListener(Mutex<Vec<BuilderEventType>>);

    impl BuilderListener for RecordingListener {
        fn on_event(&self, event: &ConfigurationBuilderEvent) -> Result<(), ConfigError> {
            self.0.lock().unwrap().push(event.event_type);
            Ok(())
        }
    }

    fn fixture() -> (
        Arc<BasicConfigurationBuilder<String>>,
        Arc<ReloadingController>,
        Arc<AtomicUsize>,
    ) {
        let acknowledged = Arc::new(AtomicUsize::new(0));
        let controller = Arc::new(ReloadingController::new(OnceDetector {
            pending: true,
            acknowledged: acknowledged.clone(),
        }));
        let builder = Arc::new(BasicConfigurationBuilder::from_fn(|| Ok(String::from("cfg"))));
        (builder, controller, acknowledged)
    }

    #[test]
    fn test_reset_builder_on_reloading_event() {
        let (builder, controller, _) = fixture();
        let events = Arc::new(RecordingListener::default());
        builder.add_event_listener(BuilderEventType::Any, events.clone());

        let _support = ReloadingBuilderSupportListener::connect(&builder, &controller);
        assert!(controller.check_for_reloading(None).unwrap());

        assert_eq!(*events.0.lock().unwrap(), vec![BuilderEventType::Reset]);
    }

    #[test]
    fn test_reset_reloading_state_on_result_creation() {
        let (builder, controller, acknowledged) = fixture();
        let _support = ReloadingBuilderSupportListener::connect(&builder, &controller);

        builder.get_configuration().unwrap();
        assert_eq!(acknowledged.load(Ordering::SeqCst), 1);

        // Cached access creates nothing, so nothing is acknowledged.
        builder.get_configuration().unwrap();
        assert_eq!(acknowledged.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reload_does_not_acknowledge_before_rebuild() {
        let (builder, controller, acknowledged) = fixture();
        let _support = ReloadingBuilderSupportListener::connect(&builder, &controller);

        controller.check_for_reloading(None).unwrap();
        assert_eq!(acknowledged.load(Ordering::SeqCst), 0);
        assert!(controller.is_in_reloading_state());

        builder.get_configuration().unwrap();
        assert_eq!(acknowledged.load(Ordering::SeqCst), 1);
        assert!(!controller.is_in_reloading_state());
    }

    #[test]
    fn test_connect_via_builder() {
        let (builder, controller, _) = fixture();
        let support = builder.connect_to_reloading_controller(&controller);

        assert!(support.is_connected());
        assert_eq!(controller.listener_count(), 1);
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let (builder, controller, acknowledged) = fixture();
        let support = ReloadingBuilderSupportListener::connect(&builder, &controller);
        let events = Arc::new(RecordingListener::default());
        builder.add_event_listener(BuilderEventType::Reset, events.clone());

        assert!(support.disconnect());
        assert!(!support.disconnect());
        assert!(!support.is_connected());
        assert_eq!(controller.listener_count(), 0);

        controller.check_for_reloading(None).unwrap();
        builder.get_configuration().unwrap();

        assert!(events.0.lock().unwrap().is_empty());
        assert_eq!(acknowledged.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_does_not_keep_builder_alive() {
        let (builder, controller, _) = fixture();
        let support = ReloadingBuilderSupportListener::connect(&builder, &controller);
        let weak = Arc::downgrade(&builder);
        drop(builder);

        assert!(weak.upgrade().is_none());
        // Reload after the builder is gone is a no-op.
        assert!(controller.check_for_reloading(None).unwrap());
        assert!(support.disconnect());
    }
}
