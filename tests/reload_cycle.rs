//! End-to-end tests of the detect → reset → rebuild → acknowledge cycle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use config_reload::builder::{
    BasicConfigurationBuilder, BuilderEventType, ConfigurationBuilder,
    ReloadingBuilderSupportListener,
};
use config_reload::reloading::{ReloadingController, ReloadingDetector, ReloadingListener};
use config_reload::ConfigError;

mod common;

use common::{BuilderEventRecorder, ReloadCounter, ScriptedDetector};

fn counting_builder() -> Arc<BasicConfigurationBuilder<usize>> {
    let builds = Arc::new(AtomicUsize::new(0));
    Arc::new(BasicConfigurationBuilder::from_fn(move || {
        Ok(builds.fetch_add(1, Ordering::SeqCst))
    }))
}

#[test]
fn test_full_cycle_with_single_change() {
    let (detector, probe) = ScriptedDetector::new(&[true]);
    let controller = Arc::new(ReloadingController::new(detector));
    let builder = counting_builder();
    let recorder = Arc::new(BuilderEventRecorder::default());
    builder.add_event_listener(BuilderEventType::Reset, recorder.clone());

    let support = ReloadingBuilderSupportListener::connect(&builder, &controller);

    assert!(controller.check_for_reloading(None).unwrap());
    recorder.next_event(BuilderEventType::Reset);
    recorder.assert_no_more_events();
    assert_eq!(probe.acknowledged(), 0);

    builder.get_configuration().unwrap();
    assert_eq!(probe.acknowledged(), 1);
    assert!(!controller.is_in_reloading_state());

    // Nothing pending any more.
    assert!(!controller.check_for_reloading(None).unwrap());
    recorder.assert_no_more_events();

    assert!(support.disconnect());
}

#[test]
fn test_reload_yields_new_instance() {
    let (detector, _) = ScriptedDetector::new(&[false, true]);
    let controller = Arc::new(ReloadingController::new(detector));
    let builder = counting_builder();
    let _support = builder.connect_to_reloading_controller(&controller);

    let first = builder.get_configuration().unwrap();
    assert!(!controller.check_for_reloading(None).unwrap());
    assert!(Arc::ptr_eq(&first, &builder.get_configuration().unwrap()));

    assert!(controller.check_for_reloading(None).unwrap());
    let second = builder.get_configuration().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*second, *first + 1);
}

#[test]
fn test_detector_not_queried_again_before_rebuild() {
    let (detector, probe) = ScriptedDetector::new(&[true, true, true]);
    let controller = Arc::new(ReloadingController::new(detector));
    let builder = counting_builder();
    let _support = ReloadingBuilderSupportListener::connect(&builder, &controller);
    let counter = Arc::new(ReloadCounter::default());
    controller.add_reloading_listener(counter.clone());

    assert!(controller.check_for_reloading(None).unwrap());
    for _ in 0..5 {
        assert!(!controller.check_for_reloading(None).unwrap());
    }
    assert_eq!(probe.queries(), 1);
    assert_eq!(counter.count(), 1);

    builder.get_configuration().unwrap();
    assert!(controller.check_for_reloading(None).unwrap());
    assert_eq!(probe.queries(), 2);
    assert_eq!(counter.count(), 2);
}

#[test]
fn test_repeated_connect_does_not_duplicate_notifications() {
    let (detector, _) = ScriptedDetector::new(&[true]);
    let controller = Arc::new(ReloadingController::new(detector));
    let builder = counting_builder();
    let counter = Arc::new(ReloadCounter::default());
    let handle: Arc<dyn ReloadingListener> = counter.clone();

    controller.add_reloading_listener(handle.clone());
    controller.add_reloading_listener(handle.clone());
    let _support = ReloadingBuilderSupportListener::connect(&builder, &controller);
    assert_eq!(controller.listener_count(), 2);

    controller.check_for_reloading(None).unwrap();
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_disconnected_pair_stays_silent() {
    let (detector, probe) = ScriptedDetector::new(&[true]);
    let controller = Arc::new(ReloadingController::new(detector));
    let builder = counting_builder();
    let recorder = Arc::new(BuilderEventRecorder::default());
    builder.add_event_listener(BuilderEventType::Any, recorder.clone());

    let support = ReloadingBuilderSupportListener::connect(&builder, &controller);
    support.disconnect();

    assert!(controller.check_for_reloading(None).unwrap());
    recorder.assert_no_more_events();

    builder.get_configuration().unwrap();
    recorder.next_event(BuilderEventType::ConfigurationRequest);
    recorder.next_event(BuilderEventType::ResultCreated);
    assert_eq!(probe.acknowledged(), 0);
    assert!(controller.is_in_reloading_state());
}

#[test]
fn test_two_builders_share_one_controller() {
    let (detector, probe) = ScriptedDetector::new(&[true]);
    let controller = Arc::new(ReloadingController::new(detector));
    let first = counting_builder();
    let second = counting_builder();
    let _a = ReloadingBuilderSupportListener::connect(&first, &controller);
    let _b = ReloadingBuilderSupportListener::connect(&second, &controller);

    let before = (first.get_configuration().unwrap(), second.get_configuration().unwrap());
    assert_eq!(probe.acknowledged(), 2);

    controller.check_for_reloading(None).unwrap();
    assert!(!first.has_result());
    assert!(!second.has_result());

    let after = first.get_configuration().unwrap();
    assert!(!Arc::ptr_eq(&before.0, &after));
    assert_eq!(probe.acknowledged(), 3);
}

/// Always reports a change; the second acknowledge fails.
struct SecondAckFails {
    acks: usize,
}

impl ReloadingDetector for SecondAckFails {
    fn is_reloading_required(&mut self) -> Result<bool, ConfigError> {
        Ok(true)
    }

    fn reloading_performed(&mut self) -> Result<(), ConfigError> {
        self.acks += 1;
        if self.acks == 2 {
            return Err(ConfigError::Construction("stat failed once".into()));
        }
        Ok(())
    }
}

#[test]
fn test_reloading_survives_failed_acknowledge() {
    let controller = Arc::new(ReloadingController::new(SecondAckFails { acks: 0 }));
    let builder = counting_builder();
    let _support = ReloadingBuilderSupportListener::connect(&builder, &controller);

    builder.get_configuration().unwrap();
    assert!(controller.check_for_reloading(None).unwrap());
    assert!(builder.get_configuration().is_err());
    assert!(!controller.is_in_reloading_state());

    let mut fired = 0;
    for _ in 0..5 {
        if controller.check_for_reloading(None).unwrap() {
            fired += 1;
        }
        builder.get_configuration().unwrap();
    }

    assert_eq!(fired, 5);
    assert!(!controller.is_in_reloading_state());
    // Initial build, the build whose acknowledge failed, then one per reload.
    assert_eq!(*builder.get_configuration().unwrap(), 6);
}
