//! Reloading controller.
//!
//! # Responsibilities
//! - Own one detector and serialize every call into it
//! - Run the detect → notify protocol on demand
//! - Keep detection and acknowledgement as separate steps
//!
//! # State Transitions
//! ```text
//! Idle → Reloading: check_for_reloading() and the detector reports a change
//!                   (listeners notified once, after the lock is released)
//! Reloading → Idle: reset_reloading_state() (detector acknowledged)
//! ```
//!
//! # Design Decisions
//! - While a reload is pending the detector is not queried again and no
//!   further event fires; the pending reload is reported exactly once
//! - Listener errors propagate to the caller of `check_for_reloading` and
//!   skip the remaining listeners

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ConfigError;
use crate::listeners::ListenerRegistry;
use crate::observability::metrics;
use crate::reloading::detector::ReloadingDetector;

/// Event passed to reloading listeners when a change was detected.
#[derive(Clone, Copy)]
pub struct ReloadingEvent<'a> {
    context: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a> ReloadingEvent<'a> {
    pub fn new(context: Option<&'a (dyn Any + Send + Sync)>) -> Self {
        Self { context }
    }

    /// The opaque context handed to `check_for_reloading`.
    pub fn context(&self) -> Option<&'a (dyn Any + Send + Sync)> {
        self.context
    }

    /// The context downcast to a concrete type.
    pub fn context_as<T: Any>(&self) -> Option<&'a T> {
        self.context.and_then(|c| c.downcast_ref::<T>())
    }
}

impl fmt::Debug for ReloadingEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadingEvent")
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

/// Subscriber informed when a controller detects a change.
pub trait ReloadingListener: Send + Sync {
    fn reloading_required(&self, event: &ReloadingEvent<'_>) -> Result<(), ConfigError>;
}

struct ControllerState {
    detector: Box<dyn ReloadingDetector>,
    reloading: bool,
}

/// Coordinates a [`ReloadingDetector`] with a set of [`ReloadingListener`]s.
pub struct ReloadingController {
    state: Mutex<ControllerState>,
    listeners: ListenerRegistry<(), dyn ReloadingListener>,
}

impl ReloadingController {
    /// Create a controller that takes ownership of `detector`.
    pub fn new(detector: impl ReloadingDetector + 'static) -> Self {
        Self {
            state: Mutex::new(ControllerState {
                detector: Box::new(detector),
                reloading: false,
            }),
            listeners: ListenerRegistry::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener. Registering the same listener twice has no effect.
    pub fn add_reloading_listener(&self, listener: Arc<dyn ReloadingListener>) -> bool {
        self.listeners.add((), listener)
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove_reloading_listener(&self, listener: &Arc<dyn ReloadingListener>) -> bool {
        self.listeners.remove(&(), listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// True between a fired reload event and the next `reset_reloading_state`.
    pub fn is_in_reloading_state(&self) -> bool {
        self.lock().reloading
    }

    /// Ask the detector whether a reload is needed and notify listeners if so.
    ///
    /// Returns true if this call fired a reload event. The detector is not
    /// acknowledged here; that is `reset_reloading_state`'s job. If the
    /// detector fails, nothing is notified and the state stays untouched so
    /// the next check retries.
    pub fn check_for_reloading(
        &self,
        context: Option<&(dyn Any + Send + Sync)>,
    ) -> Result<bool, ConfigError> {
        let fire = {
            let mut state = self.lock();
            if state.reloading {
                tracing::debug!("Reload already pending, skipping detector query");
                metrics::record_reload_check("pending");
                return Ok(false);
            }
            match state.detector.is_reloading_required() {
                Ok(true) => {
                    state.reloading = true;
                    true
                }
                Ok(false) => false,
                Err(e) => {
                    metrics::record_reload_check("error");
                    return Err(e);
                }
            }
        };

        if !fire {
            metrics::record_reload_check("unchanged");
            return Ok(false);
        }

        metrics::record_reload_check("changed");
        metrics::record_reload_event();
        tracing::info!(
            listeners = self.listeners.len(),
            "Configuration source changed, notifying reloading listeners"
        );

        let event = ReloadingEvent::new(context);
        for listener in self.listeners.matching(|_| true) {
            listener.reloading_required(&event)?;
        }
        Ok(true)
    }

    /// Acknowledge the pending reload and re-arm detection.
    ///
    /// Always delegates to the detector, whether or not a reload is pending.
    /// The pending flag is cleared even if the detector fails; its baseline
    /// then stays where it was, so the next check reports the change again.
    pub fn reset_reloading_state(&self) -> Result<(), ConfigError> {
        let mut state = self.lock();
        let was_pending = std::mem::replace(&mut state.reloading, false);
        if let Err(e) = state.detector.reloading_performed() {
            tracing::warn!(error = %e, "Detector failed to acknowledge reload, next check retries");
            return Err(e);
        }
        if was_pending {
            tracing::debug!("Reloading state reset");
        }
        Ok(())
    }
}

impl fmt::Debug for ReloadingController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadingController")
            .field("reloading", &self.is_in_reloading_state())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
