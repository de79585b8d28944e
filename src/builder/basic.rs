//! Basic caching builder.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::builder::event::{BuilderEventType, BuilderId, BuilderListener, ConfigurationBuilderEvent};
use crate::builder::support::ReloadingBuilderSupportListener;
use crate::builder::ConfigurationBuilder;
use crate::error::ConfigError;
use crate::listeners::ListenerRegistry;
use crate::observability::metrics;
use crate::reloading::ReloadingController;

/// Construction logic for a builder's result.
pub trait ResultFactory<T>: Send + Sync {
    fn create_result(&self) -> Result<T, ConfigError>;
}

impl<T, F> ResultFactory<T> for F
where
    F: Fn() -> Result<T, ConfigError> + Send + Sync,
{
    fn create_result(&self) -> Result<T, ConfigError> {
        self()
    }
}

/// Builder that creates its result lazily and caches it until reset.
///
/// Construction happens under the builder's lock, so concurrent callers
/// share a single construction. A failed construction leaves the cache
/// empty and fires no `ResultCreated` event.
pub struct BasicConfigurationBuilder<T> {
    id: BuilderId,
    factory: Box<dyn ResultFactory<T>>,
    result: Mutex<Option<Arc<T>>>,
    listeners: ListenerRegistry<BuilderEventType, dyn BuilderListener>,
}

impl<T: Send + Sync + 'static> BasicConfigurationBuilder<T> {
    pub fn new(factory: impl ResultFactory<T> + 'static) -> Self {
        Self {
            id: BuilderId::next(),
            factory: Box::new(factory),
            result: Mutex::new(None),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Builder whose result comes from a closure.
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn() -> Result<T, ConfigError> + Send + Sync + 'static,
    {
        Self::new(factory)
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<T>>> {
        self.result.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True if a result is currently cached.
    pub fn has_result(&self) -> bool {
        self.slot().is_some()
    }

    /// Connect this builder to `controller` so detected changes reset it.
    ///
    /// Keep the returned listener to disconnect later.
    pub fn connect_to_reloading_controller(
        self: &Arc<Self>,
        controller: &Arc<ReloadingController>,
    ) -> Arc<ReloadingBuilderSupportListener<Self>> {
        ReloadingBuilderSupportListener::connect(self, controller)
    }

    fn fire(&self, event_type: BuilderEventType) -> Result<(), ConfigError> {
        let event = ConfigurationBuilderEvent {
            event_type,
            source: self.id,
        };
        metrics::record_builder_event(event_type.as_str());
        for listener in self.listeners.matching(|registered| registered.accepts(event_type)) {
            listener.on_event(&event)?;
        }
        Ok(())
    }
}

impl<T: Send + Sync + 'static> ConfigurationBuilder for BasicConfigurationBuilder<T> {
    type Output = T;

    fn id(&self) -> BuilderId {
        self.id
    }

    fn get_configuration(&self) -> Result<Arc<T>, ConfigError> {
        self.fire(BuilderEventType::ConfigurationRequest)?;

        let (result, created) = {
            let mut slot = self.slot();
            match slot.as_ref() {
                Some(cached) => (Arc::clone(cached), false),
                None => {
                    let fresh = match self.factory.create_result() {
                        Ok(value) => Arc::new(value),
                        Err(e) => {
                            metrics::record_builder_failure();
                            tracing::warn!(builder = %self.id, error = %e, "Configuration construction failed");
                            return Err(e);
                        }
                    };
                    *slot = Some(Arc::clone(&fresh));
                    (fresh, true)
                }
            }
        };

        if created {
            tracing::debug!(builder = %self.id, "Configuration result created");
            self.fire(BuilderEventType::ResultCreated)?;
        }
        Ok(result)
    }

    fn reset_result(&self) -> Result<(), ConfigError> {
        let previous = self.slot().take();
        tracing::debug!(builder = %self.id, had_result = previous.is_some(), "Configuration result reset");
        self.fire(BuilderEventType::Reset)
    }

    fn add_event_listener(
        &self,
        event_type: BuilderEventType,
        listener: Arc<dyn BuilderListener>,
    ) -> bool {
        self.listeners.add(event_type, listener)
    }

    fn remove_event_listener(
        &self,
        event_type: BuilderEventType,
        listener: &Arc<dyn BuilderListener>,
    ) -> bool {
        self.listeners.remove(&event_type, listener)
    }
}

impl<T> fmt::Debug for BasicConfigurationBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicConfigurationBuilder")
            .field("id", &self.id)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
