mod conflict;
mod error;
mod ops;
mod snapshot;

pub use error::EngineError;
pub use snapshot::{ItemStatus, ReservationView, StatusReport};

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::model::Ms;
use crate::notify::NotifyHub;
use crate::registry::{Registry, SharedEquipmentState};

/// Wall clock in unix milliseconds. The engine itself never reads the
/// clock; callers pass `now` into every operation.
pub fn now_ms() -> Ms {
    conflict::now_ms()
}

/// What a successful operation hands back to the transport layer: a
/// reply for the caller plus broadcasts for the shared status channel.
/// Broadcasts are also published on the notify hub as a side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub reply: String,
    pub broadcasts: Vec<String>,
}

pub struct Engine {
    registry: Registry,
    config: EngineConfig,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    pub fn new(config: EngineConfig, notify: Arc<NotifyHub>) -> Self {
        let registry = Registry::new(&config.equipment);
        Self {
            registry,
            config,
            notify,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<SharedEquipmentState, EngineError> {
        self.registry
            .resolve(name)
            .ok_or_else(|| EngineError::InvalidEquipment(name.to_string()))
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a broadcast on the outcome and publish it on the hub.
    pub(crate) fn announce(&self, broadcasts: &mut Vec<String>, text: String) {
        self.notify.send(text.clone());
        broadcasts.push(text);
    }
}
