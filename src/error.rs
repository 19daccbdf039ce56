use thiserror::Error;

use crate::ecs::EntityId;

/// Error taxonomy for the flight-simulation engine.
///
/// Every variant except [`SimError::SinkWriteFailed`] aborts the run when
/// propagated out of [`crate::manager::Manager::run`] — persistence failures
/// are logged and the affected row is dropped, but the simulation continues.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("invalid motor thrust curve: {0}")]
    MotorCurveInvalid(String),

    #[error("motor ignite() called while not idle")]
    MotorNotIdle,

    #[error("entity {entity:?} missing required field '{field}'")]
    EntityValidationFailed { entity: EntityId, field: &'static str },

    #[error("numeric failure ({context}): non-finite value encountered")]
    NumericFailure { context: &'static str },

    #[error("plugin '{plugin}' failed: {message}")]
    PluginError { plugin: String, message: String },

    #[error("sink '{sink}' write failed: {source}")]
    SinkWriteFailed {
        sink: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
