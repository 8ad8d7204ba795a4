use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChimeError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// User-typed time text matched none of the accepted patterns. Carries
    /// the original input so the front end can echo it back.
    #[error("Unrecognized time format: {input}")]
    InvalidTimeFormat { input: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The channel (at creation) or inbox (at delivery) no longer resolves.
    /// Delivery-time failures are not errors here: the dispatcher
    /// classifies them into `DeliveryOutcome::Failed` and the engine
    /// retries next tick.
    #[error("Destination unresolvable: {target}")]
    DestinationUnresolvable { target: String },

    #[error("Store error: {0}")]
    Store(String),
}

impl ChimeError {
    /// Short error code string surfaced to the command front end.
    pub fn code(&self) -> &'static str {
        match self {
            ChimeError::Config(_) => "CONFIG_ERROR",
            ChimeError::InvalidTimeFormat { .. } => "INVALID_TIME_FORMAT",
            ChimeError::InvalidRequest(_) => "INVALID_REQUEST",
            ChimeError::DestinationUnresolvable { .. } => "DESTINATION_UNRESOLVABLE",
            ChimeError::Store(_) => "STORE_UNAVAILABLE",
        }
    }
}

pub type Result<T> = std::result::Result<T, ChimeError>;
