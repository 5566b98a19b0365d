use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid {event} payload: {source}")]
    InvalidPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("payload is not a JSON object")]
    NotAnObject,
}

impl RenderError {
    pub(crate) fn invalid(event: &str, source: serde_json::Error) -> Self {
        Self::InvalidPayload {
            event: event.to_string(),
            source,
        }
    }
}
