use std::fmt;

/// Request-scoped logging interface.
///
/// `RequestLog` stamps every event with the id of the request being
/// decorated, so events from aggregation and validation can be correlated
/// with the framework's own request logs. Requests without an id are
/// logged with `-`.
#[derive(Debug, Clone)]
pub struct RequestLog {
    request_id: String,
}

impl RequestLog {
    /// Creates a logger for the given request id.
    pub(crate) fn new(request_id: Option<String>) -> Self {
        Self {
            request_id: request_id.unwrap_or_else(|| "-".to_string()),
        }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Logs a warning-level message with request ID.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a debug-level message with request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, "{}", args);
    }
}
