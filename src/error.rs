use parse_display::Display;

/// A pushed snapshot could not be decoded into the adapter's value type.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[display("failed to decode record `{id}`: {message}")]
pub struct DecodeError {
    id: String,
    message: String,
}
impl DecodeError {
    pub fn new(id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self {
            id: id.into(),
            message: message.to_string(),
        }
    }

    /// Identifier of the record that failed to decode.
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::error::Error for DecodeError {}

/// Returned by [`PushAdapter::start`](crate::PushAdapter::start) when the adapter cannot
/// be started.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum StartError {
    #[display("adapter is already started")]
    AlreadyStarted,
    #[display("adapter is closed")]
    Closed,
}

impl std::error::Error for StartError {}
