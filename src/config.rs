use parse_display::Display;
use serde::{Deserialize, Serialize};

/// Whether an adapter may keep a live connection to its source.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPolicy {
    /// Subscribe to the source when the adapter is started.
    #[default]
    Live,
    /// Never subscribe. The adapter holds its initial value forever.
    StaticFallback,
}

/// What an adapter does with a snapshot that cannot be decoded.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Stop applying updates. The adapter keeps the last good value and reports
    /// [`AdapterStatus::Failed`](crate::AdapterStatus::Failed).
    #[default]
    FailFast,
    /// Log and drop the snapshot. The subscription stays live.
    Skip,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub connection: ConnectionPolicy,
    pub decode: DecodePolicy,
}
impl AdapterConfig {
    pub fn live() -> Self {
        Self::default()
    }
    pub fn static_fallback() -> Self {
        Self {
            connection: ConnectionPolicy::StaticFallback,
            ..Self::default()
        }
    }
    pub fn with_connection(self, connection: ConnectionPolicy) -> Self {
        Self { connection, ..self }
    }
    pub fn with_decode(self, decode: DecodePolicy) -> Self {
        Self { decode, ..self }
    }
}
