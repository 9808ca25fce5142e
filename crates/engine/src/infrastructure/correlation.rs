//! Request correlation for log lines.

use uuid::Uuid;

/// Random identifier carried on the tracing span of one story request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 hex digits, enough to tell concurrent requests apart in logs.
    pub fn short(&self) -> String {
        let mut hex = self.0.simple().to_string();
        hex.truncate(8);
        hex
    }
}
