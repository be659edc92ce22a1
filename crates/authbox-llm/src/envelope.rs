/// Normalized result of one provider HTTP call.
///
/// Adapters never surface transport errors to their callers; every call
/// collapses into an envelope. `ok` reflects HTTP-level success (2xx) only —
/// a well-formed envelope may still carry an undecodable or absent `payload`,
/// and the orchestrator re-validates payload shape independently.
#[derive(Debug, Clone)]
pub struct ProviderEnvelope {
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    pub payload: Option<serde_json::Value>,
}

impl ProviderEnvelope {
    /// Envelope for a transport-level failure (connection refused, DNS,
    /// mid-body disconnect before headers). Status 0, no payload.
    #[must_use]
    pub fn fetch_error() -> Self {
        Self {
            ok: false,
            status: 0,
            status_text: "FETCH_ERROR".into(),
            payload: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_shape() {
        let env = ProviderEnvelope::fetch_error();
        assert!(!env.ok);
        assert_eq!(env.status, 0);
        assert_eq!(env.status_text, "FETCH_ERROR");
        assert!(env.payload.is_none());
    }
}
