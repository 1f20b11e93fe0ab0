//! Server target: the externally owned endpoint a project is bound to at
//! export time. Consumed by the serializer, never mutated here.

use crate::{new_entity_id, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTarget {
    pub id: EntityId,
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub path: String,
    pub logs_dir: Option<String>,
    pub log_level: Option<String>,
    pub phase_transition_event: Option<String>,
    pub phase_identifier_key: Option<String>,
    /// `"none"` is a sentinel for "no provider" and is omitted at export.
    pub observability_provider: Option<String>,
}

impl ServerTarget {
    pub fn new(
        name: impl Into<String>,
        hostname: impl Into<String>,
        port: u16,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: new_entity_id(),
            name: name.into(),
            hostname: hostname.into(),
            port,
            path: path.into(),
            logs_dir: None,
            log_level: None,
            phase_transition_event: None,
            phase_identifier_key: None,
            observability_provider: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_target_new_defaults() {
        let target = ServerTarget::new("local", "localhost", 8765, "wss");
        assert_eq!(target.hostname, "localhost");
        assert_eq!(target.port, 8765);
        assert!(target.logs_dir.is_none());
        assert!(target.observability_provider.is_none());
    }
}
