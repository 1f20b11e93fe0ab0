//! agora core - project data model
//!
//! Pure data structures and validation rules for multi-agent experiment
//! definitions: state field schemas, prompt maps, agent roles, managers, and
//! the project aggregate. Serialization to and from the runner document
//! format lives in `agora-config`; this crate performs no I/O.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod error;
pub mod field;
pub mod params;
pub mod project;
pub mod prompt;
pub mod server;

pub use error::{AgoraError, AgoraResult, ExportError, ImportError, SchemaError};
pub use field::{
    default_meta_fields, effective_meta_fields, is_default_meta_name, FieldSet, FieldType, State,
    StateField, DEFAULT_META_FIELD_NAMES,
};
pub use params::{LlmParams, ParamValue};
pub use project::{
    dangling_role_ids, Agent, AgentRole, HybridSettings, Manager, ManagerKind, Project,
    ProjectDraft, PromptPartial,
};
pub use prompt::{PhasePrompt, PromptKey, PromptKeyParseError, PromptMap, PromptSlot};
pub use server::ServerTarget;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_unique() {
        let a = new_entity_id();
        let b = new_entity_id();
        assert_ne!(a, b);
    }
}
