//! Project aggregate: roles, agents, manager, prompt partials.

use crate::error::ImportError;
use crate::field::State;
use crate::params::LlmParams;
use crate::prompt::PromptMap;
use crate::{new_entity_id, EntityId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ============================================================================
// PROMPT PARTIALS
// ============================================================================

/// A named, reusable block of prompt text referenced by inclusion syntax
/// from other prompt bodies. Name collisions are tolerated here; they only
/// make inclusion references ambiguous at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPartial {
    pub id: EntityId,
    pub name: String,
    pub content: String,
}

impl PromptPartial {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            name: name.into(),
            content: content.into(),
        }
    }
}

// ============================================================================
// AGENT ROLES AND AGENTS
// ============================================================================

/// A role definition: the LLM configuration, prompts, and phase assignment
/// shared by every agent instantiated from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRole {
    pub role_id: u32,
    pub name: String,
    pub llm_type: String,
    pub llm_params: LlmParams,
    pub prompts: PromptMap,
    pub task_phases: Vec<u32>,
    pub num_agents: u32,
}

impl AgentRole {
    pub fn new(role_id: u32, name: impl Into<String>) -> Self {
        Self {
            role_id,
            name: name.into(),
            llm_type: String::new(),
            llm_params: LlmParams::default(),
            prompts: PromptMap::new(),
            task_phases: Vec::new(),
            num_agents: 0,
        }
    }
}

/// One concrete agent instance bound to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: u32,
    pub role_id: u32,
}

/// Role ids referenced by agents but declared by no role, deduplicated and
/// ascending. Referential integrity is advisory: the deserializer does not
/// run this check, the editing layer does.
pub fn dangling_role_ids(agents: &[Agent], roles: &[AgentRole]) -> Vec<u32> {
    let mut dangling: Vec<u32> = agents
        .iter()
        .map(|a| a.role_id)
        .filter(|role_id| !roles.iter().any(|r| r.role_id == *role_id))
        .collect();
    dangling.sort_unstable();
    dangling.dedup();
    dangling
}

// ============================================================================
// MANAGER
// ============================================================================

/// Manager kind discriminator, as written in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagerKind {
    TurnBasedPhaseManager,
    HybridPhaseManager,
}

impl ManagerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TurnBasedPhaseManager => "TurnBasedPhaseManager",
            Self::HybridPhaseManager => "HybridPhaseManager",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ImportError> {
        match s {
            "TurnBasedPhaseManager" => Ok(Self::TurnBasedPhaseManager),
            "HybridPhaseManager" => Ok(Self::HybridPhaseManager),
            other => Err(ImportError::UnrecognizedManagerType {
                value: other.to_string(),
            }),
        }
    }
}

/// Settings meaningful only for the hybrid manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HybridSettings {
    pub continuous_phases: Vec<u32>,
    pub min_action_delay: u32,
    pub max_action_delay: u32,
}

/// Phase progression strategy.
///
/// Hybrid-only settings live inside the variant, so switching the kind
/// structurally purges them: a later switch back to hybrid starts from
/// defaults, never from ghost values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Manager {
    TurnBasedPhaseManager,
    HybridPhaseManager(HybridSettings),
}

impl Default for Manager {
    fn default() -> Self {
        Self::TurnBasedPhaseManager
    }
}

impl Manager {
    pub fn kind(&self) -> ManagerKind {
        match self {
            Self::TurnBasedPhaseManager => ManagerKind::TurnBasedPhaseManager,
            Self::HybridPhaseManager(_) => ManagerKind::HybridPhaseManager,
        }
    }

    /// Switch the manager kind. Changing kind resets type-specific settings;
    /// setting the current kind keeps them.
    pub fn set_kind(&mut self, kind: ManagerKind) {
        if self.kind() == kind {
            return;
        }
        *self = match kind {
            ManagerKind::TurnBasedPhaseManager => Self::TurnBasedPhaseManager,
            ManagerKind::HybridPhaseManager => Self::HybridPhaseManager(HybridSettings::default()),
        };
    }

    pub fn hybrid_settings(&self) -> Option<&HybridSettings> {
        match self {
            Self::HybridPhaseManager(settings) => Some(settings),
            Self::TurnBasedPhaseManager => None,
        }
    }
}

// ============================================================================
// PROJECT
// ============================================================================

/// The root aggregate. A value type: no identity beyond `id`, mutated by
/// whole-object replacement of sub-trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub created_at: Timestamp,
    pub name: String,
    pub description: Option<String>,
    pub game_id: Option<i64>,
    pub prompt_partials: Vec<PromptPartial>,
    pub agent_roles: Vec<AgentRole>,
    pub agents: Vec<Agent>,
    pub state: State,
    pub manager: Manager,
    /// Reference to an externally owned server target, bound at export time.
    pub server_target_id: Option<EntityId>,
}

impl Project {
    /// A fresh project: empty role/agent/partial lists, default manager.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            created_at: Utc::now(),
            name: name.into(),
            description: None,
            game_id: None,
            prompt_partials: Vec::new(),
            agent_roles: Vec::new(),
            agents: Vec::new(),
            state: State::new(),
            manager: Manager::default(),
            server_target_id: None,
        }
    }
}

/// A project parsed from a document: everything except identity and
/// creation-time fields, which are stamped when the draft is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    pub description: Option<String>,
    pub game_id: Option<i64>,
    pub prompt_partials: Vec<PromptPartial>,
    pub agent_roles: Vec<AgentRole>,
    pub agents: Vec<Agent>,
    pub state: State,
    pub manager: Manager,
}

impl ProjectDraft {
    /// Promote the draft to a full project with fresh identity.
    pub fn into_project(self) -> Project {
        Project {
            id: new_entity_id(),
            created_at: Utc::now(),
            name: self.name,
            description: self.description,
            game_id: self.game_id,
            prompt_partials: self.prompt_partials,
            agent_roles: self.agent_roles,
            agents: self.agents,
            state: self.state,
            manager: self.manager,
            server_target_id: None,
        }
    }

    pub fn dangling_role_ids(&self) -> Vec<u32> {
        dangling_role_ids(&self.agents, &self.agent_roles)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_kind_roundtrip() {
        for kind in [
            ManagerKind::TurnBasedPhaseManager,
            ManagerKind::HybridPhaseManager,
        ] {
            assert_eq!(ManagerKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_manager_kind_parse_unknown() {
        let err = ManagerKind::parse("RoundRobinManager").unwrap_err();
        assert_eq!(
            err,
            ImportError::UnrecognizedManagerType {
                value: "RoundRobinManager".to_string()
            }
        );
    }

    #[test]
    fn test_set_kind_purges_hybrid_settings() {
        let mut manager = Manager::HybridPhaseManager(HybridSettings {
            continuous_phases: vec![2, 3],
            min_action_delay: 5,
            max_action_delay: 10,
        });

        manager.set_kind(ManagerKind::TurnBasedPhaseManager);
        assert_eq!(manager, Manager::TurnBasedPhaseManager);
        assert!(manager.hybrid_settings().is_none());

        // Switching back starts from defaults, not the old values.
        manager.set_kind(ManagerKind::HybridPhaseManager);
        assert_eq!(
            manager.hybrid_settings(),
            Some(&HybridSettings::default())
        );
    }

    #[test]
    fn test_set_kind_same_kind_keeps_settings() {
        let settings = HybridSettings {
            continuous_phases: vec![1],
            min_action_delay: 2,
            max_action_delay: 8,
        };
        let mut manager = Manager::HybridPhaseManager(settings.clone());
        manager.set_kind(ManagerKind::HybridPhaseManager);
        assert_eq!(manager.hybrid_settings(), Some(&settings));
    }

    #[test]
    fn test_project_new_shape() {
        let project = Project::new("Prison Escape");
        assert_eq!(project.name, "Prison Escape");
        assert!(project.agent_roles.is_empty());
        assert!(project.agents.is_empty());
        assert!(project.prompt_partials.is_empty());
        assert_eq!(project.manager, Manager::TurnBasedPhaseManager);
        assert!(project.server_target_id.is_none());
    }

    #[test]
    fn test_draft_into_project_stamps_identity() {
        let draft = ProjectDraft {
            name: "Imported".to_string(),
            ..ProjectDraft::default()
        };
        let a = draft.clone().into_project();
        let b = draft.into_project();
        assert_eq!(a.name, "Imported");
        assert_ne!(a.id, b.id);
        assert!(a.server_target_id.is_none());
    }

    #[test]
    fn test_dangling_role_ids() {
        let roles = vec![AgentRole::new(1, "Prisoner")];
        let agents = vec![
            Agent { id: 1, role_id: 1 },
            Agent { id: 2, role_id: 9 },
            Agent { id: 3, role_id: 9 },
        ];
        assert_eq!(dangling_role_ids(&agents, &roles), vec![9]);
    }

    #[test]
    fn test_prompt_partial_ids_unique() {
        let a = PromptPartial::new("rules", "No talking.");
        let b = PromptPartial::new("rules", "No talking.");
        assert_ne!(a.id, b.id);
    }
}
