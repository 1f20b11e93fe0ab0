//! Project serializer: `(Project, ServerTarget)` -> runner document text.
//!
//! Pure function over an immutable snapshot; writing the produced document
//! anywhere is the caller's concern. The serializer assumes a schema-valid
//! project (duplicate/reserved names and default conflicts are rejected at
//! the mutation boundary) and does not re-validate.

use crate::emit::{int_list, key_token, param_scalar, push_block_scalar, quoted};
use agora_core::{
    ExportError, ManagerKind, Project, PromptKey, PromptMap, PromptSlot, ServerTarget, StateField,
};

/// Manager type -> runner type. Table-driven on purpose: an unrecognized
/// manager kind is a loud failure, never a guessed name.
const RUNNER_TYPES: &[(ManagerKind, &str)] = &[
    (ManagerKind::TurnBasedPhaseManager, "TurnBasedGameRunner"),
    (ManagerKind::HybridPhaseManager, "HybridGameRunner"),
];

fn runner_type(kind: ManagerKind) -> Result<&'static str, ExportError> {
    RUNNER_TYPES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, name)| *name)
        .ok_or_else(|| ExportError::UnrecognizedManagerType {
            value: kind.as_str().to_string(),
        })
}

/// Produce the external document for a project bound to a server target.
///
/// The target is a caller precondition: `None` fails with
/// `MissingServerTarget`, it is never silently defaulted.
pub fn to_document(
    project: &Project,
    target: Option<&ServerTarget>,
) -> Result<String, ExportError> {
    let target = target.ok_or(ExportError::MissingServerTarget)?;
    let runner = runner_type(project.manager.kind())?;

    let mut out = String::new();

    out.push_str(&format!("name: {}\n", quoted(&project.name)));
    if let Some(description) = &project.description {
        out.push_str(&format!("description: {}\n", quoted(description)));
    }
    if let Some(game_id) = project.game_id {
        out.push_str(&format!("game_id: {}\n", game_id));
    }

    if !project.prompt_partials.is_empty() {
        out.push_str("prompt_partials:\n");
        for partial in &project.prompt_partials {
            out.push_str(&format!("  - name: {}\n", quoted(&partial.name)));
            push_block_scalar(&mut out, "    content", &partial.content, 6);
        }
    }

    if !project.agent_roles.is_empty() {
        out.push_str("agent_roles:\n");
        for role in &project.agent_roles {
            out.push_str(&format!("  - role_id: {}\n", role.role_id));
            out.push_str(&format!("    name: {}\n", quoted(&role.name)));
            out.push_str(&format!("    llm_type: {}\n", quoted(&role.llm_type)));
            out.push_str("    llm_params:\n");
            out.push_str(&format!(
                "      model_name: {}\n",
                quoted(&role.llm_params.model_name)
            ));
            for (key, value) in &role.llm_params.extra {
                out.push_str(&format!("      {}: {}\n", key_token(key), param_scalar(value)));
            }
            push_prompts(&mut out, &role.prompts);
            out.push_str(&format!("    task_phases: {}\n", int_list(&role.task_phases)));
            out.push_str(&format!("    num_agents: {}\n", role.num_agents));
        }
    }

    if !project.agents.is_empty() {
        out.push_str("agents:\n");
        for agent in &project.agents {
            out.push_str(&format!("  - id: {}\n", agent.id));
            out.push_str(&format!("    role_id: {}\n", agent.role_id));
        }
    }

    out.push_str("state:\n");
    push_field_set(
        &mut out,
        "meta_information",
        &project.state.effective_meta_fields(),
    );
    push_field_set(&mut out, "private_information", &project.state.private_information);
    push_field_set(&mut out, "public_information", &project.state.public_information);

    out.push_str("manager:\n");
    out.push_str(&format!("  type: {}\n", project.manager.kind().as_str()));
    if let Some(settings) = project.manager.hybrid_settings() {
        out.push_str(&format!(
            "  continuous_phases: {}\n",
            int_list(&settings.continuous_phases)
        ));
        out.push_str(&format!("  min_action_delay: {}\n", settings.min_action_delay));
        out.push_str(&format!("  max_action_delay: {}\n", settings.max_action_delay));
    }

    out.push_str("runner:\n");
    out.push_str(&format!("  type: {}\n", runner));
    out.push_str(&format!("  hostname: {}\n", quoted(&target.hostname)));
    out.push_str(&format!("  port: {}\n", target.port));
    out.push_str(&format!("  path: {}\n", quoted(&target.path)));
    if let Some(logs_dir) = &target.logs_dir {
        out.push_str(&format!("  logs_dir: {}\n", quoted(logs_dir)));
    }
    if let Some(log_level) = &target.log_level {
        out.push_str(&format!("  log_level: {}\n", quoted(log_level)));
    }
    if let Some(event) = &target.phase_transition_event {
        out.push_str(&format!("  phase_transition_event: {}\n", quoted(event)));
    }
    if let Some(key) = &target.phase_identifier_key {
        out.push_str(&format!("  phase_identifier_key: {}\n", quoted(key)));
    }
    if let Some(provider) = target
        .observability_provider
        .as_deref()
        .filter(|p| *p != "none")
    {
        out.push_str(&format!("  observability_provider: {}\n", quoted(provider)));
    }

    Ok(out)
}

/// Prompt list entries: default system/user first, then phase-qualified
/// entries ascending by phase, system before user within a phase.
fn push_prompts(out: &mut String, prompts: &PromptMap) {
    if prompts.is_empty() {
        return;
    }
    out.push_str("    prompts:\n");
    for slot in [PromptSlot::System, PromptSlot::User] {
        if let Some(text) = prompts.get(&PromptKey::Default(slot)) {
            push_block_scalar(out, &format!("      - {}", slot.as_str()), text, 10);
        }
    }
    for record in prompts.phase_prompts() {
        for (slot, text) in [
            (PromptSlot::System, &record.system),
            (PromptSlot::User, &record.user),
        ] {
            if !text.is_empty() {
                let key = PromptKey::Phase(slot, record.phase);
                push_block_scalar(out, &format!("      - {}", key), text, 10);
            }
        }
    }
}

fn push_field_set(out: &mut String, key: &str, fields: &[StateField]) {
    if fields.is_empty() {
        out.push_str(&format!("  {}: []\n", key));
        return;
    }
    out.push_str(&format!("  {}:\n", key));
    for field in fields {
        out.push_str(&format!("    - name: {}\n", quoted(&field.name)));
        out.push_str(&format!("      type: {}\n", field.field_type.as_str()));
        // default_factory takes precedence when both are somehow present.
        if let Some(factory) = field.default_factory.as_deref().filter(|f| !f.is_empty()) {
            out.push_str(&format!("      default_factory: {}\n", quoted(factory)));
        } else if field.default.as_deref().is_some_and(|d| !d.is_empty()) {
            if let Some(value) = field.coerced_default() {
                out.push_str(&format!("      default: {}\n", param_scalar(&value)));
            }
        }
        if let Some(event_key) = &field.event_key {
            out.push_str(&format!("      event_key: {}\n", quoted(event_key)));
        }
        if field.exclude_from_mapping {
            out.push_str("      exclude_from_mapping: true\n");
        }
        if field.optional {
            out.push_str("      optional: true\n");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{
        FieldSet, FieldType, HybridSettings, Manager, ManagerKind, ParamValue, Project,
        StateField,
    };

    fn target() -> ServerTarget {
        ServerTarget::new("local", "localhost", 8765, "wss")
    }

    #[test]
    fn test_missing_server_target_is_hard_failure() {
        let project = Project::new("Escape");
        let err = to_document(&project, None).unwrap_err();
        assert_eq!(err, ExportError::MissingServerTarget);
    }

    #[test]
    fn test_runner_type_table() {
        assert_eq!(
            runner_type(ManagerKind::TurnBasedPhaseManager).unwrap(),
            "TurnBasedGameRunner"
        );
        assert_eq!(
            runner_type(ManagerKind::HybridPhaseManager).unwrap(),
            "HybridGameRunner"
        );
    }

    #[test]
    fn test_top_level_order_and_defaults() {
        let project = Project::new("Escape");
        let doc = to_document(&project, Some(&target())).unwrap();

        let name_at = doc.find("name:").unwrap();
        let state_at = doc.find("state:").unwrap();
        let manager_at = doc.find("manager:").unwrap();
        let runner_at = doc.find("runner:").unwrap();
        assert!(name_at < state_at && state_at < manager_at && manager_at < runner_at);

        // Empty optional sections are omitted entirely.
        assert!(!doc.contains("description:"));
        assert!(!doc.contains("prompt_partials:"));
        assert!(!doc.contains("agent_roles:"));
        assert!(!doc.contains("agents:"));

        // Default meta fields are always serialized, defaults first.
        assert!(doc.contains("- name: \"game_id\""));
        assert!(doc.contains("- name: \"phase\""));
        assert!(doc.contains("default_factory: \"list\""));
    }

    #[test]
    fn test_hybrid_manager_fields_present_only_for_hybrid() {
        let mut project = Project::new("Escape");
        project.manager = Manager::HybridPhaseManager(HybridSettings {
            continuous_phases: vec![2, 3],
            min_action_delay: 5,
            max_action_delay: 10,
        });
        let doc = to_document(&project, Some(&target())).unwrap();
        assert!(doc.contains("type: HybridPhaseManager"));
        assert!(doc.contains("continuous_phases: [2, 3]"));
        assert!(doc.contains("min_action_delay: 5"));
        assert!(doc.contains("type: HybridGameRunner"));

        // Switching away purges the hybrid settings from the record.
        project.manager.set_kind(ManagerKind::TurnBasedPhaseManager);
        let doc = to_document(&project, Some(&target())).unwrap();
        assert!(doc.contains("type: TurnBasedPhaseManager"));
        assert!(!doc.contains("min_action_delay"));
        assert!(!doc.contains("continuous_phases"));
    }

    #[test]
    fn test_observability_provider_none_sentinel_omitted() {
        let project = Project::new("Escape");
        let mut t = target();
        t.observability_provider = Some("none".to_string());
        let doc = to_document(&project, Some(&t)).unwrap();
        assert!(!doc.contains("observability_provider"));

        t.observability_provider = Some("langsmith".to_string());
        let doc = to_document(&project, Some(&t)).unwrap();
        assert!(doc.contains("observability_provider: \"langsmith\""));
    }

    #[test]
    fn test_coercion_boundary_cases() {
        let mut project = Project::new("Escape");
        project
            .state
            .add_field(
                FieldSet::Public,
                StateField::new("count", FieldType::Int).with_default("abc"),
            )
            .unwrap();
        project
            .state
            .add_field(
                FieldSet::Public,
                StateField::new("ready", FieldType::Bool).with_default("TRUE"),
            )
            .unwrap();
        let doc = to_document(&project, Some(&target())).unwrap();
        assert!(doc.contains("default: \"abc\""));
        assert!(doc.contains("default: true"));
    }

    #[test]
    fn test_llm_params_native_and_structured_values() {
        let mut project = Project::new("Escape");
        let mut role = agora_core::AgentRole::new(1, "Prisoner");
        role.llm_type = "ChatOpenAI".to_string();
        role.llm_params = agora_core::LlmParams::new("gpt-4o");
        role.llm_params.set("temperature", ParamValue::Float(0.7));
        role.llm_params.set("max_tokens", ParamValue::Int(256));
        role.llm_params.set("streaming", ParamValue::Bool(true));
        role.llm_params.set(
            "stop",
            ParamValue::Json(serde_json::json!(["\n", "END"])),
        );
        project.agent_roles.push(role);

        let doc = to_document(&project, Some(&target())).unwrap();
        assert!(doc.contains("model_name: \"gpt-4o\""));
        assert!(doc.contains("temperature: 0.7"));
        assert!(doc.contains("max_tokens: 256"));
        assert!(doc.contains("streaming: true"));
        // Structured params are JSON-encoded, never bare unescaped text.
        assert!(doc.contains(r#"stop: ["\n","END"]"#));
    }

    #[test]
    fn test_empty_partial_content_keeps_explicit_block_marker() {
        let mut project = Project::new("Escape");
        project
            .prompt_partials
            .push(agora_core::PromptPartial::new("blank", ""));
        let doc = to_document(&project, Some(&target())).unwrap();
        assert!(doc.contains("content: |-\n"));
    }
}
