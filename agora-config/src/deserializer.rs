//! Document deserializer: untrusted runner document -> staged project draft.
//!
//! serde_yaml does all the parsing; this module layers field-level validation
//! and the model mapping on top. Parsing failures are always returned as
//! structured errors so the caller can surface them and leave existing state
//! untouched.

use agora_core::{
    is_default_meta_name, Agent, AgentRole, FieldSet, FieldType, HybridSettings, ImportError,
    LlmParams, Manager, ManagerKind, ParamValue, ProjectDraft, PromptKey, PromptMap,
    PromptPartial, SchemaError, State, StateField,
};
use serde::Deserialize;
use serde_yaml::{Mapping, Value as Yaml};
use std::fmt;

// ============================================================================
// WARNINGS
// ============================================================================

/// Non-fatal advisories recorded during an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportWarning {
    EmptyAgentRoles,
    EmptyAgents,
    /// A prompt entry with a non-string value was dropped. The drop itself is
    /// kept for compatibility with existing documents; recording it is the
    /// only change.
    NonStringPrompt { role: String, key: String },
    /// A prompt entry under a key that is not a recognized prompt slot.
    UnknownPromptKey { role: String, key: String },
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAgentRoles => write!(f, "document declares no agent roles"),
            Self::EmptyAgents => write!(f, "document declares no agents"),
            Self::NonStringPrompt { role, key } => write!(
                f,
                "role '{}': prompt '{}' has a non-string value and was dropped",
                role, key
            ),
            Self::UnknownPromptKey { role, key } => write!(
                f,
                "role '{}': unrecognized prompt key '{}' was dropped",
                role, key
            ),
        }
    }
}

/// A successfully parsed document: the staged draft plus recorded advisories.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub draft: ProjectDraft,
    pub warnings: Vec<ImportWarning>,
}

// ============================================================================
// RAW DOCUMENT SHAPE (serde structs)
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    name: Option<Yaml>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    game_id: Option<i64>,
    #[serde(default)]
    prompt_partials: Vec<RawPartial>,
    #[serde(default)]
    agent_roles: Vec<RawAgentRole>,
    #[serde(default)]
    agents: Vec<RawAgent>,
    #[serde(default)]
    state: Option<RawState>,
    #[serde(default)]
    manager: Option<RawManager>,
    // `runner` is deliberately absent here: it is one-way enrichment from the
    // server target selection and is ignored on reimport.
}

#[derive(Debug, Deserialize)]
struct RawPartial {
    name: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAgentRole {
    role_id: u32,
    name: String,
    llm_type: String,
    #[serde(default)]
    llm_params: Option<Mapping>,
    #[serde(default)]
    prompts: Vec<Mapping>,
    #[serde(default)]
    task_phases: Vec<u32>,
    #[serde(default)]
    num_agents: u32,
}

#[derive(Debug, Deserialize)]
struct RawAgent {
    id: u32,
    role_id: u32,
}

#[derive(Debug, Deserialize, Default)]
struct RawState {
    #[serde(default)]
    meta_information: Vec<RawStateField>,
    #[serde(default)]
    private_information: Vec<RawStateField>,
    #[serde(default)]
    public_information: Vec<RawStateField>,
}

#[derive(Debug, Deserialize)]
struct RawStateField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    default: Option<Yaml>,
    #[serde(default)]
    default_factory: Option<String>,
    #[serde(default)]
    event_key: Option<String>,
    #[serde(default)]
    exclude_from_mapping: bool,
    #[serde(default)]
    optional: bool,
}

#[derive(Debug, Deserialize)]
struct RawManager {
    #[serde(rename = "type")]
    manager_type: String,
    #[serde(default)]
    continuous_phases: Vec<u32>,
    #[serde(default)]
    min_action_delay: u32,
    #[serde(default)]
    max_action_delay: u32,
}

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Parse an external document into a staged project draft.
///
/// Referential integrity between agents and roles is not checked here:
/// partial documents are valid staging inputs pending correction in the
/// editor (`ProjectDraft::dangling_role_ids` is the caller-side check).
pub fn from_document(text: &str) -> Result<ImportOutcome, ImportError> {
    let root: Yaml = serde_yaml::from_str(text).map_err(|e| ImportError::MalformedDocument {
        reason: e.to_string(),
    })?;
    if !root.is_mapping() {
        return Err(ImportError::MalformedDocument {
            reason: "document root is not a mapping".to_string(),
        });
    }
    let raw: RawDocument =
        serde_yaml::from_value(root).map_err(|e| ImportError::MalformedDocument {
            reason: e.to_string(),
        })?;

    let name = match raw.name {
        Some(Yaml::String(name)) => name,
        _ => {
            return Err(ImportError::MissingRequiredField {
                field: "name".to_string(),
            })
        }
    };

    let mut warnings = Vec::new();

    let prompt_partials: Vec<PromptPartial> = raw
        .prompt_partials
        .into_iter()
        .map(|p| PromptPartial::new(p.name, p.content.unwrap_or_default()))
        .collect();

    let agent_roles: Vec<AgentRole> = raw
        .agent_roles
        .into_iter()
        .map(|role| convert_role(role, &mut warnings))
        .collect();

    let agents: Vec<Agent> = raw
        .agents
        .into_iter()
        .map(|a| Agent {
            id: a.id,
            role_id: a.role_id,
        })
        .collect();

    let state = convert_state(raw.state)?;
    let manager = convert_manager(raw.manager)?;

    if agent_roles.is_empty() {
        warnings.push(ImportWarning::EmptyAgentRoles);
    }
    if agents.is_empty() {
        warnings.push(ImportWarning::EmptyAgents);
    }
    for warning in &warnings {
        tracing::warn!("import advisory: {}", warning);
    }

    Ok(ImportOutcome {
        draft: ProjectDraft {
            name,
            description: raw.description,
            game_id: raw.game_id,
            prompt_partials,
            agent_roles,
            agents,
            state,
            manager,
        },
        warnings,
    })
}

// ============================================================================
// CONVERSION LAYER
// ============================================================================

fn convert_role(raw: RawAgentRole, warnings: &mut Vec<ImportWarning>) -> AgentRole {
    let prompts = fold_prompts(&raw.name, raw.prompts, warnings);
    AgentRole {
        role_id: raw.role_id,
        name: raw.name,
        llm_type: raw.llm_type,
        llm_params: convert_llm_params(raw.llm_params),
        prompts,
        task_phases: raw.task_phases,
        num_agents: raw.num_agents,
    }
}

/// A broken per-role LLM config must not block the rest of the import:
/// a missing `model_name` degrades to the literal placeholder `"unknown"`.
/// Remaining scalars are preserved verbatim; the document already typed them,
/// so no re-inference happens here.
fn convert_llm_params(raw: Option<Mapping>) -> LlmParams {
    let mut params = LlmParams::new("unknown");
    let Some(mapping) = raw else {
        return params;
    };
    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            continue;
        };
        if key == "model_name" {
            if let Some(name) = value.as_str() {
                params.model_name = name.to_string();
            }
            continue;
        }
        params.extra.push((key.to_string(), yaml_to_param(value)));
    }
    params
}

/// Fold the document's sequence of single-key prompt records into the keyed
/// map. Entries with non-string values or unrecognized keys are dropped and
/// recorded.
fn fold_prompts(
    role: &str,
    records: Vec<Mapping>,
    warnings: &mut Vec<ImportWarning>,
) -> PromptMap {
    let mut map = PromptMap::new();
    for record in records {
        for (key, value) in record {
            let key_text = match key.as_str() {
                Some(k) => k.to_string(),
                None => scalar_text(&key),
            };
            let Some(text) = value.as_str() else {
                warnings.push(ImportWarning::NonStringPrompt {
                    role: role.to_string(),
                    key: key_text,
                });
                continue;
            };
            match PromptKey::parse(&key_text) {
                Ok(prompt_key) => map.set(prompt_key, text),
                Err(_) => warnings.push(ImportWarning::UnknownPromptKey {
                    role: role.to_string(),
                    key: key_text,
                }),
            }
        }
    }
    map
}

fn convert_state(raw: Option<RawState>) -> Result<State, ImportError> {
    let raw = raw.unwrap_or_default();
    let mut state = State::new();
    for field in raw.meta_information {
        let field = convert_field(field)?;
        // Default meta fields are implicit; reading them back is reconciliation,
        // not an override.
        if is_default_meta_name(&field.name) {
            continue;
        }
        state
            .add_field(FieldSet::Meta, field)
            .map_err(schema_to_import)?;
    }
    for field in raw.private_information {
        state
            .add_field(FieldSet::Private, convert_field(field)?)
            .map_err(schema_to_import)?;
    }
    for field in raw.public_information {
        state
            .add_field(FieldSet::Public, convert_field(field)?)
            .map_err(schema_to_import)?;
    }
    Ok(state)
}

fn convert_field(raw: RawStateField) -> Result<StateField, ImportError> {
    let field_type = FieldType::parse(&raw.field_type).map_err(schema_to_import)?;
    Ok(StateField {
        name: raw.name,
        field_type,
        default: raw.default.as_ref().and_then(default_text),
        default_factory: raw.default_factory,
        event_key: raw.event_key,
        exclude_from_mapping: raw.exclude_from_mapping,
        optional: raw.optional,
    })
}

fn convert_manager(raw: Option<RawManager>) -> Result<Manager, ImportError> {
    // A project is always manageable: no manager block means turn-based.
    let Some(raw) = raw else {
        return Ok(Manager::default());
    };
    match ManagerKind::parse(&raw.manager_type)? {
        ManagerKind::TurnBasedPhaseManager => Ok(Manager::TurnBasedPhaseManager),
        ManagerKind::HybridPhaseManager => Ok(Manager::HybridPhaseManager(HybridSettings {
            continuous_phases: raw.continuous_phases,
            min_action_delay: raw.min_action_delay,
            max_action_delay: raw.max_action_delay,
        })),
    }
}

fn schema_to_import(err: SchemaError) -> ImportError {
    ImportError::MalformedDocument {
        reason: err.to_string(),
    }
}

// ============================================================================
// VALUE MAPPING HELPERS
// ============================================================================

fn yaml_to_param(value: Yaml) -> ParamValue {
    match value {
        Yaml::Bool(b) => ParamValue::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                ParamValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                ParamValue::Float(f)
            } else {
                ParamValue::Str(n.to_string())
            }
        }
        Yaml::String(s) => ParamValue::Str(s),
        other => ParamValue::Json(yaml_to_json(&other)),
    }
}

/// Render a typed document default back to the model's textual form.
fn default_text(value: &Yaml) -> Option<String> {
    match value {
        Yaml::Null => None,
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Number(n) => Some(number_text(n)),
        Yaml::String(s) => Some(s.clone()),
        other => serde_json::to_string(&yaml_to_json(other)).ok(),
    }
}

fn number_text(n: &serde_yaml::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        match n.as_f64() {
            // Keep the decimal point so the text re-coerces to a float.
            Some(f) if f.is_finite() && f == f.trunc() => format!("{:.1}", f),
            Some(f) => f.to_string(),
            None => n.to_string(),
        }
    }
}

fn yaml_to_json(value: &Yaml) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Yaml::Null => Json::Null,
        Yaml::Bool(b) => Json::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Json::from(i)
            } else if let Some(u) = n.as_u64() {
                Json::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Json::Number)
                    .unwrap_or(Json::Null)
            }
        }
        Yaml::String(s) => Json::String(s.clone()),
        Yaml::Sequence(seq) => Json::Array(seq.iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (scalar_text(k), yaml_to_json(v)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

fn scalar_text(value: &Yaml) -> String {
    match value {
        Yaml::String(s) => s.clone(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Null => "null".to_string(),
        _ => "?".to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
