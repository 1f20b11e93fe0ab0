//! State schema fields and the default meta field registry.
//!
//! A project state schema is three field-sets (meta/private/public). The meta
//! set always carries a fixed table of built-in fields; user-defined meta
//! fields are reconciled against that table and may never shadow it.

use crate::error::SchemaError;
use crate::params::ParamValue;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid field name pattern"));

// ============================================================================
// FIELD TYPE
// ============================================================================

/// Primitive type of a state field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Str,
    Int,
    Float,
    Bool,
    List,
    Dict,
}

impl FieldType {
    /// Convert to the document token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::List => "list",
            Self::Dict => "dict",
        }
    }

    /// Parse from the document token.
    pub fn parse(s: &str) -> Result<Self, SchemaError> {
        match s {
            "str" => Ok(Self::Str),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "bool" => Ok(Self::Bool),
            "list" => Ok(Self::List),
            "dict" => Ok(Self::Dict),
            other => Err(SchemaError::InvalidType {
                value: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// STATE FIELD
// ============================================================================

/// One typed field definition within a field-set.
///
/// `default` holds the textual form entered in the editor; typed coercion
/// happens at serialization time via [`StateField::coerced_default`].
/// `default` and `default_factory` are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateField {
    pub name: String,
    pub field_type: FieldType,
    pub default: Option<String>,
    pub default_factory: Option<String>,
    pub event_key: Option<String>,
    pub exclude_from_mapping: bool,
    pub optional: bool,
}

impl StateField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
            default_factory: None,
            event_key: None,
            exclude_from_mapping: false,
            optional: false,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_default_factory(mut self, factory: impl Into<String>) -> Self {
        self.default_factory = Some(factory.into());
        self
    }

    /// Validate this field in isolation: name charset and default exclusivity.
    ///
    /// Set-level rules (uniqueness, reserved names) live on [`State`].
    pub fn validate(&self) -> Result<(), SchemaError> {
        if !FIELD_NAME_RE.is_match(&self.name) {
            return Err(SchemaError::InvalidFieldName {
                name: self.name.clone(),
            });
        }
        let has_default = self.default.as_deref().is_some_and(|d| !d.is_empty());
        let has_factory = self.default_factory.as_deref().is_some_and(|f| !f.is_empty());
        if has_default && has_factory {
            return Err(SchemaError::ConflictingDefault {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Coerce the stored textual default to its typed document value.
    ///
    /// Coercion never fails: a default that does not parse under the field's
    /// type degrades to the original literal as a string.
    pub fn coerced_default(&self) -> Option<ParamValue> {
        let text = self.default.as_deref()?;
        let value = match self.field_type {
            FieldType::Str => ParamValue::Str(text.to_string()),
            FieldType::Int => match text.trim().parse::<i64>() {
                Ok(i) => ParamValue::Int(i),
                Err(_) => ParamValue::Str(text.to_string()),
            },
            FieldType::Float => match text.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => ParamValue::Float(f),
                _ => ParamValue::Str(text.to_string()),
            },
            FieldType::Bool => ParamValue::Bool(text.trim().eq_ignore_ascii_case("true")),
            FieldType::List | FieldType::Dict => {
                match serde_json::from_str::<serde_json::Value>(text) {
                    Ok(parsed) => ParamValue::Json(parsed),
                    Err(_) => ParamValue::Str(text.to_string()),
                }
            }
        };
        Some(value)
    }
}

// ============================================================================
// DEFAULT META FIELD REGISTRY
// ============================================================================

/// Names of the built-in meta fields, in their fixed order.
pub const DEFAULT_META_FIELD_NAMES: [&str; 5] =
    ["game_id", "player_name", "player_number", "players", "phase"];

/// The built-in meta fields every project state contains.
///
/// Pure table, no global mutable handle: callers needing reconciliation take
/// this as data.
pub fn default_meta_fields() -> Vec<StateField> {
    vec![
        StateField::new("game_id", FieldType::Int).with_default("0"),
        StateField::new("player_name", FieldType::Str),
        StateField::new("player_number", FieldType::Int),
        StateField::new("players", FieldType::List).with_default_factory("list"),
        StateField::new("phase", FieldType::Int).with_default("0"),
    ]
}

/// O(1) membership check against the fixed default meta names.
pub fn is_default_meta_name(name: &str) -> bool {
    matches!(
        name,
        "game_id" | "player_name" | "player_number" | "players" | "phase"
    )
}

/// Reconcile custom meta fields with the built-in table: defaults always
/// present and always first, customs following in stored order minus any
/// that shadow a default name. Pure and idempotent.
pub fn effective_meta_fields(custom: &[StateField]) -> Vec<StateField> {
    let mut fields = default_meta_fields();
    fields.extend(
        custom
            .iter()
            .filter(|f| !is_default_meta_name(&f.name))
            .cloned(),
    );
    fields
}

// ============================================================================
// STATE (THE THREE FIELD-SETS)
// ============================================================================

/// Which field-set a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldSet {
    Meta,
    Private,
    Public,
}

/// A project's state schema: meta, private, and public field-sets.
///
/// `meta_information` stores only user-defined meta fields; consumers read
/// the reconciled set through [`State::effective_meta_fields`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub meta_information: Vec<StateField>,
    pub private_information: Vec<StateField>,
    pub public_information: Vec<StateField>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    fn fields(&self, set: FieldSet) -> &Vec<StateField> {
        match set {
            FieldSet::Meta => &self.meta_information,
            FieldSet::Private => &self.private_information,
            FieldSet::Public => &self.public_information,
        }
    }

    fn fields_mut(&mut self, set: FieldSet) -> &mut Vec<StateField> {
        match set {
            FieldSet::Meta => &mut self.meta_information,
            FieldSet::Private => &mut self.private_information,
            FieldSet::Public => &mut self.public_information,
        }
    }

    /// Add a field to a set, enforcing charset, default exclusivity,
    /// reserved-name policy on the meta set, and uniqueness within the set.
    pub fn add_field(&mut self, set: FieldSet, field: StateField) -> Result<(), SchemaError> {
        field.validate()?;
        if set == FieldSet::Meta && is_default_meta_name(&field.name) {
            return Err(SchemaError::ReservedFieldName { name: field.name });
        }
        if self.fields(set).iter().any(|f| f.name == field.name) {
            return Err(SchemaError::DuplicateName { name: field.name });
        }
        self.fields_mut(set).push(field);
        Ok(())
    }

    /// Replace the field named `name` in a set with a new definition.
    ///
    /// Editing a default meta field, or renaming onto a reserved or already
    /// used name, is rejected.
    pub fn replace_field(
        &mut self,
        set: FieldSet,
        name: &str,
        field: StateField,
    ) -> Result<(), SchemaError> {
        field.validate()?;
        if set == FieldSet::Meta && (is_default_meta_name(name) || is_default_meta_name(&field.name))
        {
            let reserved = if is_default_meta_name(name) {
                name.to_string()
            } else {
                field.name.clone()
            };
            return Err(SchemaError::ReservedFieldName { name: reserved });
        }
        if field.name != name && self.fields(set).iter().any(|f| f.name == field.name) {
            return Err(SchemaError::DuplicateName { name: field.name });
        }
        let slots = self.fields_mut(set);
        match slots.iter_mut().find(|f| f.name == name) {
            Some(slot) => *slot = field,
            // Whole-object replacement semantics: replacing an absent field
            // is an insert.
            None => slots.push(field),
        }
        Ok(())
    }

    /// Remove the field named `name` from a set. Removing a default meta
    /// field is rejected; removing an absent field is a no-op.
    pub fn remove_field(&mut self, set: FieldSet, name: &str) -> Result<(), SchemaError> {
        if set == FieldSet::Meta && is_default_meta_name(name) {
            return Err(SchemaError::ReservedFieldName {
                name: name.to_string(),
            });
        }
        self.fields_mut(set).retain(|f| f.name != name);
        Ok(())
    }

    /// The reconciled meta field-set exposed to consumers.
    pub fn effective_meta_fields(&self) -> Vec<StateField> {
        effective_meta_fields(&self.meta_information)
    }
}

// =============================================================================
// TESTS
// =============================================================================
