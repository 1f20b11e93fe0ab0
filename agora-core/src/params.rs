//! LLM parameter bags.
//!
//! Role-level LLM settings are a heterogeneous key/value bag entered as free
//! text in the editor. Values are carried as a tagged sum rather than a
//! dynamically typed map so the serializer can emit native scalars.

use serde::{Deserialize, Serialize};

/// A single LLM parameter value.
///
/// `Json` carries object/array-valued params read back from a document
/// losslessly; free-text inference never produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Json(serde_json::Value),
}

impl ParamValue {
    /// Infer a typed value from free-text input.
    ///
    /// Precedence: integer, then float, then case-insensitive `true`/`false`,
    /// then string. The number checks run strictly before the boolean check.
    pub fn infer(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        Self::Str(text.to_string())
    }
}

/// LLM configuration for an agent role: the model name plus arbitrary
/// additional parameters in entry order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmParams {
    pub model_name: String,
    pub extra: Vec<(String, ParamValue)>,
}

impl LlmParams {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            extra: Vec::new(),
        }
    }

    /// Insert or update a parameter, preserving first-entry order.
    pub fn set(&mut self, key: impl Into<String>, value: ParamValue) {
        let key = key.into();
        match self.extra.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.extra.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.extra.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

// =============================================================================
// TESTS
// =============================================================================
