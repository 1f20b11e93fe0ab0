//! Prompt slots and the role prompt map.
//!
//! Prompts live under typed keys: the default `system`/`user` pair, or a
//! phase-qualified `system_phase_<N>`/`user_phase_<N>` pair for phase N >= 1.
//! Empty content is never stored as an explicit key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which prompt a key addresses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PromptSlot {
    System,
    User,
}

impl PromptSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// A prompt-slot identifier: default, or qualified by a positive phase.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum PromptKey {
    Default(PromptSlot),
    Phase(PromptSlot, u32),
}

impl PromptKey {
    /// Parse the wire form: `system`, `user`, `system_phase_<N>`,
    /// `user_phase_<N>` with N >= 1.
    pub fn parse(s: &str) -> Result<Self, PromptKeyParseError> {
        match s {
            "system" => return Ok(Self::Default(PromptSlot::System)),
            "user" => return Ok(Self::Default(PromptSlot::User)),
            _ => {}
        }
        let (slot, digits) = if let Some(rest) = s.strip_prefix("system_phase_") {
            (PromptSlot::System, rest)
        } else if let Some(rest) = s.strip_prefix("user_phase_") {
            (PromptSlot::User, rest)
        } else {
            return Err(PromptKeyParseError(s.to_string()));
        };
        match digits.parse::<u32>() {
            Ok(phase) if phase >= 1 => Ok(Self::Phase(slot, phase)),
            _ => Err(PromptKeyParseError(s.to_string())),
        }
    }

    pub fn slot(&self) -> PromptSlot {
        match self {
            Self::Default(slot) | Self::Phase(slot, _) => *slot,
        }
    }
}

impl fmt::Display for PromptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default(slot) => write!(f, "{}", slot.as_str()),
            Self::Phase(slot, phase) => write!(f, "{}_phase_{}", slot.as_str(), phase),
        }
    }
}

impl TryFrom<String> for PromptKey {
    type Error = PromptKeyParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PromptKey> for String {
    fn from(key: PromptKey) -> Self {
        key.to_string()
    }
}

/// Error parsing a PromptKey from its wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptKeyParseError(pub String);

impl fmt::Display for PromptKeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid prompt key: {}", self.0)
    }
}

impl std::error::Error for PromptKeyParseError {}

/// Both prompts discovered for one phase. Missing slot text is an empty
/// string in the record even though empty values are never stored as keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePrompt {
    pub phase: u32,
    pub system: String,
    pub user: String,
}

// ============================================================================
// PROMPT MAP
// ============================================================================

/// Mapping from prompt keys to text content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptMap {
    entries: BTreeMap<PromptKey, String>,
}

impl PromptMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &PromptKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PromptKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Insert or update a prompt. A value that trims to empty removes the key
    /// entirely; otherwise the content is stored verbatim, untrimmed.
    pub fn set(&mut self, key: PromptKey, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, value);
        }
    }

    /// Phase numbers present in the map, ascending.
    pub fn phases(&self) -> Vec<u32> {
        let mut phases: Vec<u32> = self
            .entries
            .keys()
            .filter_map(|k| match k {
                PromptKey::Phase(_, phase) => Some(*phase),
                PromptKey::Default(_) => None,
            })
            .collect();
        phases.sort_unstable();
        phases.dedup();
        phases
    }

    /// One record per discovered phase, sorted ascending by phase number.
    pub fn phase_prompts(&self) -> Vec<PhasePrompt> {
        self.phases()
            .into_iter()
            .map(|phase| PhasePrompt {
                phase,
                system: self
                    .get(&PromptKey::Phase(PromptSlot::System, phase))
                    .unwrap_or_default()
                    .to_string(),
                user: self
                    .get(&PromptKey::Phase(PromptSlot::User, phase))
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect()
    }

    /// Move the system and user entries (where present) from `old` to `new`.
    ///
    /// A `None` or zero target deletes both entries. When the target phase
    /// already holds an entry for a moved slot, the moved content wins
    /// (last write wins).
    pub fn renumber_phase(&mut self, old: u32, new: Option<u32>) {
        for slot in [PromptSlot::System, PromptSlot::User] {
            let moved = self.entries.remove(&PromptKey::Phase(slot, old));
            if let (Some(content), Some(target)) = (moved, new.filter(|n| *n >= 1)) {
                self.entries.insert(PromptKey::Phase(slot, target), content);
            }
        }
    }
}

impl FromIterator<(PromptKey, String)> for PromptMap {
    fn from_iter<I: IntoIterator<Item = (PromptKey, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.set(key, value);
        }
        map
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_key_wire_roundtrip() {
        for key in [
            PromptKey::Default(PromptSlot::System),
            PromptKey::Default(PromptSlot::User),
            PromptKey::Phase(PromptSlot::System, 3),
            PromptKey::Phase(PromptSlot::User, 12),
        ] {
            let wire = key.to_string();
            assert_eq!(PromptKey::parse(&wire).unwrap(), key);
        }
    }

    #[test]
    fn test_prompt_key_parse_rejects_invalid() {
        for bad in ["assistant", "system_phase_0", "system_phase_", "user_phase_x", ""] {
            assert!(PromptKey::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_set_empty_removes_key() {
        let mut map = PromptMap::new();
        let key = PromptKey::Phase(PromptSlot::System, 3);
        map.set(key, "A");
        assert_eq!(map.get(&key), Some("A"));

        map.set(key, "   ");
        assert_eq!(map.get(&key), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_set_keeps_internal_whitespace() {
        let mut map = PromptMap::new();
        let key = PromptKey::Default(PromptSlot::System);
        map.set(key, "  keep me  ");
        assert_eq!(map.get(&key), Some("  keep me  "));
    }

    #[test]
    fn test_phase_prompts_symmetry() {
        let mut map = PromptMap::new();
        map.set(PromptKey::Phase(PromptSlot::System, 3), "A");
        map.set(PromptKey::Phase(PromptSlot::User, 3), "B");

        let records = map.phase_prompts();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            PhasePrompt {
                phase: 3,
                system: "A".to_string(),
                user: "B".to_string(),
            }
        );

        map.set(PromptKey::Phase(PromptSlot::System, 3), "");
        map.set(PromptKey::Phase(PromptSlot::User, 3), "");
        assert!(map.phase_prompts().is_empty());
    }

    #[test]
    fn test_phase_prompts_missing_slot_is_empty_string() {
        let mut map = PromptMap::new();
        map.set(PromptKey::Phase(PromptSlot::User, 2), "only user");
        map.set(PromptKey::Phase(PromptSlot::System, 5), "only system");

        let records = map.phase_prompts();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].phase, 2);
        assert_eq!(records[0].system, "");
        assert_eq!(records[0].user, "only user");
        assert_eq!(records[1].phase, 5);
        assert_eq!(records[1].user, "");
    }

    #[test]
    fn test_renumber_phase_moves_both_slots() {
        let mut map = PromptMap::new();
        map.set(PromptKey::Phase(PromptSlot::System, 1), "S");
        map.set(PromptKey::Phase(PromptSlot::User, 1), "U");

        map.renumber_phase(1, Some(4));
        assert_eq!(map.get(&PromptKey::Phase(PromptSlot::System, 1)), None);
        assert_eq!(map.get(&PromptKey::Phase(PromptSlot::System, 4)), Some("S"));
        assert_eq!(map.get(&PromptKey::Phase(PromptSlot::User, 4)), Some("U"));
    }

    #[test]
    fn test_renumber_phase_invalid_target_deletes() {
        let mut map = PromptMap::new();
        map.set(PromptKey::Phase(PromptSlot::System, 2), "S");
        map.set(PromptKey::Phase(PromptSlot::User, 2), "U");

        map.renumber_phase(2, None);
        assert!(map.is_empty());

        map.set(PromptKey::Phase(PromptSlot::System, 2), "S");
        map.renumber_phase(2, Some(0));
        assert!(map.is_empty());
    }

    #[test]
    fn test_renumber_phase_collision_last_write_wins() {
        let mut map = PromptMap::new();
        map.set(PromptKey::Phase(PromptSlot::System, 1), "first");
        map.set(PromptKey::Phase(PromptSlot::System, 2), "second");

        map.renumber_phase(1, Some(3));
        map.renumber_phase(2, Some(3));
        assert_eq!(
            map.get(&PromptKey::Phase(PromptSlot::System, 3)),
            Some("second")
        );
        assert_eq!(map.phases(), vec![3]);
    }

    #[test]
    fn test_renumber_partial_phase_leaves_other_slot() {
        let mut map = PromptMap::new();
        map.set(PromptKey::Phase(PromptSlot::System, 1), "moved");
        map.set(PromptKey::Phase(PromptSlot::User, 2), "stays");

        map.renumber_phase(1, Some(2));
        assert_eq!(map.get(&PromptKey::Phase(PromptSlot::System, 2)), Some("moved"));
        assert_eq!(map.get(&PromptKey::Phase(PromptSlot::User, 2)), Some("stays"));
    }

    #[test]
    fn test_prompt_map_serde_uses_wire_keys() {
        let mut map = PromptMap::new();
        map.set(PromptKey::Default(PromptSlot::System), "Be concise");
        map.set(PromptKey::Phase(PromptSlot::User, 2), "Phase two");

        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"system\""));
        assert!(json.contains("\"user_phase_2\""));

        let back: PromptMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
