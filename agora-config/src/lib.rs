//! agora config - project document serialization
//!
//! Bidirectional mapping between the in-memory project model and the textual
//! runner configuration document (YAML).
//!
//! Architecture:
//! ```text
//! Project + ServerTarget
//!     ↓
//! Serializer (canonical YAML emitter, block literals for prompt text)
//!     ↓
//! Document text  →  external runner
//!     ↓
//! Deserializer (serde_yaml does ALL parsing, no custom mini-syntax)
//!     ↓
//! ProjectDraft + import warnings
//! ```
//!
//! Serializer and deserializer never call each other but satisfy a joint
//! round-trip law: a serialized project reimports to an equivalent draft,
//! minus the `runner` block, which is one-way enrichment from the server
//! target and is ignored on reimport.

mod emit;

pub mod deserializer;
pub mod serializer;

pub use deserializer::{from_document, ImportOutcome, ImportWarning};
pub use serializer::to_document;
