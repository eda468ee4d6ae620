// src/lib.rs

#![doc = "Parses, edits and generates AUTOSAR ARXML files."]
#![doc = ""]
#![doc = "The engine keeps a two-tier model: strongly typed entities for the"]
#![doc = "well-known element kinds (components, ports, interfaces,"]
#![doc = "compositions) and a canonical, identity-resolved tree for the"]
#![doc = "open-ended ECUC configuration subtree. Anything it does not"]
#![doc = "understand is preserved verbatim and re-emitted on save."]
#![doc = ""]
#![doc = "It supports:"]
#![doc = "- `load_arxml_from_str` / `load_arxml_from_file`: parsing with"]
#![doc = "  automatic schema version detection."]
#![doc = "- `ArxmlDocument::resolve` + `mutate`: aliasing-safe edits keyed by"]
#![doc = "  designator path."]
#![doc = "- `save_arxml_to_string` / `save_arxml_to_file`: round-trip"]
#![doc = "  serialization."]
#![doc = "- `validate`: a rule-based validation pass."]

// --- Crate Modules ---

mod builder;
mod error;
mod parser;
mod store;
pub mod types;
mod validation;
pub mod version;

// --- Public API Re-exports ---

pub use builder::{save_arxml_to_file, save_arxml_to_string};
pub use error::ArxmlError;
pub use parser::{ParseOutput, load_arxml_from_file, load_arxml_from_str};
pub use store::ArxmlDocument;
pub use types::{
    ComponentCategory, Composition, ConfigField, ConfigNode, ConfigRole, DataElement,
    DesignatorPath, ElementDataType, Issue, NodeId, PortConnection, PortDirection, PortInterface,
    PortPrototype, PortRef, ServiceElement, Severity, SwComponentType, UnknownFragment,
};
pub use validation::validate;
pub use version::{DEFAULT_VERSION, VersionTag, resolve_version, resolve_version_from_path};
