// crates/arxml-rs/src/types.rs

//! Public data structures for a parsed ARXML document.
//!
//! Two tiers are used: strongly typed entities for the well-known AUTOSAR
//! element kinds (components, ports, interfaces, compositions) and a
//! loosely typed [`ConfigNode`] tree for the open-ended ECUC configuration
//! subtree that cannot be modeled exhaustively.

use std::fmt;

// --- Typed entities ---

/// Category of a software component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentCategory {
    /// `<APPLICATION-SW-COMPONENT-TYPE>`
    Application,
    /// `<ATOMIC-SW-COMPONENT-TYPE>`
    Atomic,
    /// `<COMPOSITION-SW-COMPONENT-TYPE>`
    Composition,
}

impl ComponentCategory {
    /// The XML element name this category is serialized as.
    pub fn tag(&self) -> &'static str {
        match self {
            ComponentCategory::Application => "APPLICATION-SW-COMPONENT-TYPE",
            ComponentCategory::Atomic => "ATOMIC-SW-COMPONENT-TYPE",
            ComponentCategory::Composition => "COMPOSITION-SW-COMPONENT-TYPE",
        }
    }
}

/// Direction of a port prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    /// `<P-PORT-PROTOTYPE>`
    Provider,
    /// `<R-PORT-PROTOTYPE>`
    Requirer,
    /// `<PR-PORT-PROTOTYPE>`
    ProviderRequirer,
}

impl PortDirection {
    /// The XML element name this direction is serialized as.
    pub fn tag(&self) -> &'static str {
        match self {
            PortDirection::Provider => "P-PORT-PROTOTYPE",
            PortDirection::Requirer => "R-PORT-PROTOTYPE",
            PortDirection::ProviderRequirer => "PR-PORT-PROTOTYPE",
        }
    }

    /// Whether a connection between two ports of these directions is legal.
    ///
    /// Provider pairs with Requirer, and a ProviderRequirer port pairs with
    /// anything. Two pure Providers (or two pure Requirers) cannot connect.
    pub fn compatible_with(&self, other: PortDirection) -> bool {
        match (self, other) {
            (PortDirection::ProviderRequirer, _) | (_, PortDirection::ProviderRequirer) => true,
            (PortDirection::Provider, PortDirection::Requirer) => true,
            (PortDirection::Requirer, PortDirection::Provider) => true,
            _ => false,
        }
    }
}

/// Primitive data kind of a data element, derived from its `<TYPE-TREF>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ElementDataType {
    Boolean,
    Integer,
    Float,
    #[default]
    String,
    Array,
    Structure,
}

impl ElementDataType {
    /// Classifies a `<TYPE-TREF>` text into a primitive kind.
    ///
    /// The reference path is matched by substring; anything unrecognized
    /// falls back to `String`.
    pub fn from_type_ref(type_ref: &str) -> Self {
        let lower = type_ref.to_ascii_lowercase();
        if lower.contains("boolean") {
            ElementDataType::Boolean
        } else if lower.contains("integer") {
            ElementDataType::Integer
        } else if lower.contains("float") {
            ElementDataType::Float
        } else if lower.contains("array") {
            ElementDataType::Array
        } else if lower.contains("structure") {
            ElementDataType::Structure
        } else {
            ElementDataType::String
        }
    }

    /// The `<TYPE-TREF>` text used when serializing this kind.
    pub fn as_type_ref(&self) -> &'static str {
        match self {
            ElementDataType::Boolean => "boolean",
            ElementDataType::Integer => "integer",
            ElementDataType::Float => "float",
            ElementDataType::String => "string",
            ElementDataType::Array => "array",
            ElementDataType::Structure => "structure",
        }
    }
}

/// Represents a `<DATA-ELEMENT-PROTOTYPE>` within a sender-receiver interface.
#[derive(Debug, Clone, Default)]
pub struct DataElement {
    /// `<SHORT-NAME>` (mandatory)
    pub short_name: String,
    /// `<DESC>/<L-2>` description text
    pub desc: Option<String>,
    /// Original `<TYPE-TREF>` reference text, echoed back on save
    pub type_ref: Option<String>,
    /// Primitive kind derived from `<TYPE-TREF>`
    pub data_type: ElementDataType,
    /// Whether this element carries an array of values
    pub is_array: bool,
    /// Fixed array size, when declared
    pub array_size: Option<u32>,
    /// Physical unit, when declared
    pub unit: Option<String>,
    /// Lower bound, when declared
    pub min_value: Option<f64>,
    /// Upper bound, when declared
    pub max_value: Option<f64>,
}

/// Represents an `<OPERATION>` within a client-server interface.
#[derive(Debug, Clone, Default)]
pub struct ServiceElement {
    /// `<SHORT-NAME>` (mandatory)
    pub short_name: String,
    /// `<DESC>/<L-2>` description text
    pub desc: Option<String>,
    /// Kind of service element, e.g. `"operation"`
    pub kind: String,
}

/// Represents a `<SENDER-RECEIVER-INTERFACE>` or `<CLIENT-SERVER-INTERFACE>`.
///
/// A service interface holds service elements, a sender-receiver interface
/// holds data elements; the two are mutually exclusive.
#[derive(Debug, Clone, Default)]
pub struct PortInterface {
    /// `<SHORT-NAME>` (mandatory)
    pub short_name: String,
    /// `<DESC>/<L-2>` description text
    pub desc: Option<String>,
    /// True for `<CLIENT-SERVER-INTERFACE>`
    pub is_service: bool,
    /// `<DATA-ELEMENT-PROTOTYPE>` children (sender-receiver only)
    pub data_elements: Vec<DataElement>,
    /// `<OPERATION>` children (client-server only)
    pub service_elements: Vec<ServiceElement>,
}

/// Identifies a port by its owning component's short name and its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRef {
    pub component: String,
    pub port: String,
}

impl PortRef {
    pub fn new(component: impl Into<String>, port: impl Into<String>) -> Self {
        PortRef {
            component: component.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.port)
    }
}

/// Represents a `<P-PORT-PROTOTYPE>`, `<R-PORT-PROTOTYPE>` or
/// `<PR-PORT-PROTOTYPE>` on a software component.
#[derive(Debug, Clone)]
pub struct PortPrototype {
    /// `<SHORT-NAME>` (mandatory)
    pub short_name: String,
    /// `<DESC>/<L-2>` description text
    pub desc: Option<String>,
    /// Direction encoded by the element name
    pub direction: PortDirection,
    /// `<PROVIDED-INTERFACE-TREF>` / `<REQUIRED-INTERFACE-TREF>` text
    pub interface_ref: Option<String>,
    /// Index into the document's port interface collection once the
    /// reference has been resolved. Maintained by the store; cleared when
    /// the referenced interface is removed.
    pub resolved_interface: Option<usize>,
    /// Ports this port is connected to. The relation is symmetric: the
    /// store keeps both ends in sync.
    pub connected_ports: Vec<PortRef>,
}

impl PortPrototype {
    pub fn new(short_name: impl Into<String>, direction: PortDirection) -> Self {
        PortPrototype {
            short_name: short_name.into(),
            desc: None,
            direction,
            interface_ref: None,
            resolved_interface: None,
            connected_ports: Vec::new(),
        }
    }
}

/// Represents a software component type and its ports.
#[derive(Debug, Clone)]
pub struct SwComponentType {
    /// `<SHORT-NAME>` (mandatory)
    pub short_name: String,
    /// Category encoded by the element name
    pub category: ComponentCategory,
    /// `<DESC>/<L-2>` description text
    pub desc: Option<String>,
    /// Port prototypes, in document order
    pub ports: Vec<PortPrototype>,
}

impl SwComponentType {
    pub fn new(short_name: impl Into<String>, category: ComponentCategory) -> Self {
        SwComponentType {
            short_name: short_name.into(),
            category,
            desc: None,
            ports: Vec::new(),
        }
    }

    /// Looks up a port by short name.
    pub fn port(&self, name: &str) -> Option<&PortPrototype> {
        self.ports.iter().find(|p| p.short_name == name)
    }
}

/// A connection between two ports inside a composition.
#[derive(Debug, Clone)]
pub struct PortConnection {
    /// Connection name, unique within the composition
    pub name: String,
    pub source: PortRef,
    pub target: PortRef,
}

/// Represents a `<COMPOSITION>`: owned component types plus the port
/// connections between them.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    /// `<SHORT-NAME>` (mandatory)
    pub short_name: String,
    /// `<DESC>/<L-2>` description text
    pub desc: Option<String>,
    /// Component types owned by this composition, in document order
    pub components: Vec<SwComponentType>,
    /// Connections between ports of the owned components
    pub connections: Vec<PortConnection>,
}

impl Composition {
    pub fn new(short_name: impl Into<String>) -> Self {
        Composition {
            short_name: short_name.into(),
            ..Default::default()
        }
    }

    /// Looks up an owned component by short name.
    pub fn component(&self, name: &str) -> Option<&SwComponentType> {
        self.components.iter().find(|c| c.short_name == name)
    }
}

// --- Generic configuration forest ---

/// Stable handle to a canonical configuration node inside the store.
///
/// Handles are never reused: once a node is removed or merged away, its id
/// stays dead, so a live id always refers to the same logical element it
/// referred to when it was handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw index value, mainly useful for diagnostics.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One `(element kind, designator)` step of a [`DesignatorPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    /// Element kind tag, e.g. `"ECUC-CONTAINER-VALUE"`
    pub kind: String,
    /// Short name of the element, empty when the element carries none
    pub name: String,
}

/// The logical identity of a configuration node: the ordered chain of
/// `(kind, short name)` pairs from the forest root down to the node.
///
/// Two nodes with equal designator paths represent the same logical element
/// and the store guarantees at most one canonical instance per path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DesignatorPath(Vec<PathSegment>);

impl DesignatorPath {
    /// An empty path (the conceptual forest root).
    pub fn root() -> Self {
        DesignatorPath(Vec::new())
    }

    /// Returns a new path with one more segment appended.
    pub fn child(&self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment {
            kind: kind.into(),
            name: name.into(),
        });
        DesignatorPath(segments)
    }

    /// The path of the parent element, or `None` at the root level.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        DesignatorPath(self.0[..self.0.len() - 1].to_vec()).into()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Flat string form used as the store's index key.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DesignatorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.0 {
            write!(f, "/{}:{}", seg.kind, seg.name)?;
        }
        Ok(())
    }
}

/// Role a child node plays under its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigRole {
    /// `<ECUC-CONTAINER-VALUE>` and other container-like children
    Container,
    /// Parameter and reference value children
    Parameter,
}

impl ConfigRole {
    /// Derives the role a node of the given element kind plays.
    pub fn for_kind(kind: &str) -> Self {
        if kind.contains("PARAM") || kind.contains("REFERENCE-VALUE") {
            ConfigRole::Parameter
        } else {
            ConfigRole::Container
        }
    }
}

/// A scalar field of a configuration node, e.g. `<DEFINITION-REF>` or
/// `<VALUE>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigField {
    /// Element name of the field
    pub key: String,
    /// Text content of the field
    pub value: String,
    /// `DEST` attribute carried by reference fields, preserved for output
    pub dest: Option<String>,
}

/// A loosely typed, recursive configuration tree node (the ECUC subtree).
///
/// This is a detached, owned snapshot: the store hands out clones of its
/// canonical instances, stamped with the [`NodeId`] they were cloned from.
/// Passing any such snapshot (fresh or stale) back to
/// [`ArxmlDocument::resolve`](crate::ArxmlDocument::resolve) yields the one
/// canonical instance again.
#[derive(Debug, Clone, Default)]
pub struct ConfigNode {
    /// Element kind tag, e.g. `"ECUC-MODULE-CONFIGURATION-VALUES"`
    pub kind: String,
    /// `UUID` attribute
    pub uuid: Option<String>,
    /// `<SHORT-NAME>` text
    pub short_name: Option<String>,
    /// Scalar fields in document order
    pub fields: Vec<ConfigField>,
    /// Child nodes in document order, tagged with their role
    pub children: Vec<(ConfigRole, ConfigNode)>,
    /// Raw `<ADMIN-DATA>` fragment, carried through unchanged
    pub admin_data: Option<String>,
    /// Full designator path of this node
    pub path: DesignatorPath,
    /// Canonical id this snapshot was taken from, `None` for nodes built
    /// outside the store
    pub node_id: Option<NodeId>,
}

impl ConfigNode {
    pub fn new(kind: impl Into<String>) -> Self {
        ConfigNode {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// The name this node contributes to designator paths: its short name,
    /// falling back to its `DEFINITION-REF` for unnamed parameter values.
    pub fn designator(&self) -> &str {
        if let Some(name) = &self.short_name {
            return name;
        }
        self.fields
            .iter()
            .find(|f| f.key == "DEFINITION-REF")
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    /// Looks up a scalar field by key.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    /// Recomputes `path` for this node and its whole subtree, rooted under
    /// `parent`. Used after parsing and after renames.
    pub fn assign_paths(&mut self, parent: &DesignatorPath) {
        self.path = parent.child(self.kind.clone(), self.designator().to_string());
        let own = self.path.clone();
        for (_, child) in &mut self.children {
            child.assign_paths(&own);
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|(_, c)| c.subtree_len())
            .sum::<usize>()
    }
}

// --- Preserved-unknown fragments ---

/// A top-level element the typed model did not understand, kept as a raw
/// byte-identical slice of the input for verbatim re-emission.
#[derive(Debug, Clone)]
pub struct UnknownFragment {
    /// Element name of the fragment root
    pub tag: String,
    /// The fragment's own `<SHORT-NAME>`, when present
    pub short_name: Option<String>,
    /// Raw XML text, exactly as it appeared in the input
    pub raw: String,
}

// --- Validation issues ---

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// One finding produced by the validation engine.
#[derive(Debug, Clone)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    /// Short name of the entity the issue refers to, when applicable
    pub entity: Option<String>,
}

impl Issue {
    pub fn error(message: impl Into<String>, entity: Option<String>) -> Self {
        Issue {
            severity: Severity::Error,
            message: message.into(),
            entity,
        }
    }

    pub fn warning(message: impl Into<String>, entity: Option<String>) -> Self {
        Issue {
            severity: Severity::Warning,
            message: message.into(),
            entity,
        }
    }
}
