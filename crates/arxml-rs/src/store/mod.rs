// crates/arxml-rs/src/store/mod.rs

//! The document aggregate: typed entity collections, the canonical
//! configuration forest, preserved fragments and the modification state.
//!
//! Typed collections hand out read-only slices; every mutation goes through
//! a setter here so the `modified` flag and the `revision` counter stay
//! truthful. Embedders poll `revision` to notice changes.

mod identity;

use crate::error::ArxmlError;
use crate::types::{
    Composition, ConfigNode, NodeId, PortConnection, PortInterface, PortPrototype, PortRef,
    SwComponentType, UnknownFragment,
};
use crate::version::VersionTag;
use identity::ConfigForest;

const DEFAULT_PACKAGE_NAME: &str = "RootPackage";

/// One parsed (or programmatically built) ARXML document.
#[derive(Debug, Default)]
pub struct ArxmlDocument {
    version: VersionTag,
    package_name: String,
    components: Vec<SwComponentType>,
    port_interfaces: Vec<PortInterface>,
    compositions: Vec<Composition>,
    forest: ConfigForest,
    fragments: Vec<UnknownFragment>,
    modified: bool,
    revision: u64,
}

impl ArxmlDocument {
    /// An empty document at the default schema version, with one empty
    /// root package.
    pub fn new() -> Self {
        ArxmlDocument {
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            ..ArxmlDocument::default()
        }
    }

    /// Builds the document from parser output. Interface references and
    /// connection back-links are resolved here; the fresh document counts
    /// as unmodified.
    pub(crate) fn from_parse(
        version: VersionTag,
        package_name: Option<String>,
        components: Vec<SwComponentType>,
        port_interfaces: Vec<PortInterface>,
        compositions: Vec<Composition>,
        config_trees: Vec<ConfigNode>,
        fragments: Vec<UnknownFragment>,
    ) -> Self {
        let mut forest = ConfigForest::default();
        for tree in config_trees {
            forest.insert(tree);
        }
        // Input documents can carry identically-named siblings; collapse
        // them now so every designator path has exactly one live node.
        forest.merge_duplicates(None);
        let mut doc = ArxmlDocument {
            version,
            package_name: package_name.unwrap_or_else(|| DEFAULT_PACKAGE_NAME.to_string()),
            components,
            port_interfaces,
            compositions,
            forest,
            fragments,
            modified: false,
            revision: 0,
        };
        doc.resolve_interface_links();
        doc.sync_connection_links();
        doc
    }

    fn touch(&mut self) {
        self.modified = true;
        self.revision += 1;
    }

    // --- Document state ---

    pub fn version(&self) -> &VersionTag {
        &self.version
    }

    pub fn set_version(&mut self, version: VersionTag) {
        self.version = version;
        self.touch();
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn set_package_name(&mut self, name: impl Into<String>) {
        self.package_name = name.into();
        self.touch();
    }

    /// Whether the document has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Monotonic change counter, bumped by every mutation. Embedders can
    /// poll this instead of diffing snapshots.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Clears the modified flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    // --- Typed collections (read-only views) ---

    pub fn components(&self) -> &[SwComponentType] {
        &self.components
    }

    pub fn port_interfaces(&self) -> &[PortInterface] {
        &self.port_interfaces
    }

    pub fn compositions(&self) -> &[Composition] {
        &self.compositions
    }

    pub fn fragments(&self) -> &[UnknownFragment] {
        &self.fragments
    }

    pub fn component_by_name(&self, name: &str) -> Option<&SwComponentType> {
        self.components.iter().find(|c| c.short_name == name)
    }

    pub fn interface_by_name(&self, name: &str) -> Option<&PortInterface> {
        self.port_interfaces.iter().find(|i| i.short_name == name)
    }

    pub fn composition_by_name(&self, name: &str) -> Option<&Composition> {
        self.compositions.iter().find(|c| c.short_name == name)
    }

    /// Finds a port, searching top-level components first and then
    /// composition-owned ones.
    pub fn find_port(&self, port_ref: &PortRef) -> Option<&PortPrototype> {
        if let Some(component) = self.component_by_name(&port_ref.component) {
            if let Some(port) = component.port(&port_ref.port) {
                return Some(port);
            }
        }
        self.compositions
            .iter()
            .filter_map(|c| c.component(&port_ref.component))
            .find_map(|c| c.port(&port_ref.port))
    }

    fn find_port_mut(&mut self, port_ref: &PortRef) -> Option<&mut PortPrototype> {
        // Mirror `find_port`; split into two passes for the borrow checker.
        let top = self
            .components
            .iter()
            .position(|c| c.short_name == port_ref.component)
            .map(|i| (i, self.components[i].ports.iter().position(|p| p.short_name == port_ref.port)));
        if let Some((ci, Some(pi))) = top {
            return Some(&mut self.components[ci].ports[pi]);
        }
        for composition in &mut self.compositions {
            for component in &mut composition.components {
                if component.short_name != port_ref.component {
                    continue;
                }
                if let Some(pi) = component.ports.iter().position(|p| p.short_name == port_ref.port) {
                    return Some(&mut component.ports[pi]);
                }
            }
        }
        None
    }

    // --- Typed mutation ---

    pub fn add_component(&mut self, component: SwComponentType) {
        self.components.push(component);
        self.resolve_interface_links();
        self.touch();
    }

    /// Removes a top-level component, severing every connection and
    /// connected-port link that pointed at it.
    pub fn remove_component(&mut self, name: &str) -> bool {
        let Some(idx) = self.components.iter().position(|c| c.short_name == name) else {
            return false;
        };
        self.components.remove(idx);
        for component in &mut self.components {
            for port in &mut component.ports {
                port.connected_ports.retain(|r| r.component != name);
            }
        }
        for composition in &mut self.compositions {
            composition
                .connections
                .retain(|c| c.source.component != name && c.target.component != name);
            for component in &mut composition.components {
                for port in &mut component.ports {
                    port.connected_ports.retain(|r| r.component != name);
                }
            }
        }
        self.touch();
        true
    }

    pub fn add_port(&mut self, component: &str, port: PortPrototype) -> bool {
        let Some(c) = self
            .components
            .iter_mut()
            .find(|c| c.short_name == component)
        else {
            return false;
        };
        c.ports.push(port);
        self.resolve_interface_links();
        self.touch();
        true
    }

    pub fn set_component_desc(&mut self, name: &str, desc: Option<String>) -> bool {
        let Some(c) = self.components.iter_mut().find(|c| c.short_name == name) else {
            return false;
        };
        c.desc = desc;
        self.touch();
        true
    }

    pub fn add_port_interface(&mut self, interface: PortInterface) {
        self.port_interfaces.push(interface);
        self.resolve_interface_links();
        self.touch();
    }

    /// Removes a port interface and clears every resolved link that pointed
    /// at it. Interface reference strings on the ports stay untouched; they
    /// simply become dangling.
    pub fn remove_port_interface(&mut self, name: &str) -> bool {
        let Some(idx) = self
            .port_interfaces
            .iter()
            .position(|i| i.short_name == name)
        else {
            return false;
        };
        self.port_interfaces.remove(idx);
        self.resolve_interface_links();
        self.touch();
        true
    }

    pub fn add_composition(&mut self, composition: Composition) {
        self.compositions.push(composition);
        self.resolve_interface_links();
        self.touch();
    }

    pub fn remove_composition(&mut self, name: &str) -> bool {
        let Some(idx) = self.compositions.iter().position(|c| c.short_name == name) else {
            return false;
        };
        let removed = self.compositions.remove(idx);
        for connection in &removed.connections {
            self.unlink_ports(&connection.source, &connection.target);
        }
        self.touch();
        true
    }

    // --- Port connections ---

    /// Whether two ports exist and have compatible directions.
    pub fn can_connect(&self, source: &PortRef, target: &PortRef) -> bool {
        match (self.find_port(source), self.find_port(target)) {
            (Some(s), Some(t)) => s.direction.compatible_with(t.direction),
            _ => false,
        }
    }

    /// Records a connection inside a composition and links both ports to
    /// each other. Fails (returning false) when the composition is missing
    /// or the ports cannot legally connect.
    pub fn connect_ports(
        &mut self,
        composition: &str,
        name: &str,
        source: PortRef,
        target: PortRef,
    ) -> bool {
        if !self.can_connect(&source, &target) {
            return false;
        }
        let Some(c) = self
            .compositions
            .iter_mut()
            .find(|c| c.short_name == composition)
        else {
            return false;
        };
        c.connections.push(PortConnection {
            name: name.to_string(),
            source: source.clone(),
            target: target.clone(),
        });
        self.link_ports(&source, &target);
        self.touch();
        true
    }

    /// Removes a named connection and the port back-links it created.
    pub fn disconnect_ports(&mut self, composition: &str, name: &str) -> bool {
        let Some(c) = self
            .compositions
            .iter_mut()
            .find(|c| c.short_name == composition)
        else {
            return false;
        };
        let Some(idx) = c.connections.iter().position(|conn| conn.name == name) else {
            return false;
        };
        let removed = c.connections.remove(idx);
        self.unlink_ports(&removed.source, &removed.target);
        self.touch();
        true
    }

    /// Records a connection without the `can_connect` check. The validation
    /// engine will flag incompatible directions on such connections.
    pub fn add_connection_unchecked(&mut self, composition: &str, connection: PortConnection) -> bool {
        let Some(c) = self
            .compositions
            .iter_mut()
            .find(|c| c.short_name == composition)
        else {
            return false;
        };
        let (source, target) = (connection.source.clone(), connection.target.clone());
        c.connections.push(connection);
        self.link_ports(&source, &target);
        self.touch();
        true
    }

    fn link_ports(&mut self, source: &PortRef, target: &PortRef) {
        if let Some(port) = self.find_port_mut(source) {
            if !port.connected_ports.contains(target) {
                port.connected_ports.push(target.clone());
            }
        }
        if let Some(port) = self.find_port_mut(target) {
            if !port.connected_ports.contains(source) {
                port.connected_ports.push(source.clone());
            }
        }
    }

    fn unlink_ports(&mut self, source: &PortRef, target: &PortRef) {
        if let Some(port) = self.find_port_mut(source) {
            port.connected_ports.retain(|r| r != target);
        }
        if let Some(port) = self.find_port_mut(target) {
            port.connected_ports.retain(|r| r != source);
        }
    }

    /// Recomputes every port's resolved interface index by matching the
    /// last segment of its interface reference against the interface names.
    pub fn resolve_interface_links(&mut self) {
        let names: Vec<String> = self
            .port_interfaces
            .iter()
            .map(|i| i.short_name.clone())
            .collect();
        let resolve = |port: &mut PortPrototype| {
            port.resolved_interface = port.interface_ref.as_deref().and_then(|r| {
                let last = r.rsplit('/').next().unwrap_or(r);
                names.iter().position(|n| n == last)
            });
        };
        for component in &mut self.components {
            component.ports.iter_mut().for_each(resolve);
        }
        for composition in &mut self.compositions {
            for component in &mut composition.components {
                component.ports.iter_mut().for_each(resolve);
            }
        }
    }

    /// Rebuilds port back-links from the parsed composition connections.
    fn sync_connection_links(&mut self) {
        let pairs: Vec<(PortRef, PortRef)> = self
            .compositions
            .iter()
            .flat_map(|c| c.connections.iter())
            .map(|conn| (conn.source.clone(), conn.target.clone()))
            .collect();
        for (source, target) in pairs {
            self.link_ports(&source, &target);
        }
    }

    // --- Configuration forest ---

    /// Resolves any config node (fresh, stale or hand-built) to its one
    /// canonical id. Inserting a genuinely new candidate counts as a
    /// mutation.
    pub fn resolve(&mut self, candidate: &ConfigNode) -> NodeId {
        let before = self.forest.live_count();
        let id = self.forest.resolve(candidate);
        if self.forest.live_count() != before {
            self.touch();
        }
        id
    }

    /// The canonical id at a designator path key, when one exists.
    pub fn resolve_path(&self, key: &str) -> Option<NodeId> {
        self.forest.canonical_at(key)
    }

    /// Applies one field write to a canonical config node.
    ///
    /// # Errors
    /// `ElementNotFound` when the id no longer refers to a live node.
    pub fn mutate(&mut self, id: NodeId, field: &str, value: &str) -> Result<NodeId, ArxmlError> {
        let id = self.forest.mutate(id, field, value)?;
        self.touch();
        Ok(id)
    }

    /// Collapses any config nodes sharing a designator path into one.
    pub fn merge_duplicates(&mut self) {
        self.forest.merge_duplicates(None);
    }

    /// Snapshots of every config root tree, in insertion order.
    pub fn config_roots(&self) -> Vec<ConfigNode> {
        self.forest.snapshot_roots()
    }

    /// Snapshot of one config subtree.
    pub fn config_node(&self, id: NodeId) -> Option<ConfigNode> {
        self.forest.snapshot(id)
    }

    /// Snapshot of the config subtree at a designator path key.
    pub fn config_node_at(&self, key: &str) -> Option<ConfigNode> {
        self.forest
            .canonical_at(key)
            .and_then(|id| self.forest.snapshot(id))
    }

    /// Total number of live config nodes.
    pub fn config_node_count(&self) -> usize {
        self.forest.live_count()
    }

    /// Removes a config subtree.
    pub fn remove_config_node(&mut self, id: NodeId) -> bool {
        let removed = self.forest.remove(id);
        if removed {
            self.touch();
        }
        removed
    }
}
