// crates/arxml-rs/src/store/identity.rs

//! Canonical configuration forest and identity resolution.
//!
//! The forest owns every [`ConfigNode`]'s canonical state in an arena of
//! slots addressed by [`NodeId`]. Ids are never reused: a merged or removed
//! node leaves a permanently dead slot, so any id a caller still holds
//! either refers to the same logical element or to nothing at all.
//!
//! The invariant maintained here is *canonical uniqueness*: at most one
//! live node exists for any designator path. An O(1) index from path key to
//! id backs the structural half of [`ConfigForest::resolve`]; the arena
//! backs the identity half. Whenever an operation can create two live nodes
//! with the same path (a rename landing on an existing name, a graft over
//! an existing subtree), [`ConfigForest::merge_duplicates`] restores the
//! invariant by splicing the duplicates into one survivor.

use crate::error::ArxmlError;
use crate::types::{ConfigField, ConfigNode, ConfigRole, DesignatorPath, NodeId};
use std::collections::HashMap;

/// Canonical state of one configuration node inside the arena.
#[derive(Debug, Clone)]
pub(crate) struct StoredNode {
    pub(crate) kind: String,
    pub(crate) uuid: Option<String>,
    pub(crate) short_name: Option<String>,
    pub(crate) fields: Vec<ConfigField>,
    pub(crate) children: Vec<(ConfigRole, NodeId)>,
    pub(crate) admin_data: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) path: DesignatorPath,
}

impl StoredNode {
    /// The name this node contributes to designator paths, mirroring
    /// [`ConfigNode::designator`].
    fn designator(&self) -> &str {
        if let Some(name) = &self.short_name {
            return name;
        }
        self.fields
            .iter()
            .find(|f| f.key == "DEFINITION-REF")
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }
}

/// Arena-backed forest of canonical configuration nodes.
#[derive(Debug, Default)]
pub(crate) struct ConfigForest {
    slots: Vec<Option<StoredNode>>,
    roots: Vec<NodeId>,
    index: HashMap<String, NodeId>,
}

impl ConfigForest {
    /// Number of live nodes across the whole forest.
    pub(crate) fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&StoredNode> {
        self.slots.get(id.0).and_then(|s| s.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut StoredNode> {
        self.slots.get_mut(id.0).and_then(|s| s.as_mut())
    }

    /// The canonical id for a designator path key, when one exists.
    pub(crate) fn canonical_at(&self, key: &str) -> Option<NodeId> {
        self.index.get(key).copied().filter(|id| self.is_live(*id))
    }

    /// Resolves any node to the canonical id for its logical element.
    ///
    /// Identity first: a candidate stamped with a still-live id of the same
    /// kind is that element, regardless of what its recorded path says (a
    /// rename may have moved it). Then structurally by designator path.
    /// A candidate matching nothing is inserted as new canonical state, so
    /// this never fails.
    pub(crate) fn resolve(&mut self, candidate: &ConfigNode) -> NodeId {
        if let Some(id) = candidate.node_id {
            if let Some(node) = self.get(id) {
                if node.kind == candidate.kind {
                    return id;
                }
            }
        }

        let key = if candidate.path.is_empty() {
            DesignatorPath::root()
                .child(candidate.kind.clone(), candidate.designator().to_string())
                .key()
        } else {
            candidate.path.key()
        };
        if let Some(id) = self.canonical_at(&key) {
            return id;
        }

        self.insert(candidate.clone())
    }

    /// Inserts a detached subtree, attaching it under the live node at its
    /// parent path when one exists and as a new root otherwise.
    pub(crate) fn insert(&mut self, candidate: ConfigNode) -> NodeId {
        let parent = candidate
            .path
            .parent()
            .filter(|p| !p.is_empty())
            .and_then(|p| self.canonical_at(&p.key()));

        match parent {
            Some(pid) => {
                let parent_path = match self.get(pid) {
                    Some(p) => p.path.clone(),
                    None => DesignatorPath::root(),
                };
                let role = ConfigRole::for_kind(&candidate.kind);
                let id = self.graft(Some(pid), &parent_path, candidate);
                if let Some(p) = self.get_mut(pid) {
                    p.children.push((role, id));
                }
                id
            }
            None => {
                let id = self.graft(None, &DesignatorPath::root(), candidate);
                self.roots.push(id);
                id
            }
        }
    }

    /// Allocates arena slots for a subtree. Paths are recomputed from the
    /// attachment point; index entries are overwritten, so a graft over an
    /// existing path makes the new node canonical (last write wins).
    fn graft(
        &mut self,
        parent: Option<NodeId>,
        parent_path: &DesignatorPath,
        node: ConfigNode,
    ) -> NodeId {
        let designator = node.designator().to_string();
        let ConfigNode {
            kind,
            uuid,
            short_name,
            fields,
            children,
            admin_data,
            ..
        } = node;
        let path = parent_path.child(kind.clone(), designator);

        let id = NodeId(self.slots.len());
        self.slots.push(Some(StoredNode {
            kind,
            uuid,
            short_name,
            fields,
            children: Vec::new(),
            admin_data,
            parent,
            path: path.clone(),
        }));
        self.index.insert(path.key(), id);

        for (role, child) in children {
            let cid = self.graft(Some(id), &path, child);
            if let Some(n) = self.get_mut(id) {
                n.children.push((role, cid));
            }
        }
        id
    }

    /// Applies one field write to the canonical node `id`.
    ///
    /// `"short_name"` renames the node (re-keying its whole subtree and
    /// merging into any node already at the new path), `"uuid"` replaces
    /// the UUID, and any other key upserts a scalar field in place.
    ///
    /// # Errors
    /// `ElementNotFound` when `id` refers to a removed or merged-away node.
    pub(crate) fn mutate(
        &mut self,
        id: NodeId,
        field: &str,
        value: &str,
    ) -> Result<NodeId, ArxmlError> {
        if !self.is_live(id) {
            return Err(ArxmlError::ElementNotFound {
                path: format!("config node {}", id.index()),
            });
        }
        match field {
            "short_name" | "SHORT-NAME" => Ok(self.rename(id, value)),
            "uuid" | "UUID" => {
                if let Some(node) = self.get_mut(id) {
                    node.uuid = Some(value.to_string());
                }
                Ok(id)
            }
            _ => {
                if let Some(node) = self.get_mut(id) {
                    match node.fields.iter_mut().find(|f| f.key == field) {
                        Some(f) => f.value = value.to_string(),
                        None => node.fields.push(ConfigField {
                            key: field.to_string(),
                            value: value.to_string(),
                            dest: None,
                        }),
                    }
                }
                Ok(id)
            }
        }
    }

    /// Renames a node, recomputing and re-keying the paths of its whole
    /// subtree. Landing on an already-occupied path triggers a duplicate
    /// merge that keeps the renamed node canonical.
    fn rename(&mut self, id: NodeId, new_name: &str) -> NodeId {
        let mut subtree = Vec::new();
        self.subtree_ids(id, &mut subtree);
        for nid in &subtree {
            let key = match self.get(*nid) {
                Some(n) => n.path.key(),
                None => continue,
            };
            if self.index.get(&key) == Some(nid) {
                self.index.remove(&key);
            }
        }

        let parent_path = self
            .get(id)
            .and_then(|n| n.parent)
            .and_then(|pid| self.get(pid))
            .map(|p| p.path.clone())
            .unwrap_or_else(DesignatorPath::root);
        if let Some(node) = self.get_mut(id) {
            node.short_name = Some(new_name.to_string());
        }

        let mut new_keys = Vec::new();
        self.repath_subtree(id, &parent_path, &mut new_keys);
        let mut collided = false;
        for (key, nid) in new_keys {
            if let Some(old) = self.index.insert(key, nid) {
                if old != nid && self.is_live(old) {
                    collided = true;
                }
            }
        }
        if collided {
            self.merge_duplicates(Some(id));
        }
        id
    }

    /// Collapses every set of live nodes sharing a designator path into one
    /// canonical survivor: `prefer` when it is part of the set, the first
    /// inserted otherwise. Children of the dropped duplicates are spliced
    /// into the survivor; merging can cascade, so passes repeat until the
    /// forest is collision free.
    pub(crate) fn merge_duplicates(&mut self, prefer: Option<NodeId>) {
        loop {
            let mut groups: HashMap<String, Vec<NodeId>> = HashMap::new();
            for (i, slot) in self.slots.iter().enumerate() {
                if let Some(node) = slot {
                    groups.entry(node.path.key()).or_default().push(NodeId(i));
                }
            }

            let mut merged_any = false;
            for (key, ids) in groups {
                if ids.len() < 2 {
                    continue;
                }
                merged_any = true;
                let canonical = prefer
                    .filter(|p| ids.contains(p))
                    .unwrap_or(ids[0]);
                for dup in ids.into_iter().filter(|d| *d != canonical) {
                    self.merge_into(canonical, dup);
                }
                self.index.insert(key, canonical);
            }
            if !merged_any {
                break;
            }
        }
    }

    /// Folds one duplicate into its canonical node and kills its slot.
    fn merge_into(&mut self, canonical: NodeId, dup: NodeId) {
        let dup_node = match self.slots.get_mut(dup.0).and_then(|s| s.take()) {
            Some(n) => n,
            None => return,
        };
        if let Some(pid) = dup_node.parent {
            if let Some(parent) = self.get_mut(pid) {
                parent.children.retain(|(_, c)| *c != dup);
            }
        }
        self.roots.retain(|r| *r != dup);

        let mut moved = Vec::with_capacity(dup_node.children.len());
        for (role, cid) in dup_node.children {
            if let Some(child) = self.get_mut(cid) {
                child.parent = Some(canonical);
            }
            moved.push((role, cid));
        }
        if let Some(canon) = self.get_mut(canonical) {
            canon.children.extend(moved);
            for field in dup_node.fields {
                if !canon.fields.iter().any(|f| f.key == field.key) {
                    canon.fields.push(field);
                }
            }
            if canon.uuid.is_none() {
                canon.uuid = dup_node.uuid;
            }
            if canon.admin_data.is_none() {
                canon.admin_data = dup_node.admin_data;
            }
            if canon.short_name.is_none() {
                canon.short_name = dup_node.short_name;
            }
        }
    }

    /// Removes a node and its whole subtree. Returns false when the id was
    /// already dead.
    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        if let Some(pid) = self.get(id).and_then(|n| n.parent) {
            if let Some(parent) = self.get_mut(pid) {
                parent.children.retain(|(_, c)| *c != id);
            }
        }
        self.roots.retain(|r| *r != id);

        let mut subtree = Vec::new();
        self.subtree_ids(id, &mut subtree);
        for nid in subtree {
            if let Some(node) = self.slots.get_mut(nid.0).and_then(|s| s.take()) {
                let key = node.path.key();
                if self.index.get(&key) == Some(&nid) {
                    self.index.remove(&key);
                }
            }
        }
        true
    }

    /// Owned recursive snapshot of a subtree, each node stamped with the
    /// canonical id it was taken from.
    pub(crate) fn snapshot(&self, id: NodeId) -> Option<ConfigNode> {
        let node = self.get(id)?;
        let mut out = ConfigNode {
            kind: node.kind.clone(),
            uuid: node.uuid.clone(),
            short_name: node.short_name.clone(),
            fields: node.fields.clone(),
            children: Vec::new(),
            admin_data: node.admin_data.clone(),
            path: node.path.clone(),
            node_id: Some(id),
        };
        for (role, cid) in &node.children {
            if let Some(child) = self.snapshot(*cid) {
                out.children.push((*role, child));
            }
        }
        Some(out)
    }

    /// Snapshots of every root tree, in insertion order.
    pub(crate) fn snapshot_roots(&self) -> Vec<ConfigNode> {
        self.roots
            .iter()
            .filter_map(|id| self.snapshot(*id))
            .collect()
    }

    fn subtree_ids(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.get(id) {
            out.push(id);
            for (_, cid) in &node.children {
                self.subtree_ids(*cid, out);
            }
        }
    }

    fn repath_subtree(
        &mut self,
        id: NodeId,
        parent_path: &DesignatorPath,
        keys: &mut Vec<(String, NodeId)>,
    ) {
        let (new_path, children) = match self.get_mut(id) {
            Some(node) => {
                let designator = node.designator().to_string();
                node.path = parent_path.child(node.kind.clone(), designator);
                (
                    node.path.clone(),
                    node.children.iter().map(|(_, c)| *c).collect::<Vec<_>>(),
                )
            }
            None => return,
        };
        keys.push((new_path.key(), id));
        for cid in children {
            self.repath_subtree(cid, &new_path, keys);
        }
    }
}
