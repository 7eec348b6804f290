//! The object-identifier tree.
//!
//! Parent/child links between OID nodes form reference cycles under
//! ownership, so nodes live in an arena and refer to each other by stable
//! [`OidId`] indices. A node carries the definitions attached to it; two
//! MIBs declaring the same OID share one node with two definitions.
//! Children are kept sorted by sub-identifier.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use super::ids::{MibId, OidId};

/// One definition attached to an OID node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OidDefinition {
    /// The MIB that declares this OID.
    pub mib: MibId,
    /// Index of the declaring symbol within that MIB; `None` for names
    /// that only appear as intermediate OID components.
    pub symbol: Option<usize>,
    /// The declared name.
    pub name: String,
}

/// A node in the OID tree.
#[derive(Clone, Debug, Default)]
pub struct OidNode {
    /// The sub-identifier at this position.
    pub sub_id: u32,
    /// Parent node, `None` for roots.
    pub parent: Option<OidId>,
    /// Children, sorted by ascending sub-identifier.
    children: Vec<OidId>,
    /// Definitions at this OID, in registration order.
    definitions: Vec<OidDefinition>,
}

impl OidNode {
    /// The children, sorted by ascending sub-identifier.
    #[must_use]
    pub fn children(&self) -> &[OidId] {
        &self.children
    }

    /// The definitions attached to this node.
    #[must_use]
    pub fn definitions(&self) -> &[OidDefinition] {
        &self.definitions
    }

    /// The primary (first) declared name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.definitions.first().map(|d| d.name.as_str())
    }

    /// Whether this node carries no definitions.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Arena owning every OID node.
#[derive(Clone, Debug, Default)]
pub struct OidArena {
    /// Slot per node; freed slots are `None` and recycled.
    nodes: Vec<Option<OidNode>>,
    free: Vec<OidId>,
    /// Root nodes, sorted by ascending sub-identifier.
    roots: Vec<OidId>,
}

impl OidArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Access a node.
    #[must_use]
    pub fn node(&self, id: OidId) -> Option<&OidNode> {
        self.nodes.get(id.to_index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: OidId) -> Option<&mut OidNode> {
        self.nodes.get_mut(id.to_index()).and_then(Option::as_mut)
    }

    /// The root nodes, sorted by sub-identifier.
    #[must_use]
    pub fn roots(&self) -> &[OidId] {
        &self.roots
    }

    fn alloc(&mut self, node: OidNode) -> OidId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.to_index()] = Some(node);
            return id;
        }
        self.nodes.push(Some(node));
        match OidId::from_index(self.nodes.len() - 1) {
            Some(id) => id,
            // Vec indices always fit the id space here.
            None => unreachable!("arena index overflow"),
        }
    }

    /// Find or create the root node with the given sub-identifier.
    pub fn root(&mut self, sub_id: u32) -> OidId {
        if let Some(&id) = self
            .roots
            .iter()
            .find(|&&id| self.node(id).is_some_and(|n| n.sub_id == sub_id))
        {
            return id;
        }
        let id = self.alloc(OidNode {
            sub_id,
            parent: None,
            ..OidNode::default()
        });
        let pos = self
            .roots
            .iter()
            .position(|&r| self.node(r).is_some_and(|n| n.sub_id > sub_id))
            .unwrap_or(self.roots.len());
        self.roots.insert(pos, id);
        id
    }

    /// Find or create the child of `parent` with the given sub-identifier.
    pub fn child(&mut self, parent: OidId, sub_id: u32) -> OidId {
        if let Some(node) = self.node(parent) {
            if let Some(&id) = node
                .children
                .iter()
                .find(|&&c| self.node(c).is_some_and(|n| n.sub_id == sub_id))
            {
                return id;
            }
        }
        let id = self.alloc(OidNode {
            sub_id,
            parent: Some(parent),
            ..OidNode::default()
        });
        if let Some(node) = self.node_mut(parent) {
            node.children.push(id);
        }
        self.sort_children(parent);
        id
    }

    fn sort_children(&mut self, parent: OidId) {
        let Some(node) = self.node(parent) else { return };
        let mut children = node.children.clone();
        children.sort_by_key(|&c| self.node(c).map_or(u32::MAX, |n| n.sub_id));
        if let Some(node) = self.node_mut(parent) {
            node.children = children;
        }
    }

    /// Find an existing child of `parent` by its declared name.
    #[must_use]
    pub fn child_by_name(&self, parent: OidId, name: &str) -> Option<OidId> {
        let node = self.node(parent)?;
        node.children
            .iter()
            .copied()
            .find(|&c| self.node(c).is_some_and(|n| n.name() == Some(name)))
    }

    /// Attach a definition to a node; an identical definition is not
    /// duplicated.
    pub fn add_definition(&mut self, id: OidId, definition: OidDefinition) {
        if let Some(node) = self.node_mut(id) {
            if !node.definitions.contains(&definition) {
                node.definitions.push(definition);
            }
        }
    }

    /// The full arc path of a node, root first.
    #[must_use]
    pub fn arcs(&self, id: OidId) -> Vec<u32> {
        let mut arcs = Vec::new();
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            let Some(node) = self.node(c) else { break };
            arcs.push(node.sub_id);
            cursor = node.parent;
        }
        arcs.reverse();
        arcs
    }

    /// Dotted notation of a node's path (e.g. `1.3.6.1.2.1`).
    #[must_use]
    pub fn dotted(&self, id: OidId) -> String {
        let arcs = self.arcs(id);
        let mut out = String::with_capacity(arcs.len() * 4);
        for (i, arc) in arcs.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            // write! to String is infallible
            let _ = write!(out, "{arc}");
        }
        out
    }

    /// Walk down from the roots along the given arcs.
    #[must_use]
    pub fn lookup(&self, arcs: &[u32]) -> Option<OidId> {
        let (&first, rest) = arcs.split_first()?;
        let mut cursor = self
            .roots
            .iter()
            .copied()
            .find(|&r| self.node(r).is_some_and(|n| n.sub_id == first))?;
        for &arc in rest {
            let node = self.node(cursor)?;
            cursor = node
                .children
                .iter()
                .copied()
                .find(|&c| self.node(c).is_some_and(|n| n.sub_id == arc))?;
        }
        Some(cursor)
    }

    /// Parse dotted notation into arcs.
    #[must_use]
    pub fn parse_dotted(s: &str) -> Option<Vec<u32>> {
        if s.is_empty() {
            return None;
        }
        s.split('.').map(|p| p.parse().ok()).collect()
    }

    /// Remove every definition owned by `mib`, then reclaim nodes that are
    /// left with no definitions and no children (leaves first, walking up).
    pub fn remove_mib(&mut self, mib: MibId) {
        for slot in &mut self.nodes {
            if let Some(node) = slot {
                node.definitions.retain(|d| d.mib != mib);
            }
        }
        loop {
            let mut removed = false;
            let candidates: Vec<OidId> = self
                .nodes
                .iter()
                .enumerate()
                .filter_map(|(i, slot)| {
                    let node = slot.as_ref()?;
                    if node.is_undefined() && node.children.is_empty() {
                        OidId::from_index(i)
                    } else {
                        None
                    }
                })
                .collect();
            for id in candidates {
                let parent = self.node(id).and_then(|n| n.parent);
                match parent {
                    Some(p) => {
                        if let Some(pn) = self.node_mut(p) {
                            pn.children.retain(|&c| c != id);
                        }
                    }
                    None => self.roots.retain(|&r| r != id),
                }
                self.nodes[id.to_index()] = None;
                self.free.push(id);
                removed = true;
            }
            if !removed {
                break;
            }
        }
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Whether the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mib(n: usize) -> MibId {
        MibId::from_index(n).unwrap()
    }

    #[test]
    fn test_root_and_child_creation() {
        let mut arena = OidArena::new();
        let iso = arena.root(1);
        let org = arena.child(iso, 3);
        let dod = arena.child(org, 6);
        assert_eq!(arena.dotted(dod), "1.3.6");
        // Idempotent.
        assert_eq!(arena.root(1), iso);
        assert_eq!(arena.child(iso, 3), org);
    }

    #[test]
    fn test_children_sorted_by_sub_id() {
        let mut arena = OidArena::new();
        let root = arena.root(1);
        arena.child(root, 5);
        arena.child(root, 2);
        arena.child(root, 9);
        let subs: Vec<u32> = arena
            .node(root)
            .unwrap()
            .children()
            .iter()
            .map(|&c| arena.node(c).unwrap().sub_id)
            .collect();
        assert_eq!(subs, [2, 5, 9]);
    }

    #[test]
    fn test_lookup() {
        let mut arena = OidArena::new();
        let iso = arena.root(1);
        let org = arena.child(iso, 3);
        let dod = arena.child(org, 6);
        assert_eq!(arena.lookup(&[1, 3, 6]), Some(dod));
        assert_eq!(arena.lookup(&[1, 4]), None);
        assert_eq!(arena.lookup(&[]), None);
    }

    #[test]
    fn test_parse_dotted() {
        assert_eq!(OidArena::parse_dotted("1.3.6"), Some(alloc::vec![1, 3, 6]));
        assert_eq!(OidArena::parse_dotted("1.x.6"), None);
        assert_eq!(OidArena::parse_dotted(""), None);
    }

    #[test]
    fn test_shared_node_two_definitions() {
        let mut arena = OidArena::new();
        let iso = arena.root(1);
        let node = arena.child(iso, 3);
        arena.add_definition(
            node,
            OidDefinition {
                mib: mib(0),
                symbol: Some(0),
                name: "org".into(),
            },
        );
        arena.add_definition(
            node,
            OidDefinition {
                mib: mib(1),
                symbol: Some(7),
                name: "org".into(),
            },
        );
        assert_eq!(arena.node(node).unwrap().definitions().len(), 2);
        assert_eq!(arena.node(node).unwrap().name(), Some("org"));
    }

    #[test]
    fn test_remove_mib_reclaims_unshared_nodes() {
        let mut arena = OidArena::new();
        let iso = arena.root(1);
        let org = arena.child(iso, 3);
        let private = arena.child(org, 99);
        arena.add_definition(
            org,
            OidDefinition {
                mib: mib(0),
                symbol: Some(0),
                name: "org".into(),
            },
        );
        arena.add_definition(
            private,
            OidDefinition {
                mib: mib(1),
                symbol: Some(0),
                name: "leaf".into(),
            },
        );
        let before = arena.len();
        arena.remove_mib(mib(1));
        // The leaf goes away; org (still defined by mib 0) and its chain stay.
        assert_eq!(arena.len(), before - 1);
        assert!(arena.lookup(&[1, 3, 99]).is_none());
        assert!(arena.lookup(&[1, 3]).is_some());
    }

    #[test]
    fn test_child_by_name() {
        let mut arena = OidArena::new();
        let iso = arena.root(1);
        let org = arena.child(iso, 3);
        arena.add_definition(
            org,
            OidDefinition {
                mib: mib(0),
                symbol: Some(0),
                name: "org".into(),
            },
        );
        assert_eq!(arena.child_by_name(iso, "org"), Some(org));
        assert_eq!(arena.child_by_name(iso, "other"), None);
    }
}
