//! In-memory mock topology for unit and integration tests.
//!
//! Always compiled (zero runtime cost), hidden from public docs.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use super::tree::{PropValue, TopoTree};
use super::{NodeFlags, NodeId, PropMutability, Result, TopoError, TopoWalk, Topology};
use crate::protocol::*;

/// Mock provider backed by a [`TopoTree`]. Records every write and every
/// snapshot hold/release; failures can be injected per node.
pub struct MockTopology {
    tree: TopoTree,
    /// Number of successful `snapshot_hold` calls.
    pub holds: Cell<u32>,
    /// Number of `snapshot_release` calls.
    pub releases: Cell<u32>,
    /// If true, `snapshot_hold` fails.
    pub fail_hold: Cell<bool>,
    /// Nodes whose property writes fail.
    pub fail_writes: RefCell<HashSet<NodeId>>,
    /// If true, a node's `facility.mode` becomes unreadable after a write.
    pub lose_mode_after_write: Cell<bool>,
    /// Recorded writes: (node, group, key, value), including failed ones.
    pub writes: RefCell<Vec<(NodeId, String, String, u32)>>,
}

impl Default for MockTopology {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTopology {
    /// Tree with a single `chassis` root in the `hc` scheme.
    pub fn new() -> Self {
        let mut tree = TopoTree::new(SCHEME_HC);
        tree.add_node(None, "chassis", NodeFlags::DEFAULT);
        Self::with_tree(tree)
    }

    /// Tree with no nodes at all.
    pub fn empty() -> Self {
        Self::with_tree(TopoTree::new(SCHEME_HC))
    }

    pub fn with_tree(tree: TopoTree) -> Self {
        MockTopology {
            tree,
            holds: Cell::new(0),
            releases: Cell::new(0),
            fail_hold: Cell::new(false),
            fail_writes: RefCell::new(HashSet::new()),
            lose_mode_after_write: Cell::new(false),
            writes: RefCell::new(Vec::new()),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn tree(&self) -> &TopoTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut TopoTree {
        &mut self.tree
    }

    /// Add a bay, optionally labelled.
    pub fn add_bay(&mut self, parent: NodeId, label: Option<&str>) -> NodeId {
        let bay = self.tree.add_node(Some(parent), NODE_BAY, NodeFlags::DEFAULT);
        if let Some(label) = label {
            self.tree.set_prop(
                bay,
                PGROUP_PROTOCOL,
                PROP_LABEL,
                PropValue::String(label.into()),
            );
        }
        bay
    }

    /// Add a disk, optionally with a logical name.
    pub fn add_disk(&mut self, parent: NodeId, logical: Option<&str>) -> NodeId {
        let disk = self
            .tree
            .add_node(Some(parent), NODE_DISK, NodeFlags::DEFAULT);
        if let Some(name) = logical {
            self.tree.set_prop(
                disk,
                PGROUP_STORAGE,
                PROP_LOGICAL_DISK,
                PropValue::String(name.into()),
            );
        }
        disk
    }

    /// Add a facility node with `facility.type` and `facility.mode` set.
    pub fn add_indicator(&mut self, bay: NodeId, led_type: u32, on: bool) -> NodeId {
        let name = match led_type {
            LED_TYPE_SERVICE => "fail",
            LED_TYPE_LOCATE => "ident",
            _ => "ok2rm",
        };
        let led = self.tree.add_node(Some(bay), name, NodeFlags::FACILITY);
        self.tree
            .set_prop(led, PGROUP_FACILITY, PROP_TYPE, PropValue::Uint32(led_type));
        let mode = if on { LED_MODE_ON } else { LED_MODE_OFF };
        self.tree
            .set_prop(led, PGROUP_FACILITY, PROP_MODE, PropValue::Uint32(mode));
        led
    }

    /// Current `facility.mode` of a node, if readable.
    pub fn mode_of(&self, node: NodeId) -> Option<u32> {
        self.tree.get_uint32(node, PGROUP_FACILITY, PROP_MODE).ok()
    }
}

impl Topology for MockTopology {
    fn snapshot_hold(&self) -> Result<()> {
        if self.fail_hold.get() {
            return Err(TopoError::SnapshotFailed(
                "mock: snapshot hold failure injected".into(),
            ));
        }
        self.holds.set(self.holds.get() + 1);
        Ok(())
    }

    fn snapshot_release(&self) {
        self.releases.set(self.releases.get() + 1);
    }

    fn walk_init(&self, scheme: &str) -> Result<TopoWalk> {
        self.tree.walk_init(scheme)
    }

    fn node_name(&self, node: NodeId) -> &str {
        self.tree.name(node)
    }

    fn node_instance(&self, node: NodeId) -> u32 {
        self.tree.instance(node)
    }

    fn node_flags(&self, node: NodeId) -> NodeFlags {
        self.tree.flags(node)
    }

    fn node_parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    fn node_children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.children(node)
    }

    fn prop_get_string(&self, node: NodeId, group: &str, key: &str) -> Result<String> {
        self.tree.get_string(node, group, key)
    }

    fn prop_get_uint32(&self, node: NodeId, group: &str, key: &str) -> Result<u32> {
        self.tree.get_uint32(node, group, key)
    }

    fn prop_set_uint32(
        &self,
        node: NodeId,
        group: &str,
        key: &str,
        mutability: PropMutability,
        value: u32,
    ) -> Result<()> {
        self.writes
            .borrow_mut()
            .push((node, group.into(), key.into(), value));
        if self.fail_writes.borrow().contains(&node) {
            return Err(TopoError::WriteFailed(format!(
                "mock: write failure injected on node {node}"
            )));
        }
        self.tree.set_uint32(node, group, key, mutability, value)?;
        if self.lose_mode_after_write.get() && group == PGROUP_FACILITY && key == PROP_MODE {
            self.tree.remove_prop(node, group, key);
        }
        Ok(())
    }
}
