//! In-memory topology tree and its serialized snapshot form.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{NodeFlags, NodeId, PropMutability, Result, TopoError, TopoWalk};
use crate::protocol;

/// A property value: the provider stores 32-bit unsigned integers and strings.
/// Anything else in a snapshot is kept as-is so it survives a write-back, but
/// reads treat it as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Uint32(u32),
    String(String),
    Unsupported(serde_json::Value),
}

/// Property groups: group name → key → value.
pub type PropGroups = BTreeMap<String, BTreeMap<String, PropValue>>;

/// Serialized description of one node and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub instance: u32,
    /// Indicator-capable facility node.
    #[serde(default, skip_serializing_if = "is_false")]
    pub facility: bool,
    /// Reject all property writes on this node.
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: PropGroups,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

/// Serialized description of a whole topology snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSpec {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default)]
    pub root: Option<NodeSpec>,
}

fn default_scheme() -> String {
    protocol::SCHEME_HC.into()
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug)]
struct NodeData {
    name: String,
    instance: u32,
    flags: NodeFlags,
    read_only: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    props: RefCell<PropGroups>,
    /// Properties written with `PropMutability::Immutable`.
    locked: RefCell<BTreeSet<(String, String)>>,
}

/// Arena-backed topology tree. Node 0 is the root when the tree is non-empty.
#[derive(Debug)]
pub struct TopoTree {
    scheme: String,
    nodes: Vec<NodeData>,
}

impl TopoTree {
    /// Empty tree for `scheme`.
    pub fn new(scheme: &str) -> Self {
        TopoTree {
            scheme: scheme.into(),
            nodes: Vec::new(),
        }
    }

    pub fn from_spec(spec: &SnapshotSpec) -> Self {
        let mut tree = TopoTree::new(&spec.scheme);
        if let Some(ref root) = spec.root {
            tree.insert_spec(None, root);
        }
        tree
    }

    fn insert_spec(&mut self, parent: Option<NodeId>, spec: &NodeSpec) {
        let mut flags = if spec.facility {
            protocol::NODE_FLAG_FACILITY
        } else {
            protocol::NODE_FLAG_DEFAULT
        };
        if parent.is_none() {
            flags |= protocol::NODE_FLAG_ROOT;
        }
        let id = self.push(parent, &spec.name, spec.instance, NodeFlags(flags));
        self.nodes[id.0].read_only = spec.read_only;
        *self.nodes[id.0].props.borrow_mut() = spec.properties.clone();
        for child in &spec.children {
            self.insert_spec(Some(id), child);
        }
    }

    pub fn to_spec(&self) -> SnapshotSpec {
        SnapshotSpec {
            scheme: self.scheme.clone(),
            root: self.root().map(|r| self.node_spec(r)),
        }
    }

    fn node_spec(&self, id: NodeId) -> NodeSpec {
        let n = &self.nodes[id.0];
        NodeSpec {
            name: n.name.clone(),
            instance: n.instance,
            facility: n.flags.is_facility(),
            read_only: n.read_only,
            properties: n.props.borrow().clone(),
            children: n.children.iter().map(|&c| self.node_spec(c)).collect(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, parent: Option<NodeId>, name: &str, instance: u32, flags: NodeFlags) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.into(),
            instance,
            flags,
            read_only: false,
            parent,
            children: Vec::new(),
            props: RefCell::new(PropGroups::new()),
            locked: RefCell::new(BTreeSet::new()),
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    /// Append a node. The instance number counts same-named siblings.
    /// A node added without a parent becomes the root and must be the first.
    pub fn add_node(&mut self, parent: Option<NodeId>, name: &str, flags: NodeFlags) -> NodeId {
        let instance = parent.map_or(0, |p| {
            self.nodes[p.0]
                .children
                .iter()
                .filter(|c| self.nodes[c.0].name == name)
                .count() as u32
        });
        let flags = if parent.is_none() {
            NodeFlags(flags.0 | protocol::NODE_FLAG_ROOT)
        } else {
            flags
        };
        self.push(parent, name, instance, flags)
    }

    pub fn set_read_only(&mut self, node: NodeId, read_only: bool) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.read_only = read_only;
        }
    }

    /// Store a property directly, bypassing write checks.
    pub fn set_prop(&self, node: NodeId, group: &str, key: &str, value: PropValue) {
        if let Some(n) = self.nodes.get(node.0) {
            n.props
                .borrow_mut()
                .entry(group.into())
                .or_default()
                .insert(key.into(), value);
        }
    }

    pub fn remove_prop(&self, node: NodeId, group: &str, key: &str) {
        if let Some(n) = self.nodes.get(node.0)
            && let Some(g) = n.props.borrow_mut().get_mut(group)
        {
            g.remove(key);
        }
    }

    pub fn prop(&self, node: NodeId, group: &str, key: &str) -> Option<PropValue> {
        let n = self.nodes.get(node.0)?;
        n.props.borrow().get(group)?.get(key).cloned()
    }

    /// Depth-first preorder: each node, then its children, then its siblings.
    pub fn walk_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root().into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev());
        }
        order
    }

    pub fn walk_init(&self, scheme: &str) -> Result<TopoWalk> {
        if scheme != self.scheme {
            return Err(TopoError::WalkNotFound(scheme.into()));
        }
        if self.nodes.is_empty() {
            return Err(TopoError::WalkEmpty);
        }
        Ok(TopoWalk::new(self.walk_order()))
    }

    pub fn name(&self, node: NodeId) -> &str {
        self.nodes.get(node.0).map_or("", |n| n.name.as_str())
    }

    pub fn instance(&self, node: NodeId) -> u32 {
        self.nodes.get(node.0).map_or(0, |n| n.instance)
    }

    pub fn flags(&self, node: NodeId) -> NodeFlags {
        self.nodes.get(node.0).map_or(NodeFlags::DEFAULT, |n| n.flags)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn get_string(&self, node: NodeId, group: &str, key: &str) -> Result<String> {
        if node.0 >= self.nodes.len() {
            return Err(TopoError::InvalidNode(node));
        }
        match self.prop(node, group, key) {
            Some(PropValue::String(s)) => Ok(s),
            Some(PropValue::Uint32(_)) => Err(TopoError::wrong_type(group, key)),
            Some(PropValue::Unsupported(_)) | None => Err(TopoError::not_found(group, key)),
        }
    }

    pub fn get_uint32(&self, node: NodeId, group: &str, key: &str) -> Result<u32> {
        if node.0 >= self.nodes.len() {
            return Err(TopoError::InvalidNode(node));
        }
        match self.prop(node, group, key) {
            Some(PropValue::Uint32(v)) => Ok(v),
            Some(PropValue::String(_)) => Err(TopoError::wrong_type(group, key)),
            Some(PropValue::Unsupported(_)) | None => Err(TopoError::not_found(group, key)),
        }
    }

    pub fn set_uint32(
        &self,
        node: NodeId,
        group: &str,
        key: &str,
        mutability: PropMutability,
        value: u32,
    ) -> Result<()> {
        let n = self.nodes.get(node.0).ok_or(TopoError::InvalidNode(node))?;
        let locked = n.locked.borrow().contains(&(group.to_string(), key.to_string()));
        if n.read_only || locked {
            return Err(TopoError::ReadOnly {
                group: group.into(),
                key: key.into(),
            });
        }
        if let Some(PropValue::String(_)) = self.prop(node, group, key) {
            return Err(TopoError::wrong_type(group, key));
        }
        self.set_prop(node, group, key, PropValue::Uint32(value));
        if mutability == PropMutability::Immutable {
            n.locked.borrow_mut().insert((group.into(), key.into()));
        }
        Ok(())
    }
}
