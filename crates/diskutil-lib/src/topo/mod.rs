//! Topology provider — trait, node handles, scoped snapshot, walk.
//!
//! The provider owns the hardware tree; callers hold only [`NodeId`] handles
//! for the duration of a single walk.

mod snapshot;
mod tree;

#[doc(hidden)]
pub mod mock;

use std::fmt;
use std::ops::Deref;

use crate::protocol;

pub use snapshot::SnapshotTopology;
pub use tree::{NodeSpec, PropValue, SnapshotSpec, TopoTree};

// ── Error type ──

/// Topology provider errors.
///
/// String payloads follow the convention **"context: details"**, matching
/// the way the provider reports the failed step.
#[derive(Debug)]
pub enum TopoError {
    OpenFailed(String),
    SnapshotFailed(String),
    /// Walk or node access attempted without a held snapshot.
    NoSnapshot,
    /// The requested scheme has no tree.
    WalkNotFound(String),
    /// The tree exists but has no nodes.
    WalkEmpty,
    WalkFailed(String),
    InvalidNode(NodeId),
    PropertyNotFound {
        group: String,
        key: String,
    },
    PropertyType {
        group: String,
        key: String,
    },
    ReadOnly {
        group: String,
        key: String,
    },
    WriteFailed(String),
}

impl TopoError {
    pub(crate) fn not_found(group: &str, key: &str) -> Self {
        TopoError::PropertyNotFound {
            group: group.into(),
            key: key.into(),
        }
    }

    pub(crate) fn wrong_type(group: &str, key: &str) -> Self {
        TopoError::PropertyType {
            group: group.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for TopoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopoError::OpenFailed(e) => write!(f, "could not open topology: {e}"),
            TopoError::SnapshotFailed(e) => write!(f, "could not hold topology snapshot: {e}"),
            TopoError::NoSnapshot => write!(f, "no topology snapshot held"),
            TopoError::WalkNotFound(scheme) => {
                write!(f, "topology walk failed: scheme '{scheme}' not found")
            }
            TopoError::WalkEmpty => write!(f, "topology walk failed: tree is empty"),
            TopoError::WalkFailed(e) => write!(f, "topology walk failed: {e}"),
            TopoError::InvalidNode(id) => write!(f, "invalid topology node {id}"),
            TopoError::PropertyNotFound { group, key } => {
                write!(f, "property {group}.{key} not found")
            }
            TopoError::PropertyType { group, key } => {
                write!(f, "property {group}.{key} has the wrong type")
            }
            TopoError::ReadOnly { group, key } => write!(f, "property {group}.{key} is read-only"),
            TopoError::WriteFailed(e) => write!(f, "property write failed: {e}"),
        }
    }
}

impl std::error::Error for TopoError {}

pub type Result<T> = std::result::Result<T, TopoError>;

// ── Node model ──

/// Opaque handle to a node in the provider's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Disk,
    Bay,
    Indicator,
    Other,
}

impl NodeKind {
    /// Classify a node from its name and flags.
    pub fn from_node(name: &str, flags: NodeFlags) -> Self {
        match name {
            protocol::NODE_DISK => NodeKind::Disk,
            protocol::NODE_BAY => NodeKind::Bay,
            _ if flags.is_facility() => NodeKind::Indicator,
            _ => NodeKind::Other,
        }
    }
}

/// Provider-level node attributes, independent of [`NodeKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags(pub u32);

impl NodeFlags {
    pub const DEFAULT: NodeFlags = NodeFlags(protocol::NODE_FLAG_DEFAULT);
    pub const ROOT: NodeFlags = NodeFlags(protocol::NODE_FLAG_ROOT);
    pub const FACILITY: NodeFlags = NodeFlags(protocol::NODE_FLAG_FACILITY);

    pub fn is_facility(self) -> bool {
        self.0 & protocol::NODE_FLAG_FACILITY != 0
    }
}

/// Mutability requested when writing a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropMutability {
    Immutable,
    Mutable,
}

// ── Walk ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep {
    Next(NodeId),
    Terminate,
}

/// Single-pass visitation of a tree in provider order (depth-first,
/// children before siblings). Not restartable.
#[derive(Debug)]
pub struct TopoWalk {
    order: Vec<NodeId>,
    pos: usize,
}

impl TopoWalk {
    pub fn new(order: Vec<NodeId>) -> Self {
        TopoWalk { order, pos: 0 }
    }

    pub fn step(&mut self) -> WalkStep {
        match self.order.get(self.pos) {
            Some(&id) => {
                self.pos += 1;
                WalkStep::Next(id)
            }
            None => WalkStep::Terminate,
        }
    }

    pub fn remaining(&self) -> usize {
        self.order.len() - self.pos
    }
}

impl Iterator for TopoWalk {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        match self.step() {
            WalkStep::Next(id) => Some(id),
            WalkStep::Terminate => None,
        }
    }
}

// ── Trait ──

/// Read/write access to a hardware topology.
///
/// Property reads return `Err` for absent or mistyped properties; callers
/// treat that as a normal condition. Writes go through `&self` so they can be
/// issued mid-walk while node handles are borrowed.
pub trait Topology {
    fn snapshot_hold(&self) -> Result<()>;
    fn snapshot_release(&self);

    /// Prepare a walk over `scheme`. Fails with `WalkNotFound` / `WalkEmpty`
    /// before any node is visited.
    fn walk_init(&self, scheme: &str) -> Result<TopoWalk>;

    fn node_name(&self, node: NodeId) -> &str;
    fn node_instance(&self, node: NodeId) -> u32;
    fn node_flags(&self, node: NodeId) -> NodeFlags;
    fn node_parent(&self, node: NodeId) -> Option<NodeId>;
    fn node_children(&self, node: NodeId) -> Vec<NodeId>;

    fn node_kind(&self, node: NodeId) -> NodeKind {
        NodeKind::from_node(self.node_name(node), self.node_flags(node))
    }

    fn prop_get_string(&self, node: NodeId, group: &str, key: &str) -> Result<String>;
    fn prop_get_uint32(&self, node: NodeId, group: &str, key: &str) -> Result<u32>;
    fn prop_set_uint32(
        &self,
        node: NodeId,
        group: &str,
        key: &str,
        mutability: PropMutability,
        value: u32,
    ) -> Result<()>;
}

/// `name=instance` label for a node, as used in warnings.
pub fn node_label(topo: &(impl Topology + ?Sized), node: NodeId) -> String {
    format!("{}={}", topo.node_name(node), topo.node_instance(node))
}

// ── Scoped snapshot ──

/// Holds a topology snapshot for its lifetime; released on drop, on every
/// exit path.
pub struct TopoSession<'a, T: Topology + ?Sized> {
    topo: &'a T,
}

impl<'a, T: Topology + ?Sized> TopoSession<'a, T> {
    pub fn hold(topo: &'a T) -> Result<Self> {
        topo.snapshot_hold()?;
        log::debug!("topology snapshot held");
        Ok(TopoSession { topo })
    }
}

impl<T: Topology + ?Sized> Deref for TopoSession<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.topo
    }
}

impl<T: Topology + ?Sized> Drop for TopoSession<'_, T> {
    fn drop(&mut self) {
        self.topo.snapshot_release();
        log::debug!("topology snapshot released");
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTopology;
    use super::*;

    #[test]
    fn node_kind_from_name_and_flags() {
        assert_eq!(
            NodeKind::from_node("disk", NodeFlags::DEFAULT),
            NodeKind::Disk
        );
        assert_eq!(NodeKind::from_node("bay", NodeFlags::DEFAULT), NodeKind::Bay);
        assert_eq!(
            NodeKind::from_node("fail", NodeFlags::FACILITY),
            NodeKind::Indicator
        );
        assert_eq!(
            NodeKind::from_node("chassis", NodeFlags::ROOT),
            NodeKind::Other
        );
    }

    #[test]
    fn facility_flag_is_a_bit() {
        assert!(NodeFlags(protocol::NODE_FLAG_FACILITY | 0x10).is_facility());
        assert!(!NodeFlags::ROOT.is_facility());
    }

    #[test]
    fn walk_steps_then_terminates() {
        let mut walk = TopoWalk::new(vec![NodeId(0), NodeId(2)]);
        assert_eq!(walk.remaining(), 2);
        assert_eq!(walk.step(), WalkStep::Next(NodeId(0)));
        assert_eq!(walk.step(), WalkStep::Next(NodeId(2)));
        assert_eq!(walk.step(), WalkStep::Terminate);
        assert_eq!(walk.step(), WalkStep::Terminate);
        assert_eq!(walk.remaining(), 0);
    }

    #[test]
    fn session_releases_on_drop() {
        let topo = MockTopology::new();
        {
            let session = TopoSession::hold(&topo).unwrap();
            assert!(session.walk_init("hc").is_ok());
            assert_eq!(topo.holds.get(), 1);
            assert_eq!(topo.releases.get(), 0);
        }
        assert_eq!(topo.releases.get(), 1);
    }

    #[test]
    fn session_hold_failure_does_not_release() {
        let topo = MockTopology::new();
        topo.fail_hold.set(true);
        let err = TopoSession::hold(&topo).err().unwrap();
        assert!(matches!(err, TopoError::SnapshotFailed(_)));
        assert_eq!(topo.releases.get(), 0);
    }

    #[test]
    fn display_walk_errors_are_distinct() {
        let not_found = TopoError::WalkNotFound("hc".into()).to_string();
        let empty = TopoError::WalkEmpty.to_string();
        assert_ne!(not_found, empty);
        assert!(not_found.contains("'hc' not found"));
        assert!(empty.contains("empty"));
    }

    #[test]
    fn node_label_formats_name_and_instance() {
        let mut topo = MockTopology::new();
        let bay = topo.add_bay(topo.root(), Some("Bay 3"));
        assert_eq!(node_label(&topo, bay), "bay=0");
    }
}
