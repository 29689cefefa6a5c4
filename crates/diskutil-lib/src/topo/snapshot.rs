//! File-backed topology provider.
//!
//! Loads a JSON snapshot of the hardware tree. Facility writes are applied to
//! the in-memory tree and persisted back to the file before the write
//! returns, so a later run observes them.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use super::tree::{SnapshotSpec, TopoTree};
use super::{NodeFlags, NodeId, PropMutability, Result, TopoError, TopoWalk, Topology};

pub struct SnapshotTopology {
    path: PathBuf,
    tree: TopoTree,
    held: Cell<bool>,
}

impl SnapshotTopology {
    /// Open and parse the snapshot file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TopoError::OpenFailed(format!("{}: {e}", path.display())))?;
        let spec: SnapshotSpec = serde_json::from_str(&contents)
            .map_err(|e| TopoError::OpenFailed(format!("{}: {e}", path.display())))?;
        log::debug!(
            "loaded topology snapshot {} (scheme {})",
            path.display(),
            spec.scheme
        );
        Ok(SnapshotTopology {
            path: path.to_path_buf(),
            tree: TopoTree::from_spec(&spec),
            held: Cell::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tree(&self) -> &TopoTree {
        &self.tree
    }

    /// Write the tree back atomically (temp file, then rename).
    fn persist(&self) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.tree.to_spec())
            .map_err(std::io::Error::other)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        match std::fs::rename(&tmp, &self.path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(&self.path, &json);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    fn require_held(&self) -> Result<()> {
        if self.held.get() {
            Ok(())
        } else {
            Err(TopoError::NoSnapshot)
        }
    }
}

impl Topology for SnapshotTopology {
    fn snapshot_hold(&self) -> Result<()> {
        if self.held.replace(true) {
            return Err(TopoError::SnapshotFailed("snapshot already held".into()));
        }
        Ok(())
    }

    fn snapshot_release(&self) {
        self.held.set(false);
    }

    fn walk_init(&self, scheme: &str) -> Result<TopoWalk> {
        self.require_held()?;
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
        self.require_held()?;
        self.tree.get_string(node, group, key)
    }

    fn prop_get_uint32(&self, node: NodeId, group: &str, key: &str) -> Result<u32> {
        self.require_held()?;
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
        self.require_held()?;
        let previous = self.tree.prop(node, group, key);
        self.tree.set_uint32(node, group, key, mutability, value)?;
        if let Err(e) = self.persist() {
            // Keep memory and file in agreement.
            match previous {
                Some(v) => self.tree.set_prop(node, group, key, v),
                None => self.tree.remove_prop(node, group, key),
            }
            return Err(TopoError::WriteFailed(format!(
                "{}: {e}",
                self.path.display()
            )));
        }
        Ok(())
    }
}
