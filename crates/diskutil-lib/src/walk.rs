//! Disk walk — find disk nodes, resolve their bays, report LED state, and
//! apply a control request in the same pass.
//!
//! A run is: hold snapshot → init walk (fatal errors surface here, before
//! any output) → header → one record per visited disk → release snapshot.

use std::io;

use crate::error::{DiskutilError, Result};
use crate::led::{self, ControlRequest, IndicatorSummary};
use crate::protocol::*;
use crate::topo::{NodeId, NodeKind, TopoSession, TopoWalk, Topology};

/// What a run does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Report every disk.
    List,
    /// Set one LED on one disk, reporting only that disk.
    Control(ControlRequest),
}

/// One visited disk, as reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskRecord {
    pub node: NodeId,
    /// `storage.logical-disk`, if readable.
    pub logical_name: Option<String>,
    /// Enclosing bay, if the disk's parent is one.
    pub bay: Option<NodeId>,
    /// `protocol.label` of the bay, if readable.
    pub bay_label: Option<String>,
    pub leds: IndicatorSummary,
}

/// Receives the report as the walk produces it.
pub trait Reporter {
    /// Called once, after the walk is initialised and before any disk.
    fn header(&mut self) -> io::Result<()>;
    /// Called per reported disk, in visitation order.
    fn disk(&mut self, record: &DiskRecord) -> io::Result<()>;
}

/// Collects records in memory.
impl Reporter for Vec<DiskRecord> {
    fn header(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn disk(&mut self, record: &DiskRecord) -> io::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Counters for one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Nodes visited, of any kind.
    pub nodes: usize,
    /// Disks reported.
    pub disks: usize,
    /// Disks skipped because they didn't match the control request.
    pub skipped: usize,
    /// Successful indicator writes.
    pub written: usize,
    /// Failed indicator writes.
    pub failed_writes: usize,
}

/// Read a disk's logical name and bay context, classify the bay's
/// indicators, and apply `request` if given.
fn inspect_disk(
    topo: &(impl Topology + ?Sized),
    disk: NodeId,
    logical_name: Option<String>,
    request: Option<&mut ControlRequest>,
    summary: &mut WalkSummary,
) -> DiskRecord {
    let bay = topo
        .node_parent(disk)
        .filter(|&p| topo.node_kind(p) == NodeKind::Bay);

    let Some(bay) = bay else {
        log::debug!(
            "disk {} has no bay",
            logical_name.as_deref().unwrap_or("-")
        );
        return DiskRecord {
            node: disk,
            logical_name,
            bay: None,
            bay_label: None,
            leds: IndicatorSummary::unknown(),
        };
    };

    let bay_label = topo.prop_get_string(bay, PGROUP_PROTOCOL, PROP_LABEL).ok();
    let mut records = led::classify(topo, bay);
    if let Some(request) = request {
        let outcome = led::control_bay(topo, &mut records, request);
        summary.written += outcome.written;
        summary.failed_writes += outcome.failed;
    }

    DiskRecord {
        node: disk,
        logical_name,
        bay: Some(bay),
        bay_label,
        leds: IndicatorSummary::from_records(&records),
    }
}

/// Visit every node of `walk`, reporting disks.
///
/// With a control request, disks whose logical name doesn't equal the
/// requested name are skipped without side effects; unnamed disks never
/// match. Per-node read and write problems are absorbed; only reporter I/O
/// errors stop the walk.
pub fn walk_disks<R: Reporter + ?Sized>(
    topo: &(impl Topology + ?Sized),
    walk: TopoWalk,
    mut request: Option<&mut ControlRequest>,
    reporter: &mut R,
) -> Result<WalkSummary> {
    let mut summary = WalkSummary::default();

    for node in walk {
        summary.nodes += 1;
        if topo.node_kind(node) != NodeKind::Disk {
            continue;
        }

        let logical_name = match topo.prop_get_string(node, PGROUP_STORAGE, PROP_LOGICAL_DISK) {
            Ok(name) => Some(name),
            Err(e) => {
                log::debug!("disk {node}: {e}");
                None
            }
        };

        if let Some(ref req) = request
            && !req.matches_disk(logical_name.as_deref())
        {
            summary.skipped += 1;
            continue;
        }

        let record = inspect_disk(
            topo,
            node,
            logical_name,
            request.as_deref_mut(),
            &mut summary,
        );
        summary.disks += 1;
        reporter.disk(&record)?;
    }

    Ok(summary)
}

/// Run `action` against `topo` within one held snapshot.
///
/// Fatal provider errors (snapshot hold, walk init) return before the
/// reporter sees anything. A control request that never wrote a matching
/// indicator ends in [`DiskutilError::NoMatch`], or in
/// [`DiskutilError::WriteRejected`] when matching indicators refused every
/// write. The snapshot is released on
/// every path once held.
pub fn run<R: Reporter + ?Sized>(
    topo: &(impl Topology + ?Sized),
    scheme: &str,
    action: &mut Action,
    reporter: &mut R,
) -> Result<WalkSummary> {
    let session = TopoSession::hold(topo)?;
    let walk = session.walk_init(scheme)?;
    reporter.header()?;

    let request = match &mut *action {
        Action::List => None,
        Action::Control(req) => Some(req),
    };
    let summary = walk_disks(&*session, walk, request, reporter)?;
    drop(session);

    log::debug!(
        "walk done: {} nodes, {} disks reported, {} skipped",
        summary.nodes,
        summary.disks,
        summary.skipped
    );

    if let Action::Control(req) = action
        && !req.found()
    {
        if summary.failed_writes > 0 {
            return Err(DiskutilError::WriteRejected {
                disk: req.disk.clone(),
                kind: req.kind,
                failed: summary.failed_writes,
            });
        }
        return Err(DiskutilError::NoMatch {
            disk: req.disk.clone(),
            kind: req.kind,
        });
    }
    Ok(summary)
}
