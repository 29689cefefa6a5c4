//! LED control — drive every indicator of one kind on a bay to a requested state.

use crate::protocol::*;
use crate::topo::{self, PropMutability, Topology};

use super::indicator::{IndicatorKind, IndicatorRecord, LedMode, LedState};

/// Operator request: set one kind of LED on one named disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRequest {
    pub disk: String,
    pub kind: IndicatorKind,
    pub mode: LedMode,
    found: bool,
}

impl ControlRequest {
    pub fn new(disk: impl Into<String>, kind: IndicatorKind, mode: LedMode) -> Self {
        ControlRequest {
            disk: disk.into(),
            kind,
            mode,
            found: false,
        }
    }

    /// True once at least one matching indicator was written successfully.
    pub fn found(&self) -> bool {
        self.found
    }

    /// Whether a disk's resolved logical name selects it. Unnamed disks never match.
    pub fn matches_disk(&self, logical_name: Option<&str>) -> bool {
        logical_name == Some(self.disk.as_str())
    }
}

/// Result of driving one bay's indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlOutcome {
    pub written: usize,
    pub failed: usize,
}

/// Write `request.mode` to every indicator in `records` of `request.kind`.
///
/// There is no stop-after-first-match: all matching indicators receive the
/// write. A failed write is logged and skipped. Each successful write marks
/// the request found and re-reads the mode into the record; an unreadable
/// mode afterwards leaves the record `Unknown`.
pub fn control_bay(
    topo: &(impl Topology + ?Sized),
    records: &mut [IndicatorRecord],
    request: &mut ControlRequest,
) -> ControlOutcome {
    let mut outcome = ControlOutcome::default();
    let value = request.mode.mode_value();
    let kind = request.kind;

    for record in records.iter_mut().filter(|r| r.kind == Some(kind)) {
        let label = topo::node_label(topo, record.node);
        if let Err(e) = topo.prop_set_uint32(
            record.node,
            PGROUP_FACILITY,
            PROP_MODE,
            PropMutability::Mutable,
            value,
        ) {
            log::warn!(
                "could not set {PGROUP_FACILITY}.{PROP_MODE} on {label} of disk {}: {e}",
                request.disk
            );
            outcome.failed += 1;
            continue;
        }

        request.found = true;
        outcome.written += 1;
        log::info!(
            "set {} LED {label} of disk {} {}",
            request.kind,
            request.disk,
            request.mode
        );

        record.state = match topo.prop_get_uint32(record.node, PGROUP_FACILITY, PROP_MODE) {
            Ok(mode) => LedState::from_mode(mode),
            Err(e) => {
                log::debug!("re-read of {label} failed: {e}");
                LedState::Unknown
            }
        };
    }

    outcome
}
