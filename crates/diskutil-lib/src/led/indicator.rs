//! Indicator classification — which LEDs a bay carries and what state they're in.

use std::fmt;

use crate::error::DiskutilError;
use crate::protocol::*;
use crate::topo::{NodeId, Topology};

/// Indicator kinds the tool reports and controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    /// Fault / service-required LED.
    Service,
    /// Locate / identify LED.
    Locate,
}

impl IndicatorKind {
    /// Map a provider `facility.type` code. Other LED types are not reported.
    pub fn from_type_code(code: u32) -> Option<Self> {
        match code {
            LED_TYPE_SERVICE => Some(IndicatorKind::Service),
            LED_TYPE_LOCATE => Some(IndicatorKind::Locate),
            _ => None,
        }
    }

    pub fn type_code(self) -> u32 {
        match self {
            IndicatorKind::Service => LED_TYPE_SERVICE,
            IndicatorKind::Locate => LED_TYPE_LOCATE,
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Service => write!(f, "service"),
            IndicatorKind::Locate => write!(f, "locate"),
        }
    }
}

/// Parse an LED name as typed on the command line: `locate` or `service`.
pub fn parse_indicator_kind(s: &str) -> crate::error::Result<IndicatorKind> {
    match s {
        "locate" => Ok(IndicatorKind::Locate),
        "service" => Ok(IndicatorKind::Service),
        _ => Err(DiskutilError::Usage(format!("unknown LED name '{s}'"))),
    }
}

/// Displayed LED state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    On,
    Off,
    /// No readable indicator of this kind.
    Unknown,
}

impl LedState {
    pub fn from_mode(mode: u32) -> Self {
        if mode != LED_MODE_OFF {
            LedState::On
        } else {
            LedState::Off
        }
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedState::On => write!(f, "ON"),
            LedState::Off => write!(f, "OFF"),
            LedState::Unknown => write!(f, "-"),
        }
    }
}

/// Requested LED state in control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    On,
    Off,
}

impl LedMode {
    /// `facility.mode` value to write.
    pub fn mode_value(self) -> u32 {
        match self {
            LedMode::On => LED_MODE_ON,
            LedMode::Off => LED_MODE_OFF,
        }
    }
}

impl fmt::Display for LedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedMode::On => write!(f, "on"),
            LedMode::Off => write!(f, "off"),
        }
    }
}

/// Parse an LED mode as typed on the command line: `on` or `off`.
pub fn parse_led_mode(s: &str) -> crate::error::Result<LedMode> {
    match s {
        "on" => Ok(LedMode::On),
        "off" => Ok(LedMode::Off),
        _ => Err(DiskutilError::Usage(format!("unknown LED mode '{s}'"))),
    }
}

/// One readable facility node under a bay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorRecord {
    pub node: NodeId,
    /// Raw `facility.type` code.
    pub type_code: u32,
    /// `None` for LED types that aren't reported (OK-to-remove, present, ...).
    pub kind: Option<IndicatorKind>,
    pub state: LedState,
}

/// Enumerate the facility children of `bay` in provider order.
///
/// Children without the facility flag are skipped, as are facility nodes
/// whose `mode` or `type` can't be read.
pub fn classify(topo: &(impl Topology + ?Sized), bay: NodeId) -> Vec<IndicatorRecord> {
    let mut records = Vec::new();
    for child in topo.node_children(bay) {
        if !topo.node_flags(child).is_facility() {
            continue;
        }
        let mode = topo.prop_get_uint32(child, PGROUP_FACILITY, PROP_MODE);
        let type_code = topo.prop_get_uint32(child, PGROUP_FACILITY, PROP_TYPE);
        let (Ok(mode), Ok(type_code)) = (mode, type_code) else {
            log::debug!(
                "skipping unreadable facility {}",
                crate::topo::node_label(topo, child)
            );
            continue;
        };
        records.push(IndicatorRecord {
            node: child,
            type_code,
            kind: IndicatorKind::from_type_code(type_code),
            state: LedState::from_mode(mode),
        });
    }
    records
}

/// Per-disk LED columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSummary {
    pub service: LedState,
    pub locate: LedState,
}

impl IndicatorSummary {
    /// Both columns unknown: no bay, or no indicators.
    pub fn unknown() -> Self {
        IndicatorSummary {
            service: LedState::Unknown,
            locate: LedState::Unknown,
        }
    }

    /// Reduce records to one state per kind. When a bay carries several
    /// indicators of the same kind, the first one in provider order wins.
    pub fn from_records(records: &[IndicatorRecord]) -> Self {
        let first = |kind: IndicatorKind| {
            records
                .iter()
                .find(|r| r.kind == Some(kind))
                .map_or(LedState::Unknown, |r| r.state)
        };
        IndicatorSummary {
            service: first(IndicatorKind::Service),
            locate: first(IndicatorKind::Locate),
        }
    }

    pub fn get(&self, kind: IndicatorKind) -> LedState {
        match kind {
            IndicatorKind::Service => self.service,
            IndicatorKind::Locate => self.locate,
        }
    }
}
