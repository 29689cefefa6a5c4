//! Topology naming constants — node names, property groups/keys, LED codes.
//!
//! Values follow the hardware-component (`hc`) scheme of the fault management
//! topology: disks hang off bays, and each bay carries facility nodes for its
//! indicator LEDs.

// ── Schemes ──

/// Hardware-component scheme: the physical chassis/bay/disk hierarchy.
pub const SCHEME_HC: &str = "hc";

// ── Node names ──

pub const NODE_DISK: &str = "disk";
pub const NODE_BAY: &str = "bay";

// ── Node flags ──

pub const NODE_FLAG_DEFAULT: u32 = 0x0;
pub const NODE_FLAG_ROOT: u32 = 0x1;
/// Facility node (indicator or sensor), as opposed to a plain hardware node.
pub const NODE_FLAG_FACILITY: u32 = 0x2;

// ── Property groups and keys ──

/// `storage.logical-disk` on disk nodes, e.g. `"c0t0d0"`.
pub const PGROUP_STORAGE: &str = "storage";
pub const PROP_LOGICAL_DISK: &str = "logical-disk";

/// `protocol.label` on bay nodes, e.g. `"Bay 1"`.
pub const PGROUP_PROTOCOL: &str = "protocol";
pub const PROP_LABEL: &str = "label";

/// `facility.mode` / `facility.type` on indicator nodes.
pub const PGROUP_FACILITY: &str = "facility";
pub const PROP_MODE: &str = "mode";
pub const PROP_TYPE: &str = "type";

// ── LED type codes (`facility.type`) ──

pub const LED_TYPE_SERVICE: u32 = 0;
pub const LED_TYPE_LOCATE: u32 = 1;
pub const LED_TYPE_OK2RM: u32 = 2;
pub const LED_TYPE_PRESENT: u32 = 3;

// ── LED mode values (`facility.mode`) ──

pub const LED_MODE_OFF: u32 = 0;
pub const LED_MODE_ON: u32 = 1;
