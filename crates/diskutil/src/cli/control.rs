//! `DISK <locate|service> <on|off>` — set one LED kind on one disk.

use super::{Action, ControlRequest, Reporter, Result, Topology, walk};

/// Drive every matching indicator on the named disk. The matched disk's row
/// is printed with the re-read state. A request that wrote nothing fails
/// with `NoMatch`, or `WriteRejected` if indicators were found but refused.
pub(super) fn cmd_control(
    topo: &impl Topology,
    scheme: &str,
    request: ControlRequest,
    reporter: &mut impl Reporter,
) -> Result<()> {
    let mut action = Action::Control(request);
    let summary = walk::run(topo, scheme, &mut action, reporter)?;
    if summary.failed_writes > 0 {
        log::warn!(
            "{} of {} indicator writes failed",
            summary.failed_writes,
            summary.failed_writes + summary.written
        );
    }
    Ok(())
}
