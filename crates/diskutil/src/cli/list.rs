//! `list` — report every disk with its service and locate LED state.

use super::{Action, Reporter, Result, Topology, walk};

pub(super) fn cmd_list(
    topo: &impl Topology,
    scheme: &str,
    reporter: &mut impl Reporter,
) -> Result<()> {
    let summary = walk::run(topo, scheme, &mut Action::List, reporter)?;
    log::debug!("listed {} disk(s)", summary.disks);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::table::TableReporter;
    use diskutil_lib::protocol::*;
    use diskutil_lib::topo::mock::MockTopology;

    fn output(topo: &MockTopology) -> Vec<String> {
        let mut rep = TableReporter::new(Vec::new(), false);
        cmd_list(topo, SCHEME_HC, &mut rep).unwrap();
        String::from_utf8(rep.into_inner())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn empty_tree_prints_only_header() {
        let topo = MockTopology::new();
        let lines = output(&topo);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("DISK"));
    }

    #[test]
    fn bay_without_indicators_is_unknown() {
        let mut topo = MockTopology::new();
        let bay = topo.add_bay(topo.root(), Some("Slot 4"));
        topo.add_disk(bay, Some("c0t4d0"));
        let lines = output(&topo);
        let cols: Vec<&str> = lines[1].split_whitespace().collect();
        assert_eq!(cols, ["c0t4d0", "Slot", "4", "-", "-"]);
    }

    #[test]
    fn single_indicator_state_is_shown() {
        let mut topo = MockTopology::new();
        let bay = topo.add_bay(topo.root(), Some("Bay 0"));
        topo.add_disk(bay, Some("c0t0d0"));
        topo.add_indicator(bay, LED_TYPE_SERVICE, true);
        let lines = output(&topo);
        let cols: Vec<&str> = lines[1].split_whitespace().collect();
        assert_eq!(cols, ["c0t0d0", "Bay", "0", "ON", "-"]);
    }

    #[test]
    fn walk_error_prints_nothing() {
        let topo = MockTopology::empty();
        let mut rep = TableReporter::new(Vec::new(), false);
        assert!(cmd_list(&topo, SCHEME_HC, &mut rep).is_err());
        assert!(rep.into_inner().is_empty());
    }
}
