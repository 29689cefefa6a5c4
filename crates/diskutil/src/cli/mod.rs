//! CLI commands — argument shapes, config resolution, and dispatch.

mod control;
mod list;
mod table;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

pub(super) use diskutil_lib::DiskutilError;
pub(super) use diskutil_lib::config::Config;
pub(super) use diskutil_lib::error::Result;
pub(super) use diskutil_lib::led::{self, ControlRequest, IndicatorKind, LedMode};
pub(super) use diskutil_lib::topo::{SnapshotTopology, Topology};
pub(super) use diskutil_lib::walk::{self, Action, DiskRecord, Reporter};

use table::TableReporter;

/// Parsed positional arguments.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// `list`
    List,
    /// `DISK <locate|service> <on|off>`
    Control {
        disk: String,
        kind: IndicatorKind,
        mode: LedMode,
    },
}

/// Flags that override the config file.
#[derive(Debug, Default)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub topology: Option<PathBuf>,
    pub scheme: Option<String>,
}

pub fn usage() -> String {
    "usage:\n\
     \tdiskutil\tlist\n\
     \tdiskutil\tDISK_DEVICE <locate|service> <on|off>\n\n"
        .to_string()
}

/// Interpret the positional words. Nothing touches the topology until these
/// are known to be valid.
pub fn parse_command(words: &[String]) -> Result<Command> {
    match words {
        [cmd] if cmd == "list" => Ok(Command::List),
        [disk, kind, mode] => {
            let mode = led::parse_led_mode(mode)?;
            let kind = led::parse_indicator_kind(kind)?;
            Ok(Command::Control {
                disk: disk.clone(),
                kind,
                mode,
            })
        }
        _ => Err(DiskutilError::Usage(format!(
            "unknown args: {}",
            words.join(" ")
        ))),
    }
}

/// Load the config from an explicit path or the platform default, logging
/// parse warnings.
fn load_config(path: Option<&Path>) -> Config {
    let (config, warnings) = match path {
        Some(p) => Config::load_from(p),
        None => Config::load_with_warnings(),
    };
    for w in &warnings {
        log::warn!("{w}");
    }
    config
}

pub fn run(cmd: Command, opts: &Options) -> Result<()> {
    let mut config = load_config(opts.config.as_deref());
    if let Some(ref scheme) = opts.scheme {
        config.scheme = scheme.clone();
    }
    config.check()?;

    let path = opts
        .topology
        .clone()
        .or_else(|| config.topology_file())
        .ok_or_else(|| {
            DiskutilError::Config("no topology file given and no config directory".into())
        })?;
    let topo = SnapshotTopology::open(&path)?;

    let stdout = std::io::stdout();
    let highlight = config.highlight && stdout.is_terminal();
    let mut reporter = TableReporter::new(stdout.lock(), highlight);

    match cmd {
        Command::List => list::cmd_list(&topo, &config.scheme, &mut reporter),
        Command::Control { disk, kind, mode } => control::cmd_control(
            &topo,
            &config.scheme,
            ControlRequest::new(disk, kind, mode),
            &mut reporter,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_list() {
        assert_eq!(parse_command(&words(&["list"])).unwrap(), Command::List);
    }

    #[test]
    fn parse_control() {
        let cmd = parse_command(&words(&["c0t0d0", "locate", "on"])).unwrap();
        assert_eq!(
            cmd,
            Command::Control {
                disk: "c0t0d0".into(),
                kind: IndicatorKind::Locate,
                mode: LedMode::On,
            }
        );
        let cmd = parse_command(&words(&["c0t0d0", "service", "off"])).unwrap();
        assert!(matches!(
            cmd,
            Command::Control {
                kind: IndicatorKind::Service,
                mode: LedMode::Off,
                ..
            }
        ));
    }

    #[test]
    fn parse_bad_mode() {
        let err = parse_command(&words(&["c0t0d0", "locate", "blink"])).unwrap_err();
        assert_eq!(err.to_string(), "unknown LED mode 'blink'");
    }

    #[test]
    fn parse_bad_led_name() {
        let err = parse_command(&words(&["c0t0d0", "power", "on"])).unwrap_err();
        assert_eq!(err.to_string(), "unknown LED name 'power'");
    }

    #[test]
    fn parse_wrong_shapes() {
        for ws in [
            &["lists"][..],
            &["c0t0d0", "locate"][..],
            &["list", "extra"][..],
            &["a", "b", "c", "d"][..],
        ] {
            let err = parse_command(&words(ws)).unwrap_err();
            assert!(matches!(err, DiskutilError::Usage(_)), "{ws:?}");
        }
    }

    #[test]
    fn disk_named_list_is_control() {
        let cmd = parse_command(&words(&["list", "locate", "on"])).unwrap();
        assert!(matches!(cmd, Command::Control { ref disk, .. } if disk == "list"));
    }

    #[test]
    fn usage_names_both_forms() {
        let u = usage();
        assert!(u.starts_with("usage:"));
        assert!(u.contains("list"));
        assert!(u.contains("<locate|service> <on|off>"));
    }

    #[test]
    fn run_missing_topology_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let opts = Options {
            config: Some(dir.path().join("none.toml")),
            topology: Some(dir.path().join("missing.json")),
            scheme: None,
        };
        let err = run(Command::List, &opts).unwrap_err();
        assert!(err.to_string().contains("could not open topology"));
    }

    #[test]
    fn run_rejects_empty_scheme_override() {
        let dir = tempfile::tempdir().unwrap();
        let opts = Options {
            config: Some(dir.path().join("none.toml")),
            topology: Some(dir.path().join("missing.json")),
            scheme: Some(" ".into()),
        };
        let err = run(Command::List, &opts).unwrap_err();
        assert!(matches!(err, DiskutilError::Config(_)));
    }
}
