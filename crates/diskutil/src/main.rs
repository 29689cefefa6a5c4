//! diskutil — list disks in storage bays and control their service/locate LEDs.

use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;

mod cli;

#[derive(Parser)]
#[command(
    name = "diskutil",
    version,
    about = "List disks in storage bays and control their service/locate LEDs",
    override_usage = "diskutil [OPTIONS] list\n       diskutil [OPTIONS] <DISK> <locate|service> <on|off>"
)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (default: diskutil/config.toml in the platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Topology snapshot file (overrides the config)
    #[arg(long, value_name = "PATH")]
    topology: Option<PathBuf>,

    /// Topology scheme to walk (overrides the config)
    #[arg(long, value_name = "NAME")]
    scheme: Option<String>,

    /// `list`, or `DISK <locate|service> <on|off>`
    #[arg(value_name = "ARGS")]
    words: Vec<String>,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(a) => a,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                eprint!("{e}");
                eprint!("{}", cli::usage());
                std::process::exit(1);
            }
        },
    };

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if args.words.is_empty() {
        print!("{}", cli::usage());
        std::process::exit(1);
    }

    let command = match cli::parse_command(&args.words) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprint!("{}", cli::usage());
            std::process::exit(1);
        }
    };

    let opts = cli::Options {
        config: args.config,
        topology: args.topology,
        scheme: args.scheme,
    };

    if let Err(e) = cli::run(command, &opts) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
