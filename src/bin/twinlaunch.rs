// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{value_parser, Arg, ArgAction, Command};
use tokio::runtime;
use tracing_subscriber::{fmt, EnvFilter};

use twinlaunch::app::{self, Options};
use twinlaunch::config::default_config_path;
use twinlaunch::console::Console;
use twinlaunch::platform::{NativePlatform, Platform};
use twinlaunch::Error;

const CONFIG: &str = "config";
const NO_PAUSE: &str = "no-pause";
const SKIP_ELEVATION_CHECK: &str = "skip-elevation-check";
const STRICT: &str = "strict";
const VERBOSE: &str = "verbose";

fn cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new(CONFIG)
                .long(CONFIG)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("configuration file, defaults to config.ini in the working directory"),
        )
        .arg(
            Arg::new(NO_PAUSE)
                .long(NO_PAUSE)
                .action(ArgAction::SetTrue)
                .help("never wait for enter, implied when stdin is not a terminal"),
        )
        .arg(
            Arg::new(SKIP_ELEVATION_CHECK)
                .long(SKIP_ELEVATION_CHECK)
                .action(ArgAction::SetTrue)
                .help("launch even without administrative privileges"),
        )
        .arg(
            Arg::new(STRICT)
                .long(STRICT)
                .action(ArgAction::SetTrue)
                .help("fail instead of launching when a path is missing from the configuration"),
        )
        .arg(
            Arg::new(VERBOSE)
                .short('v')
                .long(VERBOSE)
                .action(ArgAction::Count)
                .help("more diagnostics on stderr, repeat for more"),
        )
}

fn init_tracing(verbosity: u8) -> Result<(), Error> {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| Error::from(format!("failed to init tracing: {}", err)))
}

fn main() -> Result<(), Error> {
    let args = cli().get_matches();
    init_tracing(args.get_count(VERBOSE))?;

    let config_path = match args.get_one::<PathBuf>(CONFIG) {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    let options = Options {
        config_path,
        skip_elevation_check: args.get_flag(SKIP_ELEVATION_CHECK),
        strict: args.get_flag(STRICT),
    };
    let interactive = !args.get_flag(NO_PAUSE) && io::stdin().is_terminal();

    let runtime = runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    let platform: Arc<dyn Platform> = Arc::new(NativePlatform);
    let mut console = Console::stdio(interactive);

    // every handled outcome, including a refused start, exits with 0
    runtime.block_on(app::run(&options, platform, &mut console))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_flags() {
        let args = cli()
            .try_get_matches_from(["twinlaunch", "--config", "/etc/x.ini", "--strict", "-vv"])
            .expect("parse");

        assert_eq!(
            args.get_one::<PathBuf>(CONFIG),
            Some(&PathBuf::from("/etc/x.ini"))
        );
        assert!(args.get_flag(STRICT));
        assert!(!args.get_flag(NO_PAUSE));
        assert_eq!(args.get_count(VERBOSE), 2);
    }
}
