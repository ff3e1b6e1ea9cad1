// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The launcher from start to finish
//!
//! Stages run strictly in order and never go back:
//!  - StartupCheck, stop unless elevated
//!  - ConfigLoad, stop if there is no config file
//!  - ConfigRead, the two paths and the shared arguments
//!  - ConcurrentLaunch, one task per path
//!  - Join, wait for both and report

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{IniFile, LaunchConfig, CONFIG_FILE_NAME};
use crate::console::Console;
use crate::error::ErrorKind;
use crate::launch::{launch_all, LaunchOutcome};
use crate::platform::Platform;
use crate::Error;

pub const NOT_ELEVATED_MSG: &str =
    "this program must be run with administrative privileges to work correctly";
pub const ELEVATED_MSG: &str = "running with administrative privileges";
pub const COMPLETED_MSG: &str = "all applications have been started";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    StartupCheck,
    ConfigLoad,
    ConfigRead,
    ConcurrentLaunch,
    Join,
}

#[derive(Clone, Debug)]
pub struct Options {
    pub config_path: PathBuf,
    /// Treat the elevation check as passed
    pub skip_elevation_check: bool,
    /// Refuse to launch when a path is missing from the config
    pub strict: bool,
}

/// How far a run got
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunReport {
    NotElevated,
    ConfigMissing(PathBuf),
    /// Outcomes in config order, first `DbAccessPath` then `AppServerPath`
    Completed(Vec<LaunchOutcome>),
}

fn enter(stage: Stage) {
    debug!(?stage, "entering stage");
}

pub async fn run<W, R>(
    options: &Options,
    platform: Arc<dyn Platform>,
    console: &mut Console<W, R>,
) -> Result<RunReport, Error>
where
    W: Write,
    R: BufRead,
{
    enter(Stage::StartupCheck);
    if options.skip_elevation_check {
        warn!("elevation check skipped");
    } else if !platform.is_elevated() {
        console.error(NOT_ELEVATED_MSG)?;
        console.pause()?;
        return Ok(RunReport::NotElevated);
    } else {
        console.info(ELEVATED_MSG)?;
    }

    enter(Stage::ConfigLoad);
    let ini = match IniFile::open(&options.config_path) {
        Ok(ini) => ini,
        Err(err) => {
            if let ErrorKind::ConfigNotFound(path) = err.kind() {
                console.error(&format!(
                    "the configuration file '{}' was not found: {}",
                    CONFIG_FILE_NAME,
                    path.display()
                ))?;
                return Ok(RunReport::ConfigMissing(path.clone()));
            }
            return Err(err);
        }
    };

    enter(Stage::ConfigRead);
    let config = LaunchConfig::from_ini(&ini);
    if options.strict {
        config.validate()?;
    }
    info!(
        db_access = %config.db_access_path,
        app_server = %config.app_server_path,
        "launching"
    );

    enter(Stage::ConcurrentLaunch);
    let outcomes = launch_all(platform, Vec::from(config.requests())).await;

    enter(Stage::Join);
    for outcome in &outcomes {
        console.outcome(outcome)?;
        console.pause()?;
    }
    console.info(COMPLETED_MSG)?;

    Ok(RunReport::Completed(outcomes))
}
