// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Operating system capabilities needed by the launcher

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod win;

use async_trait::async_trait;

use crate::error::SpawnError;
use crate::launch::LaunchRequest;

/// What is known about a process once the OS accepted it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaunchHandle {
    /// Not every launch reports one, e.g. a file handed to an already running handler
    pub pid: Option<u32>,
}

/// The privileged check and the spawn, abstracted per target OS
///
/// `spawn` only has to get the request accepted by the OS, the child is never waited on.
#[async_trait]
pub trait Platform: Send + Sync + 'static {
    /// True if the current process runs with administrative rights, false if that can't be confirmed
    fn is_elevated(&self) -> bool;

    async fn spawn(&self, request: &LaunchRequest) -> Result<LaunchHandle, SpawnError>;
}

/// The platform this binary was built for
///
/// * unix - elevated means an effective uid of 0. Executable files are run directly with the
///   arguments split by shell rules, anything else goes to the desktop default handler.
/// * windows - `IsUserAnAdmin` and `ShellExecuteExW`
#[derive(Clone, Copy, Debug, Default)]
pub struct NativePlatform;

#[cfg(unix)]
#[async_trait]
impl Platform for NativePlatform {
    fn is_elevated(&self) -> bool {
        unix::is_elevated()
    }

    async fn spawn(&self, request: &LaunchRequest) -> Result<LaunchHandle, SpawnError> {
        unix::spawn(request)
    }
}

#[cfg(windows)]
#[async_trait]
impl Platform for NativePlatform {
    fn is_elevated(&self) -> bool {
        win::is_elevated()
    }

    async fn spawn(&self, request: &LaunchRequest) -> Result<LaunchHandle, SpawnError> {
        // ShellExecuteExW may block on the shell, keep it off the async workers
        let request = request.clone();
        tokio::task::spawn_blocking(move || win::spawn(&request))
            .await
            .map_err(|err| SpawnError::Os(err.to_string()))?
    }
}
