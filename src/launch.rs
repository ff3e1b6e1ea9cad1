// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::platform::Platform;

/// A file to start and the argument string to hand it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchRequest {
    pub path: String,
    pub arguments: String,
}

impl LaunchRequest {
    pub fn new(path: &str, arguments: &str) -> Self {
        Self {
            path: path.to_string(),
            arguments: arguments.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchStatus {
    /// The OS accepted the spawn, nothing is known about the child beyond that
    Started { pid: Option<u32> },
    NotFound,
    SpawnFailed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub request: LaunchRequest,
    pub status: LaunchStatus,
}

impl LaunchOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self.status, LaunchStatus::Started { .. })
    }
}

async fn is_file(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }

    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Starts a single request, every failure is folded into the outcome
pub async fn launch<P: Platform + ?Sized>(platform: &P, request: LaunchRequest) -> LaunchOutcome {
    if !is_file(&request.path).await {
        warn!(path = %request.path, "launch path not found");
        return LaunchOutcome {
            request,
            status: LaunchStatus::NotFound,
        };
    }

    let status = match platform.spawn(&request).await {
        Ok(handle) => {
            info!(path = %request.path, pid = ?handle.pid, "started");
            LaunchStatus::Started { pid: handle.pid }
        }
        Err(err) => {
            warn!(path = %request.path, "spawn failed: {}", err);
            LaunchStatus::SpawnFailed(err.to_string())
        }
    };

    LaunchOutcome { request, status }
}

fn settle(joined: Result<LaunchOutcome, JoinError>, request: LaunchRequest) -> LaunchOutcome {
    joined.unwrap_or_else(|err| LaunchOutcome {
        request,
        status: LaunchStatus::SpawnFailed(format!("launch task failed: {}", err)),
    })
}

/// Runs every request on its own task and waits for all of them
///
/// Outcomes are returned in request order, regardless of which finished first.
pub async fn launch_all(
    platform: Arc<dyn Platform>,
    requests: Vec<LaunchRequest>,
) -> Vec<LaunchOutcome> {
    let tasks = requests.iter().cloned().map(|request| {
        let platform = Arc::clone(&platform);
        tokio::spawn(async move { launch(platform.as_ref(), request).await })
    });

    let joined = join_all(tasks).await;
    debug!(count = joined.len(), "all launch tasks joined");

    joined
        .into_iter()
        .zip(requests)
        .map(|(joined, request)| settle(joined, request))
        .collect()
}
