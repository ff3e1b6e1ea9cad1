// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use nix::unistd::geteuid;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::SpawnError;
use crate::launch::LaunchRequest;
use crate::platform::LaunchHandle;

pub(crate) fn is_elevated() -> bool {
    geteuid().is_root()
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// A bare file name would be looked up on `PATH`, pin it to the working directory instead
fn pinned(path: &Path) -> PathBuf {
    if path.components().count() == 1 && path.is_relative() {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}

fn direct_command(path: &Path, arguments: &str) -> Result<Command, SpawnError> {
    let args = shlex::split(arguments)
        .ok_or_else(|| SpawnError::Os(format!("could not split arguments: {}", arguments)))?;

    let mut command = Command::new(pinned(path));
    command.args(args);
    Ok(command)
}

fn handler_command(path: &Path, arguments: &str) -> Result<Command, SpawnError> {
    if !arguments.trim().is_empty() {
        warn!(
            path = %path.display(),
            "default handler launches do not receive arguments, ignoring: {}", arguments
        );
    }

    open::commands(path)
        .into_iter()
        .next()
        .map(Command::from)
        .ok_or_else(|| SpawnError::NoHandler(path.to_path_buf()))
}

pub(crate) fn spawn(request: &LaunchRequest) -> Result<LaunchHandle, SpawnError> {
    let path = Path::new(&request.path);

    let mut command = if is_executable(path) {
        debug!(path = %path.display(), "executing directly");
        direct_command(path, &request.arguments)?
    } else {
        debug!(path = %path.display(), "opening with the default handler");
        handler_command(path, &request.arguments)?
    };

    // the launcher may still want the terminal for acknowledgements
    command.stdin(Stdio::null());

    let child = command.spawn()?;
    Ok(LaunchHandle { pid: child.id() })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn script(dir: &Path, name: &str, body: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).expect("chmod");
        path
    }

    #[test]
    fn test_executable_bit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = script(dir.path(), "run.sh", "#!/bin/sh\nexit 0\n", 0o755);
        let doc = script(dir.path(), "notes.txt", "hello", 0o644);

        assert!(is_executable(&exe));
        assert!(!is_executable(&doc));
        assert!(!is_executable(dir.path()));
    }

    #[test]
    fn test_pinned_bare_name() {
        assert_eq!(pinned(Path::new("app")), Path::new("./app"));
        assert_eq!(pinned(Path::new("/usr/bin/app")), Path::new("/usr/bin/app"));
        assert_eq!(pinned(Path::new("bin/app")), Path::new("bin/app"));
    }

    #[test]
    fn test_unbalanced_arguments() {
        let err = direct_command(Path::new("/bin/true"), "--name \"unterminated").unwrap_err();
        assert!(matches!(err, SpawnError::Os(_)));
    }

    #[tokio::test]
    async fn test_spawn_executable() {
        // outlives the test, the child is never waited on
        let request = LaunchRequest::new("/bin/sh", "-c 'exit 0' 'two words'");
        let handle = spawn(&request).expect("spawn failed");
        assert!(handle.pid.is_some());
    }

    #[tokio::test]
    async fn test_spawn_missing_interpreter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = script(
            dir.path(),
            "broken.sh",
            "#!/nonexistent/interpreter\n",
            0o755,
        );

        let request = LaunchRequest::new(&exe.to_string_lossy(), "");
        assert!(matches!(spawn(&request), Err(SpawnError::Io(_))));
    }
}
