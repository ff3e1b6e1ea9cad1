// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! User facing status lines, green for information and red for errors

use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

use colored::Colorize;
use tracing::debug;

use crate::launch::{LaunchOutcome, LaunchStatus};

pub struct Console<W, R> {
    out: W,
    input: R,
    interactive: bool,
}

impl Console<Stdout, StdinLock<'static>> {
    pub fn stdio(interactive: bool) -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(io::stdout(), stdin.lock(), interactive)
    }
}

impl<W: Write, R: BufRead> Console<W, R> {
    /// `interactive` decides if `pause` actually waits for the user
    pub fn new(out: W, input: R, interactive: bool) -> Self {
        Self {
            out,
            input,
            interactive,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn info(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "{}", msg.green())?;
        self.out.flush()
    }

    pub fn error(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "{}", msg.red())?;
        self.out.flush()
    }

    /// Waits for one line of input, a no-op unless interactive
    ///
    /// End of input counts as an acknowledgement, the line content is never interpreted.
    pub fn pause(&mut self) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }

        let mut line = Vec::new();
        let read = self.input.read_until(b'\n', &mut line)?;
        debug!(bytes = read, "acknowledged");
        Ok(())
    }

    pub fn outcome(&mut self, outcome: &LaunchOutcome) -> io::Result<()> {
        let path = &outcome.request.path;
        match &outcome.status {
            LaunchStatus::Started { .. } => {
                self.info(&format!("application {} was started successfully", path))
            }
            LaunchStatus::NotFound => {
                self.error(&format!("application path was not found: {}", path))
            }
            LaunchStatus::SpawnFailed(msg) => {
                self.error(&format!("failed to start application {}: {}", path, msg))
            }
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_parts(self) -> (W, R) {
        (self.out, self.input)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::launch::LaunchRequest;

    fn text(console: &Console<Vec<u8>, Cursor<&[u8]>>) -> String {
        String::from_utf8_lossy(console.output()).into_owned()
    }

    #[test]
    fn test_outcome_lines() {
        let mut console = Console::new(Vec::new(), Cursor::new(&b""[..]), false);

        let request = LaunchRequest::new("C:\\a.exe", "");
        for status in [
            LaunchStatus::Started { pid: None },
            LaunchStatus::NotFound,
            LaunchStatus::SpawnFailed("denied".to_string()),
        ] {
            let outcome = LaunchOutcome {
                request: request.clone(),
                status,
            };
            console.outcome(&outcome).expect("write");
        }

        let text = text(&console);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("C:\\a.exe was started successfully"));
        assert!(lines[1].contains("not found: C:\\a.exe"));
        assert!(lines[2].contains("C:\\a.exe: denied"));
    }

    #[test]
    fn test_pause_consumes_one_line() {
        let mut console = Console::new(Vec::new(), Cursor::new(&b"first\nsecond\n"[..]), true);
        console.pause().expect("pause");

        let mut rest = String::new();
        console.input.read_line(&mut rest).expect("read");
        assert_eq!(rest, "second\n");
    }

    #[test]
    fn test_pause_accepts_invalid_utf8() {
        let mut console = Console::new(Vec::new(), Cursor::new(&b"\xff\xfe\nnext\n"[..]), true);
        console.pause().expect("pause");

        let mut rest = String::new();
        console.input.read_line(&mut rest).expect("read");
        assert_eq!(rest, "next\n");
    }

    #[test]
    fn test_pause_at_eof_and_non_interactive() {
        let mut console = Console::new(Vec::new(), Cursor::new(&b""[..]), true);
        console.pause().expect("eof pause");

        let mut console = Console::new(Vec::new(), Cursor::new(&b"keep\n"[..]), false);
        assert!(!console.is_interactive());
        console.pause().expect("pause");

        let mut rest = String::new();
        console.input.read_line(&mut rest).expect("read");
        assert_eq!(rest, "keep\n");
    }
}
