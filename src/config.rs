// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Section/key/value configuration in the classic INI layout
//!
//! ```text
//! [Paths]
//! DbAccessPath=C:\apps\db-access.exe
//! AppServerPath=C:\apps\app-server.exe
//!
//! [Arguments]
//! Args=--flag
//! ```

use std::borrow::Cow;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str;

use encoding_rs::{Encoding, WINDOWS_1252};
use tracing::debug;

use crate::error::ErrorKind;
use crate::launch::LaunchRequest;
use crate::Error;

pub const CONFIG_FILE_NAME: &str = "config.ini";

pub const PATHS_SECTION: &str = "Paths";
pub const DB_ACCESS_PATH_KEY: &str = "DbAccessPath";
pub const APP_SERVER_PATH_KEY: &str = "AppServerPath";
pub const ARGUMENTS_SECTION: &str = "Arguments";
pub const ARGS_KEY: &str = "Args";

/// `config.ini` in the current working directory
pub fn default_config_path() -> io::Result<PathBuf> {
    Ok(env::current_dir()?.join(CONFIG_FILE_NAME))
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Line {
    Entry { key: String, value: String },
    Other(String),
}

#[derive(Clone, Debug)]
struct Section {
    name: String,
    lines: Vec<Line>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: Vec::new(),
        }
    }

    fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut String> {
        self.lines.iter_mut().find_map(|line| match line {
            Line::Entry { key: k, value } if k.eq_ignore_ascii_case(key) => Some(value),
            _ => None,
        })
    }

    fn entry(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            Line::Entry { key: k, value } if k.eq_ignore_ascii_case(key) => Some(value.as_str()),
            _ => None,
        })
    }
}

/// An INI document, optionally bound to the file it was loaded from
///
/// Lookups are ASCII case-insensitive for both sections and keys, and the first match wins.
///   Comments and unrecognized lines are kept so that `save` rewrites the file without losing them.
#[derive(Clone, Debug, Default)]
pub struct IniFile {
    path: Option<PathBuf>,
    preamble: Vec<String>,
    sections: Vec<Section>,
}

impl IniFile {
    /// Loads the file at `path`, failing with `ConfigNotFound` if there is no such file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ErrorKind::ConfigNotFound(path.to_path_buf()).into());
        }

        let bytes = fs::read(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::from(ErrorKind::ConfigNotFound(path.to_path_buf())),
            _ => Error::from(err),
        })?;

        let mut ini = Self::parse(&decode(&bytes));
        ini.path = Some(path.to_path_buf());

        debug!(
            path = %path.display(),
            sections = ini.sections.len(),
            "loaded configuration"
        );
        Ok(ini)
    }

    /// Parses INI text, ignoring anything that is not a section header or a `key=value` pair
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut ini = Self::default();

        for raw in text.lines() {
            let trimmed = raw.trim();

            if trimmed.starts_with('[') {
                if let Some(end) = trimmed.find(']') {
                    ini.sections.push(Section::new(trimmed[1..end].trim()));
                    continue;
                }
            }

            let line = match trimmed.split_once('=') {
                Some((key, value))
                    if !trimmed.starts_with(';')
                        && !trimmed.starts_with('#')
                        && !key.trim().is_empty() =>
                {
                    Line::Entry {
                        key: key.trim().to_string(),
                        value: value.trim().to_string(),
                    }
                }
                _ => Line::Other(raw.to_string()),
            };

            match ini.sections.last_mut() {
                Some(section) => section.lines.push(line),
                // entries before the first section are not addressable
                None => ini.preamble.push(raw.to_string()),
            }
        }

        ini
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the value for `key` in `section`, or an empty string if either is absent
    pub fn read(&self, section: &str, key: &str) -> String {
        self.section(section)
            .and_then(|s| s.entry(key))
            .map(unquote)
            .unwrap_or_default()
            .to_string()
    }

    /// Sets `key` in `section`, creating the section when needed
    pub fn write(&mut self, section: &str, key: &str, value: &str) {
        let section = match self.sections.iter().position(|s| s.is_named(section)) {
            Some(idx) => &mut self.sections[idx],
            None => {
                self.sections.push(Section::new(section));
                let last = self.sections.len() - 1;
                &mut self.sections[last]
            }
        };

        if let Some(existing) = section.entry_mut(key) {
            *existing = value.to_string();
            return;
        }

        // keep new keys next to the existing ones rather than after trailing comments
        let insert_at = section
            .lines
            .iter()
            .rposition(|line| matches!(line, Line::Entry { .. }))
            .map_or(0, |idx| idx + 1);
        section.lines.insert(
            insert_at,
            Line::Entry {
                key: key.to_string(),
                value: value.to_string(),
            },
        );
    }

    pub fn delete_key(&mut self, section: &str, key: &str) {
        if let Some(section) = self.sections.iter_mut().find(|s| s.is_named(section)) {
            section.lines.retain(
                |line| !matches!(line, Line::Entry { key: k, .. } if k.eq_ignore_ascii_case(key)),
            );
        }
    }

    pub fn delete_section(&mut self, section: &str) {
        if let Some(idx) = self.sections.iter().position(|s| s.is_named(section)) {
            self.sections.remove(idx);
        }
    }

    /// True only when the key is present with a non-empty value
    pub fn key_exists(&self, section: &str, key: &str) -> bool {
        !self.read(section, key).is_empty()
    }

    /// Writes the document back to the file it was opened from
    pub fn save(&self) -> Result<(), Error> {
        let path = self
            .path
            .as_deref()
            .ok_or("configuration is not bound to a file")?;

        fs::write(path, self.render())?;
        debug!(path = %path.display(), "saved configuration");
        Ok(())
    }

    /// Binds the document to `path` and writes it there
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        self.path = Some(path.as_ref().to_path_buf());
        self.save()
    }

    fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.is_named(name))
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.preamble {
            out.push_str(line);
            out.push('\n');
        }

        for section in &self.sections {
            out.push('[');
            out.push_str(&section.name);
            out.push_str("]\n");

            for line in &section.lines {
                match line {
                    Line::Entry { key, value } => {
                        out.push_str(key);
                        out.push('=');
                        out.push_str(value);
                    }
                    Line::Other(raw) => out.push_str(raw),
                }
                out.push('\n');
            }
        }

        out
    }
}

/// UTF-8 or UTF-16 when a BOM says so, otherwise UTF-8 with a Windows-1252 fallback
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return encoding.decode_without_bom_handling(&bytes[bom_len..]).0;
    }

    match str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("configuration is not UTF-8, reading it as Windows-1252");
            WINDOWS_1252.decode_without_bom_handling(bytes).0
        }
    }
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(b'"'), Some(b'"')) | (Some(b'\''), Some(b'\'')) if value.len() >= 2 => {
            &value[1..value.len() - 1]
        }
        _ => value,
    }
}

/// The three values the launcher needs, read as opaque strings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    pub db_access_path: String,
    pub app_server_path: String,
    pub arguments: String,
}

impl LaunchConfig {
    /// Missing keys come back as empty strings, nothing is validated here
    pub fn from_ini(ini: &IniFile) -> Self {
        Self {
            db_access_path: ini.read(PATHS_SECTION, DB_ACCESS_PATH_KEY),
            app_server_path: ini.read(PATHS_SECTION, APP_SERVER_PATH_KEY),
            arguments: ini.read(ARGUMENTS_SECTION, ARGS_KEY),
        }
    }

    /// Rejects empty launch paths, the arguments may legitimately be empty
    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            (DB_ACCESS_PATH_KEY, &self.db_access_path),
            (APP_SERVER_PATH_KEY, &self.app_server_path),
        ];

        for (key, value) in required {
            if value.is_empty() {
                return Err(ErrorKind::MissingKey {
                    section: PATHS_SECTION.to_string(),
                    key: key.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Both launch requests, sharing the same argument string
    pub fn requests(&self) -> [LaunchRequest; 2] {
        [
            LaunchRequest::new(&self.db_access_path, &self.arguments),
            LaunchRequest::new(&self.app_server_path, &self.arguments),
        ]
    }
}
