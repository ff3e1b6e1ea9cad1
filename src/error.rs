// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("missing value for [{section}] {key}")]
    MissingKey { section: String, key: String },
    #[error("an error occured: {0}")]
    ErrorMsg(String),
    #[error("an error occured: {0}")]
    ErrorStr(&'static str),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    fn from_kind(kind: ErrorKind) -> Self {
        Self(kind)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }
}

impl<E> From<E> for Error
where
    E: Into<ErrorKind>,
{
    fn from(err: E) -> Self {
        Self::from_kind(err.into())
    }
}

impl From<&'static str> for Error {
    fn from(err: &'static str) -> Self {
        Self::from_kind(ErrorKind::ErrorStr(err))
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Self::from_kind(ErrorKind::ErrorMsg(err))
    }
}

/// Failure to hand a file over to the operating system
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Os(String),
    #[error("no handler available to open {}", .0.display())]
    NoHandler(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_preserved() {
        let err = Error::from(ErrorKind::ConfigNotFound(PathBuf::from("/tmp/config.ini")));
        assert!(matches!(err.kind(), ErrorKind::ConfigNotFound(_)));
        assert!(err.to_string().contains("/tmp/config.ini"));
    }

    #[test]
    fn test_from_strings() {
        assert!(matches!(Error::from("boom").kind(), ErrorKind::ErrorStr("boom")));
        assert!(matches!(
            Error::from(String::from("bang")).kind(),
            ErrorKind::ErrorMsg(_)
        ));
    }
}
