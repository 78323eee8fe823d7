use std::{io, path::PathBuf};

use thiserror::Error;

use crate::parse::CommandParseError;

pub type ParseError = CommandParseError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{0}: command not found")]
    CommandNotFound(String),
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{path}: {source}")]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    Runtime(String),
    #[error("{name}: {message}")]
    Builtin { name: &'static str, message: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    pub fn spawn(command: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::CommandNotFound(command.to_owned())
        } else {
            Self::Spawn {
                command: command.to_owned(),
                source,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CommandNotFound(_))
    }
}
