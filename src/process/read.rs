use std::{path::PathBuf, process::Stdio};

use tokio::process::ChildStdout;

use crate::prelude::*;

/// Where a stage reads its input from.
#[derive(Debug)]
pub enum StdinSource {
    Terminal,
    Pipe(ChildStdout),
    File(PathBuf),
}

impl From<ChildStdout> for StdinSource {
    fn from(value: ChildStdout) -> Self {
        Self::Pipe(value)
    }
}

impl StdinSource {
    pub async fn into_stdio(self) -> Result<Stdio, ShellError> {
        match self {
            Self::Terminal => Ok(Stdio::inherit()),
            Self::Pipe(stdout) => stdout.try_into().map_err(ShellError::Io),
            Self::File(path) => {
                trace!(?path, "opening input redirection");
                let file = tokio::fs::File::open(&path)
                    .await
                    .map_err(|source| ShellError::Redirect { path, source })?;
                Ok(file.into_std().await.into())
            }
        }
    }
}
