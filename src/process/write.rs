use std::process::Stdio;

use tokio::fs::OpenOptions;

use crate::{cmd::pipeline::OutputRedirect, prelude::*};

/// Where a stage writes its standard output.
#[derive(Debug)]
pub enum StdoutSink {
    /// Feeds the next stage.
    Pipe,
    /// Collected by the executor once the stage exits.
    Capture,
    File(OutputRedirect),
}

impl StdoutSink {
    pub async fn into_stdio(self) -> Result<Stdio, ShellError> {
        match self {
            Self::Pipe | Self::Capture => Ok(Stdio::piped()),
            Self::File(redirect) => {
                trace!(?redirect, "opening output redirection");
                let mut options = OpenOptions::new();
                match &redirect {
                    OutputRedirect::Truncate(_) => options.write(true).create(true).truncate(true),
                    OutputRedirect::Append(_) => options.append(true).create(true),
                };

                let file = options
                    .open(redirect.path())
                    .await
                    .map_err(|source| ShellError::Redirect {
                        path: redirect.path().to_owned(),
                        source,
                    })?;

                Ok(file.into_std().await.into())
            }
        }
    }
}
