use std::io;

use tokio::{
    io::AsyncReadExt,
    process::{Child, ChildStdout},
    task::JoinHandle,
};

use self::status::StageStatus;

pub mod child;
pub mod read;
pub mod status;
pub mod write;

/// An external stage that has been spawned and not yet reaped.
#[derive(Debug)]
pub struct RunningProcess {
    pub command: String,
    pub child: Child,
    /// Read end of the stage's stdout, when it is a pipe.
    pub stdout: Option<ChildStdout>,
}

#[derive(Debug)]
pub struct StageReport {
    pub command: String,
    pub status: StageStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RunningProcess {
    pub fn new(command: String, mut child: Child) -> Self {
        let stdout = child.stdout.take();
        Self {
            command,
            child,
            stdout,
        }
    }

    /// Waits for the stage and collects whatever is left of its stdout and all
    /// of its stderr.
    pub async fn collect(mut self) -> io::Result<StageReport> {
        self.child.stdout = self.stdout.take();

        let output = self.child.wait_with_output().await?;

        Ok(StageReport {
            command: self.command,
            status: output.status.into(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Hands the stage to a background task that drains its stderr and waits
    /// for it. The stdout read end, if still held, is closed first.
    pub fn detach(mut self) -> JoinHandle<io::Result<StageReport>> {
        drop(self.stdout.take());

        tokio::task::spawn(async move {
            let mut stderr = Vec::new();
            if let Some(mut pipe) = self.child.stderr.take() {
                pipe.read_to_end(&mut stderr).await?;
            }

            // nobody may be left to print it
            if !stderr.is_empty() {
                debug!(
                    command = %self.command,
                    stderr = %String::from_utf8_lossy(&stderr),
                    "detached stage wrote to stderr"
                );
            }

            let status: StageStatus = self.child.wait().await?.into();

            if status.failure() {
                debug!(command = %self.command, %status, "detached stage failed");
            } else {
                trace!(command = %self.command, %status, "detached stage finished");
            }

            Ok(StageReport {
                command: self.command,
                status,
                stdout: Vec::new(),
                stderr,
            })
        })
    }
}
