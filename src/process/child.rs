use std::io;

use nix::{
    sys::signal::{kill, Signal},
    unistd::Pid,
};
use tokio::process::Child;

use super::status::StageStatus;

/// A child that owns the terminal until it exits.
pub struct ForegroundChild {
    pub command: String,
    pub child: Child,
}

impl ForegroundChild {
    pub fn new(command: String, child: Child) -> Self {
        Self { command, child }
    }

    pub async fn wait(&mut self) -> io::Result<StageStatus> {
        self.child.wait().await.map(Into::into)
    }

    pub async fn signal(&mut self, signal: Signal) -> io::Result<()> {
        let id = self.child.id().ok_or_else(|| {
            io::Error::new(io::ErrorKind::BrokenPipe, "Child exited unexpectedly")
        })? as i32;

        tokio::task::spawn_blocking(move || kill(Pid::from_raw(id), signal)).await??;

        Ok(())
    }

    /// Asks the child to stop and reaps it.
    pub async fn terminate(&mut self) -> io::Result<StageStatus> {
        if let Err(err) = self.signal(Signal::SIGTERM).await {
            warn!(command = %self.command, %err, "failed to signal child, killing it");
            self.child.start_kill()?;
        }

        self.wait().await
    }
}
