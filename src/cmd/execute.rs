use tokio::{process::ChildStdout, task::JoinHandle};

use super::{
    launch::{Launch, StageLauncher},
    pipeline::Pipeline,
};
use crate::{
    prelude::*,
    process::{write::StdoutSink, RunningProcess, StageReport},
    state::ShellState,
};

#[derive(Debug)]
pub enum PipelineOutcome {
    /// Every stage launched. Holds the terminal stage's report followed by any
    /// intermediate stage that had already exited by then.
    Completed { reports: Vec<StageReport> },
    /// A stage asked the shell to exit.
    Terminated,
    /// Stage `stage` could not be started. The shell keeps running.
    SpawnFailed { stage: usize, error: ShellError },
}

impl PipelineOutcome {
    pub fn keep_running(&self) -> bool {
        !matches!(self, Self::Terminated)
    }
}

pub struct PipelineExecutor<'a, W: Write> {
    state: &'a mut ShellState,
    out: &'a mut W,
}

impl<'a, W: Write> PipelineExecutor<'a, W> {
    pub fn new(state: &'a mut ShellState, out: &'a mut W) -> Self {
        Self { state, out }
    }

    /// Runs the pipeline and reports anything that went wrong. Returns `false`
    /// only when the shell should exit.
    pub async fn run(&mut self, pipeline: &Pipeline) -> bool {
        match self.execute(pipeline).await {
            Ok(outcome) => outcome.keep_running(),
            Err(err) => {
                warn!(%err, "pipeline failed");
                if let Err(err) = print_error(self.out, format!("Error: {err}")) {
                    error!(%err, "failed to report pipeline error");
                }
                true
            }
        }
    }

    pub async fn execute(&mut self, pipeline: &Pipeline) -> Result<PipelineOutcome, ShellError> {
        let mut running: Vec<RunningProcess> = Vec::new();
        let mut upstream: Option<ChildStdout> = None;
        let last = pipeline.len().saturating_sub(1);

        for (index, stage) in pipeline.stages().iter().enumerate() {
            let sink = if index == last {
                StdoutSink::Capture
            } else {
                StdoutSink::Pipe
            };

            let launch = StageLauncher::new(&mut *self.state, &mut *self.out)
                .launch(stage, &mut upstream, sink)
                .await?;

            match launch {
                Launch::Continue => {}
                Launch::Terminate => {
                    debug!(stage = index, "pipeline terminated the shell");
                    return Ok(PipelineOutcome::Terminated);
                }
                Launch::Spawned(mut process) => {
                    if index != last {
                        upstream = process.stdout.take();
                    }
                    running.push(process);
                }
                Launch::Failed(error) => {
                    // unblock the previous stage if nothing will read its output
                    drop(upstream.take());
                    for process in running {
                        process.detach();
                    }
                    return Ok(PipelineOutcome::SpawnFailed {
                        stage: index,
                        error,
                    });
                }
            }
        }

        let Some(mut terminal) = running.pop() else {
            return Ok(PipelineOutcome::Completed {
                reports: Vec::new(),
            });
        };

        // a trailing builtin never consumed the last spawned stage's output
        if let Some(stdout) = upstream.take() {
            terminal.stdout = Some(stdout);
        }

        let reapers: Vec<JoinHandle<std::io::Result<StageReport>>> =
            running.into_iter().map(RunningProcess::detach).collect();

        let command = terminal.command.clone();
        let terminal = terminal
            .collect()
            .await
            .map_err(|err| ShellError::Runtime(format!("{command}: {err}")))?;
        debug!(command = %terminal.command, status = %terminal.status, "terminal stage finished");

        // let reapers whose stage already exited record their result
        tokio::task::yield_now().await;

        let mut finished = Vec::new();
        for reaper in reapers {
            if !reaper.is_finished() {
                continue;
            }
            match reaper.await {
                Ok(Ok(report)) => finished.push(report),
                Ok(Err(err)) => warn!(%err, "failed to reap stage"),
                Err(err) => warn!(%err, "reaper task failed"),
            }
        }

        for report in &finished {
            if !report.stderr.is_empty() {
                print_marked(self.out, String::from_utf8_lossy(&report.stderr))?;
            }
        }

        self.out.write_all(&terminal.stdout)?;
        if !terminal.stderr.is_empty() {
            print_marked(self.out, String::from_utf8_lossy(&terminal.stderr))?;
        }
        self.out.flush()?;

        let mut reports = vec![terminal];
        reports.extend(finished);

        Ok(PipelineOutcome::Completed { reports })
    }
}
