use std::process::Stdio;

use itertools::Itertools;
use tokio::{
    process::{ChildStdout, Command},
    select,
};

use super::{
    kind::{CommandKind, InteractiveCommand},
    pipeline::StageSpec,
};
use crate::{
    builtins::{BuiltinCommand, BuiltinCommands, BuiltinFlow},
    prelude::*,
    process::{child::ForegroundChild, read::StdinSource, write::StdoutSink, RunningProcess},
    state::ShellState,
};

pub const INTERRUPT_MARKER: &str = "^C";

/// Result of launching a single stage.
#[derive(Debug)]
pub enum Launch {
    /// Nothing left running; move on to the next stage.
    Continue,
    /// The user asked the shell to exit.
    Terminate,
    Spawned(RunningProcess),
    /// Already reported to the user.
    Failed(ShellError),
}

pub struct StageLauncher<'a, W: Write> {
    pub state: &'a mut ShellState,
    pub out: &'a mut W,
}

impl<'a, W: Write> StageLauncher<'a, W> {
    pub fn new(state: &'a mut ShellState, out: &'a mut W) -> Self {
        Self { state, out }
    }

    /// `upstream` is the read end of the previous spawned stage. It is only
    /// taken when this stage spawns an external process.
    pub async fn launch(
        &mut self,
        stage: &StageSpec,
        upstream: &mut Option<ChildStdout>,
        sink: StdoutSink,
    ) -> Result<Launch, ShellError> {
        if stage.is_empty() {
            trace!("skipping empty stage");
            return Ok(Launch::Continue);
        }

        match CommandKind::resolve(stage.program()) {
            CommandKind::Builtin(builtin) => self.run_builtin(builtin, stage).await,
            CommandKind::Interactive(interactive) => {
                self.run_interactive(interactive, stage, upstream.is_some())
                    .await
            }
            CommandKind::External => self.spawn_external(stage, upstream, sink).await,
        }
    }

    async fn run_builtin(
        &mut self,
        builtin: BuiltinCommands,
        stage: &StageSpec,
    ) -> Result<Launch, ShellError> {
        match builtin.execute(stage.arguments(), self.state).await {
            Ok(BuiltinFlow::Continue) => Ok(Launch::Continue),
            Ok(BuiltinFlow::Terminate) => Ok(Launch::Terminate),
            Err(err) => {
                warn!(%err, "builtin failed");
                print_error(self.out, &err)?;
                Ok(Launch::Continue)
            }
        }
    }

    async fn run_interactive(
        &mut self,
        interactive: InteractiveCommand,
        stage: &StageSpec,
        piped: bool,
    ) -> Result<Launch, ShellError> {
        if stage.is_redirected() || piped {
            debug!(command = interactive.name(), "rejected interactive command");
            print_error(
                self.out,
                "Interactive commands cannot use redirection or pipes",
            )?;
            return Ok(Launch::Continue);
        }

        self.run_foreground(stage.program(), stage.arguments()).await
    }

    /// Runs a program with the shell's own stdio and blocks until it exits.
    /// Failures are reported; the shell always continues.
    async fn run_foreground(
        &mut self,
        program: &str,
        args: &[String],
    ) -> Result<Launch, ShellError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        trace!("running interactive command: {:?}", cmd);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                let err = ShellError::spawn(program, err);
                self.report_spawn_error(&err)?;
                return Ok(Launch::Continue);
            }
        };

        let command_line = std::iter::once(program)
            .chain(args.iter().map(String::as_str))
            .join(" ");
        let mut child = ForegroundChild::new(command_line, child);

        // the terminal belongs to the child until it exits
        self.out.flush()?;

        let status = select! {
            status = child.wait() => status,
            _ = tokio::signal::ctrl_c() => {
                let status = child.terminate().await;
                print_error(self.out, INTERRUPT_MARKER)?;
                status
            }
        };

        match status {
            Ok(status) if status.success() => {}
            Ok(status) => print_error(
                self.out,
                format!("Error: {} exited with {status}", child.command),
            )?,
            Err(err) => print_error(self.out, format!("Error: {err}"))?,
        }

        Ok(Launch::Continue)
    }

    async fn spawn_external(
        &mut self,
        stage: &StageSpec,
        upstream: &mut Option<ChildStdout>,
        sink: StdoutSink,
    ) -> Result<Launch, ShellError> {
        let stdin = match upstream.take() {
            Some(pipe) => StdinSource::from(pipe),
            None => match &stage.input_file {
                Some(path) => StdinSource::File(path.clone()),
                None => StdinSource::Terminal,
            },
        };

        let sink = match &stage.output {
            Some(redirect) => StdoutSink::File(redirect.clone()),
            None => sink,
        };

        let mut cmd = Command::new(stage.program());
        cmd.args(stage.arguments());

        match open_stdio(stdin, sink).await {
            Ok((stdin, stdout)) => {
                cmd.stdin(stdin).stdout(stdout).stderr(Stdio::piped());
            }
            Err(err) => {
                self.report_spawn_error(&err)?;
                return Ok(Launch::Failed(err));
            }
        }

        trace!("spawning command: {:?}", cmd);

        // `cmd` holds the redirection files and the upstream pipe; they are
        // closed when it drops at the end of this call.
        match cmd.spawn() {
            Ok(child) => {
                debug!(command = %stage.command_line(), pid = ?child.id(), "spawned stage");
                Ok(Launch::Spawned(RunningProcess::new(
                    stage.command_line(),
                    child,
                )))
            }
            Err(err) => {
                let err = ShellError::spawn(stage.program(), err);
                self.report_spawn_error(&err)?;
                Ok(Launch::Failed(err))
            }
        }
    }

    fn report_spawn_error(&mut self, err: &ShellError) -> Result<(), ShellError> {
        warn!(%err, "failed to launch stage");
        if err.is_not_found() {
            print_error(self.out, err)?;
        } else {
            print_error(self.out, format!("Error: {err}"))?;
        }
        Ok(())
    }
}

async fn open_stdio(stdin: StdinSource, sink: StdoutSink) -> Result<(Stdio, Stdio), ShellError> {
    let stdin = stdin.into_stdio().await?;
    let stdout = sink.into_stdio().await?;
    Ok((stdin, stdout))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{cmd::pipeline::OutputRedirect, state::tests::lock_shell};

    fn output(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn exit_aliases_terminate() {
        let mut state = ShellState::new();
        for name in ["exit", "quit", "bye"] {
            let mut out = Vec::new();
            let mut launcher = StageLauncher::new(&mut state, &mut out);
            let launch = launcher
                .launch(&StageSpec::new([name]), &mut None, StdoutSink::Capture)
                .await
                .unwrap();
            assert!(matches!(launch, Launch::Terminate), "{name}");
        }
    }

    #[tokio::test]
    async fn interactive_with_redirect_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("file.txt");
        let mut stage = StageSpec::new(["vi"]);
        stage.output = Some(OutputRedirect::Truncate(target.clone()));

        let mut state = ShellState::new();
        let mut out = Vec::new();
        let launch = StageLauncher::new(&mut state, &mut out)
            .launch(&stage, &mut None, StdoutSink::Capture)
            .await
            .unwrap();

        assert!(matches!(launch, Launch::Continue));
        assert!(output(out).contains("Interactive commands cannot use redirection or pipes"));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn interactive_with_piped_input_is_rejected() {
        let mut producer = Command::new("echo")
            .arg("hi")
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        let mut upstream = producer.stdout.take();

        let mut state = ShellState::new();
        let mut out = Vec::new();
        let launch = StageLauncher::new(&mut state, &mut out)
            .launch(&StageSpec::new(["less"]), &mut upstream, StdoutSink::Capture)
            .await
            .unwrap();

        assert!(matches!(launch, Launch::Continue));
        assert!(upstream.is_some());
        assert!(output(out).contains("cannot use redirection or pipes"));
        producer.wait().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_command_fails() {
        let mut state = ShellState::new();
        let mut out = Vec::new();
        let launch = StageLauncher::new(&mut state, &mut out)
            .launch(
                &StageSpec::new(["definitely-not-a-real-command-1234"]),
                &mut None,
                StdoutSink::Capture,
            )
            .await
            .unwrap();

        assert!(matches!(launch, Launch::Failed(ShellError::CommandNotFound(_))));
        assert!(output(out).contains("definitely-not-a-real-command-1234: command not found"));
    }

    #[tokio::test]
    async fn missing_input_file_fails_without_spawning() {
        let mut stage = StageSpec::new(["cat"]);
        stage.input_file = Some(PathBuf::from("/does/not/exist.txt"));

        let mut state = ShellState::new();
        let mut out = Vec::new();
        let launch = StageLauncher::new(&mut state, &mut out)
            .launch(&stage, &mut None, StdoutSink::Capture)
            .await
            .unwrap();

        assert!(matches!(launch, Launch::Failed(ShellError::Redirect { .. })));
        assert!(output(out).contains("/does/not/exist.txt"));
    }

    #[tokio::test]
    async fn external_stage_is_spawned_and_collectable() {
        let mut state = ShellState::new();
        let mut out = Vec::new();
        let launch = StageLauncher::new(&mut state, &mut out)
            .launch(&StageSpec::new(["echo", "hi"]), &mut None, StdoutSink::Capture)
            .await
            .unwrap();

        let Launch::Spawned(process) = launch else {
            panic!("expected a spawned stage, got {launch:?}");
        };
        let report = process.collect().await.unwrap();
        assert!(report.status.success());
        assert_eq!(report.stdout, b"hi\n");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn append_redirect_appends() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("log.txt");
        std::fs::write(&target, "first\n").unwrap();

        let mut stage = StageSpec::new(["echo", "second"]);
        stage.output = Some(OutputRedirect::Append(target.clone()));

        let mut state = ShellState::new();
        let mut out = Vec::new();
        let launch = StageLauncher::new(&mut state, &mut out)
            .launch(&stage, &mut None, StdoutSink::Capture)
            .await
            .unwrap();

        let Launch::Spawned(process) = launch else {
            panic!("expected a spawned stage, got {launch:?}");
        };
        assert!(process.stdout.is_none());
        process.collect().await.unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "first\nsecond\n");
    }

    #[tokio::test]
    async fn empty_stage_is_skipped() {
        let mut state = ShellState::new();
        let mut out = Vec::new();
        let launch = StageLauncher::new(&mut state, &mut out)
            .launch(&StageSpec::new(Vec::<String>::new()), &mut None, StdoutSink::Capture)
            .await
            .unwrap();

        assert!(matches!(launch, Launch::Continue));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn interactive_nonzero_exit_is_reported() {
        // the run listens for ctrl-c while the child is in the foreground
        let _guard = lock_shell().await;
        let stage = StageSpec::new(["python3", "-c", "import sys; sys.exit(3)"]);

        let mut state = ShellState::new();
        let mut out = Vec::new();
        let launch = StageLauncher::new(&mut state, &mut out)
            .launch(&stage, &mut None, StdoutSink::Capture)
            .await
            .unwrap();

        assert!(matches!(launch, Launch::Continue));
        assert!(output(out).contains("exited with status 3"));
    }

    #[tokio::test]
    async fn missing_foreground_program_is_reported() {
        let mut state = ShellState::new();
        let mut out = Vec::new();
        let launch = StageLauncher::new(&mut state, &mut out)
            .run_foreground("definitely-not-a-real-interactive-1234", &[])
            .await
            .unwrap();

        assert!(matches!(launch, Launch::Continue));
        assert!(output(out).contains("definitely-not-a-real-interactive-1234: command not found"));
    }
}
