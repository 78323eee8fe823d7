use std::io::ErrorKind;

use color_eyre::Result;
use tokio::io::AsyncBufRead;

use crate::{
    cmd::{execute::PipelineExecutor, launch::INTERRUPT_MARKER},
    input::{InputMessage, LineReader},
    parse::parse_command,
    prelude::*,
    state::ShellState,
};

pub const FAREWELL: &str = "Goodbye!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplState {
    Running,
    Terminated,
}

pub struct Repl<R, W> {
    reader: LineReader<R>,
    out: W,
    state: ShellState,
    welcome: bool,
}

impl<R: AsyncBufRead + Unpin, W: Write> Repl<R, W> {
    pub fn new(reader: LineReader<R>, out: W, state: ShellState) -> Self {
        Self {
            reader,
            out,
            state,
            welcome: true,
        }
    }

    pub fn with_welcome(mut self, welcome: bool) -> Self {
        self.welcome = welcome;
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Reads and evaluates lines until the user exits or input ends. Errors
    /// from a single line are reported and never end the loop.
    pub async fn run(&mut self) -> Result<()> {
        if self.welcome {
            writeln!(self.out, "Welcome to lash v{}", env!("CARGO_PKG_VERSION"))?;
        }

        loop {
            match self.step().await {
                Ok(ReplState::Running) => {}
                Ok(ReplState::Terminated) => break,
                Err(err) => {
                    error!(?err, "unexpected error");
                    print_error(&mut self.out, format!("Unexpected error: {err}"))?;
                }
            }
        }

        writeln!(self.out, "{FAREWELL}")?;
        self.out.flush()?;

        Ok(())
    }

    pub async fn step(&mut self) -> Result<ReplState> {
        write!(self.out, "{}", self.state.prompt())?;
        self.out.flush()?;

        match self.reader.read_line().await {
            InputMessage::Line(line) => self.evaluate(&line).await,
            InputMessage::Interrupt => {
                print_error(&mut self.out, INTERRUPT_MARKER)?;
                Ok(ReplState::Running)
            }
            InputMessage::Eof => {
                writeln!(self.out)?;
                Ok(ReplState::Terminated)
            }
            InputMessage::Error(err) if err.kind() == ErrorKind::InvalidData => {
                print_error(&mut self.out, format!("Error: {err}"))?;
                Ok(ReplState::Running)
            }
            // nothing more can be read
            InputMessage::Error(err) => {
                print_error(&mut self.out, format!("Error: {err}"))?;
                Ok(ReplState::Terminated)
            }
        }
    }

    pub async fn evaluate(&mut self, line: &str) -> Result<ReplState> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ReplState::Running);
        }

        let pipeline = match parse_command(line) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                debug!(%err, line, "failed to parse line");
                print_error(&mut self.out, format!("Error: {err}"))?;
                return Ok(ReplState::Running);
            }
        };

        trace!(?pipeline, "execution plan");

        if pipeline.is_empty() {
            return Ok(ReplState::Running);
        }

        let keep_running = PipelineExecutor::new(&mut self.state, &mut self.out)
            .run(&pipeline)
            .await;

        Ok(if keep_running {
            ReplState::Running
        } else {
            ReplState::Terminated
        })
    }
}
