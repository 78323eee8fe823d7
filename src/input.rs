use std::io;

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin},
    select,
    signal::unix::{signal, SignalKind},
};

#[derive(Debug)]
pub enum InputMessage {
    Line(String),
    Interrupt,
    Eof,
    Error(io::Error),
}

/// Installs the process-wide SIGINT handler so Ctrl-C no longer kills the
/// shell. Listeners created afterwards only see signals delivered after them.
pub fn install_interrupt_handler() -> io::Result<()> {
    signal(SignalKind::interrupt()).map(drop)
}

pub struct LineReader<R> {
    lines: Lines<R>,
}

impl LineReader<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Waits for the next line. `next_line` is cancel safe, so an interrupt
    /// leaves any partial read buffered for the next call.
    pub async fn read_line(&mut self) -> InputMessage {
        select! {
            line = self.lines.next_line() => match line {
                Ok(Some(line)) => InputMessage::Line(line),
                Ok(None) => InputMessage::Eof,
                Err(err) => InputMessage::Error(err),
            },
            _ = tokio::signal::ctrl_c() => InputMessage::Interrupt,
        }
    }
}
