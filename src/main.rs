use std::io;

use color_eyre::Result;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::{config::Config, input::LineReader, repl::Repl, state::ShellState};

#[macro_use]
extern crate tracing;

pub mod builtins;
pub mod cmd;
pub mod config;
pub mod console;
pub mod error;
pub mod input;
pub mod parse;
pub mod prelude;
pub mod process;
pub mod repl;
pub mod state;

fn load_config() -> Config {
    let Some(path) = Config::default_path() else {
        return Config::default();
    };

    Config::load(&path).unwrap_or_else(|err| {
        eprintln!("lash: {err}; using defaults");
        Config::default()
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config();

    let appender = Builder::new()
        .rotation(Rotation::NEVER)
        .filename_prefix(&config.log_file)
        .build(&config.log_dir);

    let (writer, _guard) = match appender {
        Ok(appender) => tracing_appender::non_blocking(appender),
        Err(err) => {
            eprintln!("lash: logging disabled: {err}");
            tracing_appender::non_blocking(io::sink())
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .with(filter)
        .with(tracing_error::ErrorLayer::default())
        .init();

    color_eyre::install()?;

    trace!("installing interrupt handler");
    input::install_interrupt_handler()?;

    let mut repl = Repl::new(LineReader::stdin(), io::stdout(), ShellState::new())
        .with_welcome(config.welcome);

    // the exit status is always success once the loop has started
    if let Err(err) = repl.run().await {
        error!(?err, "failed to write to the terminal");
    }

    Ok(())
}
