use std::path::PathBuf;

use async_trait::async_trait;

use crate::{prelude::*, state::ShellState};

use super::{BuiltinCommand, BuiltinFlow};

#[derive(Debug, Default)]
pub struct Cd;

#[async_trait]
impl BuiltinCommand for Cd {
    fn names(&self) -> &'static [&'static str] {
        &["cd"]
    }

    async fn execute(
        &self,
        args: &[String],
        state: &mut ShellState,
    ) -> Result<BuiltinFlow, ShellError> {
        trace!("executing cd builtin: {args:?}");

        let target = match args.first() {
            Some(path) if path.is_empty() => return Err(cd_error("missing directory")),
            Some(path) => PathBuf::from(path),
            None => state
                .home_dir()
                .ok_or_else(|| cd_error("HOME not set"))?,
        };

        state.change_dir(&target)?;

        Ok(BuiltinFlow::Continue)
    }
}

fn cd_error(message: &str) -> ShellError {
    ShellError::Builtin {
        name: "cd",
        message: message.to_owned(),
    }
}
