use async_trait::async_trait;

use crate::{prelude::*, state::ShellState};

use super::{BuiltinCommand, BuiltinFlow};

#[derive(Debug, Default)]
pub struct Exit;

#[async_trait]
impl BuiltinCommand for Exit {
    fn names(&self) -> &'static [&'static str] {
        &["exit", "quit", "bye"]
    }

    async fn execute(
        &self,
        _args: &[String],
        _state: &mut ShellState,
    ) -> Result<BuiltinFlow, ShellError> {
        trace!("exit requested");
        Ok(BuiltinFlow::Terminate)
    }
}
