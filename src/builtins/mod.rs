use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use strum::{EnumIter, IntoEnumIterator};

use crate::{prelude::*, state::ShellState};

pub mod cd;
pub mod exit;

/// What the shell should do once a built-in has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFlow {
    Continue,
    Terminate,
}

#[async_trait]
#[enum_dispatch(BuiltinCommands)]
pub trait BuiltinCommand {
    fn names(&self) -> &'static [&'static str];
    async fn execute(&self, args: &[String], state: &mut ShellState)
        -> Result<BuiltinFlow, ShellError>;
}

#[enum_dispatch]
#[derive(Debug, EnumIter)]
pub enum BuiltinCommands {
    Cd(cd::Cd),
    Exit(exit::Exit),
}

impl BuiltinCommands {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|cmd| cmd.names().contains(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_any_alias() {
        for name in ["exit", "quit", "bye"] {
            assert!(matches!(
                BuiltinCommands::from_name(name),
                Some(BuiltinCommands::Exit(_))
            ));
        }
        assert!(matches!(
            BuiltinCommands::from_name("cd"),
            Some(BuiltinCommands::Cd(_))
        ));
        assert!(BuiltinCommands::from_name("pwd").is_none());
        assert!(BuiltinCommands::from_name("EXIT").is_none());
    }
}
