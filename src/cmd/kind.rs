use std::str::FromStr;

use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::builtins::BuiltinCommands;

/// Programs that need the terminal to themselves and so cannot be piped or
/// redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum InteractiveCommand {
    Vi,
    Vim,
    Ps,
    Top,
    Less,
    Nano,
    More,
    Python,
    Python3,
}

impl InteractiveCommand {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// How a stage's program is handled, decided before anything is opened or
/// spawned.
#[derive(Debug)]
pub enum CommandKind {
    Builtin(BuiltinCommands),
    Interactive(InteractiveCommand),
    External,
}

impl CommandKind {
    pub fn resolve(program: &str) -> Self {
        if let Some(builtin) = BuiltinCommands::from_name(program) {
            Self::Builtin(builtin)
        } else if let Ok(interactive) = InteractiveCommand::from_str(program) {
            Self::Interactive(interactive)
        } else {
            Self::External
        }
    }
}
