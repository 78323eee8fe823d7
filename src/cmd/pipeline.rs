use std::path::{Path, PathBuf};

use itertools::Itertools;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputRedirect {
    Truncate(PathBuf),
    Append(PathBuf),
}

impl OutputRedirect {
    pub fn path(&self) -> &Path {
        match self {
            Self::Truncate(path) | Self::Append(path) => path,
        }
    }
}

/// One link of a pipeline: a command, its arguments and its own redirections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    pub args: Vec<String>,
    pub input_file: Option<PathBuf>,
    pub output: Option<OutputRedirect>,
}

impl StageSpec {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            input_file: None,
            output: None,
        }
    }

    /// Empty for a stage without args; the parser never produces one.
    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }

    pub fn arguments(&self) -> &[String] {
        self.args.get(1..).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn is_redirected(&self) -> bool {
        self.input_file.is_some() || self.output.is_some()
    }

    pub fn command_line(&self) -> String {
        self.args.iter().join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<StageSpec>,
}

impl Pipeline {
    pub fn new(stages: Vec<StageSpec>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl From<Vec<StageSpec>> for Pipeline {
    fn from(stages: Vec<StageSpec>) -> Self {
        Self::new(stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stage_has_no_program() {
        let stage = StageSpec::new(Vec::<String>::new());
        assert!(stage.is_empty());
        assert_eq!(stage.program(), "");
        assert!(stage.arguments().is_empty());
    }

    #[test]
    fn program_and_arguments_split() {
        let stage = StageSpec::new(["grep", "-n", "foo"]);
        assert_eq!(stage.program(), "grep");
        assert_eq!(stage.arguments(), ["-n", "foo"]);
        assert_eq!(stage.command_line(), "grep -n foo");
    }
}
