use std::path::PathBuf;

use logos::Logos;
use thiserror::Error;

use crate::cmd::pipeline::{OutputRedirect, Pipeline, StageSpec};

use self::{
    token::{LexerError, Redirect, Token},
    unescape::{unescape, UnescapeError},
};

pub mod token;
pub mod unescape;

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("failed to tokenize command at {position}: {source}")]
    Lexer {
        position: usize,
        #[source]
        source: LexerError,
    },
    #[error(transparent)]
    Unescape(#[from] UnescapeError),
    #[error("Missing {} file after '{}'", target_kind(.0), .0.operator())]
    MissingTarget(Redirect),
}

fn target_kind(redirect: &Redirect) -> &'static str {
    match redirect {
        Redirect::Read => "input",
        Redirect::Write | Redirect::Append => "output",
    }
}

pub fn parse_command(cmd: &str) -> Result<Pipeline, CommandParseError> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(cmd).spanned() {
        match token {
            Ok(token) => tokens.push(token),
            Err(source) => {
                return Err(CommandParseError::Lexer {
                    position: span.start,
                    source,
                })
            }
        }
    }

    let mut stages = Vec::new();

    for segment in tokens.split(|token| *token == Token::Pipe) {
        if let Some(stage) = parse_stage(segment)? {
            stages.push(stage);
        }
    }

    trace!(stages = stages.len(), "parsed pipeline");

    Ok(Pipeline::new(stages))
}

/// Returns `None` for a segment that has no arguments once redirections are
/// stripped.
fn parse_stage(segment: &[Token<'_>]) -> Result<Option<StageSpec>, CommandParseError> {
    let mut stage = StageSpec::new(Vec::<String>::new());
    let mut tokens = segment.iter();

    while let Some(token) = tokens.next() {
        let Token::Word(raw) = token else {
            continue;
        };

        let Some(redirect) = token.redirect() else {
            stage.args.push(unescape(raw)?);
            continue;
        };

        let target: PathBuf = match tokens.next() {
            Some(Token::Word(target)) => unescape(target)?.into(),
            _ => return Err(CommandParseError::MissingTarget(redirect)),
        };

        match redirect {
            Redirect::Read => stage.input_file = Some(target),
            Redirect::Write => stage.output = Some(OutputRedirect::Truncate(target)),
            Redirect::Append => stage.output = Some(OutputRedirect::Append(target)),
        }
    }

    if stage.args.is_empty() {
        Ok(None)
    } else {
        Ok(Some(stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(args: &[&str]) -> StageSpec {
        StageSpec::new(args.iter().copied())
    }

    #[test]
    fn single_command() {
        let plan = parse_command("ls -la /tmp").unwrap();
        assert_eq!(plan.stages(), &[stage(&["ls", "-la", "/tmp"])]);
    }

    #[test]
    fn pipeline_preserves_order() {
        let plan = parse_command("cat a.txt | grep foo | wc -l").unwrap();
        let programs = plan.stages().iter().map(|s| s.program()).collect::<Vec<_>>();
        assert_eq!(programs, ["cat", "grep", "wc"]);
    }

    #[test]
    fn redirections_are_stripped_from_args() {
        let plan = parse_command("sort < in.txt -r > out.txt").unwrap();
        let stage = &plan.stages()[0];
        assert_eq!(stage.args, ["sort", "-r"]);
        assert_eq!(stage.input_file, Some(PathBuf::from("in.txt")));
        assert_eq!(
            stage.output,
            Some(OutputRedirect::Truncate(PathBuf::from("out.txt")))
        );
    }

    #[test]
    fn later_output_redirect_wins() {
        let plan = parse_command("echo hi > a.txt >> b.txt").unwrap();
        assert_eq!(
            plan.stages()[0].output,
            Some(OutputRedirect::Append(PathBuf::from("b.txt")))
        );

        let plan = parse_command("echo hi >> a.txt > b.txt").unwrap();
        assert_eq!(
            plan.stages()[0].output,
            Some(OutputRedirect::Truncate(PathBuf::from("b.txt")))
        );
    }

    #[test]
    fn quoting_is_honored() {
        let plan = parse_command(r#"echo "a | b" 'c > d' e\ f"#).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.stages()[0].args, ["echo", "a | b", "c > d", "e f"]);
    }

    #[test]
    fn quoted_operator_is_an_argument() {
        let plan = parse_command("echo '>' \">>\"").unwrap();
        let stage = &plan.stages()[0];
        assert_eq!(stage.args, ["echo", ">", ">>"]);
        assert!(!stage.is_redirected());
    }

    #[test]
    fn dangling_redirect_is_an_error() {
        for (line, redirect) in [
            ("cat <", Redirect::Read),
            ("echo hi >", Redirect::Write),
            ("echo hi >>", Redirect::Append),
            ("echo hi > | cat", Redirect::Write),
        ] {
            match parse_command(line) {
                Err(CommandParseError::MissingTarget(r)) => assert_eq!(r, redirect, "{line}"),
                other => panic!("expected missing target for {line:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_target_messages() {
        let err = parse_command("cat <").unwrap_err();
        assert_eq!(err.to_string(), "Missing input file after '<'");
        let err = parse_command("cat >>").unwrap_err();
        assert_eq!(err.to_string(), "Missing output file after '>>'");
    }

    #[test]
    fn empty_segments_are_dropped() {
        let plan = parse_command("echo hi | | wc -l").unwrap();
        assert_eq!(plan.len(), 2);

        let plan = parse_command("> out.txt").unwrap();
        assert!(plan.is_empty());

        let plan = parse_command("   ").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn unbalanced_quote_is_an_error() {
        assert!(matches!(
            parse_command("echo 'nope"),
            Err(CommandParseError::Lexer { position: 5, .. })
        ));
    }
}
