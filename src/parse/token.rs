use logos::{Lexer, Logos};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexerError {
    #[default]
    #[error("unbalanced quotes or trailing escape")]
    Unbalanced,
}

#[derive(Debug, PartialEq, Logos)]
#[logos(skip r"[ \t\r\n\f]+", error = LexerError)]
pub enum Token<'a> {
    #[token("|")]
    Pipe,

    // raw text, quotes and escapes included; see `Token::redirect`
    #[regex(r#"([^ \t\r\n\f|'"\\]|\\.|'[^']*'|"([^"\\]|\\.)*")+"#, word_callback)]
    Word(&'a str),
}

fn word_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> &'a str {
    lex.slice()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Read,
    Write,
    Append,
}

impl Redirect {
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Read => "<",
            Self::Write => ">",
            Self::Append => ">>",
        }
    }
}

impl<'a> Token<'a> {
    /// Only a bare, unquoted operator word counts as a redirection.
    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            Self::Word("<") => Some(Redirect::Read),
            Self::Word(">") => Some(Redirect::Write),
            Self::Word(">>") => Some(Redirect::Append),
            _ => None,
        }
    }
}
