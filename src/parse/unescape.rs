use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnescapeError {
    #[error("unterminated {quote} quote at {index} in {string}")]
    UnterminatedQuote {
        quote: char,
        index: usize,
        string: String,
    },
    #[error("trailing escape at {index} in {string}")]
    TrailingEscape { index: usize, string: String },
}

/// Strips POSIX shell quoting from a single raw word.
///
/// Outside quotes a backslash escapes any character. Inside single quotes
/// nothing is special. Inside double quotes a backslash only escapes `$`,
/// `` ` ``, `"`, `\` and newline; before anything else it is kept literally.
pub fn unescape(s: &str) -> Result<String, UnescapeError> {
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut quote_start = 0;

    let mut chars = s.chars().enumerate();

    let mut res = String::with_capacity(s.len());

    while let Some((idx, c)) = chars.next() {
        if in_single_quote {
            if c == '\'' {
                in_single_quote = false;
                continue;
            }
        } else if in_double_quote {
            if c == '"' {
                in_double_quote = false;
                continue;
            }

            if c == '\\' {
                match chars.next() {
                    None => {
                        return Err(UnescapeError::TrailingEscape {
                            index: idx,
                            string: String::from(s),
                        });
                    }
                    Some((_, c2 @ ('$' | '`' | '"' | '\\'))) => {
                        res.push(c2);
                        continue;
                    }
                    // line continuation
                    Some((_, '\n')) => continue,
                    Some((_, c2)) => {
                        res.push(c);
                        res.push(c2);
                        continue;
                    }
                }
            }
        } else if c == '\'' {
            in_single_quote = true;
            quote_start = idx;
            continue;
        } else if c == '"' {
            in_double_quote = true;
            quote_start = idx;
            continue;
        } else if c == '\\' {
            match chars.next() {
                None => {
                    return Err(UnescapeError::TrailingEscape {
                        index: idx,
                        string: String::from(s),
                    });
                }
                Some((_, '\n')) => continue,
                Some((_, c2)) => {
                    res.push(c2);
                    continue;
                }
            }
        }

        res.push(c);
    }

    if in_single_quote || in_double_quote {
        return Err(UnescapeError::UnterminatedQuote {
            quote: if in_single_quote { '\'' } else { '"' },
            index: quote_start,
            string: String::from(s),
        });
    }

    Ok(res)
}
