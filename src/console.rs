use std::{fmt::Display, io};

use termion::color;

use crate::prelude::*;

/// Writes `text` in the error color without adding a newline.
pub fn print_marked<W: Write + ?Sized>(out: &mut W, text: impl Display) -> io::Result<()> {
    write!(
        out,
        "{}{}{}",
        color::Fg(color::Red),
        text,
        color::Fg(color::Reset)
    )
}

/// Writes a one-line diagnostic in the error color.
pub fn print_error<W: Write + ?Sized>(out: &mut W, text: impl Display) -> io::Result<()> {
    print_marked(out, text)?;
    writeln!(out)?;
    out.flush()
}
