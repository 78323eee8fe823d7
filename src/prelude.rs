pub use std::io::Write;

pub use crate::{
    console::{print_error, print_marked},
    error::ShellError,
};
