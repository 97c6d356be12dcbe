//! Input resolution

use crate::error::CliError;
use anyhow::Result;
use ptprune_core::Input;
use std::io;
use std::path::Path;

/// Path argument meaning standard input
pub const STDIN_PATH: &str = "-";

/// Turns the optional input argument into a core [`Input`]
///
/// A missing argument or `-` reads standard input.
pub fn resolve_input(path: Option<&Path>) -> Result<Input> {
    match path {
        None => Ok(Input::from_reader(io::stdin())),
        Some(path) if path == Path::new(STDIN_PATH) => Ok(Input::from_reader(io::stdin())),
        Some(path) => {
            if !path.is_file() {
                return Err(CliError::FileNotFound(path.display().to_string()).into());
            }
            Ok(Input::from_file(path))
        }
    }
}
