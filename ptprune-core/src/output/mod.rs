//! Writing the retained records
//!
//! Both strategies consume the same [`Retained`] mask and differ only in
//! where the record text comes from and in which order it is emitted.

use crate::error::Result;
use crate::selection::Retained;
use crate::table::{LoadedTable, FIELD_SEPARATOR};
use std::io::Write;

pub mod in_memory;
pub mod reread;

pub use in_memory::InMemoryWriter;
pub use reread::RereadWriter;

/// Output strategy for a finished selection
pub trait SelectionWriter {
    /// Emits every retained record and returns the number of lines written
    fn write_selection(
        &mut self,
        table: &LoadedTable,
        scores: &[f64],
        retained: &Retained,
    ) -> Result<usize>;
}

/// Writes one record line, optionally followed by its score
fn emit_line<W: Write>(out: &mut W, record: &str, score: Option<f64>) -> Result<()> {
    out.write_all(record.as_bytes())?;
    if let Some(score) = score {
        write!(out, "{FIELD_SEPARATOR}{score}")?;
    }
    out.write_all(b"\n")?;
    Ok(())
}
