//! Emission by re-reading the input file

use super::{emit_line, SelectionWriter};
use crate::error::{PruneError, Result};
use crate::selection::Retained;
use crate::table::{record_lines, LoadedTable};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

/// Streams the input a second time and copies retained lines verbatim
pub struct RereadWriter<W: Write> {
    path: PathBuf,
    out: W,
    append_score: bool,
}

impl<W: Write> RereadWriter<W> {
    pub fn new(path: impl Into<PathBuf>, out: W, append_score: bool) -> Self {
        Self {
            path: path.into(),
            out,
            append_score,
        }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SelectionWriter for RereadWriter<W> {
    fn write_selection(
        &mut self,
        table: &LoadedTable,
        scores: &[f64],
        retained: &Retained,
    ) -> Result<usize> {
        let reader = BufReader::new(File::open(&self.path)?);
        let total = table.store.len();
        let mut written = 0;

        for record in record_lines(reader) {
            if written == retained.count() {
                break;
            }
            let (id, line) = record?;
            if id as usize >= total {
                return Err(PruneError::InputChanged {
                    reason: format!("second pass found more than {total} records"),
                });
            }
            if !retained.contains(id) {
                continue;
            }
            let score = self.append_score.then(|| scores[id as usize]);
            emit_line(&mut self.out, &line, score)?;
            written += 1;
        }

        if written < retained.count() {
            return Err(PruneError::InputChanged {
                reason: format!(
                    "second pass ended after {written} of {} retained records",
                    retained.count()
                ),
            });
        }

        self.out.flush()?;
        Ok(written)
    }
}
