//! Emission from the in-memory store

use super::{emit_line, SelectionWriter};
use crate::error::{PruneError, Result};
use crate::selection::Retained;
use crate::table::LoadedTable;
use std::io::Write;

/// Emits retained input lines from the store, grouped by source phrase
pub struct InMemoryWriter<W: Write> {
    out: W,
    append_score: bool,
}

impl<W: Write> InMemoryWriter<W> {
    pub fn new(out: W, append_score: bool) -> Self {
        Self { out, append_score }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SelectionWriter for InMemoryWriter<W> {
    fn write_selection(
        &mut self,
        table: &LoadedTable,
        scores: &[f64],
        retained: &Retained,
    ) -> Result<usize> {
        let index = table
            .index
            .as_ref()
            .ok_or_else(|| PruneError::config("in-memory output needs the phrase index"))?;

        let mut written = 0;
        for id in index.native_order() {
            if written == retained.count() {
                break;
            }
            if !retained.contains(id) {
                continue;
            }

            let line = table.store.get(id).line.as_deref().ok_or_else(|| {
                PruneError::config("input lines were not kept for in-memory output")
            })?;
            let score = self.append_score.then(|| scores[id as usize]);
            emit_line(&mut self.out, line, score)?;
            written += 1;
        }

        self.out.flush()?;
        Ok(written)
    }
}
