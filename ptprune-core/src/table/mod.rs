//! In-memory phrase table: interning, records, index and loading

pub mod index;
pub mod loader;
pub mod record;
pub mod store;
pub mod vocab;

pub use index::{IndexView, PairId, PhraseIndex, PhraseLookup};
pub use loader::{record_lines, LoadStats, LoadedTable, TableLoader, WarningLimiter};
pub use record::{ParsedLine, FIELD_SEPARATOR};
pub use store::{Marginals, PhraseInfo, PhraseStore};
pub use vocab::{PhraseId, PhraseInterner, TokenId, Vocab};
