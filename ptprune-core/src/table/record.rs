//! Phrase-table line format
//!
//! ```text
//! SOURCE ||| TARGET ||| p1 p2 .. pk [name=value ..] [||| EXTRA ..]
//! ```
//!
//! Bare numbers before the first named field are probability columns, the
//! first half backward `p(s|t)` and the second half forward `p(t|s)`. The
//! joint count is the named field `c=`.

use crate::error::LineError;
use smallvec::SmallVec;

/// Separator between the fields of a record
pub const FIELD_SEPARATOR: &str = " ||| ";

/// Name of the joint-count field
pub const JOINT_COUNT_FIELD: &str = "c";

/// State of the joint-count field on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountField {
    Present(u64),
    Missing,
    Malformed,
}

/// Numeric content of the values field
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFields {
    /// Probability columns; `None` marks a token that did not parse
    pub probs: SmallVec<[Option<f64>; 8]>,
    pub joint_count: CountField,
}

impl ValueFields {
    /// Parses the whitespace-separated values field
    pub fn parse(field: &str) -> Self {
        let mut probs = SmallVec::new();
        let mut joint_count = CountField::Missing;
        let mut named = false;

        for token in field.split_whitespace() {
            if let Some((name, value)) = token.split_once('=') {
                named = true;
                if name == JOINT_COUNT_FIELD {
                    joint_count = parse_count(value);
                }
            } else if !named {
                probs.push(token.parse::<f64>().ok());
            }
        }

        Self { probs, joint_count }
    }

    /// Number of malformed probability tokens
    pub fn malformed_probs(&self) -> usize {
        self.probs.iter().filter(|p| p.is_none()).count()
    }
}

/// Parses `c=` values; the first of a comma-separated list wins
fn parse_count(value: &str) -> CountField {
    let first = value.split(',').next().unwrap_or_default();
    if let Ok(count) = first.parse::<u64>() {
        return CountField::Present(count);
    }
    match first.parse::<f64>() {
        Ok(count) if count.is_finite() && count >= 0.0 => CountField::Present(count.round() as u64),
        _ => CountField::Malformed,
    }
}

/// A line split into its fields, borrowing from the line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine<'a> {
    /// Whole line without its terminator
    pub line: &'a str,
    pub source: &'a str,
    pub target: &'a str,
    /// Everything after the second separator, verbatim
    pub payload: &'a str,
    pub values: ValueFields,
    /// Last separated field when the record has more than three
    pub trailing: Option<&'a str>,
}

impl<'a> ParsedLine<'a> {
    /// Splits a line into fields
    pub fn parse(line: &'a str) -> Result<Self, LineError> {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return Err(LineError::Blank);
        }
        let mut fields = line.splitn(3, FIELD_SEPARATOR);
        let (Some(source), Some(target), Some(payload)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(LineError::MissingSeparator);
        };

        let source = source.trim();
        let target = target.trim();
        if source.is_empty() || target.is_empty() {
            return Err(LineError::EmptyPhrase);
        }

        let (values_field, trailing) = match payload.split_once(FIELD_SEPARATOR) {
            Some((values, rest)) => (
                values,
                Some(rest.rsplit(FIELD_SEPARATOR).next().unwrap_or(rest)),
            ),
            None => (payload, None),
        };

        Ok(Self {
            line,
            source,
            target,
            payload,
            values: ValueFields::parse(values_field),
            trailing,
        })
    }

    /// Reads the trailing field as a score
    pub fn trailing_score(&self) -> Option<Option<f64>> {
        self.trailing.map(|field| field.trim().parse::<f64>().ok())
    }
}

/// 0-based index of the first forward column among `k` columns
pub fn first_forward_column(k: usize) -> usize {
    if k <= 1 {
        0
    } else {
        k / 2
    }
}

/// Resolves a 1-based column request (`None` = first forward) to an index
pub fn resolve_column(requested: Option<usize>, k: usize) -> Option<usize> {
    let index = match requested {
        Some(column) => column.checked_sub(1)?,
        None if k == 0 => return None,
        None => first_forward_column(k),
    };
    (index < k).then_some(index)
}

/// 0-based `(backward, forward)` indices of a 1-based column pair
pub fn column_pair(pair: usize, k: usize) -> Option<(usize, usize)> {
    let half = k / 2;
    if pair == 0 || pair > half {
        return None;
    }
    Some((pair - 1, half + pair - 1))
}

/// Log-probability of a column value, falling back to `floor`
pub fn log_prob(value: Option<f64>, floor: f64) -> f64 {
    match value {
        Some(p) if p > 0.0 && p.is_finite() => p.ln(),
        _ => floor,
    }
}
