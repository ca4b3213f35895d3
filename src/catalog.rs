//! Event catalog file: each event takes two lines, the description and
//! then its ticket count.
//!
//! ```text
//! Rock concert
//! 120
//! Chess simul
//! 30
//! ```

use std::fmt;
use std::io;
use std::path::Path;

use crate::limits::{MAX_DESCRIPTION_LEN, MAX_EVENTS};
use crate::model::CatalogEntry;

#[derive(Debug)]
pub enum CatalogError {
    Io(io::Error),
    /// Line numbers are 1-based.
    EmptyDescription { line: usize },
    DescriptionTooLong { line: usize, len: usize },
    MissingTicketCount { line: usize },
    BadTicketCount { line: usize, value: String },
    TooManyEvents,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "cannot read catalog: {e}"),
            CatalogError::EmptyDescription { line } => {
                write!(f, "line {line}: event description is empty")
            }
            CatalogError::DescriptionTooLong { line, len } => write!(
                f,
                "line {line}: description is {len} bytes, at most {MAX_DESCRIPTION_LEN} allowed"
            ),
            CatalogError::MissingTicketCount { line } => {
                write!(f, "line {line}: event has no ticket count")
            }
            CatalogError::BadTicketCount { line, value } => {
                write!(f, "line {line}: ticket count {value:?} is not a number in [0, 65535]")
            }
            CatalogError::TooManyEvents => {
                write!(f, "catalog holds more than {MAX_EVENTS} events")
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CatalogError {
    fn from(e: io::Error) -> Self {
        CatalogError::Io(e)
    }
}

pub fn load(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let contents = std::fs::read_to_string(path)?;
    parse(&contents)
}

pub fn parse(contents: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    let mut entries = Vec::new();
    let mut lines = contents.lines().enumerate().map(|(i, l)| (i + 1, l));

    while let Some((line, description)) = lines.next() {
        if description.is_empty() {
            return Err(CatalogError::EmptyDescription { line });
        }
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(CatalogError::DescriptionTooLong {
                line,
                len: description.len(),
            });
        }
        let (count_line, count) = lines
            .next()
            .ok_or(CatalogError::MissingTicketCount { line })?;
        let tickets = count
            .trim()
            .parse::<u16>()
            .map_err(|_| CatalogError::BadTicketCount {
                line: count_line,
                value: count.to_string(),
            })?;
        if entries.len() == MAX_EVENTS {
            return Err(CatalogError::TooManyEvents);
        }
        entries.push(CatalogEntry::new(description, tickets));
    }
    Ok(entries)
}
