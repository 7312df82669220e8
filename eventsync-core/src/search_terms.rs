//! Loading search criteria from the search-terms CSV file.
//!
//! ```text
//! calendar,title,location,category,tags
//! Fitness,yoga,,,
//! Music,,Savannah Center,,'live, concert'
//! ```

use std::fs::File;
use std::io;
use std::path::Path;

use crate::criteria::SearchCriterion;
use crate::error::{SyncError, SyncResult};

/// Columns that must be present in the header row.
pub const REQUIRED_COLUMNS: [&str; 5] = ["calendar", "title", "location", "category", "tags"];

/// Load and parse the search-terms file at `path`.
pub fn load(path: &Path) -> SyncResult<Vec<SearchCriterion>> {
    let file = File::open(path).map_err(|e| {
        SyncError::SearchTerms(format!("Could not open {}: {e}", path.display()))
    })?;

    parse(file)
}

/// Parse search terms from any reader.
pub fn parse<R: io::Read>(reader: R) -> SyncResult<Vec<SearchCriterion>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| SyncError::SearchTerms(format!("Could not read header row: {e}")))?
        .clone();

    let position = |name: &str| headers.iter().position(|h| h == name);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| position(*name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(SyncError::SearchTerms(format!(
            "Search terms file must contain {} columns (missing: {})",
            REQUIRED_COLUMNS.join(", "),
            missing.join(", ")
        )));
    }

    // Presence checked above.
    let columns: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .filter_map(|name| position(*name))
        .collect();

    let mut criteria = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| {
            SyncError::SearchTerms(format!("Malformed row {}: {e}", line + 2))
        })?;
        let field = |i: usize| record.get(columns[i]).unwrap_or_default().trim().to_string();

        criteria.push(SearchCriterion {
            calendar: field(0),
            title: field(1),
            location: field(2),
            category: field(3),
            tags: parse_tags(&field(4)),
        });
    }

    if criteria.is_empty() {
        return Err(SyncError::SearchTerms("No search terms found".to_string()));
    }

    Ok(criteria)
}

/// Split a tag cell such as `'live, concert'` into trimmed, non-empty tags.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(raw);

    inner
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
