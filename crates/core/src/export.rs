//! CSV export of a user's collection.

use std::cmp::Ordering;
use std::io::Write;

use chrono::NaiveDate;
use thiserror::Error;

use crate::catalog::compare_card_numbers;
use crate::ownership::CollectionEntry;

pub const CSV_HEADER: [&str; 12] = [
    "Card Name",
    "Card Number",
    "Rarity",
    "Type",
    "Set Name",
    "Set Code",
    "Release Date",
    "Language",
    "Era",
    "Quantity",
    "Acquired Date",
    "Notes",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// `binder_collection_YYYYMMDD.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("binder_collection_{}.csv", date.format("%Y%m%d"))
}

/// Oldest set first (undated sets last), then set name, then card number.
fn export_order(a: &CollectionEntry, b: &CollectionEntry) -> Ordering {
    let by_date = match (a.set.release_date, b.set.release_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date
        .then_with(|| a.set.name.cmp(&b.set.name))
        .then_with(|| compare_card_numbers(&a.card.number, &b.card.number))
}

pub fn write_collection_csv<W: Write>(
    entries: &[CollectionEntry],
    writer: W,
) -> Result<(), ExportError> {
    let mut sorted: Vec<&CollectionEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| export_order(a, b));

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for entry in sorted {
        let release = entry
            .set
            .release_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let acquired = entry
            .record
            .acquired_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        csv.write_record([
            entry.card.name.as_str(),
            entry.card.number.as_str(),
            entry.card.rarity.as_str(),
            entry.card.card_type.as_deref().unwrap_or(""),
            entry.set.name.as_str(),
            entry.set.code.as_str(),
            release.as_str(),
            entry.set.language.as_str(),
            entry.set.era.as_str(),
            entry.record.quantity.to_string().as_str(),
            acquired.as_str(),
            entry.record.notes.as_deref().unwrap_or(""),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// The whole export as bytes, ready to serve.
pub fn collection_csv(entries: &[CollectionEntry]) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    write_collection_csv(entries, &mut buffer)?;
    Ok(buffer)
}
