use std::fs;
use std::io::Read;
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;

use crate::channel::{Channel, Table};
use crate::{AssayError, Result};

/// Read an assay table from a CSV file
///
/// See [`read_csv`] for the expected layout.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid assay table.
pub fn from_file<E: Copy + DeserializeOwned>(filepath: &Path) -> Result<Table<E>> {
    debug!("reading assay table {filepath:?}");
    let file = fs::read(filepath)?;
    read_csv(&file[..])
}

/// Read an assay table from CSV
///
/// The header row names the channels. Each following row holds one replicate per channel, so
/// each column becomes a [`Channel`] in header order. Empty cells are missing readings and rows
/// may be shorter than the header when columns hold different numbers of replicates.
///
/// # Errors
/// Returns an error if a cell is not a number, if a row carries values beyond the last named
/// column, or if two columns share a name.
pub fn read_csv<E: Copy + DeserializeOwned, R: Read>(reader: R) -> Result<Table<E>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let names = rdr
        .headers()?
        .iter()
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>();
    let mut columns: Vec<Vec<Option<E>>> = vec![vec![]; names.len()];

    for (record, result) in rdr.deserialize().enumerate() {
        let row: Vec<Option<E>> = result?;
        // trailing empty cells past the header are tolerated, values there would be lost
        if row.iter().skip(names.len()).any(Option::is_some) {
            return Err(AssayError::RaggedRecord {
                record: record + 1,
                cells: row.len(),
                columns: names.len(),
            });
        }
        for (ii, column) in columns.iter_mut().enumerate() {
            column.push(row.get(ii).copied().flatten());
        }
    }

    Table::new(
        names
            .into_iter()
            .zip(columns)
            .map(|(name, readings)| Channel::new(name, readings))
            .collect(),
    )
}
