use std::path::Path;

use log::info;

use super::dedup::MergedTable;
use super::table::{format_time, DatasetTable, TIME_COLUMN};
use crate::error::OutlookError;

fn write_failure(path: &Path, err: csv::Error) -> OutlookError {
    let source = match err.into_kind() {
        csv::ErrorKind::Io(e) => e,
        other => std::io::Error::other(format!("{:?}", other)),
    };
    OutlookError::WriteFailure {
        path: path.to_path_buf(),
        source,
    }
}

/// Write the rows of one dataset as they were downloaded, with the `Time`
/// column as an ordinary column.
pub fn write_table(path: &Path, table: &DatasetTable) -> Result<(), OutlookError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| write_failure(path, e))?;
    wtr.write_record(&table.columns)
        .map_err(|e| write_failure(path, e))?;
    let width = table.columns.len();
    for row in &table.rows {
        let record = (0..width).map(|i| row.cells.get(i).cloned().flatten().unwrap_or_default());
        wtr.write_record(record).map_err(|e| write_failure(path, e))?;
    }
    wtr.flush().map_err(|source| OutlookError::WriteFailure {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Write the joined table with the `Time` index as the first column.
pub fn write_merged(path: &Path, table: &MergedTable) -> Result<(), OutlookError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| write_failure(path, e))?;
    let header = std::iter::once(TIME_COLUMN).chain(table.columns.iter().map(|c| c.as_str()));
    wtr.write_record(header).map_err(|e| write_failure(path, e))?;
    for row in &table.rows {
        let record = std::iter::once(format_time(&row.time))
            .chain(row.cells.iter().map(|c| c.clone().unwrap_or_default()));
        wtr.write_record(record).map_err(|e| write_failure(path, e))?;
    }
    wtr.flush().map_err(|source| OutlookError::WriteFailure {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}
