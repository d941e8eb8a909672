use std::collections::{BTreeMap, HashSet};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use jiff::civil::DateTime;
use log::info;
use tabled::builder::Builder;
use tabled::settings::Style;

use super::feed::Dataset;
use super::table::{format_time, DatasetTable, Row, TIME_COLUMN};
use crate::error::OutlookError;

/// A table after removing the rows with a repeated timestamp.
#[derive(Debug, PartialEq)]
pub struct Deduplicated {
    pub table: DatasetTable,
    /// The rows removed, in the order they were appended.
    pub duplicates: Vec<Row>,
}

/// Keep the first row for each timestamp.  Consecutive daily files can
/// overlap, e.g. the 00:00 interval of the next day.
pub fn dedup(table: DatasetTable) -> Deduplicated {
    let mut seen: HashSet<DateTime> = HashSet::with_capacity(table.len());
    let mut rows: Vec<Row> = Vec::with_capacity(table.len());
    let mut duplicates: Vec<Row> = Vec::new();
    for row in table.rows {
        if seen.insert(row.time) {
            rows.push(row);
        } else {
            duplicates.push(row);
        }
    }
    Deduplicated {
        table: DatasetTable {
            columns: table.columns,
            rows,
        },
        duplicates,
    }
}

/// Text files, one per dataset, where removed rows are appended.
#[derive(Clone, Debug)]
pub struct DuplicateLog {
    pub dir: PathBuf,
}

impl DuplicateLog {
    pub fn new<P: AsRef<Path>>(dir: P) -> DuplicateLog {
        DuplicateLog {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, dataset: Dataset) -> PathBuf {
        self.dir.join(dataset.error_log_filename())
    }

    /// Append the removed rows to the log of this dataset.  Nothing is
    /// written if there are no duplicates.
    pub fn record(
        &self,
        dataset: Dataset,
        columns: &[String],
        duplicates: &[Row],
    ) -> Result<(), OutlookError> {
        if duplicates.is_empty() {
            return Ok(());
        }
        let path = self.path(dataset);
        let text = render_rows(columns, duplicates);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "{}", text))
            .map_err(|source| OutlookError::WriteFailure {
                path: path.clone(),
                source,
            })?;
        info!(
            "Removed {} {} rows with duplicate time values, see {}",
            duplicates.len(),
            dataset,
            path.display()
        );
        println!(
            "Duplicate time values found in the {} data\nSee error log for removed observations details.\nFirst values kept.",
            dataset
        );
        Ok(())
    }
}

/// Fixed width text of the rows with the timestamp first.
fn render_rows(columns: &[String], rows: &[Row]) -> String {
    let time_idx = columns.iter().position(|c| c == TIME_COLUMN);
    let keep = |i: &usize| Some(*i) != time_idx;

    let mut builder = Builder::default();
    let mut header = vec![TIME_COLUMN.to_string()];
    header.extend(
        columns
            .iter()
            .enumerate()
            .filter(|(i, _)| keep(i))
            .map(|(_, c)| c.clone()),
    );
    builder.push_record(header);
    for row in rows {
        let mut record = vec![format_time(&row.time)];
        record.extend((0..columns.len()).filter(keep).map(|i| {
            row.cells
                .get(i)
                .cloned()
                .flatten()
                .unwrap_or_else(|| "NaN".to_string())
        }));
        builder.push_record(record);
    }
    let mut table = builder.build();
    table.with(Style::blank());
    table.to_string()
}

#[derive(Clone, Debug, PartialEq)]
pub struct MergedRow {
    pub time: DateTime,
    pub cells: Vec<Option<String>>,
}

/// Demand and supply side by side, indexed by timestamp.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergedTable {
    /// Value columns, demand ones first.  The `Time` index is not included.
    pub columns: Vec<String>,
    /// Sorted by time, one row per timestamp.
    pub rows: Vec<MergedRow>,
}

impl MergedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The value cells of one table for a timestamp, `None` if the table has no
/// row at that time.
type Side = Option<Vec<Option<String>>>;

/// Outer join of two deduplicated tables on their timestamps.  A timestamp
/// missing from one side gets empty cells for that side's columns.
pub fn join(demand: &DatasetTable, supply: &DatasetTable) -> MergedTable {
    let left_columns = demand.value_columns();
    let right_columns = supply.value_columns();

    let mut index: BTreeMap<DateTime, (Side, Side)> = BTreeMap::new();
    for row in &demand.rows {
        index.entry(row.time).or_default().0.get_or_insert_with(|| demand.values(row));
    }
    for row in &supply.rows {
        index.entry(row.time).or_default().1.get_or_insert_with(|| supply.values(row));
    }

    let rows = index
        .into_iter()
        .map(|(time, (left, right))| {
            let mut cells = left.unwrap_or_else(|| vec![None; left_columns.len()]);
            cells.extend(right.unwrap_or_else(|| vec![None; right_columns.len()]));
            MergedRow { time, cells }
        })
        .collect();

    let mut columns = left_columns;
    columns.extend(right_columns);
    MergedTable { columns, rows }
}

/// Deduplicate both datasets, log what was removed, and join them.
pub fn dedup_and_join(
    demand: DatasetTable,
    supply: DatasetTable,
    log: &DuplicateLog,
) -> Result<MergedTable, OutlookError> {
    let demand = dedup(demand);
    log.record(Dataset::Demand, &demand.table.columns, &demand.duplicates)?;
    let supply = dedup(supply);
    log.record(Dataset::Supply, &supply.table.columns, &supply.duplicates)?;

    let merged = join(&demand.table, &supply.table);
    info!(
        "Joined {} demand rows and {} supply rows into {} rows",
        demand.table.len(),
        supply.table.len(),
        merged.len()
    );
    Ok(merged)
}
