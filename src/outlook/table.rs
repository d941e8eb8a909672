use jiff::civil::DateTime;

/// Name of the column holding the absolute timestamp of each row.
pub const TIME_COLUMN: &str = "Time";

pub fn format_time(time: &DateTime) -> String {
    time.strftime("%Y-%m-%d %H:%M:%S").to_string()
}

/// One row of a feed file.  The cells are aligned with the columns of the
/// table that owns the row, `None` when the file for that day didn't have
/// the column.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub time: DateTime,
    pub cells: Vec<Option<String>>,
}

/// Rows of one dataset in the order they were appended.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatasetTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl DatasetTable {
    pub fn new(columns: Vec<String>) -> DatasetTable {
        DatasetTable {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the `Time` column.
    pub fn time_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| c == TIME_COLUMN)
    }

    /// All the columns except `Time`.
    pub fn value_columns(&self) -> Vec<String> {
        let idx = self.time_index();
        self.columns
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != idx)
            .map(|(_, c)| c.clone())
            .collect()
    }

    /// The cells of a row except the `Time` one, in the same order as
    /// [`DatasetTable::value_columns`].
    pub fn values(&self, row: &Row) -> Vec<Option<String>> {
        let idx = self.time_index();
        (0..self.columns.len())
            .filter(|i| Some(*i) != idx)
            .map(|i| row.cells.get(i).cloned().flatten())
            .collect()
    }

    /// Add the rows of `other` at the end.  Columns are matched by name, a
    /// column not seen before is added at the end and is empty for the rows
    /// already in the table.
    pub fn append(&mut self, other: DatasetTable) {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return;
        }

        let mut positions: Vec<usize> = Vec::with_capacity(other.columns.len());
        for name in &other.columns {
            let existing = self
                .columns
                .iter()
                .enumerate()
                .position(|(i, c)| c == name && !positions.contains(&i));
            match existing {
                Some(i) => positions.push(i),
                None => {
                    self.columns.push(name.clone());
                    for row in self.rows.iter_mut() {
                        row.cells.push(None);
                    }
                    positions.push(self.columns.len() - 1);
                }
            }
        }

        let width = self.columns.len();
        for row in other.rows {
            let mut cells = vec![None; width];
            for (cell, &i) in row.cells.into_iter().zip(positions.iter()) {
                cells[i] = cell;
            }
            self.rows.push(Row {
                time: row.time,
                cells,
            });
        }
    }
}
