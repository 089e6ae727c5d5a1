use super::KEY_COLUMN;

// ---------------------------------------------------------------------------
// ComposedTable – one key column plus one value column per experiment
// ---------------------------------------------------------------------------

/// A dependent-variable column of a composed table.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueColumn {
    /// Positional label, `Exp_<index>`.
    pub label: String,
    pub values: Vec<f64>,
}

/// The wide table produced by joining every record of a store on the key.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedTable {
    keys: Vec<f64>,
    columns: Vec<ValueColumn>,
}

impl ComposedTable {
    pub fn new(keys: Vec<f64>, columns: Vec<(String, Vec<f64>)>) -> Self {
        let columns = columns
            .into_iter()
            .map(|(label, values)| {
                debug_assert_eq!(values.len(), keys.len());
                ValueColumn { label, values }
            })
            .collect();
        Self { keys, columns }
    }

    /// Label used for the value column of the record at `index`.
    pub fn label_for(index: usize) -> String {
        format!("Exp_{index}")
    }

    pub fn key_name(&self) -> &str {
        KEY_COLUMN
    }

    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    pub fn columns(&self) -> &[ValueColumn] {
        &self.columns
    }

    pub fn column(&self, label: &str) -> Option<&ValueColumn> {
        self.columns.iter().find(|c| c.label == label)
    }

    /// All column names, key first.
    pub fn column_names(&self) -> Vec<&str> {
        std::iter::once(self.key_name())
            .chain(self.columns.iter().map(|c| c.label.as_str()))
            .collect()
    }

    /// Values of every experiment at `row`, in column order.
    pub fn row_values(&self, row: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c.values[row]).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of value columns (excludes the key).
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

// ---------------------------------------------------------------------------
// StatsTable – per-row aggregates
// ---------------------------------------------------------------------------

/// One row of a [`StatsTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsRow {
    pub key: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

/// Column-oriented `[Wavelength, min, max, mean, std]` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsTable {
    pub keys: Vec<f64>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl StatsTable {
    pub const COLUMNS: [&'static str; 5] = [KEY_COLUMN, "min", "max", "mean", "std"];

    pub fn with_capacity(rows: usize) -> Self {
        Self {
            keys: Vec::with_capacity(rows),
            min: Vec::with_capacity(rows),
            max: Vec::with_capacity(rows),
            mean: Vec::with_capacity(rows),
            std: Vec::with_capacity(rows),
        }
    }

    pub fn push(&mut self, row: StatsRow) {
        self.keys.push(row.key);
        self.min.push(row.min);
        self.max.push(row.max);
        self.mean.push(row.mean);
        self.std.push(row.std);
    }

    pub fn row(&self, i: usize) -> Option<StatsRow> {
        Some(StatsRow {
            key: *self.keys.get(i)?,
            min: self.min[i],
            max: self.max[i],
            mean: self.mean[i],
            std: self.std[i],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = StatsRow> + '_ {
        (0..self.len()).filter_map(|i| self.row(i))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
