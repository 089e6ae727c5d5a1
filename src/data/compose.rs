use std::collections::HashMap;

use super::error::{Result, SpectError};
use super::record::Record;
use super::table::ComposedTable;

// ---------------------------------------------------------------------------
// Join key
// ---------------------------------------------------------------------------

/// Hashable form of a wavelength. `-0.0` joins with `0.0` and every NaN
/// joins with every other NaN.
fn key_bits(key: f64) -> u64 {
    if key.is_nan() {
        f64::NAN.to_bits()
    } else if key == 0.0 {
        0.0f64.to_bits()
    } else {
        key.to_bits()
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Join `records` on the wavelength column into one wide table.
///
/// Record 0 seeds the accumulator; every following record is inner-joined
/// onto it, so only wavelengths present in all records survive. Rows keep
/// the accumulator's order and a key repeated on both sides yields one row
/// per matching pair. Value columns are labelled `Exp_<position>`.
///
/// An empty intersection is a valid 0-row table.
pub fn compose(records: &[&Record]) -> Result<ComposedTable> {
    let Some((first, rest)) = records.split_first() else {
        return Err(SpectError::EmptyStore);
    };

    let seed = first.data().ok_or(SpectError::NotLoaded { index: 0 })?;
    let mut keys = seed.keys.clone();
    let mut columns: Vec<Vec<f64>> = vec![seed.values.clone()];

    for (offset, record) in rest.iter().enumerate() {
        let index = offset + 1;
        let data = record.data().ok_or(SpectError::NotLoaded { index })?;

        let mut lookup: HashMap<u64, Vec<usize>> = HashMap::with_capacity(data.keys.len());
        for (row, &key) in data.keys.iter().enumerate() {
            lookup.entry(key_bits(key)).or_default().push(row);
        }

        let mut next_keys = Vec::with_capacity(keys.len());
        let mut next_columns: Vec<Vec<f64>> = vec![Vec::with_capacity(keys.len()); columns.len() + 1];

        for (acc_row, &key) in keys.iter().enumerate() {
            let Some(matches) = lookup.get(&key_bits(key)) else {
                continue;
            };
            for &rec_row in matches {
                next_keys.push(key);
                for (col, out) in columns.iter().zip(next_columns.iter_mut()) {
                    out.push(col[acc_row]);
                }
                if let Some(out) = next_columns.last_mut() {
                    out.push(data.values[rec_row]);
                }
            }
        }

        keys = next_keys;
        columns = next_columns;
    }

    if keys.is_empty() {
        log::warn!(
            "Composing {} experiments left no common wavelengths",
            records.len()
        );
    }

    let labelled = columns
        .into_iter()
        .enumerate()
        .map(|(i, values)| (ComposedTable::label_for(i), values))
        .collect();
    Ok(ComposedTable::new(keys, labelled))
}

/// Check that every record is loaded without composing. Reports the first
/// offending position.
pub fn ensure_loaded(records: &[&Record]) -> Result<()> {
    match records.iter().position(|r| !r.is_loaded()) {
        Some(index) => Err(SpectError::NotLoaded { index }),
        None => Ok(()),
    }
}
