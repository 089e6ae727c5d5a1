use std::fmt;
use std::str::FromStr;

use super::error::{IndexError, Result, SpectError};
use super::store::RecordStore;

// ---------------------------------------------------------------------------
// IndexSets – textual subgroup definitions
// ---------------------------------------------------------------------------

/// An inclusive run of experiment indices, `first..=last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpan {
    pub first: usize,
    pub last: usize,
}

impl IndexSpan {
    pub fn single(index: usize) -> Self {
        Self {
            first: index,
            last: index,
        }
    }
}

impl fmt::Display for IndexSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

/// Index sets for [`RecordStore::subgroup`], written as `"0-2; 3,5"`:
/// sets separated by `;`, indices by `,`, `a-b` for an inclusive run.
///
/// Runs stay unexpanded until [`IndexSets::resolve`] checks them against a
/// group size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSets(pub Vec<Vec<IndexSpan>>);

impl IndexSets {
    pub fn parse(text: &str) -> Result<Self, IndexError> {
        let mut sets = Vec::new();
        for chunk in text.split(';') {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            let mut set = Vec::new();
            for token in chunk.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                match token.split_once('-') {
                    Some((lo, hi)) => {
                        let first = parse_index(lo.trim(), token)?;
                        let last = parse_index(hi.trim(), token)?;
                        if first > last {
                            return Err(malformed(token));
                        }
                        set.push(IndexSpan { first, last });
                    }
                    None => set.push(IndexSpan::single(parse_index(token, token)?)),
                }
            }
            sets.push(set);
        }
        Ok(Self(sets))
    }

    /// Expand every run into concrete indices, rejecting any index at or
    /// past `len` before anything is allocated for it.
    pub fn resolve(&self, len: usize) -> Result<Vec<Vec<usize>>, IndexError> {
        let mut out = Vec::with_capacity(self.0.len());
        for (n, spans) in self.0.iter().enumerate() {
            let mut set = Vec::new();
            for span in spans {
                if span.last >= len {
                    return Err(IndexError::OutOfRange {
                        set: n + 1,
                        index: span.first.max(len),
                        len,
                    });
                }
                set.extend(span.first..=span.last);
            }
            out.push(set);
        }
        Ok(out)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for IndexSets {
    type Err = IndexError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for IndexSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sets: Vec<String> = self
            .0
            .iter()
            .map(|set| {
                set.iter()
                    .map(IndexSpan::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();
        write!(f, "{}", sets.join("; "))
    }
}

fn parse_index(raw: &str, token: &str) -> Result<usize, IndexError> {
    raw.parse::<usize>().map_err(|_| malformed(token))
}

fn malformed(token: &str) -> IndexError {
    IndexError::Malformed {
        token: token.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Convenience over RecordStore
// ---------------------------------------------------------------------------

/// Parse `text` and split `store` into the subgroups it describes.
pub fn split(store: &RecordStore, text: &str) -> Result<Vec<RecordStore>> {
    let sets = IndexSets::parse(text)?.resolve(store.len())?;
    store.subgroup(&sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::config::OutputConfig;
    use crate::data::record::Record;

    fn store_of(n: usize) -> RecordStore {
        let records = (0..n)
            .map(|i| {
                Record::from_columns(vec![1.0], vec![i as f64])
                    .unwrap()
                    .into_shared()
            })
            .collect();
        RecordStore::with_records(records, "All", OutputConfig::default())
    }

    #[test]
    fn parses_lists_and_ranges() {
        let sets = IndexSets::parse(" 0-2; 3, 5 ;").unwrap();
        assert_eq!(
            sets.0,
            vec![
                vec![IndexSpan { first: 0, last: 2 }],
                vec![IndexSpan::single(3), IndexSpan::single(5)],
            ]
        );
        assert_eq!(sets.to_string(), "0-2; 3,5");
        assert_eq!(sets.resolve(6).unwrap(), vec![vec![0, 1, 2], vec![3, 5]]);
    }

    #[test]
    fn non_integers_are_malformed() {
        for text in ["1.5", "a", "-1", "3-1", "1-x"] {
            assert!(
                matches!(IndexSets::parse(text), Err(IndexError::Malformed { .. })),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn huge_ranges_are_out_of_range_not_expanded() {
        let sets = IndexSets::parse("0-18446744073709551615").unwrap();
        assert_eq!(
            sets.resolve(4),
            Err(IndexError::OutOfRange { set: 1, index: 4, len: 4 })
        );

        let sets = IndexSets::parse("1; 99999999999-99999999999").unwrap();
        assert_eq!(
            sets.resolve(4),
            Err(IndexError::OutOfRange {
                set: 2,
                index: 99_999_999_999,
                len: 4
            })
        );

        let store = store_of(4);
        assert!(matches!(
            split(&store, "0-18446744073709551615"),
            Err(SpectError::Index(IndexError::OutOfRange { .. }))
        ));
        assert!(matches!(
            split(&store, "0-99999999999"),
            Err(SpectError::Index(IndexError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn split_builds_subgroups() {
        let store = store_of(4);
        let subs = split(&store, "0,1; 2-3").unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[1].stats().unwrap().mean, vec![2.5]);

        assert!(matches!(split(&store, "0; 9"), Err(SpectError::Index(_))));
        assert!(matches!(split(&store, "zero"), Err(SpectError::Index(_))));
    }
}
