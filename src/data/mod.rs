/// Data layer: records, stores, composition and statistics.
///
/// Architecture:
/// ```text
///  OceanView .txt / group.json
///        │
///        ▼
///   ┌──────────┐
///   │  record   │  ReadSpec → metadata lines + (Wavelength, value)
///   └──────────┘
///        │   Rc<RefCell<Record>>, shared between stores
///        ▼
///   ┌──────────┐
///   │  store    │  ordered records + cached tables, subgroups
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │ compose   │ ──▶ │  stats    │  min / max / mean / std per row
///   └──────────┘      └──────────┘
/// ```
///
/// Nothing here is thread-safe: a store and its records live on one thread
/// and callers serialise mutation against `compose`/`stats`.

pub mod cache;
pub mod compose;
pub mod config;
pub mod definition;
pub mod error;
pub mod group;
pub mod naming;
pub mod read_spec;
pub mod record;
pub mod stats;
pub mod store;
pub mod table;

pub use error::{IndexError, ParseError, Result, SpectError};
pub use record::{Record, SharedRecord};
pub use store::RecordStore;
pub use table::{ComposedTable, StatsTable};

/// Canonical name of the join key column.
pub const KEY_COLUMN: &str = "Wavelength";
