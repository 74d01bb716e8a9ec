//! File I/O: typed tables, atomic publishing and model artifacts.

mod atomic;
mod format;
mod load;
mod model;
mod save;
mod table;

pub use atomic::{csv_writer, finish_csv, write_atomic, AtomicFile};
pub use format::ArtifactFormat;
pub use load::load_model;
pub use model::{ModelState, FORMAT_VERSION};
pub use save::save_model;
pub use table::{normalize_header, parse_count, ReadStats, Row, RowError, TableReader, TableRow};
