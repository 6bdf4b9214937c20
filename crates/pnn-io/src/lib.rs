//! # pnn-io
//!
//! File formats of the paramnn pipeline: Parquet event input, the
//! whitespace-delimited numeric tables every stage exchanges, the
//! comma-separated analysis tables and their columnar export.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod concat;
pub mod event_parquet;
pub mod export;
pub mod extract;
pub mod table;
pub mod toy;

pub use concat::{ConditionDataset, concatenate, concatenate_all, load_dataset};
pub use extract::{ExtractedFile, extract_dir, extract_file};
pub use table::{NumericTable, read_scalar, read_table, write_scalar, write_table};
