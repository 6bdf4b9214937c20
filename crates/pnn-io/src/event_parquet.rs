//! Parquet / Arrow event I/O.
//!
//! # Event file layout
//!
//! One file per (class, scale). Each file carries a single tree:
//!
//! | Column   | Arrow Type            | Description                     |
//! |----------|-----------------------|---------------------------------|
//! | `mwwbb`  | `Float64` / `Float32` | primary reconstructed mass      |
//! | `mjj`    | `Float64` / `Float32` | secondary reconstructed mass    |
//! | `mx`     | `Float64` / `Float32` | generator resonance mass        |
//! | `jes`    | `Float64` / `Float32` | systematic scale of the sample  |
//! | `target` | `Float64` / `Float32` | 1 signal, 0 background          |
//!
//! Parquet key-value metadata:
//!
//! | Key                    | Value                             |
//! |------------------------|-----------------------------------|
//! | `pnn.schema_version`   | `"paramnn_events_v1"`             |
//! | `pnn.tree`             | tree name, e.g. `"xtt"`           |
//!
//! Files without `pnn.tree` are accepted as the requested tree. A file that
//! names a different tree is rejected.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray, Float64Array};
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::properties::WriterProperties;

use pnn_core::{Error, Event, Result};

/// Schema version string embedded in Parquet key-value metadata.
pub const EVENTS_SCHEMA_V1: &str = "paramnn_events_v1";

/// Parquet metadata key for the schema version.
pub const META_KEY_SCHEMA_VERSION: &str = "pnn.schema_version";

/// Parquet metadata key for the tree name.
pub const META_KEY_TREE: &str = "pnn.tree";

/// Leaves read from every event file, in [`Event`] field order.
pub const EVENT_LEAVES: [&str; 5] = ["mwwbb", "mjj", "mx", "jes", "target"];

/// Read the given leaves of `tree` from a Parquet file.
///
/// Returns one `Vec<f64>` per leaf in the order requested. `Float32` columns
/// are widened.
pub fn read_leaves(path: &Path, tree: &str, leaves: &[&str]) -> Result<Vec<Vec<f64>>> {
    if !path.is_file() {
        return Err(Error::missing("event file", path));
    }
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::Format(format!("failed to read Parquet {}: {e}", path.display())))?;

    // Capture the Arrow schema (with key-value metadata) before building the reader.
    let full_schema = builder.schema().clone();
    check_tree(path, &full_schema, tree)?;

    let reader = builder
        .build()
        .map_err(|e| Error::Format(format!("failed to build Parquet reader: {e}")))?;
    let batches: std::result::Result<Vec<_>, _> = reader.collect();
    let batches =
        batches.map_err(|e| Error::Format(format!("failed to read Parquet batches: {e}")))?;
    let merged = arrow::compute::concat_batches(&full_schema, &batches)
        .map_err(|e| Error::Format(format!("failed to concat Parquet batches: {e}")))?;

    leaves.iter().map(|leaf| leaf_values(path, &merged, leaf)).collect()
}

/// Read all events of `tree` from a Parquet file.
pub fn read_events(path: &Path, tree: &str) -> Result<Vec<Event>> {
    let cols = read_leaves(path, tree, &EVENT_LEAVES)?;
    let n = cols[0].len();
    Ok((0..n)
        .map(|i| Event {
            mwwbb: cols[0][i],
            mjj: cols[1][i],
            mx: cols[2][i],
            jes: cols[3][i],
            target: cols[4][i],
        })
        .collect())
}

fn check_tree(path: &Path, schema: &Schema, tree: &str) -> Result<()> {
    match schema.metadata().get(META_KEY_TREE) {
        Some(found) if found != tree => Err(Error::Validation(format!(
            "{} holds tree '{found}', expected '{tree}'",
            path.display()
        ))),
        _ => Ok(()),
    }
}

fn leaf_values(path: &Path, batch: &RecordBatch, leaf: &str) -> Result<Vec<f64>> {
    let schema = batch.schema();
    let idx = schema
        .index_of(leaf)
        .map_err(|_| Error::missing(format!("leaf '{leaf}'"), path))?;
    let arr = batch.column(idx);
    if arr.null_count() > 0 {
        return Err(Error::Validation(format!(
            "leaf '{leaf}' in {} has {} null values",
            path.display(),
            arr.null_count()
        )));
    }
    let arr = match arr.data_type() {
        DataType::Float64 => arr.clone(),
        DataType::Float32 => arrow::compute::cast(arr, &DataType::Float64)
            .map_err(|e| Error::Format(format!("failed to widen leaf '{leaf}': {e}")))?,
        other => {
            return Err(Error::Validation(format!(
                "leaf '{leaf}' in {} has type {other:?}, expected Float64",
                path.display()
            )));
        }
    };
    Ok(arr.as_primitive::<Float64Type>().values().to_vec())
}

/// Build an Arrow [`RecordBatch`] from named `Float64` columns.
pub fn columns_to_record_batch(
    columns: &[(&str, &[f64])],
    metadata: HashMap<String, String>,
) -> Result<RecordBatch> {
    let fields: Vec<Field> =
        columns.iter().map(|(n, _)| Field::new(*n, DataType::Float64, false)).collect();
    let schema = Arc::new(Schema::new(fields).with_metadata(metadata));
    let arrays: Vec<Arc<dyn Array>> = columns
        .iter()
        .map(|(_, v)| Arc::new(Float64Array::from(v.to_vec())) as Arc<dyn Array>)
        .collect();
    RecordBatch::try_new(schema, arrays)
        .map_err(|e| Error::Format(format!("failed to build RecordBatch: {e}")))
}

/// Write named `Float64` columns to a Parquet file (Snappy-compressed).
pub fn write_columns_parquet(
    path: &Path,
    columns: &[(&str, &[f64])],
    metadata: HashMap<String, String>,
) -> Result<()> {
    let batch = columns_to_record_batch(columns, metadata)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .map_err(|e| Error::Format(format!("failed to create Parquet writer: {e}")))?;
    writer.write(&batch).map_err(|e| Error::Format(format!("failed to write Parquet: {e}")))?;
    writer.close().map_err(|e| Error::Format(format!("failed to close Parquet writer: {e}")))?;
    Ok(())
}

/// Write events as one tree of an event file.
pub fn write_events(path: &Path, tree: &str, events: &[Event]) -> Result<()> {
    let col = |f: fn(&Event) -> f64| events.iter().map(f).collect::<Vec<f64>>();
    let (mwwbb, mjj, mx, jes, target) =
        (col(|e| e.mwwbb), col(|e| e.mjj), col(|e| e.mx), col(|e| e.jes), col(|e| e.target));
    let metadata = HashMap::from([
        (META_KEY_SCHEMA_VERSION.to_string(), EVENTS_SCHEMA_V1.to_string()),
        (META_KEY_TREE.to_string(), tree.to_string()),
    ]);
    write_columns_parquet(
        path,
        &[
            ("mwwbb", &mwwbb),
            ("mjj", &mjj),
            ("mx", &mx),
            ("jes", &jes),
            ("target", &target),
        ],
        metadata,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("pnn_evpq_{}_{}_{}", name, std::process::id(), nanos))
    }

    fn events() -> Vec<Event> {
        vec![
            Event { mwwbb: 510.0, mjj: 81.0, mx: 500.0, jes: 1.0, target: 1.0 },
            Event { mwwbb: 480.5, mjj: 79.25, mx: 500.0, jes: 1.0, target: 1.0 },
        ]
    }

    #[test]
    fn test_write_read_events() {
        let p = tmp_path("ev.parquet");
        write_events(&p, "xtt", &events()).unwrap();
        assert_eq!(read_events(&p, "xtt").unwrap(), events());
        std::fs::remove_file(&p).ok();
    }

    #[test]
    fn test_wrong_tree_rejected() {
        let p = tmp_path("tree.parquet");
        write_events(&p, "other", &events()).unwrap();
        let err = read_events(&p, "xtt").unwrap_err();
        assert!(err.to_string().contains("other"), "{err}");
        std::fs::remove_file(&p).ok();
    }

    #[test]
    fn test_missing_leaf_is_missing_input() {
        let p = tmp_path("leaf.parquet");
        write_columns_parquet(&p, &[("mwwbb", &[1.0]), ("mjj", &[2.0])], HashMap::new()).unwrap();
        match read_events(&p, "xtt") {
            Err(Error::MissingInput { what, .. }) => assert_eq!(what, "leaf 'mx'"),
            other => panic!("expected MissingInput, got {other:?}"),
        }
        std::fs::remove_file(&p).ok();
    }

    #[test]
    fn test_float32_leaves_are_widened() {
        let p = tmp_path("f32.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new("mjj", DataType::Float32, false)]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(arrow::array::Float32Array::from(vec![80.5f32, 91.0]))],
        )
        .unwrap();
        let file = std::fs::File::create(&p).unwrap();
        let mut w = ArrowWriter::try_new(file, schema, None).unwrap();
        w.write(&batch).unwrap();
        w.close().unwrap();
        let cols = read_leaves(&p, "xtt", &["mjj"]).unwrap();
        assert_eq!(cols[0], vec![80.5, 91.0]);
        std::fs::remove_file(&p).ok();
    }
}
