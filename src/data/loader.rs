use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, Date32Array, Date64Array, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use thiserror::Error;

use super::frame::{days_from_civil, Frame, FrameError, Value};
use super::model::{DatasetBundle, DatasetPaths};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl DataError {
    fn parse(path: &Path, message: impl Into<String>) -> Self {
        DataError::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetStore – load-once handle over the five tables
// ---------------------------------------------------------------------------

/// Owns the dataset paths and the memoized bundle. The first `bundle()` call
/// reads all five files; later calls return the cached `Arc` without touching
/// the filesystem. Loading is all-or-nothing: a failure caches nothing.
pub struct DatasetStore {
    paths: DatasetPaths,
    cached: Option<Arc<DatasetBundle>>,
    load_count: usize,
}

impl DatasetStore {
    pub fn new(paths: DatasetPaths) -> Self {
        Self {
            paths,
            cached: None,
            load_count: 0,
        }
    }

    pub fn bundle(&mut self) -> Result<Arc<DatasetBundle>, DataError> {
        if let Some(bundle) = &self.cached {
            return Ok(Arc::clone(bundle));
        }
        let bundle = Arc::new(DatasetBundle {
            pems: load_table(&self.paths.pems)?,
            hpms_table_6: load_table(&self.paths.hpms_table_6)?,
            hpms_table_9: load_table(&self.paths.hpms_table_9)?,
            inrix: load_table(&self.paths.inrix)?,
            emfac: load_table(&self.paths.emfac)?,
        });
        self.load_count += 1;
        self.cached = Some(Arc::clone(&bundle));
        Ok(bundle)
    }

    /// How many times the files have actually been read.
    pub fn load_count(&self) -> usize {
        self.load_count
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – the cleaned tables as produced by the data pipeline
/// * `.csv`     – header row plus plain scalar cells (dates as `YYYY-MM-DD`)
pub fn load_table(path: &Path) -> Result<Frame, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "csv" => load_csv(path),
        other => Err(DataError::parse(
            path,
            format!("unsupported file extension: .{other}"),
        )),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

fn load_parquet(path: &Path) -> Result<Frame, DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::parse(path, format!("reading parquet metadata: {e}")))?;

    let schema = builder.schema().clone();
    let reader = builder
        .build()
        .map_err(|e| DataError::parse(path, format!("building parquet reader: {e}")))?;

    // Keep the file's column order; an empty file still yields its schema.
    let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let mut columns: BTreeMap<String, Vec<Value>> =
        names.iter().map(|n| (n.clone(), Vec::new())).collect();

    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| DataError::parse(path, format!("reading record batch: {e}")))?;
        for (field, col) in schema.fields().iter().zip(batch.columns()) {
            let values = column_values(col.as_ref())
                .map_err(|msg| DataError::parse(path, format!("column '{}': {msg}", field.name())))?;
            columns
                .get_mut(field.name())
                .expect("schema column present")
                .extend(values);
        }
    }

    let columns: Vec<(String, Vec<Value>)> = names
        .into_iter()
        .map(|n| {
            let values = columns.remove(&n).expect("schema column present");
            (n, values)
        })
        .collect();
    Frame::from_columns(columns).map_err(|e: FrameError| DataError::parse(path, e.to_string()))
}

/// Convert one Arrow column into dynamic cell values. Dates and timestamps
/// collapse to day numbers so every table shares one x-axis representation.
fn column_values(col: &dyn Array) -> Result<Vec<Value>, String> {
    let mut out = Vec::with_capacity(col.len());
    macro_rules! extract {
        ($arr:expr, $make:expr) => {{
            let arr = $arr;
            for row in 0..arr.len() {
                if arr.is_null(row) {
                    out.push(Value::Null);
                } else {
                    out.push($make(arr.value(row)));
                }
            }
        }};
    }

    match col.data_type() {
        DataType::Utf8 => {
            let arr = col.as_any().downcast_ref::<StringArray>().unwrap();
            for row in 0..arr.len() {
                if arr.is_null(row) {
                    out.push(Value::Null);
                } else {
                    out.push(Value::Str(arr.value(row).to_string()));
                }
            }
        }
        DataType::LargeUtf8 => {
            let arr = col.as_string::<i64>();
            for row in 0..arr.len() {
                if arr.is_null(row) {
                    out.push(Value::Null);
                } else {
                    out.push(Value::Str(arr.value(row).to_string()));
                }
            }
        }
        DataType::Int32 => {
            extract!(
                col.as_any().downcast_ref::<Int32Array>().unwrap(),
                |v: i32| Value::Int(v as i64)
            )
        }
        DataType::Int64 => {
            extract!(col.as_any().downcast_ref::<Int64Array>().unwrap(), |v| {
                Value::Int(v)
            })
        }
        DataType::Float32 => {
            extract!(
                col.as_any().downcast_ref::<Float32Array>().unwrap(),
                |v: f32| Value::Float(v as f64)
            )
        }
        DataType::Float64 => {
            extract!(col.as_any().downcast_ref::<Float64Array>().unwrap(), |v| {
                Value::Float(v)
            })
        }
        DataType::Date32 => {
            extract!(
                col.as_any().downcast_ref::<Date32Array>().unwrap(),
                |v: i32| Value::Date(v as i64)
            )
        }
        DataType::Date64 => {
            extract!(
                col.as_any().downcast_ref::<Date64Array>().unwrap(),
                |ms: i64| Value::Date(ms.div_euclid(86_400_000))
            )
        }
        DataType::Timestamp(unit, _) => {
            let per_day: i64 = match unit {
                TimeUnit::Second => 86_400,
                TimeUnit::Millisecond => 86_400_000,
                TimeUnit::Microsecond => 86_400_000_000,
                TimeUnit::Nanosecond => 86_400_000_000_000,
            };
            macro_rules! ts {
                ($ty:ty) => {
                    extract!(col.as_any().downcast_ref::<$ty>().unwrap(), |v: i64| {
                        Value::Date(v.div_euclid(per_day))
                    })
                };
            }
            match unit {
                TimeUnit::Second => ts!(TimestampSecondArray),
                TimeUnit::Millisecond => ts!(TimestampMillisecondArray),
                TimeUnit::Microsecond => ts!(TimestampMicrosecondArray),
                TimeUnit::Nanosecond => ts!(TimestampNanosecondArray),
            }
        }
        other => return Err(format!("unsupported column type {other:?}")),
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one scalar cell per column.
/// Cell types are inferred per cell: empty → null, `YYYY-MM-DD` → date,
/// integer, float, anything else → string.
fn load_csv(path: &Path) -> Result<Frame, DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DataError::parse(path, format!("reading CSV headers: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| DataError::parse(path, format!("CSV row {row_no}: {e}")))?;
        if record.len() != headers.len() {
            return Err(DataError::parse(
                path,
                format!(
                    "CSV row {row_no}: {} fields, expected {}",
                    record.len(),
                    headers.len()
                ),
            ));
        }
        for (col, cell) in columns.iter_mut().zip(record.iter()) {
            col.push(guess_value(cell));
        }
    }

    let columns = headers.into_iter().zip(columns).collect();
    Frame::from_columns(columns).map_err(|e: FrameError| DataError::parse(path, e.to_string()))
}

fn guess_value(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Some(days) = parse_iso_date(s) {
        return Value::Date(days);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(s.to_string())
}

fn parse_iso_date(s: &str) -> Option<i64> {
    let mut parts = s.splitn(3, '-');
    let y = parts.next()?.parse::<i64>().ok()?;
    let m = parts.next()?.parse::<u32>().ok()?;
    let d = parts.next()?.parse::<u32>().ok()?;
    if !(1..=12).contains(&m) || !(1..=31).contains(&d) {
        return None;
    }
    Some(days_from_civil(y, m, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    use arrow::array::{Date32Array, Float64Array};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vmt_dashboard_loader_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_tiny_tables(dir: &Path) -> DatasetPaths {
        std::fs::write(
            dir.join("pems.csv"),
            "date,vmt\n2020-01-01,100.5\n2020-01-02,101.5\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("table_6.csv"),
            "timestamp,dvmt_1000_urban,dvmt_1000_rural\n2020-01-01,2.0,1.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("table_9.csv"),
            "timestamp,mpo,dvmt_1000\n2020-01-01,SANDAG,4.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("umr2022.csv"),
            "Year,Urban Area,Freeway DVMT,Arterial Street DVMT\n2020,San Diego CA,100,50\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("emfac.csv"),
            "EMFAC Model,Calendar Year,Total VMT\nEMFAC 2017,2020,80000000\n",
        )
        .unwrap();
        DatasetPaths {
            pems: dir.join("pems.csv"),
            hpms_table_6: dir.join("table_6.csv"),
            hpms_table_9: dir.join("table_9.csv"),
            inrix: dir.join("umr2022.csv"),
            emfac: dir.join("emfac.csv"),
        }
    }

    #[test]
    fn csv_loader_infers_cell_types() {
        let dir = temp_dir("csv_types");
        let path = dir.join("table_9.csv");
        std::fs::write(
            &path,
            "timestamp,mpo,dvmt_1000\n2020-01-01,SANDAG,4.5\n2020-01-02,OTHER,7\n",
        )
        .unwrap();

        let frame = load_table(&path).unwrap();
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(
            frame.column("timestamp").unwrap()[0],
            Value::Date(days_from_civil(2020, 1, 1))
        );
        assert_eq!(frame.column("mpo").unwrap()[0], Value::Str("SANDAG".into()));
        assert_eq!(frame.column("dvmt_1000").unwrap()[0], Value::Float(4.5));
        assert_eq!(frame.column("dvmt_1000").unwrap()[1], Value::Int(7));
    }

    #[test]
    fn parquet_round_trip_preserves_dates_and_floats() {
        let dir = temp_dir("parquet");
        let path = dir.join("pems.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("date", DataType::Date32, false),
            Field::new("vmt", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(vec![
                    days_from_civil(2020, 1, 1) as i32,
                    days_from_civil(2020, 1, 2) as i32,
                ])),
                Arc::new(Float64Array::from(vec![100.5, 101.5])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let frame = load_table(&path).unwrap();
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(
            frame.column("date").unwrap()[0],
            Value::Date(days_from_civil(2020, 1, 1))
        );
        assert_eq!(frame.f64_column("vmt").unwrap(), vec![100.5, 101.5]);
    }

    #[test]
    fn store_reads_files_once_and_caches_the_bundle() {
        let dir = temp_dir("cache");
        let paths = write_tiny_tables(&dir);

        let mut store = DatasetStore::new(paths);
        let first = store.bundle().unwrap();
        let second = store.bundle().unwrap();

        assert_eq!(store.load_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.pems.n_rows(), 2);
    }

    #[test]
    fn missing_file_fails_the_whole_load() {
        let dir = temp_dir("missing");
        let mut paths = write_tiny_tables(&dir);
        paths.emfac = dir.join("nonexistent.csv");

        let mut store = DatasetStore::new(paths);
        let err = store.bundle().unwrap_err();
        assert!(matches!(err, DataError::FileAccess { .. }));
        // Nothing cached, nothing counted as a successful read.
        assert_eq!(store.load_count(), 0);
        assert!(store.bundle().is_err());
    }

    #[test]
    fn unsupported_extension_is_a_parse_error() {
        let err = load_table(Path::new("data.xlsx")).unwrap_err();
        assert!(matches!(err, DataError::Parse { .. }));
    }
}
