use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Value – a single cell in a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value covering the dtypes found in the cleaned
/// tables. Using `BTreeMap` keys downstream so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    /// Days since the Unix epoch.
    Date(i64),
    Null,
}

// -- Manual Eq/Ord so Value can be a group-by key --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Int(_) => 1,
                Float(_) => 2,
                Date(_) => 3,
                Str(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Int(a), Int(b)) | (Date(a), Date(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Date(days) => {
                let (y, m, d) = civil_from_days(*days);
                write!(f, "{y:04}-{m:02}-{d:02}")
            }
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64` for plotting and aggregation.
    /// Dates map to their day number so they stay usable as an x axis.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(i) => Some(*i as f64),
            Value::Date(days) => Some(*days as f64),
            _ => None,
        }
    }
}

// -- Civil calendar conversions (proleptic Gregorian) --

/// Days since 1970-01-01 for a calendar date.
pub fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = if month > 2 { month - 3 } else { month + 9 } as i64;
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

/// Calendar date (year, month, day) for a day number since 1970-01-01.
pub fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (yoe + era * 400 + i64::from(m <= 2), m, d)
}

// ---------------------------------------------------------------------------
// Frame – an in-memory columnar table
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FrameError {
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("column '{name}' has {len} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },
}

/// A small immutable column-oriented table with the operations the chart
/// layer needs: equality filter, group-by-key with sum aggregation, and
/// numeric column extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: BTreeMap<String, Vec<Value>>,
    n_rows: usize,
}

impl Frame {
    /// Build a frame from named columns. All columns must share one length.
    pub fn from_columns(
        columns: Vec<(String, Vec<Value>)>,
    ) -> Result<Self, FrameError> {
        let n_rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        for (name, values) in &columns {
            if values.len() != n_rows {
                return Err(FrameError::LengthMismatch {
                    name: name.clone(),
                    len: values.len(),
                    expected: n_rows,
                });
            }
        }
        let names = columns.iter().map(|(n, _)| n.clone()).collect();
        let columns = columns.into_iter().collect();
        Ok(Frame {
            names,
            columns,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Result<&[Value], FrameError> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| FrameError::MissingColumn(name.to_string()))
    }

    /// Extract a column as `f64`. Nulls become NaN; a non-numeric cell is a
    /// schema problem and fails the whole extraction.
    pub fn f64_column(&self, name: &str) -> Result<Vec<f64>, FrameError> {
        self.column(name)?
            .iter()
            .map(|v| match v {
                Value::Null => Ok(f64::NAN),
                other => other
                    .as_f64()
                    .ok_or_else(|| FrameError::NotNumeric(name.to_string())),
            })
            .collect()
    }

    /// Rows where `column` equals `value` exactly. Non-matching rows are
    /// excluded entirely.
    pub fn filter_eq(&self, column: &str, value: &Value) -> Result<Frame, FrameError> {
        let predicate_col = self.column(column)?;
        let keep: Vec<usize> = predicate_col
            .iter()
            .enumerate()
            .filter(|(_, v)| *v == value)
            .map(|(i, _)| i)
            .collect();

        let columns = self
            .names
            .iter()
            .map(|name| {
                let src = &self.columns[name];
                let taken: Vec<Value> = keep.iter().map(|&i| src[i].clone()).collect();
                (name.clone(), taken)
            })
            .collect();
        Frame::from_columns(columns)
    }

    /// Group rows by `key` and sum each of `value_columns` within a group.
    /// Output has one row per distinct key, sorted ascending by key, with the
    /// key column first and one Float column per value column. Rows with a
    /// null key or null cell are skipped, matching the source tables' "absent
    /// period is simply absent" behavior.
    pub fn group_sum(
        &self,
        key: &str,
        value_columns: &[&str],
    ) -> Result<Frame, FrameError> {
        let key_col = self.column(key)?;
        let mut value_cols: Vec<&[Value]> = Vec::with_capacity(value_columns.len());
        for name in value_columns {
            value_cols.push(self.column(name)?);
        }

        let mut groups: BTreeMap<Value, Vec<f64>> = BTreeMap::new();
        for (row, key_val) in key_col.iter().enumerate() {
            if *key_val == Value::Null {
                continue;
            }
            let sums = groups
                .entry(key_val.clone())
                .or_insert_with(|| vec![0.0; value_columns.len()]);
            for (slot, col) in value_cols.iter().enumerate() {
                match &col[row] {
                    Value::Null => {}
                    cell => {
                        let v = cell.as_f64().ok_or_else(|| {
                            FrameError::NotNumeric(value_columns[slot].to_string())
                        })?;
                        sums[slot] += v;
                    }
                }
            }
        }

        let mut out_key = Vec::with_capacity(groups.len());
        let mut out_values: Vec<Vec<Value>> =
            vec![Vec::with_capacity(groups.len()); value_columns.len()];
        for (key_val, sums) in groups {
            out_key.push(key_val);
            for (slot, sum) in sums.into_iter().enumerate() {
                out_values[slot].push(Value::Float(sum));
            }
        }

        let mut columns = vec![(key.to_string(), out_key)];
        for (name, values) in value_columns.iter().zip(out_values) {
            columns.push((name.to_string(), values));
        }
        Frame::from_columns(columns)
    }

    /// Extract (x, y) point pairs for plotting. Rows where either side is
    /// null are skipped; non-numeric cells fail the extraction.
    pub fn xy(&self, x: &str, y: &str) -> Result<Vec<[f64; 2]>, FrameError> {
        let x_col = self.column(x)?;
        let y_col = self.column(y)?;
        let mut points = Vec::with_capacity(self.n_rows);
        for (xv, yv) in x_col.iter().zip(y_col) {
            if *xv == Value::Null || *yv == Value::Null {
                continue;
            }
            let px = xv
                .as_f64()
                .ok_or_else(|| FrameError::NotNumeric(x.to_string()))?;
            let py = yv
                .as_f64()
                .ok_or_else(|| FrameError::NotNumeric(y.to_string()))?;
            points.push([px, py]);
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: Vec<(&str, Vec<Value>)>) -> Frame {
        Frame::from_columns(
            columns
                .into_iter()
                .map(|(n, v)| (n.to_string(), v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn group_sum_combines_duplicate_keys() {
        let f = frame(vec![
            ("k", vec![Value::Int(1), Value::Int(1), Value::Int(2)]),
            (
                "v",
                vec![Value::Float(2.0), Value::Float(3.0), Value::Float(10.0)],
            ),
        ]);
        let g = f.group_sum("k", &["v"]).unwrap();
        assert_eq!(g.n_rows(), 2);
        assert_eq!(g.f64_column("v").unwrap(), vec![5.0, 10.0]);
    }

    #[test]
    fn group_sum_sorts_keys_ascending() {
        let f = frame(vec![
            ("k", vec![Value::Int(3), Value::Int(1), Value::Int(2)]),
            (
                "v",
                vec![Value::Float(30.0), Value::Float(10.0), Value::Float(20.0)],
            ),
        ]);
        let g = f.group_sum("k", &["v"]).unwrap();
        assert_eq!(g.f64_column("k").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(g.f64_column("v").unwrap(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn filter_eq_is_exact_equality() {
        let f = frame(vec![
            (
                "region",
                vec![
                    Value::Str("SANDAG".into()),
                    Value::Str("SANDAG-X".into()),
                    Value::Str("OTHER".into()),
                ],
            ),
            (
                "v",
                vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)],
            ),
        ]);
        let g = f.filter_eq("region", &Value::Str("SANDAG".into())).unwrap();
        assert_eq!(g.n_rows(), 1);
        assert_eq!(g.f64_column("v").unwrap(), vec![1.0]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let f = frame(vec![("a", vec![Value::Int(1)])]);
        assert_eq!(
            f.column("b").unwrap_err(),
            FrameError::MissingColumn("b".into())
        );
        assert!(matches!(
            f.group_sum("a", &["b"]).unwrap_err(),
            FrameError::MissingColumn(_)
        ));
    }

    #[test]
    fn mismatched_column_lengths_are_rejected() {
        let err = Frame::from_columns(vec![
            ("a".to_string(), vec![Value::Int(1), Value::Int(2)]),
            ("b".to_string(), vec![Value::Int(1)]),
        ])
        .unwrap_err();
        assert!(matches!(err, FrameError::LengthMismatch { .. }));
    }

    #[test]
    fn xy_skips_null_rows() {
        let f = frame(vec![
            ("x", vec![Value::Int(1), Value::Null, Value::Int(3)]),
            (
                "y",
                vec![Value::Float(1.0), Value::Float(2.0), Value::Null],
            ),
        ]);
        assert_eq!(f.xy("x", "y").unwrap(), vec![[1.0, 1.0]]);
    }

    #[test]
    fn civil_conversions_round_trip() {
        for &(y, m, d) in &[(1970, 1, 1), (2000, 2, 29), (2020, 12, 31), (2023, 3, 1)] {
            let days = days_from_civil(y, m, d);
            assert_eq!(civil_from_days(days), (y, m, d));
        }
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(days_from_civil(2020, 1, 1), 18262);
    }

    #[test]
    fn date_values_display_as_iso_dates() {
        let v = Value::Date(days_from_civil(2021, 7, 4));
        assert_eq!(v.to_string(), "2021-07-04");
    }
}
