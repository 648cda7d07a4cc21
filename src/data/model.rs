use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::frame::Frame;
use super::loader::DataError;

// ---------------------------------------------------------------------------
// DatasetKind – the fixed enumeration of toggleable datasets
// ---------------------------------------------------------------------------

/// The five datasets the dashboard can overlay. The enum is closed, so an
/// out-of-range selection is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetKind {
    Pems,
    HpmsTable6,
    HpmsTable9,
    Inrix,
    Emfac,
}

impl DatasetKind {
    /// Fixed display order, also the order traces are stacked in the chart.
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Pems,
        DatasetKind::HpmsTable6,
        DatasetKind::HpmsTable9,
        DatasetKind::Inrix,
        DatasetKind::Emfac,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Pems => "PeMS",
            DatasetKind::HpmsTable6 => "HPMS (PRD Table 6)",
            DatasetKind::HpmsTable9 => "HPMS (PRD Table 9)",
            DatasetKind::Inrix => "INRIX (UMR)",
            DatasetKind::Emfac => "EMFAC",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// DatasetBundle – all five tables, loaded once, read-only afterwards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DatasetBundle {
    pub pems: Frame,
    pub hpms_table_6: Frame,
    pub hpms_table_9: Frame,
    pub inrix: Frame,
    pub emfac: Frame,
}

impl DatasetBundle {
    pub fn table(&self, kind: DatasetKind) -> &Frame {
        match kind {
            DatasetKind::Pems => &self.pems,
            DatasetKind::HpmsTable6 => &self.hpms_table_6,
            DatasetKind::HpmsTable9 => &self.hpms_table_9,
            DatasetKind::Inrix => &self.inrix,
            DatasetKind::Emfac => &self.emfac,
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetPaths – configurable file locations with fixed defaults
// ---------------------------------------------------------------------------

/// File locations of the cleaned tables. Defaults match the layout produced
/// by the upstream data pipeline; a JSON config file may override any subset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetPaths {
    pub pems: PathBuf,
    pub hpms_table_6: PathBuf,
    pub hpms_table_9: PathBuf,
    pub inrix: PathBuf,
    pub emfac: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            pems: PathBuf::from("data/clean/pems/pems.parquet"),
            hpms_table_6: PathBuf::from("data/clean/hpms/table_6.parquet"),
            hpms_table_9: PathBuf::from("data/clean/hpms/table_9.parquet"),
            inrix: PathBuf::from("data/clean/inrix/umr2022.parquet"),
            emfac: PathBuf::from("data/clean/emfac/emfac.parquet"),
        }
    }
}

impl DatasetPaths {
    /// Read paths from a JSON config file, or fall back to the defaults when
    /// the file does not exist. A present-but-malformed file is an error.
    pub fn load_or_default(config: &Path) -> Result<Self, DataError> {
        if !config.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(config).map_err(|source| {
            DataError::FileAccess {
                path: config.to_path_buf(),
                source,
            }
        })?;
        serde_json::from_str(&text).map_err(|e| DataError::Parse {
            path: config.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_the_fixed_enumeration() {
        let labels: Vec<&str> = DatasetKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(
            labels,
            vec![
                "PeMS",
                "HPMS (PRD Table 6)",
                "HPMS (PRD Table 9)",
                "INRIX (UMR)",
                "EMFAC",
            ]
        );
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let paths =
            DatasetPaths::load_or_default(Path::new("no_such_dashboard_config.json")).unwrap();
        assert_eq!(paths.pems, PathBuf::from("data/clean/pems/pems.parquet"));
    }

    #[test]
    fn config_file_overrides_a_subset_of_paths() {
        let dir = std::env::temp_dir().join("vmt_dashboard_model_test");
        std::fs::create_dir_all(&dir).unwrap();
        let config = dir.join("dashboard.json");
        std::fs::write(&config, r#"{ "pems": "elsewhere/pems.csv" }"#).unwrap();

        let paths = DatasetPaths::load_or_default(&config).unwrap();
        assert_eq!(paths.pems, PathBuf::from("elsewhere/pems.csv"));
        assert_eq!(paths.emfac, PathBuf::from("data/clean/emfac/emfac.parquet"));
    }

    #[test]
    fn malformed_config_file_is_a_parse_error() {
        let dir = std::env::temp_dir().join("vmt_dashboard_model_test_bad");
        std::fs::create_dir_all(&dir).unwrap();
        let config = dir.join("dashboard.json");
        std::fs::write(&config, "{ not json").unwrap();

        let err = DatasetPaths::load_or_default(&config).unwrap_err();
        assert!(matches!(err, DataError::Parse { .. }));
    }
}
