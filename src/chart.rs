use std::collections::BTreeSet;

use thiserror::Error;

use crate::data::frame::{Frame, FrameError, Value};
use crate::data::model::{DatasetBundle, DatasetKind};

// ---------------------------------------------------------------------------
// Chart state: the fully derived set of traces
// ---------------------------------------------------------------------------

/// Which datasets are drawn. Ordered so rebuilds are deterministic.
pub type SelectionSet = BTreeSet<DatasetKind>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStyle {
    /// Raw points, no connecting line.
    Markers,
    /// Connected markers.
    LineMarkers,
    DashedLine,
    DottedLine,
}

/// One plotted series: a dataset (or sub-series within one).
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: &'static str,
    pub points: Vec<[f64; 2]>,
    pub style: TraceStyle,
}

/// The rendered figure, rebuilt from scratch on every selection change.
/// Never accumulates traces across rebuilds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartState {
    pub traces: Vec<Trace>,
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("{dataset} does not match the expected layout: {source}")]
    SchemaMismatch {
        dataset: DatasetKind,
        source: FrameError,
    },
}

// ---------------------------------------------------------------------------
// Fixed filter constants and trace names
// ---------------------------------------------------------------------------

const HPMS_MPO: &str = "SANDAG";
const INRIX_URBAN_AREA: &str = "San Diego CA";
const EMFAC_MODELS: [&str; 3] = ["EMFAC 2017", "EMFAC 2021", "EMFAC 2025"];

const INRIX_FREEWAY_NAME: &str = "INRIX (UMR) Freeway VMT";
const INRIX_COMBINED_NAME: &str = "INRIX (UMR) Freeway and Arterial Street VMT";

/// Every trace name the chart can produce, in stacking order. Used to assign
/// stable colors regardless of the current selection.
pub const ALL_TRACE_NAMES: [&str; 8] = [
    "PeMS",
    "HPMS (PRD Table 6)",
    "HPMS (PRD Table 9)",
    INRIX_FREEWAY_NAME,
    INRIX_COMBINED_NAME,
    "EMFAC 2017",
    "EMFAC 2021",
    "EMFAC 2025",
];

// ---------------------------------------------------------------------------
// Chart builder
// ---------------------------------------------------------------------------

/// Pure mapping from (bundle, selection) to a chart. Selected datasets are
/// visited in the fixed enumeration order; an empty selection yields an empty
/// chart. A selected table that does not match its expected layout fails the
/// whole build; no partial trace is added for it.
pub fn build_chart(
    bundle: &DatasetBundle,
    selection: &SelectionSet,
) -> Result<ChartState, ChartError> {
    let mut traces = Vec::new();
    for kind in DatasetKind::ALL {
        if !selection.contains(&kind) {
            continue;
        }
        let built = match kind {
            DatasetKind::Pems => pems_traces(&bundle.pems),
            DatasetKind::HpmsTable6 => hpms_table_6_traces(&bundle.hpms_table_6),
            DatasetKind::HpmsTable9 => hpms_table_9_traces(&bundle.hpms_table_9),
            DatasetKind::Inrix => inrix_traces(&bundle.inrix),
            DatasetKind::Emfac => emfac_traces(&bundle.emfac),
        }
        .map_err(|source| ChartError::SchemaMismatch {
            dataset: kind,
            source,
        })?;
        traces.extend(built);
    }
    Ok(ChartState { traces })
}

/// Raw (date, vmt) sensor points, deliberately unaggregated.
fn pems_traces(frame: &Frame) -> Result<Vec<Trace>, FrameError> {
    Ok(vec![Trace {
        name: "PeMS",
        points: frame.xy("date", "vmt")?,
        style: TraceStyle::Markers,
    }])
}

/// Statewide DVMT: urban + rural thousands summed per timestamp, scaled to
/// absolute miles.
fn hpms_table_6_traces(frame: &Frame) -> Result<Vec<Trace>, FrameError> {
    let grouped = frame.group_sum("timestamp", &["dvmt_1000_urban", "dvmt_1000_rural"])?;
    let timestamps = grouped.f64_column("timestamp")?;
    let urban = grouped.f64_column("dvmt_1000_urban")?;
    let rural = grouped.f64_column("dvmt_1000_rural")?;

    let points = timestamps
        .iter()
        .zip(urban.iter().zip(&rural))
        .map(|(&t, (&u, &r))| [t, (u + r) * 1_000.0])
        .collect();
    Ok(vec![Trace {
        name: "HPMS (PRD Table 6)",
        points,
        style: TraceStyle::LineMarkers,
    }])
}

/// Regional DVMT restricted to the SANDAG MPO.
fn hpms_table_9_traces(frame: &Frame) -> Result<Vec<Trace>, FrameError> {
    let grouped = frame
        .filter_eq("mpo", &Value::Str(HPMS_MPO.to_string()))?
        .group_sum("timestamp", &["dvmt_1000"])?;
    let timestamps = grouped.f64_column("timestamp")?;
    let dvmt = grouped.f64_column("dvmt_1000")?;

    let points = timestamps
        .iter()
        .zip(&dvmt)
        .map(|(&t, &v)| [t, v * 1_000.0])
        .collect();
    Ok(vec![Trace {
        name: "HPMS (PRD Table 9)",
        points,
        style: TraceStyle::LineMarkers,
    }])
}

/// Two derived series for the San Diego urban area: freeway-only and
/// freeway-plus-arterial annual VMT.
fn inrix_traces(frame: &Frame) -> Result<Vec<Trace>, FrameError> {
    let grouped = frame
        .filter_eq("Urban Area", &Value::Str(INRIX_URBAN_AREA.to_string()))?
        .group_sum("Year", &["Freeway DVMT", "Arterial Street DVMT"])?;
    let years = grouped.f64_column("Year")?;
    let freeway = grouped.f64_column("Freeway DVMT")?;
    let arterial = grouped.f64_column("Arterial Street DVMT")?;

    let freeway_points = years
        .iter()
        .zip(&freeway)
        .map(|(&y, &f)| [y, f * 1_000.0])
        .collect();
    let combined_points = years
        .iter()
        .zip(freeway.iter().zip(&arterial))
        .map(|(&y, (&f, &a))| [y, (f + a) * 1_000.0])
        .collect();

    Ok(vec![
        Trace {
            name: INRIX_FREEWAY_NAME,
            points: freeway_points,
            style: TraceStyle::DashedLine,
        },
        Trace {
            name: INRIX_COMBINED_NAME,
            points: combined_points,
            style: TraceStyle::DashedLine,
        },
    ])
}

/// One series per EMFAC model version, summed across vehicle categories.
fn emfac_traces(frame: &Frame) -> Result<Vec<Trace>, FrameError> {
    EMFAC_MODELS
        .iter()
        .map(|&model| {
            let grouped = frame
                .filter_eq("EMFAC Model", &Value::Str(model.to_string()))?
                .group_sum("Calendar Year", &["Total VMT"])?;
            Ok(Trace {
                name: model,
                points: grouped.xy("Calendar Year", "Total VMT")?,
                style: TraceStyle::DottedLine,
            })
        })
        .collect()
}
