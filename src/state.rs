use std::sync::Arc;

use crate::chart::{build_chart, ChartState, SelectionSet, ALL_TRACE_NAMES};
use crate::color::TraceColors;
use crate::data::model::{DatasetBundle, DatasetKind};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. The bundle is loaded before
/// the event loop starts and never changes; everything else is derived from
/// the current selection.
pub struct AppState {
    /// The five loaded tables, shared read-only.
    pub bundle: Arc<DatasetBundle>,

    /// Which datasets are currently drawn.
    pub selection: SelectionSet,

    /// The chart derived from (bundle, selection). On a failed rebuild the
    /// previous chart stays on screen.
    pub chart: ChartState,

    /// Stable per-trace colours.
    pub colors: TraceColors,

    /// Error message from the last failed rebuild, if any.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(bundle: Arc<DatasetBundle>) -> Self {
        let mut state = Self {
            bundle,
            selection: SelectionSet::from([DatasetKind::Pems]),
            chart: ChartState::default(),
            colors: TraceColors::new(&ALL_TRACE_NAMES),
            status_message: None,
        };
        state.rebuild_chart();
        state
    }

    pub fn is_selected(&self, kind: DatasetKind) -> bool {
        self.selection.contains(&kind)
    }

    /// Toggle one dataset and rebuild the chart synchronously.
    pub fn toggle_dataset(&mut self, kind: DatasetKind) {
        if !self.selection.remove(&kind) {
            self.selection.insert(kind);
        }
        self.rebuild_chart();
    }

    /// Replace the chart with a fresh build of the current selection. A
    /// schema mismatch keeps the previous chart and surfaces the error.
    fn rebuild_chart(&mut self) {
        match build_chart(&self.bundle, &self.selection) {
            Ok(chart) => {
                self.chart = chart;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("chart rebuild failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::frame::{days_from_civil, Frame, Value};

    fn frame(columns: Vec<(&str, Vec<Value>)>) -> Frame {
        Frame::from_columns(
            columns
                .into_iter()
                .map(|(n, v)| (n.to_string(), v))
                .collect(),
        )
        .unwrap()
    }

    fn test_bundle() -> Arc<DatasetBundle> {
        let day = Value::Date(days_from_civil(2020, 1, 1));
        Arc::new(DatasetBundle {
            pems: frame(vec![
                ("date", vec![day.clone()]),
                ("vmt", vec![Value::Float(100.0)]),
            ]),
            hpms_table_6: frame(vec![
                ("timestamp", vec![day.clone()]),
                ("dvmt_1000_urban", vec![Value::Float(2.0)]),
                ("dvmt_1000_rural", vec![Value::Float(1.0)]),
            ]),
            hpms_table_9: frame(vec![
                ("timestamp", vec![day]),
                ("mpo", vec![Value::Str("SANDAG".into())]),
                ("dvmt_1000", vec![Value::Float(4.0)]),
            ]),
            inrix: frame(vec![
                ("Year", vec![Value::Int(2020)]),
                ("Urban Area", vec![Value::Str("San Diego CA".into())]),
                ("Freeway DVMT", vec![Value::Float(100.0)]),
                ("Arterial Street DVMT", vec![Value::Float(50.0)]),
            ]),
            emfac: frame(vec![
                ("EMFAC Model", vec![Value::Str("EMFAC 2017".into())]),
                ("Calendar Year", vec![Value::Int(2020)]),
                ("Total VMT", vec![Value::Float(80e6)]),
            ]),
        })
    }

    #[test]
    fn starts_with_pems_selected_and_plotted() {
        let state = AppState::new(test_bundle());
        assert!(state.is_selected(DatasetKind::Pems));
        assert_eq!(state.selection.len(), 1);
        assert_eq!(state.chart.traces.len(), 1);
        assert_eq!(state.chart.traces[0].name, "PeMS");
        assert!(state.status_message.is_none());
    }

    #[test]
    fn toggling_adds_and_removes_traces() {
        let mut state = AppState::new(test_bundle());

        state.toggle_dataset(DatasetKind::Emfac);
        assert_eq!(state.chart.traces.len(), 1 + 3);

        state.toggle_dataset(DatasetKind::Pems);
        assert!(!state.is_selected(DatasetKind::Pems));
        assert_eq!(state.chart.traces.len(), 3);

        state.toggle_dataset(DatasetKind::Emfac);
        assert!(state.chart.traces.is_empty());
    }

    #[test]
    fn failed_rebuild_keeps_the_previous_chart() {
        let mut bundle = (*test_bundle()).clone();
        bundle.emfac = frame(vec![("Calendar Year", vec![Value::Int(2020)])]);
        let mut state = AppState::new(Arc::new(bundle));
        let before = state.chart.clone();

        state.toggle_dataset(DatasetKind::Emfac);
        assert_eq!(state.chart, before);
        let message = state.status_message.as_deref().unwrap();
        assert!(message.contains("EMFAC"), "{message}");

        // Deselecting the broken dataset recovers on the next rebuild.
        state.toggle_dataset(DatasetKind::Emfac);
        assert!(state.status_message.is_none());
    }
}
