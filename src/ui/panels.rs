use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::model::DatasetKind;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – dataset toggles
// ---------------------------------------------------------------------------

/// Render the dataset checkbox group. Each toggle rebuilds the chart before
/// control returns to the event loop.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Datasets");
    ui.separator();

    for kind in DatasetKind::ALL {
        let mut checked = state.is_selected(kind);
        if ui.checkbox(&mut checked, kind.label()).changed() {
            state.toggle_dataset(kind);
        }
    }

    ui.separator();
    ui.strong("Loaded tables");
    for kind in DatasetKind::ALL {
        ui.label(format!(
            "{kind}: {} rows",
            state.bundle.table(kind).n_rows()
        ));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top toolbar: title, trace summary, and the error status from
/// the last rebuild, if any.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(RichText::new("VMT Dashboard").strong());
        ui.separator();

        ui.label(format!(
            "{} of {} datasets shown, {} traces",
            state.selection.len(),
            DatasetKind::ALL.len(),
            state.chart.traces.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
