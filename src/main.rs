mod app;
mod chart;
mod color;
mod data;
mod state;
mod ui;

use std::path::Path;

use anyhow::Context;
use eframe::egui;

use app::VmtDashboardApp;
use data::loader::DatasetStore;
use data::model::{DatasetKind, DatasetPaths};
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // All five tables are read once here; the UI never touches the
    // filesystem again. A load failure is fatal — there is no dashboard
    // without its data.
    let paths = DatasetPaths::load_or_default(Path::new("dashboard.json"))
        .context("reading dashboard configuration")?;
    let mut store = DatasetStore::new(paths);
    let bundle = store.bundle().context("loading VMT datasets")?;
    for kind in DatasetKind::ALL {
        log::info!("{kind}: {} rows", bundle.table(kind).n_rows());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let state = AppState::new(bundle);
    eframe::run_native(
        "VMT Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(VmtDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running UI: {e}"))
}
