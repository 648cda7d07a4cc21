use eframe::egui::Ui;
use egui_plot::{Line, LineStyle, Plot, PlotPoints, Points};

use crate::chart::TraceStyle;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// VMT plot (central panel)
// ---------------------------------------------------------------------------

/// Render the current chart. An empty selection shows an empty plot; the
/// traces drawn are exactly those in `state.chart`.
pub fn vmt_plot(ui: &mut Ui, state: &AppState) {
    Plot::new("vmt_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Period")
        .y_axis_label("VMT")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for trace in &state.chart.traces {
                let color = state.colors.color_for(trace.name);
                let points: PlotPoints = trace.points.iter().copied().collect();

                match trace.style {
                    TraceStyle::Markers => {
                        plot_ui.points(
                            Points::new(points)
                                .name(trace.name)
                                .color(color)
                                .radius(1.0),
                        );
                    }
                    TraceStyle::LineMarkers => {
                        plot_ui.line(
                            Line::new(points)
                                .name(trace.name)
                                .color(color)
                                .width(1.5),
                        );
                        let markers: PlotPoints = trace.points.iter().copied().collect();
                        plot_ui.points(
                            Points::new(markers)
                                .name(trace.name)
                                .color(color)
                                .radius(2.5),
                        );
                    }
                    TraceStyle::DashedLine => {
                        plot_ui.line(
                            Line::new(points)
                                .name(trace.name)
                                .color(color)
                                .width(2.0)
                                .style(LineStyle::dashed_loose()),
                        );
                    }
                    TraceStyle::DottedLine => {
                        plot_ui.line(
                            Line::new(points)
                                .name(trace.name)
                                .color(color)
                                .width(2.0)
                                .style(LineStyle::dotted_dense()),
                        );
                    }
                }
            }
        });
}
