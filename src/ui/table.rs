use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

/// Read-only preview of the first rows of the loaded table.
pub fn data_preview(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };

    let shown = table.len().min(state.config.preview_rows);
    ui.label(format!("Showing {shown} of {} rows", table.len()));

    if table.width() == 0 {
        return;
    }

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0), table.width())
            .header(20.0, |mut header| {
                for name in table.headers() {
                    header.col(|ui: &mut Ui| {
                        ui.label(RichText::new(name).strong());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, shown, |mut row| {
                    let cells = &table.rows()[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            if cell.is_null() {
                                ui.weak("—");
                            } else {
                                ui.label(cell.to_string());
                            }
                        });
                    }
                });
            });
    });
}
