use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::reshape::DrawMode;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – axis and grouping controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Plot");
    ui.separator();

    let headers = match &state.table {
        Some(table) if table.width() > 0 => table.headers().to_vec(),
        Some(_) => {
            ui.label("The dataset has no columns.");
            return;
        }
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // ---- Axis selectors ----
    ui.strong("X-axis");
    let current_x = state.axes.x.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("x_axis")
        .selected_text(&current_x)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &headers {
                if ui.selectable_label(current_x == *col, col).clicked() {
                    state.set_x(col);
                }
            }
        });

    ui.strong("Y-axis");
    let current_y = state.axes.y.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("y_axis")
        .selected_text(&current_y)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &headers {
                if ui.selectable_label(current_y == *col, col).clicked() {
                    state.set_y(col);
                }
            }
        });
    ui.separator();

    // ---- Grouping (needs a third column) ----
    if let Some(group) = state.axes.group.clone() {
        ui.strong("Group by");
        ui.label(&group.name);

        // Checked: only the chosen value is plotted.
        // Unchecked: one series per value.
        let mut single = state.grouping.enabled;
        if ui.checkbox(&mut single, "Single group only").changed() {
            state.set_grouping(single);
        }

        if state.grouping.enabled {
            let current = state
                .grouping
                .value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default();
            let values: Vec<_> = state.grouping.distinct.iter().cloned().collect();
            egui::ComboBox::from_id_salt("group_value")
                .selected_text(current)
                .show_ui(ui, |ui: &mut Ui| {
                    for value in values {
                        let selected = state.grouping.value.as_ref() == Some(&value);
                        let mut text = RichText::new(value.to_string());
                        if let Some(cm) = &state.color_map {
                            text = text.color(cm.color_for(Some(&value)));
                        }
                        if ui.selectable_label(selected, text).clicked() {
                            state.set_group_value(value);
                        }
                    }
                });
        }
        ui.separator();
    }
    if !state.grouping_available() {
        ui.weak("Grouping needs at least three columns.");
        ui.separator();
    }

    // ---- Draw mode ----
    ui.strong("Mode");
    ui.horizontal(|ui: &mut Ui| {
        for mode in DrawMode::ALL {
            if ui
                .selectable_label(state.grouping.mode == mode, mode.label())
                .clicked()
            {
                state.set_mode(mode);
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar with the dataset picker.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        dataset_picker(ui, state);

        if ui.button("Load Data").clicked() {
            state.load_selected();
        }

        if state.loading() {
            ui.spinner();
        }

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} rows, {} columns, {} series",
                table.len(),
                table.width(),
                state.series.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Searchable dropdown over the dataset catalog.
fn dataset_picker(ui: &mut Ui, state: &mut AppState) {
    let selected_text = state
        .selected_entry
        .as_ref()
        .map(|e| e.label.clone())
        .unwrap_or_else(|| "Select a file".to_string());

    egui::ComboBox::from_id_salt("dataset_picker")
        .width(220.0)
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            ui.add(
                egui::TextEdit::singleline(&mut state.catalog_query)
                    .hint_text("Search…")
                    .desired_width(200.0),
            );
            ui.separator();

            let mut picked = None;
            for entry in state.config.catalog.search(&state.catalog_query) {
                let selected = state.selected_entry.as_ref() == Some(entry);
                if ui.selectable_label(selected, &entry.label).clicked() {
                    picked = Some(entry.clone());
                }
            }
            if picked.is_some() {
                state.selected_entry = picked;
                state.catalog_query.clear();
            }
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open spreadsheet")
        .set_directory(&state.config.datasets_dir)
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Excel / OpenDocument", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(path);
    }
}
