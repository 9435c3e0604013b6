//! egui rendering of the viewer panels
//!
//! Panels only read application state. Whatever the user does is collected as
//! [`PanelAction`]s during the frame and applied afterwards with [`apply`].

use egui::{RichText, Ui};

use crate::{
    app::AppContext,
    controllers::{
        filter::{FilterController, LayerFilter},
        search::SearchController,
    },
    ui::{legend::Legend, popup::Popup, status::MapStatus},
    Result,
};

/// A command raised by a panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    SetVisible(String, bool),
    SetOpacity(String, f32),
    MoveLayer(String, isize),
    ApplyFilter(LayerFilter),
    HoverSuggestion(usize),
    SelectSuggestion(usize),
    ZoomToResult(usize),
    ClosePopup,
    ToggleMeasure,
    ZoomToExtent,
    ShowHelp,
}

/// Applies the actions collected during a frame, in order
pub fn apply(app: &mut AppContext, actions: Vec<PanelAction>) -> Result<()> {
    for action in actions {
        match action {
            PanelAction::SetVisible(name, visible) => app.set_layer_visible(&name, visible)?,
            PanelAction::SetOpacity(name, opacity) => {
                app.set_layer_opacity(&name, opacity)?;
            }
            PanelAction::MoveLayer(name, offset) => app.move_layer(&name, offset)?,
            PanelAction::ApplyFilter(filter) => app.apply_filter(filter),
            PanelAction::HoverSuggestion(index) => app.hover_suggestion(index),
            PanelAction::SelectSuggestion(index) => {
                app.select_suggestion(index);
            }
            PanelAction::ZoomToResult(index) => {
                app.zoom_to_result(index);
            }
            PanelAction::ClosePopup => app.close_popup(),
            PanelAction::ToggleMeasure => {
                app.toggle_measure();
            }
            PanelAction::ZoomToExtent => app.zoom_to_extent(),
            PanelAction::ShowHelp => app.show_help(),
        }
    }
    Ok(())
}

pub fn toolbar(ui: &mut Ui, app: &AppContext, actions: &mut Vec<PanelAction>) {
    ui.horizontal(|ui| {
        if ui.button("Zoom to extent").clicked() {
            actions.push(PanelAction::ZoomToExtent);
        }
        let measure_label = if app.measure().is_measuring() {
            "Cancel"
        } else {
            "Measure"
        };
        if ui.button(measure_label).clicked() {
            actions.push(PanelAction::ToggleMeasure);
        }
        if ui.button("Help").clicked() {
            actions.push(PanelAction::ShowHelp);
        }
    });
}

pub fn filter_bar(ui: &mut Ui, filter: &FilterController, actions: &mut Vec<PanelAction>) {
    ui.horizontal(|ui| {
        for option in LayerFilter::ALL {
            if ui
                .selectable_label(filter.active() == option, option.label())
                .clicked()
            {
                actions.push(PanelAction::ApplyFilter(option));
            }
        }
    });
}

/// Layer list: visibility checkbox, opacity slider and reorder buttons per row
pub fn layer_list(ui: &mut Ui, app: &AppContext, actions: &mut Vec<PanelAction>) {
    let registry = app.registry();
    let last = registry.len().saturating_sub(1);

    for (position, entry) in registry.list().enumerate() {
        if !app.filter().row_visible(entry.name()) {
            continue;
        }
        let name = entry.name().to_string();

        ui.horizontal(|ui| {
            ui.add_enabled_ui(position > 0, |ui| {
                if ui.small_button("▲").clicked() {
                    actions.push(PanelAction::MoveLayer(name.clone(), -1));
                }
            });
            ui.add_enabled_ui(position < last, |ui| {
                if ui.small_button("▼").clicked() {
                    actions.push(PanelAction::MoveLayer(name.clone(), 1));
                }
            });

            let mut visible = entry.is_visible();
            if ui.checkbox(&mut visible, entry.name()).changed() {
                actions.push(PanelAction::SetVisible(name.clone(), visible));
            }

            let mut opacity = entry.opacity();
            let slider = egui::Slider::new(&mut opacity, 0.0..=1.0)
                .step_by(0.05)
                .show_value(false);
            if ui.add_enabled(entry.opacity_enabled(), slider).changed() {
                actions.push(PanelAction::SetOpacity(name.clone(), opacity));
            }
            ui.label(format!("{}%", (entry.opacity() * 100.0).round() as i32));
        });
    }
}

pub fn legend_panel(ui: &mut Ui, legend: &Legend) {
    if !legend.is_visible() {
        return;
    }
    ui.heading("Legend");
    for entry in legend.entries() {
        ui.horizontal(|ui| {
            ui.add(
                egui::Image::new(entry.icon_url.as_str())
                    .fit_to_exact_size(egui::vec2(20.0, 20.0)),
            );
            ui.label(&entry.name);
        });
    }
}

pub fn popup_panel(ui: &mut Ui, popup: Option<&Popup>, actions: &mut Vec<PanelAction>) {
    let Some(popup) = popup else {
        return;
    };
    ui.group(|ui| {
        let text = RichText::new(popup.content.to_string());
        if popup.content.is_error() {
            ui.label(text.color(ui.visuals().error_fg_color));
        } else {
            ui.label(text);
        }
        if ui.small_button("Close").clicked() {
            actions.push(PanelAction::ClosePopup);
        }
    });
}

pub fn suggestion_list(ui: &mut Ui, search: &SearchController, actions: &mut Vec<PanelAction>) {
    if !search.suggestions_visible() {
        return;
    }
    for (index, suggestion) in search.suggestions().iter().enumerate() {
        let text = format!(
            "{} {}\n{}    {}",
            suggestion.glyph().as_str(),
            suggestion.primary_name(),
            suggestion.secondary_context(),
            suggestion.coords_text()
        );
        let response = ui.selectable_label(search.highlighted() == Some(index), text);
        if response.hovered() && search.highlighted() != Some(index) {
            actions.push(PanelAction::HoverSuggestion(index));
        }
        if response.clicked() {
            actions.push(PanelAction::SelectSuggestion(index));
        }
    }
    ui.label(RichText::new(search.announcement()).small().weak());
}

/// Search result list with a zoom button per marker
pub fn result_list(ui: &mut Ui, search: &SearchController, actions: &mut Vec<PanelAction>) {
    for (index, result) in search.results().iter().enumerate() {
        ui.horizontal(|ui| {
            ui.label(format!("📍 {}", result.primary_name()));
            if ui.small_button("Zoom").clicked() {
                actions.push(PanelAction::ZoomToResult(index));
            }
        });
    }
}

pub fn status_bar(ui: &mut Ui, status: &MapStatus) {
    ui.horizontal(|ui| {
        ui.label(status.coordinates_text());
        ui.separator();
        ui.label(status.zoom_text());
        ui.separator();
        ui.label(status.scale_text());
        ui.separator();
        ui.label(status.layers_text());
    });
}
