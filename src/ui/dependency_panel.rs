use egui::{Color32, RichText, Ui};
use egui_phosphor::regular as icons;

use planboard_timeline::engine::TimelineChart;
use planboard_timeline::model::{Project, TaskId};

use crate::ui::theme;

/// Picker selections, kept in egui temp storage between frames.
#[derive(Debug, Clone, Copy, Default)]
struct LinkPickerState {
    predecessor: Option<TaskId>,
    successor: Option<TaskId>,
}

/// Dependency list with delete buttons plus the "add link" form. Returns a
/// status line when something was requested or refused.
pub fn show_dependency_panel(
    chart: &mut TimelineChart,
    project: &Project,
    ui: &mut Ui,
) -> Option<String> {
    let mut status = None;
    let name_of = |id: TaskId| {
        project
            .task_name(id)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("{id} (missing)"))
    };

    ui.add_space(6.0);
    ui.label(
        RichText::new(format!("Dependencies ({})", project.dependencies.len()))
            .font(theme::font_header())
            .strong(),
    );
    ui.add_space(2.0);

    let can_delete = chart.callbacks().can_delete_dependencies();
    let mut delete = None;
    egui::ScrollArea::vertical()
        .id_salt("dependency-list")
        .max_height(220.0)
        .show(ui, |ui| {
            if project.dependencies.is_empty() {
                ui.label(RichText::new("No dependencies").color(theme::TEXT_DIM));
            }
            for dep in &project.dependencies {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(format!(
                            "{} {} {}",
                            name_of(dep.predecessor),
                            icons::ARROW_RIGHT,
                            name_of(dep.successor)
                        ))
                        .size(11.0),
                    );
                    ui.label(
                        RichText::new(format!("({})", dep.kind.short_label()))
                            .size(10.0)
                            .color(theme::TEXT_DIM),
                    );
                    if can_delete {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui
                                .small_button(icons::TRASH)
                                .on_hover_text("Remove dependency")
                                .clicked()
                            {
                                delete = Some(dep.id);
                            }
                        });
                    }
                });
            }
        });

    if let Some(id) = delete {
        if chart.request_dependency_delete(id) {
            status = Some(format!("Removing dependency {id}"));
        }
    }

    let mut candidates = Vec::new();
    project.for_each_task(|t| candidates.push((t.id, t.name.clone())));
    if !chart.callbacks().can_create_dependencies() || candidates.len() < 2 {
        return status;
    }

    ui.add_space(6.0);
    ui.label(
        RichText::new("Add dependency")
            .size(10.0)
            .color(theme::TEXT_DIM)
            .strong(),
    );

    let picker_id = ui.make_persistent_id("link-picker");
    let mut state: LinkPickerState = ui.ctx().data_mut(|d| d.get_temp(picker_id).unwrap_or_default());
    let label_for = |id: Option<TaskId>| {
        id.and_then(|id| candidates.iter().find(|(cid, _)| *cid == id))
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| "pick task".to_string())
    };

    let combo_w = (ui.available_width() / 2.0 - 24.0).clamp(60.0, 180.0);
    ui.horizontal(|ui| {
        egui::ComboBox::from_id_salt("link-predecessor")
            .selected_text(RichText::new(label_for(state.predecessor)).size(11.0))
            .width(combo_w)
            .show_ui(ui, |ui| {
                for (id, name) in &candidates {
                    ui.selectable_value(&mut state.predecessor, Some(*id), name.as_str());
                }
            });
        ui.label(icons::ARROW_RIGHT);
        egui::ComboBox::from_id_salt("link-successor")
            .selected_text(RichText::new(label_for(state.successor)).size(11.0))
            .width(combo_w)
            .show_ui(ui, |ui| {
                for (id, name) in &candidates {
                    ui.selectable_value(&mut state.successor, Some(*id), name.as_str());
                }
            });
    });

    let pair = match (state.predecessor, state.successor) {
        (Some(p), Some(s)) if p != s => Some((p, s)),
        _ => None,
    };
    let button = egui::Button::new(RichText::new(format!("{} Add", icons::PLUS)).color(Color32::WHITE))
        .fill(if pair.is_some() { theme::ACCENT } else { theme::BG_HEADER });
    if ui.add_enabled(pair.is_some(), button).clicked() {
        if let Some((predecessor, successor)) = pair {
            match chart.request_dependency(project, predecessor, successor) {
                Ok(_) => {
                    status = Some(format!(
                        "Linking '{}' → '{}'",
                        name_of(predecessor),
                        name_of(successor)
                    ));
                    state = LinkPickerState::default();
                }
                Err(e) => status = Some(e.to_string()),
            }
        }
    }

    ui.ctx().data_mut(|d| d.insert_temp(picker_id, state));
    status
}
