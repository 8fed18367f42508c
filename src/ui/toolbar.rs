use egui::{menu, RichText, Ui};
use egui_extras::DatePickerButton;
use egui_phosphor::regular as icons;

use planboard_timeline::model::TimeScale;

use crate::app::TimelineApp;
use crate::ui::theme;

/// Render the menu bar and the timeline controls.
pub fn show_toolbar(app: &mut TimelineApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_header()), |ui| {
            if ui.button(format!("{} Open...", icons::FOLDER_OPEN)).clicked() {
                app.open_project();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{} Save          Ctrl+S", icons::FLOPPY_DISK)).clicked() {
                app.save_project();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_project_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Load Sample").clicked() {
                app.load_sample();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_header()), |ui| {
            if ui
                .add_enabled(app.chart.zoom().can_zoom_in(), egui::Button::new("  Zoom In        Ctrl+Scroll ↑"))
                .clicked()
            {
                app.chart.zoom_in();
                ui.close_menu();
            }
            if ui
                .add_enabled(app.chart.zoom().can_zoom_out(), egui::Button::new("  Zoom Out      Ctrl+Scroll ↓"))
                .clicked()
            {
                app.chart.zoom_out();
                ui.close_menu();
            }
            ui.separator();
            ui.label(RichText::new("Timeline Scale").small().weak());
            for scale in TimeScale::ALL {
                if ui
                    .radio(app.chart.time_scale() == scale, scale.label())
                    .clicked()
                {
                    app.chart.set_time_scale(scale);
                    ui.close_menu();
                }
            }
            ui.separator();
            let mut read_only = app.chart.config().read_only;
            if ui.checkbox(&mut read_only, "Read only").changed() {
                let mut config = *app.chart.config();
                config.read_only = read_only;
                app.chart.set_config(config);
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let modified = if app.file_path.is_some() { "" } else { " (unsaved)" };
            ui.label(
                RichText::new(format!("{}{}", app.store.project().name, modified))
                    .size(11.0)
                    .weak(),
            );
        });
    });

    ui.add_space(2.0);
    ui.horizontal(|ui| {
        let axis = app.chart.axis(app.store.project());
        ui.label(
            RichText::new(format!(
                "{} – {}",
                axis.min().format("%d %b %Y"),
                axis.max().format("%d %b %Y")
            ))
            .color(theme::TEXT_SECONDARY),
        );
        ui.separator();

        let range = app.chart.range();
        ui.label("From");
        let mut from = range.start.unwrap_or(axis.min());
        if ui
            .add(DatePickerButton::new(&mut from).id_salt("range-from"))
            .changed()
        {
            app.chart.set_range_start(Some(from));
        }
        ui.label("To");
        let mut to = range.end.unwrap_or(axis.max());
        if ui
            .add(DatePickerButton::new(&mut to).id_salt("range-to"))
            .changed()
        {
            app.chart.set_range_end(Some(to));
        }
        if ui
            .add_enabled(range.is_active(), egui::Button::new("Auto"))
            .on_hover_text("Fit the range to the tasks")
            .clicked()
        {
            app.chart.reset_range();
        }
        ui.separator();

        let mut scale = app.chart.time_scale();
        egui::ComboBox::from_id_salt("time-scale")
            .selected_text(scale.label())
            .width(80.0)
            .show_ui(ui, |ui| {
                for option in TimeScale::ALL {
                    ui.selectable_value(&mut scale, option, option.label());
                }
            });
        if scale != app.chart.time_scale() {
            app.chart.set_time_scale(scale);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let fullscreen_icon = if app.chart.is_fullscreen() {
                icons::CORNERS_IN
            } else {
                icons::CORNERS_OUT
            };
            if ui
                .button(fullscreen_icon)
                .on_hover_text("Toggle fullscreen")
                .clicked()
            {
                let fullscreen = app.chart.toggle_fullscreen();
                ui.ctx()
                    .send_viewport_cmd(egui::ViewportCommand::Fullscreen(fullscreen));
            }
            ui.separator();

            if ui
                .add_enabled(app.chart.zoom().can_zoom_in(), egui::Button::new(icons::MAGNIFYING_GLASS_PLUS))
                .on_hover_text("Zoom in")
                .clicked()
            {
                app.chart.zoom_in();
            }
            ui.label(
                RichText::new(format!("{:.0}%", app.chart.zoom().scale() * 100.0))
                    .color(theme::TEXT_SECONDARY),
            );
            if ui
                .add_enabled(app.chart.zoom().can_zoom_out(), egui::Button::new(icons::MAGNIFYING_GLASS_MINUS))
                .on_hover_text("Zoom out")
                .clicked()
            {
                app.chart.zoom_out();
            }
        });
    });
    ui.add_space(2.0);
}
