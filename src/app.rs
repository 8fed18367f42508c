use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use egui::Color32;

use planboard_timeline::config::AppSettings;
use planboard_timeline::engine::{
    DragState, TimelineCallbacks, TimelineChart, ZoomController,
};
use planboard_timeline::io::{self, StoreCommand, TaskStore};
use planboard_timeline::model::dates::{self, shift_days};
use planboard_timeline::model::{Dependency, DependencyId, DependencyKind, Project, TaskBar, TaskId};

use crate::ui;
use crate::ui::gantt_chart::EguiPointerCapture;

/// Messages from the chart callbacks to the host.
#[derive(Debug)]
enum ChartEvent {
    Store(StoreCommand),
    Activated(TaskId),
}

/// Main application state.
pub struct TimelineApp {
    pub store: TaskStore,
    pub chart: TimelineChart,
    pub file_path: Option<PathBuf>,
    pub status_message: String,
    events: Receiver<ChartEvent>,
    settings: AppSettings,
    settings_path: Option<PathBuf>,
}

impl TimelineApp {
    pub fn new(cc: &eframe::CreationContext<'_>, path: Option<PathBuf>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let settings_path = match AppSettings::default_path() {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(error = %e, "settings will not be persisted");
                None
            }
        };
        let settings = settings_path
            .as_deref()
            .map(AppSettings::load_or_default)
            .unwrap_or_default();

        let (tx, events) = mpsc::channel();
        let ctx = cc.egui_ctx.clone();
        let mut chart = TimelineChart::new(settings.chart, chart_callbacks(tx))
            .with_pointer_capture(Box::new(EguiPointerCapture::new(cc.egui_ctx.clone())))
            .with_zoom(ZoomController::with_scale(settings.zoom_scale))
            .with_time_scale(settings.time_scale);
        chart.subscribe(move |state: &DragState| {
            tracing::trace!(?state, "drag state");
            ctx.request_repaint();
        });

        let latency = Duration::from_millis(settings.simulated_latency_ms);
        let mut app = Self {
            store: TaskStore::new(sample_project(dates::today())).with_latency(latency),
            chart,
            file_path: None,
            status_message: "Ready".to_string(),
            events,
            settings,
            settings_path,
        };

        if let Some(path) = path.or_else(|| app.settings.last_file.clone()) {
            app.load_from(path);
        }
        app
    }

    // --- File operations ---

    pub fn load_sample(&mut self) {
        self.chart.cancel_gesture();
        self.chart.reset_range();
        self.store.replace(sample_project(dates::today()));
        self.file_path = None;
        self.status_message = "Sample project loaded".to_string();
    }

    pub fn open_project(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Timeline Project", &["json"])
            .pick_file()
        {
            self.load_from(path);
        }
    }

    fn load_from(&mut self, path: PathBuf) {
        match io::load_project(&path) {
            Ok(project) => {
                self.chart.cancel_gesture();
                self.chart.reset_range();
                self.store.replace(project);
                self.status_message = format!("Loaded {}", path.display());
                self.file_path = Some(path);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load project");
                self.status_message = format!("Error loading: {}", e);
            }
        }
    }

    pub fn save_project(&mut self) {
        if let Some(path) = self.file_path.clone() {
            self.write_to(&path);
        } else {
            self.save_project_as();
        }
    }

    pub fn save_project_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Timeline Project", &["json"])
            .set_file_name(format!("{}.json", self.store.project().name))
            .save_file()
        {
            self.write_to(&path);
            self.file_path = Some(path);
        }
    }

    fn write_to(&mut self, path: &std::path::Path) {
        self.status_message = match io::save_project(self.store.project(), path) {
            Ok(()) => "Project saved".to_string(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to save project");
                format!("Error saving: {}", e)
            }
        };
    }

    // --- Store plumbing ---

    fn drain_events(&mut self) {
        let now = Instant::now();
        while let Ok(event) = self.events.try_recv() {
            match event {
                ChartEvent::Store(command) => self.store.submit(command, now),
                ChartEvent::Activated(id) => {
                    let project = self.store.project();
                    let name = project.task_name(id).unwrap_or("?").to_string();
                    let item = project.find_task(id).and_then(|t| t.linked_item);
                    tracing::info!(task = %id, ?item, "task activated");
                    self.status_message = match item {
                        Some(item) => format!("Open work item #{item} ('{name}')"),
                        None => format!("'{name}' has no linked work item"),
                    };
                }
            }
        }

        for (command, result) in self.store.poll(now) {
            self.status_message = match (&command, result) {
                (_, Err(e)) => format!("Update rejected: {e}"),
                (StoreCommand::UpdateDates { task, dates }, Ok(())) => format!(
                    "Updated '{}' ({} → {})",
                    self.store.project().task_name(*task).unwrap_or("?"),
                    dates.start,
                    dates.end
                ),
                (StoreCommand::CreateDependency { .. }, Ok(())) => "Dependency added".to_string(),
                (StoreCommand::DeleteDependency(_), Ok(())) => "Dependency removed".to_string(),
            };
        }
    }

    fn persist_settings(&mut self) {
        let current = AppSettings {
            time_scale: self.chart.time_scale(),
            zoom_scale: self.chart.zoom().scale(),
            chart: *self.chart.config(),
            simulated_latency_ms: self.settings.simulated_latency_ms,
            last_file: self.file_path.clone(),
        };
        if current == self.settings {
            return;
        }
        if let Some(path) = &self.settings_path {
            if let Err(e) = current.save(path) {
                tracing::warn!(error = %e, "failed to save settings");
            }
        }
        self.settings = current;
    }
}

fn chart_callbacks(tx: Sender<ChartEvent>) -> TimelineCallbacks {
    let dates_tx = tx.clone();
    let link_tx = tx.clone();
    let unlink_tx = tx.clone();
    TimelineCallbacks::new()
        .on_bar_dates_changed(move |task, dates| {
            let _ = dates_tx.send(ChartEvent::Store(StoreCommand::UpdateDates { task, dates }));
        })
        .on_dependency_create_requested(move |predecessor, successor| {
            let _ = link_tx.send(ChartEvent::Store(StoreCommand::CreateDependency {
                predecessor,
                successor,
            }));
        })
        .on_dependency_delete_requested(move |id| {
            let _ = unlink_tx.send(ChartEvent::Store(StoreCommand::DeleteDependency(id)));
        })
        .on_bar_activated(move |id| {
            let _ = tx.send(ChartEvent::Activated(id));
        })
}

/// A small project laid out around `today`.
fn sample_project(today: NaiveDate) -> Project {
    let at = |days: i64| shift_days(today, days);
    let mut project = Project::new("Website Relaunch");
    project.id = 1;

    project.tasks = vec![
        TaskBar::new(1, "Planning", at(-6), at(7))
            .with_color(Color32::from_rgb(70, 120, 180))
            .with_progress(70)
            .with_children(vec![
                TaskBar::new(2, "Kickoff", at(-6), at(-4))
                    .with_progress(100)
                    .with_color(Color32::from_rgb(70, 130, 180))
                    .with_linked_item(101),
                TaskBar::new(3, "Requirements", at(-3), at(4))
                    .with_progress(60)
                    .with_color(Color32::from_rgb(60, 179, 113))
                    .with_linked_item(102),
                TaskBar::new(4, "Sign-off", at(6), at(7)),
            ]),
        TaskBar::new(5, "Execution", at(9), at(34))
            .with_color(Color32::from_rgb(180, 100, 50))
            .with_children(vec![
                TaskBar::new(6, "UI Design", at(9), at(18))
                    .with_color(Color32::from_rgb(218, 112, 214))
                    .with_linked_item(103),
                TaskBar::new(7, "Backend", at(12), at(28))
                    .with_color(Color32::from_rgb(106, 90, 205)),
                TaskBar::new(8, "Testing & QA", at(29), at(34))
                    .with_color(Color32::from_rgb(220, 20, 60)),
            ]),
        TaskBar::new(9, "Launch", at(36), at(36)).with_color(Color32::from_rgb(255, 193, 7)),
    ];

    let link = |id: u64, from: u64, to: u64, kind: DependencyKind| Dependency {
        id: DependencyId(id),
        predecessor: TaskId(from),
        successor: TaskId(to),
        kind,
        lag: 0,
    };
    project.dependencies = vec![
        link(1, 2, 3, DependencyKind::FinishToStart),
        link(2, 3, 4, DependencyKind::FinishToStart),
        link(3, 4, 6, DependencyKind::FinishToStart),
        link(4, 6, 7, DependencyKind::StartToStart),
        link(5, 7, 8, DependencyKind::FinishToStart),
        link(6, 8, 9, DependencyKind::FinishToStart),
    ];
    project
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let should_save = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S));
        if should_save {
            self.save_project();
        }

        if let Some(fullscreen) = ctx.input(|i| i.viewport().fullscreen) {
            self.chart.set_fullscreen(fullscreen);
        }

        self.drain_events();
        self.chart.set_updating(self.store.has_pending());
        if let Some(wait) = self.store.next_due(Instant::now()) {
            ctx.request_repaint_after(wait);
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_sub())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Tasks: {}", self.store.project().task_count()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Right panel: dependencies
        egui::SidePanel::right("dependency_panel")
            .default_width(300.0)
            .min_width(220.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                if let Some(message) = ui::dependency_panel::show_dependency_panel(
                    &mut self.chart,
                    self.store.project(),
                    ui,
                ) {
                    self.status_message = message;
                }
            });

        // Central panel: timeline
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            let interaction =
                ui::gantt_chart::show_gantt_chart(&mut self.chart, self.store.project(), ui);
            if interaction.committed.is_some() {
                self.status_message = "Saving…".to_string();
            }
        });

        // Writes submitted this frame show the overlay immediately.
        self.drain_events();
        self.chart.set_updating(self.store.has_pending());

        self.persist_settings();
    }
}
