use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use egui::{Color32, Pos2, Rect};
use serde::{Deserialize, Serialize};

use super::drag::{BarDates, DateChange, DragController, DragObserver, PointerCapture};
use super::geometry::{effective_dates, BarGeometry};
use super::router::{DependencyRouter, Edge};
use super::zoom::ZoomController;
use crate::error::StoreError;
use crate::model::dates::today;
use crate::model::{
    DependencyId, HeaderCell, Project, RangeOverride, RowIndex, TaskId, TimeAxis, TimeScale,
};

pub const ROW_HEIGHT: f32 = 40.0;
/// Month row plus scale row.
pub const HEADER_HEIGHT: f32 = 48.0;
/// Width of the resize zone at a bar's right edge.
pub const HANDLE_WIDTH: f32 = 8.0;

/// Per-instance behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub allow_reschedule: bool,
    pub allow_resize: bool,
    pub read_only: bool,
    /// Fire the dates callback even when a gesture ends where it started.
    pub commit_unchanged: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            allow_reschedule: true,
            allow_resize: true,
            read_only: false,
            commit_unchanged: false,
        }
    }
}

type DatesCallback = Box<dyn FnMut(TaskId, BarDates)>;
type LinkCallback = Box<dyn FnMut(TaskId, TaskId)>;
type UnlinkCallback = Box<dyn FnMut(DependencyId)>;
type ActivateCallback = Box<dyn FnMut(TaskId)>;

/// Outbound hooks to the task store and the host. Each one is optional;
/// a missing hook disables the matching interaction.
#[derive(Default)]
pub struct TimelineCallbacks {
    on_bar_dates_changed: Option<DatesCallback>,
    on_dependency_create_requested: Option<LinkCallback>,
    on_dependency_delete_requested: Option<UnlinkCallback>,
    on_bar_activated: Option<ActivateCallback>,
}

impl TimelineCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_bar_dates_changed(mut self, f: impl FnMut(TaskId, BarDates) + 'static) -> Self {
        self.on_bar_dates_changed = Some(Box::new(f));
        self
    }

    pub fn on_dependency_create_requested(
        mut self,
        f: impl FnMut(TaskId, TaskId) + 'static,
    ) -> Self {
        self.on_dependency_create_requested = Some(Box::new(f));
        self
    }

    pub fn on_dependency_delete_requested(mut self, f: impl FnMut(DependencyId) + 'static) -> Self {
        self.on_dependency_delete_requested = Some(Box::new(f));
        self
    }

    pub fn on_bar_activated(mut self, f: impl FnMut(TaskId) + 'static) -> Self {
        self.on_bar_activated = Some(Box::new(f));
        self
    }

    pub fn can_create_dependencies(&self) -> bool {
        self.on_dependency_create_requested.is_some()
    }

    pub fn can_delete_dependencies(&self) -> bool {
        self.on_dependency_delete_requested.is_some()
    }
}

impl std::fmt::Debug for TimelineCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineCallbacks")
            .field("on_bar_dates_changed", &self.on_bar_dates_changed.is_some())
            .field(
                "on_dependency_create_requested",
                &self.on_dependency_create_requested.is_some(),
            )
            .field(
                "on_dependency_delete_requested",
                &self.on_dependency_delete_requested.is_some(),
            )
            .field("on_bar_activated", &self.on_bar_activated.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub x: f32,
    pub kind: GridKind,
}

/// One flattened task row, ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub task_id: TaskId,
    pub name: String,
    pub depth: usize,
    pub row: usize,
    /// Dates as drawn, i.e. the live preview for the dragged bar.
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub geometry: BarGeometry,
    /// Chart coordinates, origin at the top left of the first row.
    pub rect: Rect,
    pub progress: u8,
    pub color: Option<Color32>,
    pub dragging: bool,
    pub activatable: bool,
}

impl BarRow {
    pub fn handle_rect(&self) -> Rect {
        let left = (self.rect.right() - HANDLE_WIDTH).max(self.rect.left());
        Rect::from_min_max(Pos2::new(left, self.rect.top()), self.rect.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    ResizeHandle(TaskId),
    Body(TaskId),
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub axis: TimeAxis,
    pub scale: TimeScale,
    pub day_width: f32,
    pub row_height: f32,
    pub header_height: f32,
    pub chart_width: f32,
    pub chart_height: f32,
    pub month_row: Vec<HeaderCell>,
    pub scale_row: Vec<HeaderCell>,
    pub grid_lines: Vec<GridLine>,
    pub bars: Vec<BarRow>,
    pub edges: Vec<Edge>,
    pub today_x: Option<f32>,
    pub show_handles: bool,
    pub empty: bool,
    by_id: HashMap<TaskId, usize>,
}

impl ChartLayout {
    pub fn bar(&self, id: TaskId) -> Option<&BarRow> {
        self.by_id.get(&id).and_then(|&row| self.bars.get(row))
    }

    /// Horizontal extent `(x, width)` of a header cell.
    pub fn cell_span(&self, cell: &HeaderCell) -> (f32, f32) {
        (
            self.axis.date_to_x(cell.start, self.day_width),
            cell.span_days as f32 * self.day_width,
        )
    }

    /// The bar under `pos` (chart coordinates). The resize handle wins over
    /// the body when handles are shown.
    pub fn hit_test(&self, pos: Pos2) -> Option<HitTarget> {
        let row = (pos.y / self.row_height).floor();
        if !row.is_finite() || row < 0.0 {
            return None;
        }
        let bar = self
            .bars
            .get(row as usize)
            .filter(|b| b.rect.contains(pos))?;
        if self.show_handles && bar.handle_rect().contains(pos) {
            Some(HitTarget::ResizeHandle(bar.task_id))
        } else {
            Some(HitTarget::Body(bar.task_id))
        }
    }
}

pub struct TimelineChart {
    config: TimelineConfig,
    callbacks: TimelineCallbacks,
    zoom: ZoomController,
    drag: DragController,
    scale: TimeScale,
    range: RangeOverride,
    fullscreen: bool,
    updating: bool,
    today: NaiveDate,
}

impl TimelineChart {
    pub fn new(config: TimelineConfig, callbacks: TimelineCallbacks) -> Self {
        let mut drag = DragController::default();
        drag.set_commit_unchanged(config.commit_unchanged);
        Self {
            config,
            callbacks,
            zoom: ZoomController::new(),
            drag,
            scale: TimeScale::default(),
            range: RangeOverride::default(),
            fullscreen: false,
            updating: false,
            today: today(),
        }
    }

    /// Route gesture capture through the host. Replaces the drag
    /// controller, so call it before [`subscribe`](Self::subscribe).
    pub fn with_pointer_capture(mut self, capture: Box<dyn PointerCapture>) -> Self {
        let mut drag = DragController::new(capture);
        drag.set_commit_unchanged(self.config.commit_unchanged);
        self.drag = drag;
        self
    }

    pub fn with_zoom(mut self, zoom: ZoomController) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_time_scale(mut self, scale: TimeScale) -> Self {
        self.scale = scale;
        self
    }

    /// Pin "today" (used for the empty axis and the today marker).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TimelineConfig) {
        if config.read_only && self.drag.is_active() {
            self.drag.cancel();
        }
        self.drag.set_commit_unchanged(config.commit_unchanged);
        self.config = config;
    }

    pub fn callbacks(&self) -> &TimelineCallbacks {
        &self.callbacks
    }

    pub fn subscribe(&mut self, observer: impl DragObserver + 'static) {
        self.drag.subscribe(observer);
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn can_reschedule(&self) -> bool {
        !self.config.read_only
            && self.config.allow_reschedule
            && self.callbacks.on_bar_dates_changed.is_some()
    }

    pub fn can_resize(&self) -> bool {
        !self.config.read_only
            && self.config.allow_resize
            && self.callbacks.on_bar_dates_changed.is_some()
    }

    /// The axis the next layout would use, without building bars.
    pub fn axis(&self, project: &Project) -> TimeAxis {
        let rows = RowIndex::build(&project.tasks);
        TimeAxis::compute(self.spans(&rows), self.range, self.today)
    }

    /// Drawn dates per row, preview applied.
    fn spans(&self, rows: &RowIndex<'_>) -> Vec<(NaiveDate, NaiveDate)> {
        let preview = self.drag.preview();
        rows.iter()
            .map(|r| effective_dates(r.task, preview.as_ref()))
            .collect()
    }

    pub fn layout(&self, project: &Project) -> ChartLayout {
        let rows = RowIndex::build(&project.tasks);
        let preview = self.drag.preview();
        let spans = self.spans(&rows);
        let axis = TimeAxis::compute(spans.iter().copied(), self.range, self.today);

        let day_width = self.zoom.day_width();
        let chart_width = axis.total_width(day_width);
        let geometry: Vec<BarGeometry> = spans
            .iter()
            .map(|(start, end)| BarGeometry::from_span(*start, *end, &axis))
            .collect();

        let bars: Vec<BarRow> = rows
            .iter()
            .zip(spans.iter().zip(geometry.iter()))
            .enumerate()
            .map(|(row, (r, ((start, end), geometry)))| BarRow {
                task_id: r.task.id,
                name: r.task.name.clone(),
                depth: r.depth,
                row,
                start: *start,
                end: *end,
                geometry: *geometry,
                rect: geometry.to_rect(row, chart_width, ROW_HEIGHT),
                progress: r.task.progress,
                color: r.task.color,
                dragging: preview.is_some_and(|p| p.task_id == r.task.id),
                activatable: r.task.linked_item.is_some(),
            })
            .collect();

        let bars_by_id = bars
            .iter()
            .enumerate()
            .map(|(row, b)| (b.task_id, row))
            .collect();

        let edges = DependencyRouter::new(ROW_HEIGHT).route_all(
            &project.dependencies,
            &rows,
            &geometry,
            chart_width,
        );

        ChartLayout {
            scale: self.scale,
            day_width,
            row_height: ROW_HEIGHT,
            header_height: HEADER_HEIGHT,
            chart_width,
            chart_height: rows.len() as f32 * ROW_HEIGHT,
            month_row: axis.month_cells(),
            scale_row: axis.header_cells(self.scale),
            grid_lines: grid_lines(&axis, day_width),
            bars,
            edges,
            today_x: axis
                .contains(self.today)
                .then(|| axis.date_to_x(self.today, day_width)),
            show_handles: self.can_resize(),
            empty: rows.is_empty(),
            by_id: bars_by_id,
            axis,
        }
    }

    /// Pointer pressed at `pos` (chart coordinates). Returns whether a
    /// gesture started.
    pub fn press(&mut self, layout: &ChartLayout, pos: Pos2) -> bool {
        if self.drag.is_active() {
            return false;
        }
        match layout.hit_test(pos) {
            Some(HitTarget::ResizeHandle(id)) if self.can_resize() => match layout.bar(id) {
                Some(bar) => self.drag.begin_resize(id, bar.start, bar.end, pos.x),
                None => false,
            },
            Some(HitTarget::Body(id)) if self.can_reschedule() => match layout.bar(id) {
                Some(bar) => self.drag.begin_move(id, bar.start, bar.end, pos.x),
                None => false,
            },
            _ => false,
        }
    }

    pub fn pointer_moved(&mut self, x: f32) {
        self.drag.update(x, self.zoom.day_width());
    }

    /// Pointer released. A committed change is forwarded to the dates
    /// callback and returned.
    pub fn release(&mut self) -> Option<DateChange> {
        let change = self.drag.commit()?;
        match self.callbacks.on_bar_dates_changed.as_mut() {
            Some(callback) => callback(change.task_id, change.to_bar_dates()),
            None => tracing::debug!(task = %change.task_id, "no dates callback, change discarded"),
        }
        Some(change)
    }

    pub fn cancel_gesture(&mut self) {
        self.drag.cancel();
    }

    /// Label click. Only tasks with a linked work item activate.
    pub fn activate(&mut self, layout: &ChartLayout, id: TaskId) -> bool {
        let Some(bar) = layout.bar(id) else {
            return false;
        };
        if !bar.activatable {
            return false;
        }
        match self.callbacks.on_bar_activated.as_mut() {
            Some(callback) => {
                callback(id);
                true
            }
            None => false,
        }
    }

    /// Validate and forward a new link. `Ok(false)` when nobody listens.
    pub fn request_dependency(
        &mut self,
        project: &Project,
        predecessor: TaskId,
        successor: TaskId,
    ) -> Result<bool, StoreError> {
        if predecessor == successor {
            return Err(StoreError::SelfLink(predecessor));
        }
        for id in [predecessor, successor] {
            if project.find_task(id).is_none() {
                return Err(StoreError::UnknownTask(id));
            }
        }
        if project
            .dependencies
            .iter()
            .any(|d| d.predecessor == predecessor && d.successor == successor)
        {
            return Err(StoreError::DuplicateDependency {
                predecessor,
                successor,
            });
        }
        match self.callbacks.on_dependency_create_requested.as_mut() {
            Some(callback) => {
                callback(predecessor, successor);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn request_dependency_delete(&mut self, id: DependencyId) -> bool {
        match self.callbacks.on_dependency_delete_requested.as_mut() {
            Some(callback) => {
                callback(id);
                true
            }
            None => false,
        }
    }

    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    pub fn wheel(&mut self, delta_y: f32, modifier_held: bool) -> bool {
        self.zoom.on_wheel(delta_y, modifier_held)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom.zoom_out()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Returns the new fullscreen flag.
    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    /// Mirror a fullscreen change the host made outside the chart.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn time_scale(&self) -> TimeScale {
        self.scale
    }

    pub fn set_time_scale(&mut self, scale: TimeScale) {
        self.scale = scale;
    }

    pub fn range(&self) -> RangeOverride {
        self.range
    }

    pub fn set_range_start(&mut self, start: Option<NaiveDate>) {
        self.range.start = start;
    }

    pub fn set_range_end(&mut self, end: Option<NaiveDate>) {
        self.range.end = end;
    }

    pub fn reset_range(&mut self) {
        self.range = RangeOverride::default();
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// Host flag for writes in flight.
    pub fn set_updating(&mut self, updating: bool) {
        self.updating = updating;
    }
}

impl std::fmt::Debug for TimelineChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineChart")
            .field("config", &self.config)
            .field("callbacks", &self.callbacks)
            .field("zoom", &self.zoom)
            .field("drag", &self.drag)
            .field("scale", &self.scale)
            .field("range", &self.range)
            .finish()
    }
}

/// Vertical grid: Mondays and first-of-month, excluding the axis start.
fn grid_lines(axis: &TimeAxis, day_width: f32) -> Vec<GridLine> {
    let mut lines: Vec<(NaiveDate, GridKind)> = axis
        .week_starts()
        .into_iter()
        .filter(|d| *d > axis.min() && d.day() != 1)
        .map(|d| (d, GridKind::Week))
        .collect();
    lines.extend(
        axis.month_starts()
            .into_iter()
            .filter(|d| *d > axis.min())
            .map(|d| (d, GridKind::Month)),
    );
    lines.sort_by_key(|(d, _)| *d);
    lines
        .into_iter()
        .map(|(d, kind)| GridLine {
            x: axis.date_to_x(d, day_width),
            kind,
        })
        .collect()
}
