//! Move / resize gestures on task bars.
//!
//! The controller is independent of any UI toolkit. It owns the live
//! preview for the one bar being dragged; the canonical snapshot is never
//! touched. While a gesture is active the controller holds a
//! [`CaptureGuard`] from the host so that pointer tracking outside the bar
//! is released on every exit path, including the controller being dropped.

use chrono::NaiveDate;
use serde::Serialize;

use super::geometry::LivePreview;
use crate::model::dates::{format_iso, shift_days};
use crate::model::TaskId;

/// Scoped pointer subscription. Dropping it releases the subscription.
#[must_use = "dropping the guard releases the pointer capture immediately"]
pub struct CaptureGuard {
    release: Option<Box<dyn FnOnce()>>,
}

impl CaptureGuard {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A guard with nothing to release.
    pub fn detached() -> Self {
        Self { release: None }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureGuard")
            .field("armed", &self.release.is_some())
            .finish()
    }
}

/// Host hook that starts global pointer tracking for a gesture.
pub trait PointerCapture {
    fn acquire(&mut self) -> CaptureGuard;
}

/// For hosts that deliver pointer events globally anyway.
#[derive(Debug, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn acquire(&mut self) -> CaptureGuard {
        CaptureGuard::detached()
    }
}

/// Notified after every state transition.
pub trait DragObserver {
    fn on_drag_state(&mut self, state: &DragState);
}

impl<F: FnMut(&DragState)> DragObserver for F {
    fn on_drag_state(&mut self, state: &DragState) {
        self(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveGesture {
    pub task_id: TaskId,
    pub anchor_x: f32,
    pub original_start: NaiveDate,
    pub original_end: NaiveDate,
    pub preview_start: NaiveDate,
    pub preview_end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeGesture {
    pub task_id: TaskId,
    pub anchor_x: f32,
    pub original_end: NaiveDate,
    pub preview_end: NaiveDate,
    pub locked_start: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Moving(MoveGesture),
    Resizing(ResizeGesture),
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }

    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            DragState::Idle => None,
            DragState::Moving(g) => Some(g.task_id),
            DragState::Resizing(g) => Some(g.task_id),
        }
    }

    pub fn preview(&self) -> Option<LivePreview> {
        match self {
            DragState::Idle => None,
            DragState::Moving(g) => Some(LivePreview {
                task_id: g.task_id,
                start: g.preview_start,
                end: g.preview_end,
            }),
            DragState::Resizing(g) => Some(LivePreview {
                task_id: g.task_id,
                start: g.locked_start,
                end: g.preview_end,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize,
}

/// Final dates of a released gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateChange {
    pub task_id: TaskId,
    pub kind: GestureKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// True when the gesture ended where it started.
    pub unchanged: bool,
}

impl DateChange {
    pub fn to_bar_dates(&self) -> BarDates {
        BarDates {
            start: format_iso(self.start),
            end: format_iso(self.end),
        }
    }
}

/// ISO date-only pair handed to the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarDates {
    #[serde(rename = "start_date")]
    pub start: String,
    #[serde(rename = "end_date")]
    pub end: String,
}

/// Whole days for a pixel delta. Degenerate day widths mean no movement.
pub fn snap_days(delta_px: f32, day_width: f32) -> i64 {
    if day_width <= 0.0 || !day_width.is_finite() || !delta_px.is_finite() {
        return 0;
    }
    (delta_px / day_width).round() as i64
}

pub struct DragController {
    state: DragState,
    capture: Option<CaptureGuard>,
    pointer: Box<dyn PointerCapture>,
    observers: Vec<Box<dyn DragObserver>>,
    commit_unchanged: bool,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(Box::new(NoCapture))
    }
}

impl DragController {
    pub fn new(pointer: Box<dyn PointerCapture>) -> Self {
        Self {
            state: DragState::Idle,
            capture: None,
            pointer,
            observers: Vec::new(),
            commit_unchanged: false,
        }
    }

    /// Whether releasing a gesture with zero net movement still commits.
    pub fn set_commit_unchanged(&mut self, commit: bool) {
        self.commit_unchanged = commit;
    }

    pub fn subscribe(&mut self, observer: impl DragObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !self.state.is_idle()
    }

    pub fn preview(&self) -> Option<LivePreview> {
        self.state.preview()
    }

    /// Start moving a bar. Refused while another gesture is active.
    pub fn begin_move(
        &mut self,
        task_id: TaskId,
        start: NaiveDate,
        end: NaiveDate,
        anchor_x: f32,
    ) -> bool {
        if self.is_active() {
            return false;
        }
        tracing::debug!(task = %task_id, %start, %end, "move started");
        self.enter(DragState::Moving(MoveGesture {
            task_id,
            anchor_x,
            original_start: start,
            original_end: end,
            preview_start: start,
            preview_end: end,
        }));
        true
    }

    /// Start dragging a bar's right edge. Refused while another gesture is
    /// active.
    pub fn begin_resize(
        &mut self,
        task_id: TaskId,
        start: NaiveDate,
        end: NaiveDate,
        anchor_x: f32,
    ) -> bool {
        if self.is_active() {
            return false;
        }
        tracing::debug!(task = %task_id, %start, %end, "resize started");
        // An inverted record resizes from its one-day rendering.
        let end = end.max(start);
        self.enter(DragState::Resizing(ResizeGesture {
            task_id,
            anchor_x,
            original_end: end,
            preview_end: end,
            locked_start: start,
        }));
        true
    }

    /// Feed a pointer position. No-op when idle.
    pub fn update(&mut self, pointer_x: f32, day_width: f32) {
        let next = match self.state {
            DragState::Idle => return,
            DragState::Moving(g) => {
                let delta = snap_days(pointer_x - g.anchor_x, day_width);
                let mut start = shift_days(g.original_start, delta);
                let mut end = shift_days(g.original_end, delta);
                // A shift that hit the calendar edge on one side only would
                // change the duration; keep the bar where it was instead.
                if (end - start) != (g.original_end - g.original_start) {
                    start = g.original_start;
                    end = g.original_end;
                }
                DragState::Moving(MoveGesture {
                    preview_start: start,
                    preview_end: end,
                    ..g
                })
            }
            DragState::Resizing(g) => {
                let delta = snap_days(pointer_x - g.anchor_x, day_width);
                let end = shift_days(g.original_end, delta).max(g.locked_start);
                DragState::Resizing(ResizeGesture {
                    preview_end: end,
                    ..g
                })
            }
        };
        if next != self.state {
            self.state = next;
            self.notify();
        }
    }

    /// Finish the gesture and return its final dates.
    ///
    /// Returns `None` when idle, and for zero-movement gestures unless
    /// [`set_commit_unchanged`](Self::set_commit_unchanged) is on.
    pub fn commit(&mut self) -> Option<DateChange> {
        let change = match self.state {
            DragState::Idle => return None,
            DragState::Moving(g) => DateChange {
                task_id: g.task_id,
                kind: GestureKind::Move,
                start: g.preview_start,
                end: g.preview_end,
                unchanged: g.preview_start == g.original_start,
            },
            DragState::Resizing(g) => DateChange {
                task_id: g.task_id,
                kind: GestureKind::Resize,
                start: g.locked_start,
                end: g.preview_end,
                unchanged: g.preview_end == g.original_end,
            },
        };
        self.leave();

        if change.unchanged && !self.commit_unchanged {
            tracing::debug!(task = %change.task_id, "gesture released without movement");
            return None;
        }
        tracing::debug!(task = %change.task_id, start = %change.start, end = %change.end, "gesture committed");
        Some(change)
    }

    /// Drop the gesture and its preview.
    pub fn cancel(&mut self) {
        if let Some(task) = self.state.task_id() {
            tracing::debug!(task = %task, "gesture cancelled");
            self.leave();
        }
    }

    fn enter(&mut self, state: DragState) {
        self.capture = Some(self.pointer.acquire());
        self.state = state;
        self.notify();
    }

    fn leave(&mut self) {
        self.state = DragState::Idle;
        self.capture = None;
        self.notify();
    }

    fn notify(&mut self) {
        let state = self.state;
        for observer in &mut self.observers {
            observer.on_drag_state(&state);
        }
    }
}

impl std::fmt::Debug for DragController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragController")
            .field("state", &self.state)
            .field("captured", &self.capture.is_some())
            .field("observers", &self.observers.len())
            .finish()
    }
}
