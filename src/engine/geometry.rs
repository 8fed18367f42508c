use chrono::NaiveDate;
use egui::{Pos2, Rect, Vec2};

use crate::model::{TaskBar, TaskId, TimeAxis};

/// Vertical gap between a bar and its row edges.
pub const BAR_VERTICAL_INSET: f32 = 2.0;

/// Dates shown for one task while a gesture is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivePreview {
    pub task_id: TaskId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The dates a bar is drawn with: the live preview for the dragged task,
/// the stored dates for everything else.
pub fn effective_dates(task: &TaskBar, preview: Option<&LivePreview>) -> (NaiveDate, NaiveDate) {
    match preview {
        Some(p) if p.task_id == task.id => (p.start, p.end),
        _ => (task.start, task.end),
    }
}

/// Horizontal placement of a bar as percentages of the axis width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub left_percent: f32,
    pub width_percent: f32,
}

impl BarGeometry {
    pub fn of(task: &TaskBar, axis: &TimeAxis, preview: Option<&LivePreview>) -> Self {
        let (start, end) = effective_dates(task, preview);
        Self::from_span(start, end, axis)
    }

    pub fn from_span(start: NaiveDate, end: NaiveDate, axis: &TimeAxis) -> Self {
        Self {
            left_percent: axis.left_percent(start),
            width_percent: axis.width_percent(start, end),
        }
    }

    pub fn right_percent(&self) -> f32 {
        self.left_percent + self.width_percent
    }

    pub fn left_px(&self, chart_width: f32) -> f32 {
        self.left_percent / 100.0 * chart_width
    }

    pub fn right_px(&self, chart_width: f32) -> f32 {
        self.right_percent() / 100.0 * chart_width
    }

    /// Pixel rectangle of the bar in chart coordinates (origin at the top
    /// left of the first row).
    pub fn to_rect(&self, row: usize, chart_width: f32, row_height: f32) -> Rect {
        let top = row as f32 * row_height + BAR_VERTICAL_INSET;
        let height = (row_height - BAR_VERTICAL_INSET * 2.0).max(1.0);
        let width = (self.width_percent / 100.0 * chart_width).max(0.0);
        Rect::from_min_size(
            Pos2::new(self.left_px(chart_width), top),
            Vec2::new(width, height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RangeOverride;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn setup() -> (TaskBar, TimeAxis) {
        let task = TaskBar::new(1, "a", d(2025, 1, 1), d(2025, 1, 10));
        let axis = TimeAxis::compute(
            [(d(2025, 1, 1), d(2025, 1, 20))],
            RangeOverride::default(),
            d(2025, 1, 1),
        );
        (task, axis)
    }

    #[test]
    fn uses_stored_dates_without_preview() {
        let (task, axis) = setup();
        let g = BarGeometry::of(&task, &axis, None);
        assert_eq!(g.left_percent, 0.0);
        assert!((g.width_percent - 50.0).abs() < 1e-4);
    }

    #[test]
    fn preview_for_same_task_wins() {
        let (task, axis) = setup();
        let preview = LivePreview {
            task_id: task.id,
            start: d(2025, 1, 3),
            end: d(2025, 1, 12),
        };
        let g = BarGeometry::of(&task, &axis, Some(&preview));
        assert!((g.left_percent - 10.0).abs() < 1e-4);
        assert!((g.width_percent - 50.0).abs() < 1e-4);
    }

    #[test]
    fn preview_for_other_task_is_ignored() {
        let (task, axis) = setup();
        let preview = LivePreview {
            task_id: TaskId(99),
            start: d(2025, 1, 15),
            end: d(2025, 1, 20),
        };
        assert_eq!(
            BarGeometry::of(&task, &axis, Some(&preview)),
            BarGeometry::of(&task, &axis, None)
        );
    }

    #[test]
    fn rect_in_pixels() {
        let (task, axis) = setup();
        let g = BarGeometry::of(&task, &axis, None);
        let rect = g.to_rect(2, 480.0, 40.0);
        assert_eq!(rect.left(), 0.0);
        assert!((rect.width() - 240.0).abs() < 1e-3);
        assert_eq!(rect.top(), 82.0);
        assert_eq!(rect.height(), 36.0);
    }
}
