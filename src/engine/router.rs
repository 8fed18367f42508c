use egui::{Pos2, Vec2};

use super::geometry::BarGeometry;
use crate::model::{Dependency, DependencyId, DependencyKind, RowIndex};

/// Horizontal offset into each bar so arrows do not sit on the bar edge.
pub const EDGE_INSET: f32 = 6.0;

/// A drawable edge in chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub dependency_id: DependencyId,
    pub kind: DependencyKind,
    pub from: Pos2,
    pub to: Pos2,
}

impl Edge {
    /// Triangle with its tip on `to`, aligned with the edge.
    pub fn arrow_head(&self, size: f32) -> [Pos2; 3] {
        let delta = self.to - self.from;
        let dir = if delta.length() > f32::EPSILON {
            delta.normalized()
        } else {
            Vec2::X
        };
        let back = self.to - dir * size;
        let side = dir.rot90() * (size * 0.5);
        [self.to, back + side, back - side]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingPredecessor,
    MissingSuccessor,
    SelfLink,
    /// The successor starts left of where the predecessor ends.
    Degenerate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeRoute {
    Drawn(Edge),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DependencyRouter {
    pub inset: f32,
    pub row_height: f32,
}

impl DependencyRouter {
    pub fn new(row_height: f32) -> Self {
        Self {
            inset: EDGE_INSET,
            row_height,
        }
    }

    /// Route one dependency. `geometry` is indexed by row, as in `rows`.
    pub fn route(
        &self,
        dep: &Dependency,
        rows: &RowIndex<'_>,
        geometry: &[BarGeometry],
        chart_width: f32,
    ) -> EdgeRoute {
        if dep.predecessor == dep.successor {
            return EdgeRoute::Skipped(SkipReason::SelfLink);
        }
        let Some((pred_row, pred)) = lookup(rows, geometry, dep.predecessor) else {
            return EdgeRoute::Skipped(SkipReason::MissingPredecessor);
        };
        let Some((succ_row, succ)) = lookup(rows, geometry, dep.successor) else {
            return EdgeRoute::Skipped(SkipReason::MissingSuccessor);
        };

        let lo = self.inset;
        let hi = (chart_width - self.inset).max(lo);
        let x1 = (pred.right_px(chart_width) - self.inset).clamp(lo, hi);
        let x2 = (succ.left_px(chart_width) + self.inset).clamp(lo, hi);
        if x2 <= x1 || !x1.is_finite() || !x2.is_finite() {
            return EdgeRoute::Skipped(SkipReason::Degenerate);
        }

        EdgeRoute::Drawn(Edge {
            dependency_id: dep.id,
            kind: dep.kind,
            from: Pos2::new(x1, self.row_center(pred_row)),
            to: Pos2::new(x2, self.row_center(succ_row)),
        })
    }

    /// Drawn edges only; skipped ones are traced.
    pub fn route_all(
        &self,
        deps: &[Dependency],
        rows: &RowIndex<'_>,
        geometry: &[BarGeometry],
        chart_width: f32,
    ) -> Vec<Edge> {
        deps.iter()
            .filter_map(|dep| match self.route(dep, rows, geometry, chart_width) {
                EdgeRoute::Drawn(edge) => Some(edge),
                EdgeRoute::Skipped(reason) => {
                    tracing::trace!(dependency = %dep.id, ?reason, "dependency edge skipped");
                    None
                }
            })
            .collect()
    }

    fn row_center(&self, row: usize) -> f32 {
        row as f32 * self.row_height + self.row_height / 2.0
    }
}

fn lookup(
    rows: &RowIndex<'_>,
    geometry: &[BarGeometry],
    id: crate::model::TaskId,
) -> Option<(usize, BarGeometry)> {
    let row = rows.row_of(id)?;
    geometry.get(row).map(|g| (row, *g))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RangeOverride, TaskBar, TaskId, TimeAxis};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dep(id: u64, pred: u64, succ: u64) -> Dependency {
        Dependency {
            id: DependencyId(id),
            predecessor: TaskId(pred),
            successor: TaskId(succ),
            kind: DependencyKind::FinishToStart,
            lag: 0,
        }
    }

    fn fixture(tasks: &[TaskBar]) -> (RowIndex<'_>, Vec<BarGeometry>, f32) {
        let rows = RowIndex::build(tasks);
        let axis = TimeAxis::compute(
            rows.iter().map(|r| (r.task.start, r.task.end)),
            RangeOverride::default(),
            d(2025, 1, 1),
        );
        let geometry = rows
            .iter()
            .map(|r| BarGeometry::of(r.task, &axis, None))
            .collect();
        (rows, geometry, axis.total_width(24.0))
    }

    #[test]
    fn finish_to_start_edge() {
        let tasks = vec![
            TaskBar::new(1, "a", d(2025, 1, 1), d(2025, 1, 5)),
            TaskBar::new(2, "b", d(2025, 1, 8), d(2025, 1, 20)),
        ];
        let (rows, geometry, width) = fixture(&tasks);
        let router = DependencyRouter::new(40.0);
        let EdgeRoute::Drawn(edge) = router.route(&dep(1, 1, 2), &rows, &geometry, width) else {
            panic!("expected an edge");
        };
        assert!((edge.from.x - (5.0 * 24.0 - 6.0)).abs() < 1e-3);
        assert!((edge.to.x - (7.0 * 24.0 + 6.0)).abs() < 1e-3);
        assert_eq!(edge.from.y, 20.0);
        assert_eq!(edge.to.y, 60.0);
        assert_eq!(edge.arrow_head(8.0)[0], edge.to);
    }

    #[test]
    fn overlapping_bars_are_skipped() {
        let tasks = vec![
            TaskBar::new(1, "a", d(2025, 1, 1), d(2025, 1, 10)),
            TaskBar::new(2, "b", d(2025, 1, 5), d(2025, 1, 12)),
        ];
        let (rows, geometry, width) = fixture(&tasks);
        let router = DependencyRouter::new(40.0);
        assert_eq!(
            router.route(&dep(1, 1, 2), &rows, &geometry, width),
            EdgeRoute::Skipped(SkipReason::Degenerate)
        );
    }

    #[test]
    fn missing_and_self_links_are_skipped() {
        let tasks = vec![TaskBar::new(1, "a", d(2025, 1, 1), d(2025, 1, 5))];
        let (rows, geometry, width) = fixture(&tasks);
        let router = DependencyRouter::new(40.0);
        assert_eq!(
            router.route(&dep(1, 9, 1), &rows, &geometry, width),
            EdgeRoute::Skipped(SkipReason::MissingPredecessor)
        );
        assert_eq!(
            router.route(&dep(2, 1, 9), &rows, &geometry, width),
            EdgeRoute::Skipped(SkipReason::MissingSuccessor)
        );
        assert_eq!(
            router.route(&dep(3, 1, 1), &rows, &geometry, width),
            EdgeRoute::Skipped(SkipReason::SelfLink)
        );
        assert!(router
            .route_all(&[dep(1, 9, 1), dep(3, 1, 1)], &rows, &geometry, width)
            .is_empty());
    }

    #[test]
    fn narrow_chart_does_not_panic() {
        let tasks = vec![
            TaskBar::new(1, "a", d(2025, 1, 1), d(2025, 1, 1)),
            TaskBar::new(2, "b", d(2025, 1, 1), d(2025, 1, 1)),
        ];
        let (rows, geometry, _) = fixture(&tasks);
        let router = DependencyRouter::new(40.0);
        // Upper clamp bound would fall below the lower one.
        assert_eq!(
            router.route(&dep(1, 1, 2), &rows, &geometry, 4.0),
            EdgeRoute::Skipped(SkipReason::Degenerate)
        );
    }
}
