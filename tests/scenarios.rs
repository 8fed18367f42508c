use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::NaiveDate;
use egui::{Color32, Pos2};

use planboard_timeline::engine::{
    BarDates, CaptureGuard, ChartLayout, DependencyRouter, EdgeRoute, PointerCapture, SkipReason,
    TimelineCallbacks, TimelineChart, TimelineConfig, ZoomController,
};
use planboard_timeline::io::{load_project, save_project, StoreCommand, TaskStore};
use planboard_timeline::model::{
    Dependency, DependencyId, DependencyKind, Project, RowIndex, TaskBar, TaskId,
};
use planboard_timeline::engine::BarGeometry;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

type Commits = Rc<RefCell<Vec<(TaskId, BarDates)>>>;

fn recording_chart(config: TimelineConfig) -> (TimelineChart, Commits) {
    let commits: Commits = Rc::default();
    let sink = commits.clone();
    let chart = TimelineChart::new(
        config,
        TimelineCallbacks::new().on_bar_dates_changed(move |id, dates| {
            sink.borrow_mut().push((id, dates));
        }),
    )
    .with_today(d(2025, 1, 1));
    (chart, commits)
}

fn single_task() -> Project {
    let mut project = Project::new("one");
    project.tasks = vec![TaskBar::new(1, "A", d(2025, 1, 1), d(2025, 1, 10))];
    project
}

fn body_of(layout: &ChartLayout, id: u64) -> Pos2 {
    let rect = layout.bar(TaskId(id)).unwrap().rect;
    Pos2::new(rect.left() + 10.0, rect.center().y)
}

fn grip_of(layout: &ChartLayout, id: u64) -> Pos2 {
    let rect = layout.bar(TaskId(id)).unwrap().rect;
    Pos2::new(rect.right() - 2.0, rect.center().y)
}

#[test]
fn move_by_three_days_commits_shifted_dates() {
    let (mut chart, commits) = recording_chart(TimelineConfig::default());
    let project = single_task();
    let layout = chart.layout(&project);
    let day = layout.day_width;
    let press = body_of(&layout, 1);

    assert!(chart.press(&layout, press));
    chart.pointer_moved(press.x + 3.0 * day);
    let live = chart.layout(&project);
    let bar = live.bar(TaskId(1)).unwrap();
    assert_eq!((bar.start, bar.end), (d(2025, 1, 4), d(2025, 1, 13)));

    chart.release();
    assert_eq!(
        commits.borrow().as_slice(),
        &[(
            TaskId(1),
            BarDates {
                start: "2025-01-04".into(),
                end: "2025-01-13".into()
            }
        )]
    );
}

#[test]
fn resize_left_clamps_at_start() {
    let (mut chart, commits) = recording_chart(TimelineConfig::default());
    let project = single_task();
    let layout = chart.layout(&project);
    let day = layout.day_width;
    let grip = grip_of(&layout, 1);

    assert!(chart.press(&layout, grip));
    chart.pointer_moved(grip.x - 5.0 * day);
    let bar_end = chart.layout(&project).bar(TaskId(1)).unwrap().end;
    assert_eq!(bar_end, d(2025, 1, 5));

    chart.pointer_moved(grip.x - 30.0 * day);
    let live = chart.layout(&project);
    let bar = live.bar(TaskId(1)).unwrap();
    assert_eq!((bar.start, bar.end), (d(2025, 1, 1), d(2025, 1, 1)));

    chart.release();
    let (_, dates) = commits.borrow()[0].clone();
    assert_eq!((dates.start.as_str(), dates.end.as_str()), ("2025-01-01", "2025-01-01"));
}

fn linked_pair(successor_start: NaiveDate) -> Vec<TaskBar> {
    vec![
        TaskBar::new(1, "A", d(2025, 1, 1), d(2025, 1, 10)),
        TaskBar::new(2, "B", successor_start, shift(successor_start, 7)),
    ]
}

fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    planboard_timeline::model::dates::shift_days(date, days)
}

fn route_pair(tasks: &[TaskBar]) -> EdgeRoute {
    let rows = RowIndex::build(tasks);
    let axis = planboard_timeline::model::TimeAxis::compute(
        rows.iter().map(|r| (r.task.start, r.task.end)),
        Default::default(),
        d(2025, 1, 1),
    );
    let geometry: Vec<BarGeometry> = rows
        .iter()
        .map(|r| BarGeometry::of(r.task, &axis, None))
        .collect();
    let dep = Dependency {
        id: DependencyId(1),
        predecessor: TaskId(1),
        successor: TaskId(2),
        kind: DependencyKind::FinishToStart,
        lag: 0,
    };
    DependencyRouter::new(40.0).route(&dep, &rows, &geometry, axis.total_width(24.0))
}

#[test]
fn overlapping_successor_has_no_edge() {
    // x1 = 240 - 6 = 234, x2 = 96 + 6 = 102
    assert_eq!(
        route_pair(&linked_pair(d(2025, 1, 5))),
        EdgeRoute::Skipped(SkipReason::Degenerate)
    );
}

#[test]
fn later_successor_gets_an_edge() {
    let EdgeRoute::Drawn(edge) = route_pair(&linked_pair(d(2025, 1, 15))) else {
        panic!("expected a drawn edge");
    };
    assert_eq!(edge.from.x, 234.0);
    assert_eq!(edge.to.x, 14.0 * 24.0 + 6.0);
    assert_eq!((edge.from.y, edge.to.y), (20.0, 60.0));
}

#[test]
fn four_zoom_steps_reach_the_maximum() {
    let mut zoom = ZoomController::new();
    for _ in 0..4 {
        assert!(zoom.zoom_in());
    }
    assert_eq!(zoom.scale(), 2.0);
    assert!(!zoom.zoom_in());
    assert_eq!(zoom.scale(), 2.0);
    assert_eq!(zoom.day_width(), 48.0);
}

#[test]
fn committed_dates_reproduce_preview_geometry() {
    let (mut chart, commits) = recording_chart(TimelineConfig::default());
    let mut store = TaskStore::new(single_task());
    let layout = chart.layout(store.project());
    let press = body_of(&layout, 1);

    chart.press(&layout, press);
    chart.pointer_moved(press.x - 4.0 * layout.day_width);
    let preview = chart.layout(store.project());
    let preview_rect = preview.bar(TaskId(1)).unwrap().rect;
    chart.release();

    let (task, dates) = commits.borrow()[0].clone();
    store
        .apply(&StoreCommand::UpdateDates { task, dates })
        .unwrap();
    let after = chart.layout(store.project());
    assert_eq!(after.bar(TaskId(1)).unwrap().rect, preview_rect);
    assert_eq!(after.axis, preview.axis);
}

#[test]
fn rejected_write_restores_previous_geometry() {
    let (mut chart, commits) = recording_chart(TimelineConfig::default());
    let mut store = TaskStore::new(single_task());
    let before = chart.layout(store.project());
    let press = body_of(&before, 1);

    chart.press(&before, press);
    chart.pointer_moved(press.x + 2.0 * before.day_width);
    chart.release();

    // The store refuses the write (e.g. a conflicting edit swapped the ends).
    let (task, dates) = commits.borrow()[0].clone();
    let conflicting = BarDates {
        start: dates.end,
        end: dates.start,
    };
    assert!(store
        .apply(&StoreCommand::UpdateDates {
            task,
            dates: conflicting
        })
        .is_err());

    let after = chart.layout(store.project());
    assert_eq!(after.bars, before.bars);
}

#[test]
fn zero_movement_release_is_not_committed() {
    let (mut chart, commits) = recording_chart(TimelineConfig::default());
    let project = single_task();
    let layout = chart.layout(&project);
    let press = body_of(&layout, 1);

    chart.press(&layout, press);
    chart.pointer_moved(press.x + 0.4 * layout.day_width);
    assert!(chart.release().is_none());
    assert!(commits.borrow().is_empty());
    assert!(!chart.drag().is_active());
}

#[test]
fn zero_movement_release_commits_when_configured() {
    let (mut chart, commits) = recording_chart(TimelineConfig {
        commit_unchanged: true,
        ..TimelineConfig::default()
    });
    let project = single_task();
    let layout = chart.layout(&project);

    chart.press(&layout, body_of(&layout, 1));
    chart.release();
    let (_, dates) = commits.borrow()[0].clone();
    assert_eq!(dates.start, "2025-01-01");
    assert_eq!(dates.end, "2025-01-10");
}

struct Counting(Rc<Cell<u32>>);

impl PointerCapture for Counting {
    fn acquire(&mut self) -> CaptureGuard {
        self.0.set(self.0.get() + 1);
        let live = self.0.clone();
        CaptureGuard::new(move || live.set(live.get() - 1))
    }
}

#[test]
fn dropping_chart_mid_gesture_releases_capture() {
    let live = Rc::new(Cell::new(0));
    let (chart, _) = recording_chart(TimelineConfig::default());
    let mut chart = chart.with_pointer_capture(Box::new(Counting(live.clone())));
    let project = single_task();
    let layout = chart.layout(&project);

    assert!(chart.press(&layout, grip_of(&layout, 1)));
    assert_eq!(live.get(), 1);
    // A second press while captured is refused.
    assert!(!chart.press(&layout, body_of(&layout, 1)));
    assert_eq!(live.get(), 1);

    drop(chart);
    assert_eq!(live.get(), 0);
}

#[test]
fn dangling_dependency_is_silently_dropped() {
    let (chart, _) = recording_chart(TimelineConfig::default());
    let mut project = single_task();
    project.dependencies = vec![Dependency {
        id: DependencyId(3),
        predecessor: TaskId(1),
        successor: TaskId(404),
        kind: DependencyKind::FinishToFinish,
        lag: 2,
    }];
    let layout = chart.layout(&project);
    assert!(layout.edges.is_empty());
    assert_eq!(layout.bars.len(), 1);
}

#[test]
fn project_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.json");

    let mut project = Project::new("Round trip");
    project.tasks = vec![TaskBar::new(1, "Parent", d(2025, 3, 1), d(2025, 3, 20))
        .with_color(Color32::from_rgb(0x12, 0x34, 0x56))
        .with_children(vec![TaskBar::new(2, "Child", d(2025, 3, 2), d(2025, 3, 5))
            .with_progress(40)
            .with_linked_item(77)])];
    project.dependencies = vec![Dependency {
        id: DependencyId(1),
        predecessor: TaskId(2),
        successor: TaskId(1),
        kind: DependencyKind::StartToFinish,
        lag: -1,
    }];

    save_project(&project, &path).unwrap();
    let loaded = load_project(&path).unwrap();
    assert_eq!(loaded, project);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"start_date\": \"2025-03-01\""));
    assert!(raw.contains("#123456"));
}
