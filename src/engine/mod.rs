pub mod chart;
pub mod drag;
pub mod geometry;
pub mod router;
pub mod zoom;

pub use chart::{
    BarRow, ChartLayout, GridKind, GridLine, HitTarget, TimelineCallbacks, TimelineChart,
    TimelineConfig,
};
pub use drag::{
    BarDates, CaptureGuard, DateChange, DragController, DragObserver, DragState, GestureKind,
    NoCapture, PointerCapture,
};
pub use geometry::{BarGeometry, LivePreview};
pub use router::{DependencyRouter, Edge, EdgeRoute, SkipReason};
pub use zoom::ZoomController;
