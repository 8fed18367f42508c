pub mod dates;
pub mod hierarchy;
pub mod project;
pub mod task;
pub mod timeline;

pub use hierarchy::{Row, RowIndex};
pub use project::Project;
pub use task::{Dependency, DependencyId, DependencyKind, TaskBar, TaskId};
pub use timeline::{HeaderCell, RangeOverride, TimeAxis, TimeScale};
