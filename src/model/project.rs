use serde::{Deserialize, Serialize};

use super::task::{Dependency, TaskBar, TaskId};

/// A snapshot of one project as the task store delivers it: the task tree
/// plus the dependency list. The engine reads it on every layout pass and
/// never writes to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "project_id", default)]
    pub id: u64,
    #[serde(rename = "project_name", default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskBar>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

fn default_name() -> String {
    "Untitled Project".to_string()
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Walk the whole tree, nested children included.
    pub fn for_each_task(&self, mut f: impl FnMut(&TaskBar)) {
        let mut stack: Vec<&TaskBar> = self.tasks.iter().rev().collect();
        while let Some(task) = stack.pop() {
            f(task);
            stack.extend(task.children.iter().rev());
        }
    }

    pub fn find_task(&self, id: TaskId) -> Option<&TaskBar> {
        let mut stack: Vec<&TaskBar> = self.tasks.iter().collect();
        while let Some(task) = stack.pop() {
            if task.id == id {
                return Some(task);
            }
            stack.extend(task.children.iter());
        }
        None
    }

    pub fn find_task_mut(&mut self, id: TaskId) -> Option<&mut TaskBar> {
        let mut stack: Vec<&mut TaskBar> = self.tasks.iter_mut().collect();
        while let Some(task) = stack.pop() {
            if task.id == id {
                return Some(task);
            }
            stack.extend(task.children.iter_mut());
        }
        None
    }

    pub fn task_count(&self) -> usize {
        let mut n = 0;
        self.for_each_task(|_| n += 1);
        n
    }

    pub fn task_name(&self, id: TaskId) -> Option<&str> {
        self.find_task(id).map(|t| t.name.as_str())
    }
}
