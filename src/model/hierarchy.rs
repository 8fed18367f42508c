use std::collections::{HashMap, HashSet};

use super::task::{TaskBar, TaskId};

/// One chart row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub task: &'a TaskBar,
    /// Nesting level, 0 for roots.
    pub depth: usize,
}

/// Flat, row-indexed view over a task tree with O(1) id lookups.
#[derive(Debug, Default)]
pub struct RowIndex<'a> {
    rows: Vec<Row<'a>>,
    by_id: HashMap<TaskId, usize>,
}

impl<'a> RowIndex<'a> {
    pub fn build(tasks: &'a [TaskBar]) -> Self {
        // Top-level tasks that point at another top-level task are listed
        // under it rather than as roots.
        let top_ids: HashSet<TaskId> = tasks.iter().map(|t| t.id).collect();
        let mut linked: HashMap<TaskId, Vec<&'a TaskBar>> = HashMap::new();
        let mut roots: Vec<&'a TaskBar> = Vec::new();
        for task in tasks {
            match task.parent_id {
                Some(parent) if parent != task.id && top_ids.contains(&parent) => {
                    linked.entry(parent).or_default().push(task);
                }
                _ => roots.push(task),
            }
        }

        let mut index = RowIndex {
            rows: Vec::with_capacity(tasks.len()),
            by_id: HashMap::with_capacity(tasks.len()),
        };
        index.walk(&roots, &linked);

        // Tasks caught in a parent cycle were never reached from a root.
        let stranded: Vec<&'a TaskBar> = tasks
            .iter()
            .filter(|t| !index.by_id.contains_key(&t.id))
            .collect();
        if !stranded.is_empty() {
            tracing::warn!(count = stranded.len(), "parent links form a cycle; listing tasks as roots");
            for task in stranded {
                if !index.by_id.contains_key(&task.id) {
                    index.walk(&[task], &linked);
                }
            }
        }

        index
    }

    fn walk(&mut self, roots: &[&'a TaskBar], linked: &HashMap<TaskId, Vec<&'a TaskBar>>) {
        let mut stack: Vec<(&'a TaskBar, usize)> = roots.iter().rev().map(|t| (*t, 0)).collect();
        while let Some((task, depth)) = stack.pop() {
            if self.by_id.contains_key(&task.id) {
                tracing::warn!(task = %task.id, "duplicate task id in snapshot; keeping first");
                continue;
            }
            self.by_id.insert(task.id, self.rows.len());
            self.rows.push(Row { task, depth });

            let extra = linked.get(&task.id).map(Vec::as_slice).unwrap_or(&[]);
            // Reverse push so the first child is popped first.
            for child in extra.iter().rev() {
                stack.push((*child, depth + 1));
            }
            for child in task.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row<'a>] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row<'a>> {
        self.rows.iter()
    }

    pub fn row_of(&self, id: TaskId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn get(&self, id: TaskId) -> Option<&'a TaskBar> {
        self.row_of(id).map(|i| self.rows[i].task)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.by_id.contains_key(&id)
    }
}
