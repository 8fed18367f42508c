use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::engine::BarDates;
use crate::error::StoreError;
use crate::model::dates::parse_date_only;
use crate::model::{Dependency, DependencyId, DependencyKind, Project, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    UpdateDates { task: TaskId, dates: BarDates },
    CreateDependency { predecessor: TaskId, successor: TaskId },
    DeleteDependency(DependencyId),
}

/// Outcome of one applied command.
pub type StoreResult = std::result::Result<(), StoreError>;

/// In-memory snapshot owner. Writes are queued and applied after an
/// optional simulated latency; a rejected write leaves the snapshot as it was.
#[derive(Debug)]
pub struct TaskStore {
    project: Project,
    latency: Duration,
    pending: VecDeque<(Instant, StoreCommand)>,
    /// Bumped on every successful write.
    revision: u64,
}

impl TaskStore {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            latency: Duration::ZERO,
            pending: VecDeque::new(),
            revision: 0,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_latency(&mut self, latency: Duration) {
        self.latency = latency;
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Swap in a new snapshot, dropping queued writes.
    pub fn replace(&mut self, project: Project) {
        if !self.pending.is_empty() {
            tracing::warn!(dropped = self.pending.len(), "replacing project with writes in flight");
        }
        self.pending.clear();
        self.project = project;
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn submit(&mut self, command: StoreCommand, now: Instant) {
        tracing::debug!(?command, "write queued");
        self.pending.push_back((now + self.latency, command));
    }

    /// Apply every queued command that is due at `now`, in order.
    pub fn poll(&mut self, now: Instant) -> Vec<(StoreCommand, StoreResult)> {
        let mut done = Vec::new();
        while let Some((due, _)) = self.pending.front() {
            if *due > now {
                break;
            }
            let Some((_, command)) = self.pending.pop_front() else {
                break;
            };
            let result = self.apply(&command);
            done.push((command, result));
        }
        done
    }

    /// Time until the next queued command is due.
    pub fn next_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .front()
            .map(|(due, _)| due.saturating_duration_since(now))
    }

    /// Apply a command immediately.
    pub fn apply(&mut self, command: &StoreCommand) -> StoreResult {
        let result = match command {
            StoreCommand::UpdateDates { task, dates } => self.update_dates(*task, dates),
            StoreCommand::CreateDependency {
                predecessor,
                successor,
            } => self.create_dependency(*predecessor, *successor),
            StoreCommand::DeleteDependency(id) => self.delete_dependency(*id),
        };
        match &result {
            Ok(()) => {
                self.revision += 1;
                tracing::debug!(?command, revision = self.revision, "write applied");
            }
            Err(e) => tracing::warn!(?command, error = %e, "write rejected"),
        }
        result
    }

    fn update_dates(&mut self, id: TaskId, dates: &BarDates) -> StoreResult {
        let start = parse_date_only(&dates.start).ok_or_else(|| StoreError::InvalidDate {
            task: id,
            value: dates.start.clone(),
        })?;
        let end = parse_date_only(&dates.end).ok_or_else(|| StoreError::InvalidDate {
            task: id,
            value: dates.end.clone(),
        })?;
        if end < start {
            return Err(StoreError::InvertedRange {
                task: id,
                start,
                end,
            });
        }
        let task = self
            .project
            .find_task_mut(id)
            .ok_or(StoreError::UnknownTask(id))?;
        task.start = start;
        task.end = end;
        Ok(())
    }

    fn create_dependency(&mut self, predecessor: TaskId, successor: TaskId) -> StoreResult {
        if predecessor == successor {
            return Err(StoreError::SelfLink(predecessor));
        }
        for id in [predecessor, successor] {
            if self.project.find_task(id).is_none() {
                return Err(StoreError::UnknownTask(id));
            }
        }
        let deps = &mut self.project.dependencies;
        if deps
            .iter()
            .any(|d| d.predecessor == predecessor && d.successor == successor)
        {
            return Err(StoreError::DuplicateDependency {
                predecessor,
                successor,
            });
        }
        let next_id = deps.iter().map(|d| d.id.0).max().unwrap_or(0) + 1;
        deps.push(Dependency {
            id: DependencyId(next_id),
            predecessor,
            successor,
            kind: DependencyKind::FinishToStart,
            lag: 0,
        });
        Ok(())
    }

    fn delete_dependency(&mut self, id: DependencyId) -> StoreResult {
        let deps = &mut self.project.dependencies;
        let index = deps
            .iter()
            .position(|d| d.id == id)
            .ok_or(StoreError::UnknownDependency(id))?;
        deps.remove(index);
        Ok(())
    }
}
