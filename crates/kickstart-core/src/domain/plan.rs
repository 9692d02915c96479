//! Ordering tasks by their declared dependencies.
//!
//! Tasks are sorted topologically. Among tasks whose dependencies are all
//! placed, the one declared first goes next, so a list whose dependencies
//! form a chain keeps its declaration order.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::domain::{error::PlanError, task::Task};

/// A validated, dependency-ordered task list.
#[derive(Debug)]
pub struct Plan {
    tasks: Vec<Task>,
}

impl Plan {
    /// Order `tasks`, rejecting duplicate titles, unknown dependencies and cycles.
    pub fn new(tasks: Vec<Task>) -> Result<Self, PlanError> {
        let mut index = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if index.insert(task.title().to_owned(), i).is_some() {
                return Err(PlanError::DuplicateTask {
                    title: task.title().to_owned(),
                });
            }
        }

        let mut indegree = vec![0usize; tasks.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
        for (i, task) in tasks.iter().enumerate() {
            for dep in task.dependencies() {
                let &d = index.get(dep).ok_or_else(|| PlanError::UnknownDependency {
                    task: task.title().to_owned(),
                    dependency: dep.clone(),
                })?;
                indegree[i] += 1;
                dependents[d].push(i);
            }
        }

        let mut ready: BTreeSet<usize> = (0..tasks.len()).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(tasks.len());
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &dependent in &dependents[next] {
                indegree[dependent] -= 1;
                if indegree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() < tasks.len() {
            let stuck = tasks
                .iter()
                .enumerate()
                .filter(|(i, _)| indegree[*i] > 0)
                .map(|(_, t)| t.title().to_owned())
                .collect();
            return Err(PlanError::Cycle { tasks: stuck });
        }

        let mut slots: Vec<Option<Task>> = tasks.into_iter().map(Some).collect();
        let tasks: Vec<Task> = order.into_iter().filter_map(|i| slots[i].take()).collect();
        debug!(count = tasks.len(), "plan ordered");

        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(Task::title)
    }

    /// Exact-title lookup.
    pub fn find(&self, title: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.title() == title)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
