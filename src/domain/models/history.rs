#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::create_id;
use super::Project;

pub const HISTORY_LIMIT: usize = 10;

/// Completed projects, most recent first, never longer than `HISTORY_LIMIT`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectHistory {
    projects: Vec<Project>,
}

impl ProjectHistory {
    pub fn from_projects(mut projects: Vec<Project>) -> ProjectHistory {
        projects.truncate(HISTORY_LIMIT);
        return ProjectHistory { projects };
    }

    pub fn record(&mut self, prompt: &str) -> &Project {
        let project = Project {
            id: format!("proj-{}", create_id()),
            prompt: prompt.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };

        self.push(project);
        return &self.projects[0];
    }

    pub fn push(&mut self, project: Project) {
        self.projects.insert(0, project);
        self.projects.truncate(HISTORY_LIMIT);
    }

    pub fn projects(&self) -> &[Project] {
        return &self.projects;
    }

    /// Zero based, newest first.
    pub fn get(&self, idx: usize) -> Option<&Project> {
        return self.projects.get(idx);
    }

    pub fn len(&self) -> usize {
        return self.projects.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.projects.is_empty();
    }
}
