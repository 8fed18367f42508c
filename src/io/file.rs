use std::path::Path;

use crate::error::Result;
use crate::model::Project;

/// Save a project snapshot to a JSON file.
pub fn save_project(project: &Project, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), tasks = project.task_count(), "project saved");
    Ok(())
}

/// Load a project snapshot from a JSON file.
pub fn load_project(path: &Path) -> Result<Project> {
    let json = std::fs::read_to_string(path)?;
    let project: Project = serde_json::from_str(&json)?;
    tracing::info!(path = %path.display(), tasks = project.task_count(), "project loaded");
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimelineError;

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_project(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, TimelineError::Io(_)));
    }

    #[test]
    fn garbage_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(load_project(&path), Err(TimelineError::Json(_))));
    }
}
