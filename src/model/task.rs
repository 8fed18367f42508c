use std::fmt;

use chrono::NaiveDate;
use egui::Color32;
use serde::{Deserialize, Serialize};

use super::dates;

/// Store-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Store-assigned dependency identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyId(pub u64);

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Represents the type of dependency between two tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DependencyKind {
    #[default]
    #[serde(rename = "FS")]
    FinishToStart,
    #[serde(rename = "SS")]
    StartToStart,
    #[serde(rename = "FF")]
    FinishToFinish,
    #[serde(rename = "SF")]
    StartToFinish,
}

impl DependencyKind {
    pub fn short_label(self) -> &'static str {
        match self {
            DependencyKind::FinishToStart => "FS",
            DependencyKind::StartToStart => "SS",
            DependencyKind::FinishToFinish => "FF",
            DependencyKind::StartToFinish => "SF",
        }
    }
}

/// A directed link: the successor waits on the predecessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: DependencyId,
    pub predecessor: TaskId,
    pub successor: TaskId,
    #[serde(rename = "type", default)]
    pub kind: DependencyKind,
    /// Lag in days. Informational only.
    #[serde(default)]
    pub lag: i32,
}

/// One task bar as delivered by the task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBar {
    pub id: TaskId,
    pub name: String,
    #[serde(rename = "start_date", with = "dates::date_only", default = "dates::today")]
    pub start: NaiveDate,
    /// Inclusive.
    #[serde(rename = "end_date", with = "dates::date_only", default = "dates::today")]
    pub end: NaiveDate,
    /// Percent complete, 0–100.
    #[serde(default, with = "progress_percent")]
    pub progress: u8,
    #[serde(rename = "parent", default)]
    pub parent_id: Option<TaskId>,
    /// Linked work item in the board; bars without one cannot be opened.
    #[serde(rename = "related_workitem", default)]
    pub linked_item: Option<u64>,
    #[serde(default, with = "hex_color_opt")]
    pub color: Option<Color32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskBar>,
}

impl TaskBar {
    pub fn new(id: u64, name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: TaskId(id),
            name: name.into(),
            start,
            end,
            progress: 0,
            parent_id: None,
            linked_item: None,
            color: None,
            children: Vec::new(),
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_linked_item(mut self, item: u64) -> Self {
        self.linked_item = Some(item);
        self
    }

    pub fn with_parent(mut self, parent: TaskId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn with_children(mut self, children: Vec<TaskBar>) -> Self {
        self.children = children;
        self
    }

    /// Inclusive length in days, never less than one.
    pub fn duration_days(&self) -> i64 {
        (dates::days_between(self.start, self.end) + 1).max(1)
    }
}

/// Progress arrives as a number that may be fractional or out of range.
mod progress_percent {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(progress: &u8, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(*progress)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<f64> = Option::deserialize(deserializer)?;
        Ok(match raw {
            Some(v) if v.is_finite() => v.round().clamp(0.0, 100.0) as u8,
            _ => 0,
        })
    }
}

/// Serde helper for `Option<Color32>` stored as `#RRGGBB` / `#RRGGBBAA`.
/// Unparseable colours become `None` so the palette takes over.
pub mod hex_color_opt {
    use egui::Color32;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(color: &Option<Color32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match color {
            Some(c) => {
                let [r, g, b, a] = c.to_array();
                if a == 255 {
                    serializer.serialize_str(&format!("#{:02X}{:02X}{:02X}", r, g, b))
                } else {
                    serializer.serialize_str(&format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a))
                }
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Color32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(|s| parse_hex_color(s).ok()))
    }

    pub fn parse_hex_color(s: &str) -> Result<Color32, String> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return Err(format!("Invalid hex color '{}'", s));
        }
        let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string());
        match s.len() {
            6 => Ok(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color32::from_rgba_unmultiplied(
                byte(0)?,
                byte(2)?,
                byte(4)?,
                byte(6)?,
            )),
            _ => Err(format!("Invalid hex color '{}': expected 6 or 8 hex digits", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_store_record() {
        let json = r##"{
            "id": 7,
            "name": "Design",
            "start_date": "2025-01-01T00:00:00Z",
            "end_date": "2025-01-10",
            "progress": 42.6,
            "color": "#3366cc",
            "related_workitem": 99,
            "parent": null,
            "children": [
                { "id": 8, "name": "Sketch", "start_date": "2025-01-02", "end_date": "2025-01-03" }
            ]
        }"##;
        let task: TaskBar = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, TaskId(7));
        assert_eq!(task.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(task.end, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert_eq!(task.progress, 43);
        assert_eq!(task.color, Some(Color32::from_rgb(0x33, 0x66, 0xcc)));
        assert_eq!(task.linked_item, Some(99));
        assert_eq!(task.children.len(), 1);
        assert_eq!(task.children[0].progress, 0);
        assert_eq!(task.duration_days(), 10);
    }

    #[test]
    fn tolerates_bad_color_and_progress() {
        let json = r#"{ "id": 1, "name": "x", "start_date": "2025-01-01",
                        "end_date": "2025-01-01", "progress": 250, "color": "teal" }"#;
        let task: TaskBar = serde_json::from_str(json).unwrap();
        assert_eq!(task.progress, 100);
        assert_eq!(task.color, None);
    }

    #[test]
    fn dependency_kind_uses_short_codes() {
        let json = r#"{ "id": 100, "predecessor": 1, "successor": 2, "type": "SS", "lag": 2 }"#;
        let dep: Dependency = serde_json::from_str(json).unwrap();
        assert_eq!(dep.kind, DependencyKind::StartToStart);
        assert_eq!(dep.lag, 2);

        let out = serde_json::to_value(&dep).unwrap();
        assert_eq!(out["type"], "SS");
    }

    #[test]
    fn serializes_iso_dates() {
        let task = TaskBar::new(
            1,
            "x",
            NaiveDate::from_ymd_opt(2025, 1, 4).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
        );
        let out = serde_json::to_value(&task).unwrap();
        assert_eq!(out["start_date"], "2025-01-04");
        assert_eq!(out["end_date"], "2025-01-13");
        assert!(out.get("children").is_none());
    }
}
