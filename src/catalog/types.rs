//! Content hierarchy types
//!
//! Courses nest week → day → content, but the model evolved over time
//! and older documents still carry content in legacy flat lists or
//! module-level document lists. Every list field defaults to empty so
//! old and new document shapes deserialize side by side. A course may
//! also delegate its entire week list to a shared-content tree that
//! several courses reference.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a content entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Pdf,
    Document,
    Quiz,
}

/// A single piece of content inside the hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    pub id: Uuid,

    pub title: String,

    #[serde(rename = "type")]
    pub content_type: ContentType,

    /// Key of the backing object. Absent for entries with no stored
    /// asset (e.g. quizzes).
    #[serde(default)]
    pub storage_key: Option<String>,
}

/// One day inside a week
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub day_number: u32,

    #[serde(default)]
    pub contents: Vec<ContentNode>,
}

/// One week of a course
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub week_number: u32,

    /// Current structure: content nested under days
    #[serde(default)]
    pub days: Vec<Day>,

    /// Legacy structure: content directly under the week
    #[serde(default)]
    pub contents: Vec<ContentNode>,

    /// Module-level documents attached to the week itself
    #[serde(default)]
    pub documents: Vec<ContentNode>,
}

/// A course tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,

    pub title: String,

    #[serde(default)]
    pub weeks: Vec<Week>,

    /// Course-level documents outside the week hierarchy
    #[serde(default)]
    pub other_documents: Vec<ContentNode>,

    /// When set, the course's weeks live in a shared-content tree
    #[serde(default)]
    pub shared_content_id: Option<Uuid>,
}

/// A shared-content tree referenced by one or more courses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedContent {
    pub id: Uuid,

    pub title: String,

    #[serde(default)]
    pub weeks: Vec<Week>,

    #[serde(default)]
    pub other_documents: Vec<ContentNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_flat_shape_deserializes() {
        let course: Course = serde_json::from_str(
            r#"{
                "id": "0c6b1a42-33cf-41a2-a3e0-1c2c21c1dd11",
                "title": "Rust 101",
                "weeks": [{
                    "weekNumber": 1,
                    "contents": [{
                        "id": "3db1e50a-5e3c-4b87-9a3e-9a35f5a60001",
                        "title": "Intro",
                        "type": "video",
                        "storageKey": "courses/rust-101/intro.mp4"
                    }]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(course.weeks[0].contents.len(), 1);
        assert!(course.weeks[0].days.is_empty());
        assert!(course.other_documents.is_empty());
    }

    #[test]
    fn test_node_without_storage_key_deserializes() {
        let node: ContentNode = serde_json::from_str(
            r#"{
                "id": "3db1e50a-5e3c-4b87-9a3e-9a35f5a60002",
                "title": "Week quiz",
                "type": "quiz"
            }"#,
        )
        .unwrap();
        assert_eq!(node.content_type, ContentType::Quiz);
        assert!(node.storage_key.is_none());
    }
}
