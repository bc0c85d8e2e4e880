//! Documents attached to tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::Entity;
use crate::id::DocumentId;

/// Metadata of an uploaded document. The file body itself is never held
/// client-side; `file_url` points at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn new(id: DocumentId, file_name: impl Into<String>) -> Self {
        Self {
            id,
            file_name: Some(file_name.into()),
            file: None,
            file_url: None,
            uploaded_at: None,
            extra: Map::new(),
        }
    }
}

impl Entity for Document {
    type Id = DocumentId;

    fn id(&self) -> &DocumentId {
        &self.id
    }
}
