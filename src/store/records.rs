use crate::identity::{Role, Tier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A coached client as the document store holds it. Identifiers and creation
/// timestamps are generated here; everything else about persistence belongs
/// to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
}

impl ClientRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, role: Role, tier: Tier) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            role,
            tier,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPhoto {
    pub id: Uuid,
    pub client_id: Uuid,
    /// Retrievable URL handed back by the object store.
    pub url: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProgressPhoto {
    #[must_use]
    pub fn new(client_id: Uuid, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            url: url.into(),
            note: None,
            created_at: Utc::now(),
        }
    }
}
