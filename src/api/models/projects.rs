use super::common::{OwnerType, timestamp_now};
use crate::api::traits::{ResponseItem, WithOwner};
use crate::impl_rest_identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CONTENT_PERMISSIONS: &[&str] = &[
    "LockedToProject",
    "LockedToProjectWithoutNested",
    "ManagedByOwner",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "@contentPermissions", default, skip_serializing_if = "Option::is_none")]
    pub content_permissions: Option<String>,
    #[serde(rename = "@parentProjectId", default, skip_serializing_if = "Option::is_none")]
    pub parent_project_id: Option<Uuid>,
    #[serde(rename = "@createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "@updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerType>,
}

impl ProjectType {
    pub fn new(name: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            content_permissions: Some("ManagedByOwner".to_string()),
            parent_project_id: None,
            created_at: Some(now),
            updated_at: Some(now),
            owner: None,
        }
    }

    pub fn with_parent(mut self, parent: Uuid) -> Self {
        self.parent_project_id = Some(parent);
        self
    }

    pub fn with_owner(mut self, owner: Uuid) -> Self {
        self.owner = Some(OwnerType::new(owner));
        self
    }

    /// Project names are unique among siblings, compared case-insensitively.
    pub fn conflicts_with(&self, name: &str, parent: Option<Uuid>) -> bool {
        self.parent_project_id == parent && self.name.eq_ignore_ascii_case(name)
    }
}

impl ResponseItem for ProjectType {
    const ELEMENT: &'static str = "project";
    const COLLECTION: &'static str = "projects";
}

impl_rest_identity!(ProjectType);

impl WithOwner for ProjectType {
    fn owner_id(&self) -> Option<Uuid> {
        self.owner.as_ref().map(|owner| owner.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequestType {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "@contentPermissions", default, skip_serializing_if = "Option::is_none")]
    pub content_permissions: Option<String>,
    #[serde(rename = "@parentProjectId", default, skip_serializing_if = "Option::is_none")]
    pub parent_project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct ProjectRequest {
    #[serde(default)]
    pub project: ProjectRequestType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_only_among_siblings() {
        let parent = Uuid::new_v4();
        let project = ProjectType::new("Finance").with_parent(parent);
        assert!(project.conflicts_with("finance", Some(parent)));
        assert!(!project.conflicts_with("finance", None));
        assert!(!project.conflicts_with("Marketing", Some(parent)));
    }

    #[test]
    fn test_owner_accessor() {
        let owner = Uuid::new_v4();
        let project = ProjectType::new("Ops").with_owner(owner);
        assert_eq!(project.owner_id(), Some(owner));
        assert_eq!(ProjectType::new("Ops").owner_id(), None);
    }
}
