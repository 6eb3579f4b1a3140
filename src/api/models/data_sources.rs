use super::common::{IdReference, OwnerType, ProjectReferenceType, TagsType, timestamp_now};
use crate::api::traits::{ResponseItem, WithContentUrl, WithOwner, WithProject, WithTags};
use crate::impl_rest_identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "@contentUrl", default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub data_source_type: Option<String>,
    #[serde(rename = "@createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "@updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "@hasExtracts", default)]
    pub has_extracts: bool,
    #[serde(rename = "@isCertified", default)]
    pub is_certified: bool,
    #[serde(rename = "@useRemoteQueryAgent", default)]
    pub use_remote_query_agent: bool,
    #[serde(rename = "@size", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerType>,
    #[serde(default, skip_serializing_if = "TagsType::is_empty")]
    pub tags: TagsType,
}

impl DataSourceType {
    pub fn new(name: impl Into<String>, project: Uuid) -> Self {
        let name = name.into();
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            content_url: Some(super::common::content_url_for(&name)),
            name,
            description: None,
            data_source_type: None,
            created_at: Some(now),
            updated_at: Some(now),
            has_extracts: false,
            is_certified: false,
            use_remote_query_agent: false,
            size: None,
            project: Some(ProjectReferenceType::new(project)),
            owner: None,
            tags: TagsType::default(),
        }
    }

    pub fn with_owner(mut self, owner: Uuid) -> Self {
        self.owner = Some(OwnerType::new(owner));
        self
    }
}

impl ResponseItem for DataSourceType {
    const ELEMENT: &'static str = "datasource";
    const COLLECTION: &'static str = "datasources";
}

impl_rest_identity!(DataSourceType);

impl WithContentUrl for DataSourceType {
    fn content_url(&self) -> Option<&str> {
        self.content_url.as_deref()
    }
}

impl WithOwner for DataSourceType {
    fn owner_id(&self) -> Option<Uuid> {
        self.owner.as_ref().map(|owner| owner.id)
    }
}

impl WithProject for DataSourceType {
    fn project_id(&self) -> Option<Uuid> {
        self.project.as_ref().map(|project| project.id)
    }
}

impl WithTags for DataSourceType {
    fn tag_labels(&self) -> Vec<&str> {
        self.tags.labels()
    }
}

/// Credentials embedded into a published workbook or data source connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCredentialsType {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@password", default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "@embed", default)]
    pub embed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRequestType {
    #[serde(rename = "@serverAddress", default, skip_serializing_if = "Option::is_none")]
    pub server_address: Option<String>,
    #[serde(rename = "@serverPort", default, skip_serializing_if = "Option::is_none")]
    pub server_port: Option<String>,
    #[serde(rename = "connectionCredentials", default, skip_serializing_if = "Option::is_none")]
    pub connection_credentials: Option<ConnectionCredentialsType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionsRequestType {
    #[serde(rename = "connection", default)]
    pub connections: Vec<ConnectionRequestType>,
}

/// `<datasource>` element of a publish (commit) request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDataSourceType {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "@useRemoteQueryAgent", default, skip_serializing_if = "Option::is_none")]
    pub use_remote_query_agent: Option<bool>,
    #[serde(rename = "connectionCredentials", default, skip_serializing_if = "Option::is_none")]
    pub connection_credentials: Option<ConnectionCredentialsType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<ConnectionsRequestType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<IdReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct CommitDataSourceRequest {
    #[serde(default)]
    pub datasource: CommitDataSourceType,
}

/// Credentials to embed, from the single `connectionCredentials` element or,
/// failing that, the first connection that carries credentials.
pub fn embedded_credentials<'a>(
    single: Option<&'a ConnectionCredentialsType>,
    connections: Option<&'a ConnectionsRequestType>,
) -> Option<&'a ConnectionCredentialsType> {
    single.or_else(|| {
        connections?
            .connections
            .iter()
            .find_map(|connection| connection.connection_credentials.as_ref())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_credentials_prefers_single_element() {
        let single = ConnectionCredentialsType {
            name: Some("svc".to_string()),
            password: None,
            embed: true,
        };
        let connections = ConnectionsRequestType {
            connections: vec![ConnectionRequestType {
                server_address: Some("db.example".to_string()),
                server_port: None,
                connection_credentials: Some(ConnectionCredentialsType {
                    name: Some("other".to_string()),
                    ..Default::default()
                }),
            }],
        };

        let picked = embedded_credentials(Some(&single), Some(&connections));
        assert_eq!(picked.and_then(|c| c.name.as_deref()), Some("svc"));

        let picked = embedded_credentials(None, Some(&connections));
        assert_eq!(picked.and_then(|c| c.name.as_deref()), Some("other"));

        assert!(embedded_credentials(None, None).is_none());
    }

    #[test]
    fn test_new_data_source_content_url() {
        let source = DataSourceType::new("Orders (Prod)", Uuid::new_v4());
        assert_eq!(source.content_url(), Some("orders-prod"));
        assert!(source.owner_id().is_none());
    }
}
