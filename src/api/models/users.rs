use super::common::DomainType;
use crate::api::traits::ResponseItem;
use crate::impl_rest_identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Site roles the simulated server accepts when users are created or updated.
pub const SITE_ROLES: &[&str] = &[
    "Creator",
    "Explorer",
    "ExplorerCanPublish",
    "ServerAdministrator",
    "SiteAdministratorCreator",
    "SiteAdministratorExplorer",
    "Unlicensed",
    "Viewer",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@fullName", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(rename = "@email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "@siteRole")]
    pub site_role: String,
    #[serde(rename = "@authSetting", default, skip_serializing_if = "Option::is_none")]
    pub auth_setting: Option<String>,
    #[serde(rename = "@lastLogin", default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub domain: DomainType,
}

impl UserType {
    pub fn new(name: impl Into<String>, site_role: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            full_name: None,
            email: None,
            site_role: site_role.into(),
            auth_setting: None,
            last_login: None,
            domain: DomainType::local(),
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = DomainType {
            name: domain.into(),
        };
        self
    }

    /// Users are unique per (name, domain), compared case-insensitively.
    pub fn same_identity(&self, name: &str, domain: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) && self.domain.name.eq_ignore_ascii_case(domain)
    }
}

impl ResponseItem for UserType {
    const ELEMENT: &'static str = "user";
    const COLLECTION: &'static str = "users";
}

impl_rest_identity!(UserType);

/// `<user>` element of add-user and update-user requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRequestType {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@fullName", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(rename = "@email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "@siteRole", default, skip_serializing_if = "Option::is_none")]
    pub site_role: Option<String>,
    #[serde(rename = "@authSetting", default, skip_serializing_if = "Option::is_none")]
    pub auth_setting: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct UserRequest {
    #[serde(default)]
    pub user: UserRequestType,
}

/// `<tsRequest><user id="..."/></tsRequest>` used to add a user to a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct UserIdRequest {
    #[serde(default)]
    pub user: super::common::IdReference,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_identity_is_case_insensitive() {
        let user = UserType::new("Alice", "Viewer").with_domain("CORP");
        assert!(user.same_identity("alice", "corp"));
        assert!(!user.same_identity("alice", "local"));
        assert!(!user.same_identity("bob", "corp"));
    }

    #[test]
    fn test_new_user_defaults_to_local_domain() {
        let user = UserType::new("bob", "Creator");
        assert_eq!(user.domain.name, "local");
        assert_eq!(user.site_role, "Creator");
        assert!(user.email.is_none());
    }
}
