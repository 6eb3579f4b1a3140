use super::common::{DomainType, ReferenceType};
use crate::api::traits::ResponseItem;
use crate::impl_rest_identity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportType {
    #[serde(rename = "@source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "@domainName", default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(rename = "@grantLicenseMode", default, skip_serializing_if = "Option::is_none")]
    pub grant_license_mode: Option<String>,
    #[serde(rename = "@siteRole", default, skip_serializing_if = "Option::is_none")]
    pub site_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@minimumSiteRole", default, skip_serializing_if = "Option::is_none")]
    pub minimum_site_role: Option<String>,
    #[serde(default)]
    pub domain: DomainType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportType>,
}

impl GroupType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            minimum_site_role: None,
            domain: DomainType::local(),
            import: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = DomainType {
            name: domain.into(),
        };
        self
    }

    pub fn same_identity(&self, name: &str, domain: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) && self.domain.name.eq_ignore_ascii_case(domain)
    }
}

impl ResponseItem for GroupType {
    const ELEMENT: &'static str = "group";
    const COLLECTION: &'static str = "groups";
}

impl_rest_identity!(GroupType);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSetType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@groupCount")]
    pub group_count: usize,
    #[serde(rename = "group", default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<ReferenceType>,
}

impl GroupSetType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            group_count: 0,
            groups: Vec::new(),
        }
    }

    pub fn add_group(&mut self, group: &GroupType) {
        if self.groups.iter().all(|existing| existing.id != group.id) {
            self.groups
                .push(ReferenceType::named(group.id, group.name.clone()));
            self.group_count = self.groups.len();
        }
    }
}

impl ResponseItem for GroupSetType {
    const ELEMENT: &'static str = "groupSet";
    const COLLECTION: &'static str = "groupSets";
}

impl_rest_identity!(GroupSetType);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRequestType {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@minimumSiteRole", default, skip_serializing_if = "Option::is_none")]
    pub minimum_site_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct CreateGroupRequest {
    #[serde(default)]
    pub group: GroupRequestType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSetRequestType {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct CreateGroupSetRequest {
    #[serde(rename = "groupSet", default)]
    pub group_set: GroupSetRequestType,
}
