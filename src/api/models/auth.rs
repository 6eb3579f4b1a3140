use super::common::ReferenceType;
use crate::api::traits::ResponseItem;
use crate::impl_rest_identity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRequestType {
    #[serde(rename = "@contentUrl", default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsRequestType {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@password", default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "@personalAccessTokenName", default, skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
    #[serde(rename = "@personalAccessTokenSecret", default, skip_serializing_if = "Option::is_none")]
    pub token_secret: Option<String>,
    #[serde(default)]
    pub site: SiteRequestType,
}

impl CredentialsRequestType {
    /// User name to sign in as: the explicit name, else the token name.
    pub fn principal(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.token_name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct SignInRequest {
    #[serde(default)]
    pub credentials: CredentialsRequestType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInSiteType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@contentUrl")]
    pub content_url: String,
}

/// `<credentials token="...">` returned by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsType {
    #[serde(rename = "@token")]
    pub token: String,
    pub site: SignInSiteType,
    pub user: ReferenceType,
}

impl ResponseItem for CredentialsType {
    const ELEMENT: &'static str = "credentials";
    const COLLECTION: &'static str = "credentials";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@contentUrl")]
    pub content_url: String,
    #[serde(rename = "@state")]
    pub state: String,
}

impl SiteType {
    pub fn new(name: impl Into<String>, content_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            content_url: content_url.into(),
            state: "Active".to_string(),
        }
    }
}

impl ResponseItem for SiteType {
    const ELEMENT: &'static str = "site";
    const COLLECTION: &'static str = "sites";
}

impl_rest_identity!(SiteType);

impl crate::api::traits::WithContentUrl for SiteType {
    fn content_url(&self) -> Option<&str> {
        Some(&self.content_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVersionType {
    #[serde(rename = "@build")]
    pub build: String,
    #[serde(rename = "$text")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfoType {
    #[serde(rename = "productVersion")]
    pub product_version: ProductVersionType,
    #[serde(rename = "restApiVersion")]
    pub rest_api_version: String,
}

impl ResponseItem for ServerInfoType {
    const ELEMENT: &'static str = "serverInfo";
    const COLLECTION: &'static str = "serverInfo";
}
