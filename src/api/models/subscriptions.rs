use super::common::{IdReference, ReferenceType};
use super::schedules::TaskScheduleType;
use crate::api::traits::{ResponseItem, RestIdentifiable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscribed content: a workbook or a view, referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionContentType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@type")]
    pub content_type: String,
    #[serde(rename = "@sendIfViewEmpty", default)]
    pub send_if_view_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@subject")]
    pub subject: String,
    #[serde(rename = "@message", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "@attachImage", default)]
    pub attach_image: bool,
    #[serde(rename = "@attachPdf", default)]
    pub attach_pdf: bool,
    #[serde(rename = "@suspended", default)]
    pub suspended: bool,
    pub content: SubscriptionContentType,
    pub schedule: TaskScheduleType,
    pub user: ReferenceType,
}

impl ResponseItem for SubscriptionType {
    const ELEMENT: &'static str = "subscription";
    const COLLECTION: &'static str = "subscriptions";
}

impl RestIdentifiable for SubscriptionType {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionContentRequestType {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(rename = "@sendIfViewEmpty", default, skip_serializing_if = "Option::is_none")]
    pub send_if_view_empty: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequestType {
    #[serde(rename = "@subject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "@message", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "@attachImage", default, skip_serializing_if = "Option::is_none")]
    pub attach_image: Option<bool>,
    #[serde(rename = "@attachPdf", default, skip_serializing_if = "Option::is_none")]
    pub attach_pdf: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<SubscriptionContentRequestType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<IdReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<IdReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct CreateSubscriptionRequest {
    #[serde(default)]
    pub subscription: SubscriptionRequestType,
}
