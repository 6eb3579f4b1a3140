use super::common::{
    IdReference, OwnerType, ProjectReferenceType, ReferenceType, TagsType, ViewReferenceType,
    WorkbookReferenceType, timestamp_now,
};
use super::data_sources::{ConnectionCredentialsType, ConnectionsRequestType};
use crate::api::traits::{
    NamedContent, ResponseItem, RestIdentifiable, WithContentUrl, WithOwner, WithProject,
    WithTags,
};
use crate::impl_rest_identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "@contentUrl", default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(rename = "@webpageUrl", default, skip_serializing_if = "Option::is_none")]
    pub webpage_url: Option<String>,
    #[serde(rename = "@showTabs", default)]
    pub show_tabs: bool,
    #[serde(rename = "@size", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(rename = "@createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "@updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerType>,
    #[serde(default, skip_serializing_if = "TagsType::is_empty")]
    pub tags: TagsType,
}

/// Read access to a workbook-shaped value, used to build a [`WorkbookType`]
/// from any source that exposes the same fields.
pub trait WorkbookSource:
    RestIdentifiable + NamedContent + WithContentUrl + WithOwner + WithProject + WithTags
{
    fn description(&self) -> Option<&str>;
    fn show_tabs(&self) -> bool;
    fn size(&self) -> Option<u64>;
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

impl WorkbookType {
    pub fn new(name: impl Into<String>, project: Uuid) -> Self {
        let name = name.into();
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            content_url: Some(super::common::content_url_for(&name)),
            name,
            description: None,
            webpage_url: None,
            show_tabs: false,
            size: None,
            created_at: Some(now),
            updated_at: Some(now),
            project: Some(ProjectReferenceType::new(project)),
            owner: None,
            tags: TagsType::default(),
        }
    }

    pub fn with_owner(mut self, owner: Uuid) -> Self {
        self.owner = Some(OwnerType::new(owner));
        self
    }

    pub fn from_source<S: WorkbookSource + ?Sized>(source: &S) -> Self {
        Self {
            id: source.id(),
            name: source.name().to_string(),
            description: source.description().map(str::to_string),
            content_url: source.content_url().map(str::to_string),
            webpage_url: None,
            show_tabs: source.show_tabs(),
            size: source.size(),
            created_at: source.created_at(),
            updated_at: source.updated_at(),
            project: source.project_id().map(ProjectReferenceType::new),
            owner: source.owner_id().map(OwnerType::new),
            tags: TagsType::from_labels(source.tag_labels()),
        }
    }
}

impl ResponseItem for WorkbookType {
    const ELEMENT: &'static str = "workbook";
    const COLLECTION: &'static str = "workbooks";
}

impl_rest_identity!(WorkbookType);

impl WithContentUrl for WorkbookType {
    fn content_url(&self) -> Option<&str> {
        self.content_url.as_deref()
    }
}

impl WithOwner for WorkbookType {
    fn owner_id(&self) -> Option<Uuid> {
        self.owner.as_ref().map(|owner| owner.id)
    }
}

impl WithProject for WorkbookType {
    fn project_id(&self) -> Option<Uuid> {
        self.project.as_ref().map(|project| project.id)
    }
}

impl WithTags for WorkbookType {
    fn tag_labels(&self) -> Vec<&str> {
        self.tags.labels()
    }
}

impl WorkbookSource for WorkbookType {
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn show_tabs(&self) -> bool {
        self.show_tabs
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@contentUrl", default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(rename = "@sheetType", default, skip_serializing_if = "Option::is_none")]
    pub sheet_type: Option<String>,
    #[serde(rename = "@createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "@updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook: Option<WorkbookReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectReferenceType>,
    #[serde(default, skip_serializing_if = "TagsType::is_empty")]
    pub tags: TagsType,
}

impl ViewType {
    /// A view for one sheet of `workbook`; the content URL follows the
    /// `{workbook}/sheets/{sheet}` convention.
    pub fn for_sheet(workbook: &WorkbookType, sheet: &str, sheet_type: &str) -> Self {
        let workbook_url = workbook
            .content_url
            .clone()
            .unwrap_or_else(|| super::common::content_url_for(&workbook.name));
        Self {
            id: Uuid::new_v4(),
            name: sheet.to_string(),
            content_url: Some(format!(
                "{}/sheets/{}",
                workbook_url,
                super::common::content_url_for(sheet)
            )),
            sheet_type: Some(sheet_type.to_string()),
            created_at: workbook.created_at,
            updated_at: workbook.updated_at,
            workbook: Some(WorkbookReferenceType::named(workbook.id, workbook.name.clone())),
            owner: workbook.owner.clone(),
            project: workbook.project.clone(),
            tags: TagsType::default(),
        }
    }

    pub fn workbook_id(&self) -> Option<Uuid> {
        self.workbook.as_ref().map(|workbook| workbook.id)
    }
}

impl ResponseItem for ViewType {
    const ELEMENT: &'static str = "view";
    const COLLECTION: &'static str = "views";
}

impl_rest_identity!(ViewType);

impl WithContentUrl for ViewType {
    fn content_url(&self) -> Option<&str> {
        self.content_url.as_deref()
    }
}

impl WithOwner for ViewType {
    fn owner_id(&self) -> Option<Uuid> {
        self.owner.as_ref().map(|owner| owner.id)
    }
}

impl WithProject for ViewType {
    fn project_id(&self) -> Option<Uuid> {
        self.project.as_ref().map(|project| project.id)
    }
}

impl WithTags for ViewType {
    fn tag_labels(&self) -> Vec<&str> {
        self.tags.labels()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomViewType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@shared", default)]
    pub shared: bool,
    #[serde(rename = "@createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "@updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook: Option<WorkbookReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerType>,
}

impl CustomViewType {
    pub fn new(name: impl Into<String>, view: &ViewType, owner: Uuid) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            shared: false,
            created_at: Some(now),
            updated_at: Some(now),
            view: Some(ReferenceType::named(view.id, view.name.clone())),
            workbook: view.workbook.clone(),
            owner: Some(OwnerType::new(owner)),
        }
    }
}

impl ResponseItem for CustomViewType {
    const ELEMENT: &'static str = "customView";
    const COLLECTION: &'static str = "customViews";
}

impl_rest_identity!(CustomViewType);

impl WithOwner for CustomViewType {
    fn owner_id(&self) -> Option<Uuid> {
        self.owner.as_ref().map(|owner| owner.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewVisibilityType {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@hidden", default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewsVisibilityType {
    #[serde(rename = "view", default)]
    pub views: Vec<ViewVisibilityType>,
}

/// `<workbook>` element of a publish (commit) request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitWorkbookType {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "@showTabs", default, skip_serializing_if = "Option::is_none")]
    pub show_tabs: Option<bool>,
    #[serde(rename = "connectionCredentials", default, skip_serializing_if = "Option::is_none")]
    pub connection_credentials: Option<ConnectionCredentialsType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<ConnectionsRequestType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<IdReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<ViewsVisibilityType>,
}

impl CommitWorkbookType {
    pub fn hidden_views(&self) -> Vec<&str> {
        self.views
            .iter()
            .flat_map(|views| views.views.iter())
            .filter(|view| view.hidden)
            .map(|view| view.name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct CommitWorkbookRequest {
    #[serde(default)]
    pub workbook: CommitWorkbookType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateWorkbookType {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "@showTabs", default, skip_serializing_if = "Option::is_none")]
    pub show_tabs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<IdReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<IdReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct UpdateWorkbookRequest {
    #[serde(default)]
    pub workbook: UpdateWorkbookType,
}
