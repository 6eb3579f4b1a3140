//! Data-transfer objects mirroring the REST API's XML schema.
//!
//! Attribute fields are renamed with an `@` prefix and element text with
//! `$text`, so one set of serde derives serves both the XML and the JSON
//! encodings (see [`crate::api::serialization`]).

pub mod auth;
pub mod common;
pub mod data_sources;
pub mod favorites;
pub mod groups;
pub mod permissions;
pub mod projects;
pub mod schedules;
pub mod subscriptions;
pub mod uploads;
pub mod users;
pub mod workbooks;

pub use auth::{
    CredentialsRequestType, CredentialsType, ProductVersionType, ServerInfoType, SignInRequest,
    SignInSiteType, SiteRequestType, SiteType,
};
pub use common::{
    DomainType, ErrorType, IdReference, OwnerType, Pagination, ProjectReferenceType,
    ReferenceType, TagType, TagsType, UserReferenceType, ViewReferenceType,
    WorkbookReferenceType, content_url_for, timestamp_now,
};
pub use data_sources::{
    CommitDataSourceRequest, CommitDataSourceType, ConnectionCredentialsType,
    ConnectionRequestType, ConnectionsRequestType, DataSourceType, embedded_credentials,
};
pub use favorites::{
    AddFavoriteRequest, FavoriteContentType, FavoriteKey, FavoriteRequestType, FavoriteType,
};
pub use groups::{
    CreateGroupRequest, CreateGroupSetRequest, GroupRequestType, GroupSetRequestType,
    GroupSetType, GroupType, ImportType,
};
pub use permissions::{
    CapabilitiesType, CapabilityMode, CapabilityType, GranteeCapabilitiesType, GranteeKind,
    PermissionsRequest, PermissionsType,
};
pub use projects::{ProjectRequest, ProjectRequestType, ProjectType};
pub use schedules::{
    CreateExtractRefreshTaskRequest, ExtractRefreshRequestType, ExtractRefreshType,
    FrequencyDetailsType, IntervalType, IntervalsType, ScheduleRequestType, ScheduleType,
    TaskScheduleType, TaskType,
};
pub use subscriptions::{
    CreateSubscriptionRequest, SubscriptionContentRequestType, SubscriptionContentType,
    SubscriptionRequestType, SubscriptionType,
};
pub use uploads::FileUploadType;
pub use users::{UserIdRequest, UserRequest, UserRequestType, UserType};
pub use workbooks::{
    CommitWorkbookRequest, CommitWorkbookType, CustomViewType, UpdateWorkbookRequest,
    UpdateWorkbookType, ViewType, ViewVisibilityType, ViewsVisibilityType, WorkbookSource,
    WorkbookType,
};
