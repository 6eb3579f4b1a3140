//! Publish (commit) of workbooks and data sources.
//!
//! The file comes either from a finished upload session
//! (`?uploadSessionId=`) or from the file part of a single multipart request.
//! [`commit`] is generic over a [`CommitTarget`] that supplies the typed
//! request, the entity construction and its storage.

use super::entity::{self, EntityRoute};
use super::errors::{self, sub_codes};
use super::payload::{self, RewriteOptions, Rewritten};
use super::users::non_blank;
use crate::api::ItemResponse;
use crate::api::RestError;
use crate::api::models::{
    CommitDataSourceRequest, CommitWorkbookRequest, DataSourceType, OwnerType, ViewType,
    WorkbookType, embedded_credentials,
};
use crate::api::traits::{NamedContent, ResponseItem, RestIdentifiable, WithProject};
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::{ServerState, StoredFile};
use crate::error::{BuildResponseError, SimulationError};
use log::debug;
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub const UPLOAD_SESSION_PARAM: &str = "uploadSessionId";
pub const OVERWRITE_PARAM: &str = "overwrite";

/// Where the published bytes came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub upload_session: Option<String>,
}

/// Fields every commit request carries.
pub struct CommitFields<'a> {
    pub name: &'a str,
    pub project: Uuid,
    pub connection_user: Option<&'a str>,
}

/// Entity built from a commit request, ready to store.
pub struct Committed<T> {
    pub item: T,
    pub views: Vec<ViewType>,
    pub file: StoredFile,
}

pub trait CommitTarget {
    type Request: DeserializeOwned;
    type Item: ResponseItem + RestIdentifiable + NamedContent + WithProject;

    /// Multipart part carrying the file in a single-request publish.
    const FILE_PART: &'static str;
    /// Query parameter naming the file type (`twb`, `twbx`, ...).
    const TYPE_PARAM: &'static str;
    const DEFAULT_EXTENSION: &'static str;
    /// Request element name, for error details.
    const ELEMENT: &'static str;
    /// Whether names are unique per project rather than per site.
    const PROJECT_SCOPED: bool;

    fn route() -> EntityRoute<Self::Item>;

    fn fields(request: &Self::Request) -> (Option<&str>, Option<Uuid>, Option<&str>);

    fn build(
        request: &Self::Request,
        fields: &CommitFields<'_>,
        owner: Option<Uuid>,
        file: &UploadedFile,
    ) -> Result<Committed<Self::Item>, BuildResponseError>;

    fn evict(state: &mut ServerState, id: Uuid);

    fn store(state: &mut ServerState, committed: Committed<Self::Item>);
}

pub fn commit<C: CommitTarget>(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let request: C::Request = ctx.payload()?;
    let (name, project, connection_user) = C::fields(&request);
    let name = non_blank(name).ok_or_else(|| errors::missing_field(C::ELEMENT, "name"))?;
    let project = project.ok_or_else(|| errors::missing_field("project", "id"))?;
    entity::projects().require(state, project)?;

    let file = uploaded_file::<C>(ctx, name)?;
    let overwrite = ctx.query.flag(OVERWRITE_PARAM);
    let existing = existing_named::<C>(state, name, project, None);
    if existing.is_some() && !overwrite {
        return Err(errors::forbidden(
            sub_codes::PUBLISH_OVERWRITE,
            format!(
                "A {} named '{}' already exists; set overwrite=true to replace it",
                C::ELEMENT,
                name
            ),
        )
        .into());
    }

    let fields = CommitFields {
        name,
        project,
        connection_user,
    };
    let owner = state.session.as_ref().map(|session| session.user_id);
    let committed = C::build(&request, &fields, owner, &file)?;

    if let Some(id) = existing {
        debug!("Overwriting {} {}", C::ELEMENT, id);
        C::evict(state, id);
    }
    let item = committed.item.clone();
    C::store(state, committed);
    if let Some(session) = &file.upload_session {
        ctx.uploads.remove(session);
    }
    Ok(Built::created(ItemResponse::new(item)))
}

/// Id of the stored item that `name` in `project` would collide with,
/// ignoring `except`.
pub fn existing_named<C: CommitTarget>(
    state: &ServerState,
    name: &str,
    project: Uuid,
    except: Option<Uuid>,
) -> Option<Uuid> {
    (C::route().select)(state)
        .iter()
        .filter(|item| Some(item.id()) != except)
        .filter(|item| !C::PROJECT_SCOPED || item.project_id() == Some(project))
        .find(|item| item.name() == name)
        .map(|item| item.id())
}

fn uploaded_file<C: CommitTarget>(
    ctx: &RequestContext<'_>,
    name: &str,
) -> Result<UploadedFile, RestError> {
    let extension = ctx
        .query
        .get(C::TYPE_PARAM)
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty());

    if let Some(session) = ctx.query.get(UPLOAD_SESSION_PARAM) {
        let bytes = ctx.uploads.get(session).ok_or_else(|| {
            errors::not_found(sub_codes::UPLOAD_SESSION_NOT_FOUND, "Upload session", session)
        })?;
        let extension = extension.unwrap_or_else(|| C::DEFAULT_EXTENSION.to_string());
        return Ok(UploadedFile {
            file_name: format!("{}.{}", name, extension),
            bytes,
            upload_session: Some(session.to_string()),
        });
    }

    let part = ctx
        .form
        .as_ref()
        .and_then(|form| form.part(C::FILE_PART))
        .ok_or_else(|| {
            errors::bad_request(format!(
                "Publish requires '{}' or a '{}' multipart part",
                UPLOAD_SESSION_PARAM,
                C::FILE_PART
            ))
        })?;
    let file_name = match (&part.file_name, extension) {
        (_, Some(extension)) => format!("{}.{}", name, extension),
        (Some(file_name), None) if payload::extension_of(file_name).is_some() => file_name.clone(),
        _ => format!("{}.{}", name, C::DEFAULT_EXTENSION),
    };
    Ok(UploadedFile {
        file_name,
        bytes: part.data.to_vec(),
        upload_session: None,
    })
}

pub struct WorkbookCommit;

impl CommitTarget for WorkbookCommit {
    type Request = CommitWorkbookRequest;
    type Item = WorkbookType;

    const FILE_PART: &'static str = "tableau_workbook";
    const TYPE_PARAM: &'static str = "workbookType";
    const DEFAULT_EXTENSION: &'static str = "twb";
    const ELEMENT: &'static str = "workbook";
    const PROJECT_SCOPED: bool = false;

    fn route() -> EntityRoute<WorkbookType> {
        entity::workbooks()
    }

    fn fields(request: &CommitWorkbookRequest) -> (Option<&str>, Option<Uuid>, Option<&str>) {
        let workbook = &request.workbook;
        let credentials = embedded_credentials(
            workbook.connection_credentials.as_ref(),
            workbook.connections.as_ref(),
        );
        (
            workbook.name.as_deref(),
            workbook.project.as_ref().and_then(|project| project.id),
            credentials.and_then(|credentials| credentials.name.as_deref()),
        )
    }

    fn build(
        request: &CommitWorkbookRequest,
        fields: &CommitFields<'_>,
        owner: Option<Uuid>,
        file: &UploadedFile,
    ) -> Result<Committed<WorkbookType>, BuildResponseError> {
        let hidden = request.workbook.hidden_views();
        let Rewritten { bytes, sheets } = payload::rewrite(
            &file.file_name,
            &file.bytes,
            &RewriteOptions {
                connection_user: fields.connection_user,
                hidden_sheets: &hidden,
            },
        )?;

        let mut workbook = WorkbookType::new(fields.name, fields.project);
        workbook.description = request.workbook.description.clone();
        workbook.show_tabs = request.workbook.show_tabs.unwrap_or(false);
        workbook.size = Some(bytes.len() as u64);
        workbook.owner = owner.map(OwnerType::new);

        let views = sheets
            .iter()
            .map(|sheet| ViewType::for_sheet(&workbook, &sheet.name, sheet.sheet_type))
            .collect();
        Ok(Committed {
            item: workbook,
            views,
            file: StoredFile {
                file_name: file.file_name.clone(),
                bytes,
            },
        })
    }

    fn evict(state: &mut ServerState, id: Uuid) {
        state.evict_workbook(id);
    }

    fn store(state: &mut ServerState, committed: Committed<WorkbookType>) {
        let id = committed.item.id;
        state.workbooks.push(committed.item);
        state.views.extend(committed.views);
        state.files.insert(id, committed.file);
    }
}

pub struct DataSourceCommit;

impl CommitTarget for DataSourceCommit {
    type Request = CommitDataSourceRequest;
    type Item = DataSourceType;

    const FILE_PART: &'static str = "tableau_datasource";
    const TYPE_PARAM: &'static str = "datasourceType";
    const DEFAULT_EXTENSION: &'static str = "tds";
    const ELEMENT: &'static str = "datasource";
    const PROJECT_SCOPED: bool = true;

    fn route() -> EntityRoute<DataSourceType> {
        entity::data_sources()
    }

    fn fields(request: &CommitDataSourceRequest) -> (Option<&str>, Option<Uuid>, Option<&str>) {
        let source = &request.datasource;
        let credentials = embedded_credentials(
            source.connection_credentials.as_ref(),
            source.connections.as_ref(),
        );
        (
            source.name.as_deref(),
            source.project.as_ref().and_then(|project| project.id),
            credentials.and_then(|credentials| credentials.name.as_deref()),
        )
    }

    fn build(
        request: &CommitDataSourceRequest,
        fields: &CommitFields<'_>,
        owner: Option<Uuid>,
        file: &UploadedFile,
    ) -> Result<Committed<DataSourceType>, BuildResponseError> {
        let Rewritten { bytes, .. } = payload::rewrite(
            &file.file_name,
            &file.bytes,
            &RewriteOptions {
                connection_user: fields.connection_user,
                hidden_sheets: &[],
            },
        )?;

        let mut source = DataSourceType::new(fields.name, fields.project);
        source.description = request.datasource.description.clone();
        source.use_remote_query_agent = request.datasource.use_remote_query_agent.unwrap_or(false);
        source.has_extracts = matches!(
            payload::extension_of(&file.file_name).as_deref(),
            Some("tdsx") | Some("hyper")
        );
        source.data_source_type = payload::extension_of(&file.file_name);
        source.size = Some(bytes.len() as u64);
        source.owner = owner.map(OwnerType::new);
        Ok(Committed {
            item: source,
            views: Vec::new(),
            file: StoredFile {
                file_name: file.file_name.clone(),
                bytes,
            },
        })
    }

    fn evict(state: &mut ServerState, id: Uuid) {
        state.evict_data_source(id);
    }

    fn store(state: &mut ServerState, committed: Committed<DataSourceType>) {
        let id = committed.item.id;
        state.data_sources.push(committed.item);
        state.files.insert(id, committed.file);
    }
}

pub fn publish_workbook(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    commit::<WorkbookCommit>(ctx, state)
}

pub fn publish_data_source(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    commit::<DataSourceCommit>(ctx, state)
}
