//! Read, update, delete and download of published content: workbooks,
//! data sources, views and custom views.

use super::commit::{WorkbookCommit, existing_named};
use super::entity;
use super::errors::{self, sub_codes};
use super::users::non_blank;
use crate::api::models::{OwnerType, ProjectReferenceType, UpdateWorkbookRequest, timestamp_now};
use crate::api::traits::WithProject;
use crate::api::{ItemResponse, ListResponse};
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::{ServerState, StoredFile};
use crate::error::SimulationError;
use uuid::Uuid;

pub fn query_workbooks(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::workbooks().paged(ctx, state)?)
}

pub fn get_workbook(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::workbooks().get(ctx, state, "workbook-id")?)
}

/// Renames keep the content URL; views follow a project or owner change.
/// A name already taken by another workbook is a 409.
pub fn update_workbook(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let workbooks = entity::workbooks();
    let id = ctx.id_param("workbook-id")?;
    let current = workbooks.require(state, id)?;
    let (current_name, current_project) = (current.name.clone(), current.project_id());
    let request: UpdateWorkbookRequest = ctx.body()?;
    let fields = request.workbook;

    let project = match fields.project.as_ref().and_then(|project| project.id) {
        Some(project) => Some(entity::projects().require(state, project)?.id),
        None => None,
    };
    let owner = match fields.owner.as_ref().and_then(|owner| owner.id) {
        Some(owner) => Some(entity::users().require(state, owner)?.id),
        None => None,
    };

    let target_name = non_blank(fields.name.as_deref()).unwrap_or(&current_name);
    if let Some(target_project) = project.or(current_project) {
        if existing_named::<WorkbookCommit>(state, target_name, target_project, Some(id)).is_some() {
            return Err(errors::conflict(
                sub_codes::WORKBOOK_CONFLICT,
                format!("A workbook named '{}' already exists", target_name),
            )
            .into());
        }
    }

    let workbook = workbooks.require_mut(state, id)?;
    if let Some(name) = non_blank(fields.name.as_deref()) {
        workbook.name = name.to_string();
    }
    if fields.description.is_some() {
        workbook.description = fields.description;
    }
    if let Some(show_tabs) = fields.show_tabs {
        workbook.show_tabs = show_tabs;
    }
    if let Some(project) = project {
        workbook.project = Some(ProjectReferenceType::new(project));
    }
    if let Some(owner) = owner {
        workbook.owner = Some(OwnerType::new(owner));
    }
    workbook.updated_at = Some(timestamp_now());
    let updated = workbook.clone();

    for view in state
        .views
        .iter_mut()
        .filter(|view| view.workbook_id() == Some(id))
    {
        view.project = updated.project.clone();
        view.owner = updated.owner.clone();
        if let Some(reference) = view.workbook.as_mut() {
            reference.name = Some(updated.name.clone());
        }
    }
    Ok(Built::ok(ItemResponse::new(updated)))
}

pub fn delete_workbook(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let id = entity::workbooks().require(state, ctx.id_param("workbook-id")?)?.id;
    state.evict_workbook(id);
    Ok(Built::no_content())
}

pub fn download_workbook(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let workbooks = entity::workbooks();
    let id = workbooks.require(state, ctx.id_param("workbook-id")?)?.id;
    let file = state.files.get(&id).ok_or_else(|| workbooks.not_found(id))?;
    Ok(download(file))
}

pub fn query_workbook_views(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let views = entity::views();
    let id = entity::workbooks()
        .require(state, ctx.id_param("workbook-id")?)?
        .id;
    let filter = ctx.filter()?;
    let items = views.apply_filter(
        &filter,
        state.views.iter().filter(|view| view.workbook_id() == Some(id)),
    )?;
    Ok(Built::ok(ListResponse::new(items)))
}

pub fn query_data_sources(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    Ok(entity::data_sources().paged(ctx, state)?)
}

pub fn get_data_source(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::data_sources().get(ctx, state, "datasource-id")?)
}

pub fn delete_data_source(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let id = entity::data_sources()
        .require(state, ctx.id_param("datasource-id")?)?
        .id;
    state.evict_data_source(id);
    Ok(Built::no_content())
}

pub fn download_data_source(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let data_sources = entity::data_sources();
    let id: Uuid = data_sources
        .require(state, ctx.id_param("datasource-id")?)?
        .id;
    let file = state
        .files
        .get(&id)
        .ok_or_else(|| errors::not_found(sub_codes::DATASOURCE_NOT_FOUND, "Data source file", id))?;
    Ok(download(file))
}

fn download(file: &StoredFile) -> Built {
    Built::raw("application/octet-stream", file.bytes.clone())
}

pub fn query_views(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::views().paged(ctx, state)?)
}

pub fn get_view(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::views().get(ctx, state, "view-id")?)
}

pub fn query_custom_views(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    Ok(entity::custom_views().paged(ctx, state)?)
}

pub fn get_custom_view(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::custom_views().get(ctx, state, "customview-id")?)
}

pub fn delete_custom_view(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let removed = entity::custom_views().delete(ctx, state, "customview-id")?;
    state.forget_content(&[removed.id]);
    Ok(Built::no_content())
}
