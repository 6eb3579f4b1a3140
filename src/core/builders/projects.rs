use super::entity;
use super::errors::{self, sub_codes};
use super::users::non_blank;
use crate::api::ItemResponse;
use crate::api::RestError;
use crate::api::models::projects::CONTENT_PERMISSIONS;
use crate::api::models::{ProjectRequest, ProjectType, timestamp_now};
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::{PermissionTarget, ServerState};
use crate::error::SimulationError;
use uuid::Uuid;

pub fn query_projects(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::projects().paged(ctx, state)?)
}

/// The signed-in user owns the new project. Names are unique among siblings.
pub fn create_project(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let request: ProjectRequest = ctx.body()?;
    let fields = request.project;
    let name = non_blank(fields.name.as_deref())
        .ok_or_else(|| errors::missing_field("project", "name"))?
        .to_string();
    validate_content_permissions(fields.content_permissions.as_deref())?;
    if let Some(parent) = fields.parent_project_id {
        entity::projects().require(state, parent)?;
    }
    ensure_unique(state, &name, fields.parent_project_id, None)?;

    let owner = ctx.session(state)?.user_id;
    let mut project = ProjectType::new(name).with_owner(owner);
    project.parent_project_id = fields.parent_project_id;
    project.description = fields.description;
    if fields.content_permissions.is_some() {
        project.content_permissions = fields.content_permissions;
    }
    state.projects.push(project.clone());
    Ok(Built::created(ItemResponse::new(project)))
}

pub fn update_project(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let projects = entity::projects();
    let id = ctx.id_param("project-id")?;
    let current = projects.require(state, id)?.clone();
    let request: ProjectRequest = ctx.body()?;
    let fields = request.project;
    validate_content_permissions(fields.content_permissions.as_deref())?;

    let parent = match fields.parent_project_id {
        Some(parent) if parent == id => {
            return Err(errors::bad_request("A project cannot be its own parent").into());
        }
        Some(parent) => {
            projects.require(state, parent)?;
            Some(parent)
        }
        None => current.parent_project_id,
    };
    let name = non_blank(fields.name.as_deref())
        .map(str::to_string)
        .unwrap_or(current.name);
    ensure_unique(state, &name, parent, Some(id))?;

    let project = projects.require_mut(state, id)?;
    project.name = name;
    project.parent_project_id = parent;
    if fields.description.is_some() {
        project.description = fields.description;
    }
    if fields.content_permissions.is_some() {
        project.content_permissions = fields.content_permissions;
    }
    project.updated_at = Some(timestamp_now());
    Ok(Built::ok(ItemResponse::new(project.clone())))
}

/// Deletes the project, its nested projects and everything published in them.
pub fn delete_project(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let root = entity::projects().require(state, ctx.id_param("project-id")?)?.id;

    let mut doomed = vec![root];
    let mut cursor = 0;
    while let Some(parent) = doomed.get(cursor).copied() {
        doomed.extend(
            state
                .projects
                .iter()
                .filter(|project| project.parent_project_id == Some(parent))
                .map(|project| project.id),
        );
        cursor += 1;
    }

    let in_doomed = |project: Option<Uuid>| project.is_some_and(|id| doomed.contains(&id));
    let workbooks: Vec<Uuid> = state
        .workbooks
        .iter()
        .filter(|workbook| in_doomed(workbook.project.as_ref().map(|p| p.id)))
        .map(|workbook| workbook.id)
        .collect();
    let data_sources: Vec<Uuid> = state
        .data_sources
        .iter()
        .filter(|source| in_doomed(source.project.as_ref().map(|p| p.id)))
        .map(|source| source.id)
        .collect();
    for workbook in workbooks {
        state.evict_workbook(workbook);
    }
    for source in data_sources {
        state.evict_data_source(source);
    }

    state.projects.retain(|project| !doomed.contains(&project.id));
    state.forget_content(&doomed);
    for project in &doomed {
        state.permissions.remove(&PermissionTarget::Project(*project));
    }
    state
        .default_permissions
        .retain(|(project, _), _| !doomed.contains(project));
    Ok(Built::no_content())
}

fn validate_content_permissions(value: Option<&str>) -> Result<(), RestError> {
    match value {
        Some(mode) if !CONTENT_PERMISSIONS.contains(&mode) => Err(errors::bad_request(format!(
            "'{}' is not a valid contentPermissions value",
            mode
        ))),
        _ => Ok(()),
    }
}

fn ensure_unique(
    state: &ServerState,
    name: &str,
    parent: Option<Uuid>,
    except: Option<Uuid>,
) -> Result<(), RestError> {
    let taken = state
        .projects
        .iter()
        .filter(|project| Some(project.id) != except)
        .any(|project| project.conflicts_with(name, parent));
    if taken {
        Err(errors::conflict(
            sub_codes::PROJECT_CONFLICT,
            format!("A project named '{}' already exists here", name),
        ))
    } else {
        Ok(())
    }
}
