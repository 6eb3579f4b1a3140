//! Explicit content permissions and project default permissions.
//!
//! Capability names are stored as given; only the grantee and the mode are
//! checked.

use super::entity::{self, EntityRoute};
use super::errors;
use crate::api::ItemResponse;
use crate::api::RestError;
use crate::api::models::{
    CapabilityMode, CapabilityType, GranteeKind, PermissionsRequest, PermissionsType,
    ReferenceType,
};
use crate::api::traits::ResponseItem;
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::{PermissionTarget, ServerState};
use crate::error::SimulationError;
use uuid::Uuid;

/// Content types a project carries default permissions for.
pub const DEFAULT_PERMISSION_CONTENT_TYPES: &[&str] = &[
    "workbooks",
    "datasources",
    "flows",
    "metrics",
    "lenses",
    "dataroles",
    "databases",
    "tables",
    "virtualconnections",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Content(PermissionTarget),
    Default { project: Uuid, content_type: String },
}

impl Scope {
    fn permissions<'s>(&self, state: &'s mut ServerState) -> &'s mut PermissionsType {
        match self {
            Scope::Content(target) => state
                .permissions
                .entry(*target)
                .or_insert_with(|| target.empty_permissions()),
            Scope::Default {
                project,
                content_type,
            } => state
                .default_permissions
                .entry((*project, content_type.clone()))
                .or_insert_with(|| PermissionsType {
                    project: Some(ReferenceType::new(*project)),
                    ..PermissionsType::default()
                }),
        }
    }

    fn current(&self, state: &ServerState) -> PermissionsType {
        let stored = match self {
            Scope::Content(target) => state.permissions.get(target),
            Scope::Default {
                project,
                content_type,
            } => state
                .default_permissions
                .get(&(*project, content_type.clone())),
        };
        match (stored, self) {
            (Some(permissions), _) => permissions.clone(),
            (None, Scope::Content(target)) => target.empty_permissions(),
            (None, Scope::Default { project, .. }) => PermissionsType {
                project: Some(ReferenceType::new(*project)),
                ..PermissionsType::default()
            },
        }
    }
}

fn content_scope<T: ResponseItem>(
    ctx: &RequestContext<'_>,
    state: &ServerState,
    route: EntityRoute<T>,
    target: fn(Uuid) -> PermissionTarget,
) -> Result<Scope, RestError> {
    let id = ctx.id_param("content-id")?;
    route.require(state, id)?;
    Ok(Scope::Content(target(id)))
}

fn project_scope(ctx: &RequestContext<'_>, state: &ServerState) -> Result<Scope, RestError> {
    content_scope(ctx, state, entity::projects(), PermissionTarget::Project)
}

fn workbook_scope(ctx: &RequestContext<'_>, state: &ServerState) -> Result<Scope, RestError> {
    content_scope(ctx, state, entity::workbooks(), PermissionTarget::Workbook)
}

fn data_source_scope(ctx: &RequestContext<'_>, state: &ServerState) -> Result<Scope, RestError> {
    content_scope(ctx, state, entity::data_sources(), PermissionTarget::DataSource)
}

fn default_scope(ctx: &RequestContext<'_>, state: &ServerState) -> Result<Scope, RestError> {
    let project = entity::projects()
        .require(state, ctx.id_param("content-id")?)?
        .id;
    let content_type = ctx.param("content-type")?.to_ascii_lowercase();
    if !DEFAULT_PERMISSION_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(errors::bad_request(format!(
            "'{}' does not carry default permissions",
            content_type
        )));
    }
    Ok(Scope::Default {
        project,
        content_type,
    })
}

type ScopeFn = fn(&RequestContext<'_>, &ServerState) -> Result<Scope, RestError>;

fn query(ctx: &RequestContext<'_>, state: &ServerState, scope: ScopeFn) -> Result<Built, SimulationError> {
    let scope = scope(ctx, state)?;
    Ok(Built::ok(ItemResponse::new(scope.current(state))))
}

/// Validates every grantee and mode before applying any capability.
fn add(ctx: &RequestContext<'_>, state: &mut ServerState, scope: ScopeFn) -> Result<Built, SimulationError> {
    let scope = scope(ctx, state)?;
    let request: PermissionsRequest = ctx.body()?;

    let mut grants = Vec::new();
    for entry in &request.permissions.grantee_capabilities {
        let (kind, id) = entry.grantee().ok_or_else(|| {
            errors::bad_request("Each granteeCapabilities element needs exactly one user or group")
        })?;
        require_grantee(state, kind, id)?;
        for capability in &entry.capabilities.capabilities {
            let mode: CapabilityMode = capability.mode.parse().map_err(errors::bad_request)?;
            grants.push((kind, id, CapabilityType::new(capability.name.clone(), mode)));
        }
    }

    let permissions = scope.permissions(state);
    for (kind, id, capability) in grants {
        permissions.for_grantee_mut(kind, id).set_capability(capability);
    }
    permissions.prune();
    Ok(Built::ok(ItemResponse::new(permissions.clone())))
}

fn delete(ctx: &RequestContext<'_>, state: &mut ServerState, scope: ScopeFn) -> Result<Built, SimulationError> {
    let scope = scope(ctx, state)?;
    let kind: GranteeKind = ctx.param("grantee-type")?.parse().map_err(errors::bad_request)?;
    let grantee = ctx.id_param("grantee-id")?;
    require_grantee(state, kind, grantee)?;
    let capability = ctx.param("capability")?;
    let mode: CapabilityMode = ctx.param("mode")?.parse().map_err(errors::bad_request)?;

    let permissions = scope.permissions(state);
    let removed = permissions
        .grantee_capabilities
        .iter_mut()
        .filter(|entry| entry.grantee() == Some((kind, grantee)))
        .any(|entry| entry.remove_capability(capability, mode.as_str()));
    permissions.prune();
    if !removed {
        return Err(errors::not_found(
            0,
            "Capability",
            format!("{}:{}", capability, mode),
        )
        .into());
    }
    Ok(Built::no_content())
}

fn require_grantee(state: &ServerState, kind: GranteeKind, id: Uuid) -> Result<(), RestError> {
    match kind {
        GranteeKind::User => entity::users().require(state, id).map(|_| ()),
        GranteeKind::Group => entity::groups().require(state, id).map(|_| ()),
    }
}

pub fn query_project_permissions(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    query(ctx, state, project_scope)
}

pub fn add_project_permissions(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    add(ctx, state, project_scope)
}

pub fn delete_project_permission(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    delete(ctx, state, project_scope)
}

pub fn query_workbook_permissions(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    query(ctx, state, workbook_scope)
}

pub fn add_workbook_permissions(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    add(ctx, state, workbook_scope)
}

pub fn delete_workbook_permission(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    delete(ctx, state, workbook_scope)
}

pub fn query_data_source_permissions(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    query(ctx, state, data_source_scope)
}

pub fn add_data_source_permissions(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    add(ctx, state, data_source_scope)
}

pub fn delete_data_source_permission(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    delete(ctx, state, data_source_scope)
}

pub fn query_default_permissions(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    query(ctx, state, default_scope)
}

pub fn add_default_permissions(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    add(ctx, state, default_scope)
}

pub fn delete_default_permission(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    delete(ctx, state, default_scope)
}
