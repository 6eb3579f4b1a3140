use super::entity::{self, page_of};
use super::errors::{self, sub_codes};
use super::users::{non_blank, validate_site_role};
use crate::api::ItemResponse;
use crate::api::models::{
    CreateGroupRequest, CreateGroupSetRequest, DomainType, GroupSetType, GroupType, UserIdRequest,
};
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::ServerState;
use crate::error::SimulationError;

pub fn query_groups(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::groups().paged(ctx, state)?)
}

/// Local groups are unique by name; imported groups by (name, domain).
pub fn create_group(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let request: CreateGroupRequest = ctx.body()?;
    let fields = request.group;
    let name = non_blank(fields.name.as_deref()).ok_or_else(|| errors::missing_field("group", "name"))?;
    if let Some(site_role) = non_blank(fields.minimum_site_role.as_deref()) {
        validate_site_role(site_role)?;
    }

    let domain = fields
        .import
        .as_ref()
        .and_then(|import| non_blank(import.domain_name.as_deref()))
        .unwrap_or(DomainType::LOCAL);
    if state.groups.iter().any(|group| group.same_identity(name, domain)) {
        return Err(errors::conflict(
            sub_codes::GROUP_CONFLICT,
            format!("A group named '{}' already exists", name),
        )
        .into());
    }

    let mut group = GroupType::new(name).with_domain(domain);
    group.minimum_site_role = non_blank(fields.minimum_site_role.as_deref()).map(str::to_string);
    group.import = fields.import.clone();
    state.groups.push(group.clone());
    Ok(Built::created(ItemResponse::new(group)))
}

pub fn delete_group(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let removed = entity::groups().delete(ctx, state, "group-id")?;
    state.remove_group_references(removed.id);
    Ok(Built::no_content())
}

pub fn query_users_in_group(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let group = entity::groups().require(state, ctx.id_param("group-id")?)?;
    let members = state
        .members_of(group.id)
        .iter()
        .filter_map(|id| state.user(*id).cloned())
        .collect();
    Ok(page_of(ctx, members)?)
}

pub fn add_user_to_group(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let group_id = entity::groups().require(state, ctx.id_param("group-id")?)?.id;
    let request: UserIdRequest = ctx.body()?;
    let user_id = request
        .user
        .id
        .ok_or_else(|| errors::missing_field("user", "id"))?;
    let user = entity::users().require(state, user_id)?.clone();

    if !state.add_member(group_id, user.id) {
        return Err(errors::conflict(
            sub_codes::GROUP_MEMBERSHIP_CONFLICT,
            format!("User '{}' is already a member of group '{}'", user.id, group_id),
        )
        .into());
    }
    Ok(Built::ok(ItemResponse::new(user)))
}

pub fn remove_user_from_group(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let group_id = entity::groups().require(state, ctx.id_param("group-id")?)?.id;
    let users = entity::users();
    let user_id = users.require(state, ctx.id_param("user-id")?)?.id;
    if !state.remove_member(group_id, user_id) {
        return Err(errors::not_found(
            sub_codes::USER_NOT_FOUND,
            "Group member",
            user_id,
        )
        .into());
    }
    Ok(Built::no_content())
}

pub fn query_group_sets(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    Ok(entity::group_sets().paged(ctx, state)?)
}

pub fn create_group_set(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let request: CreateGroupSetRequest = ctx.body()?;
    let name = non_blank(request.group_set.name.as_deref())
        .ok_or_else(|| errors::missing_field("groupSet", "name"))?;
    if state
        .group_sets
        .iter()
        .any(|set| set.name.eq_ignore_ascii_case(name))
    {
        return Err(errors::conflict(
            sub_codes::GROUP_SET_CONFLICT,
            format!("A group set named '{}' already exists", name),
        )
        .into());
    }

    let group_set = GroupSetType::new(name);
    state.group_sets.push(group_set.clone());
    Ok(Built::created(ItemResponse::new(group_set)))
}

pub fn delete_group_set(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    entity::group_sets().delete(ctx, state, "groupset-id")?;
    Ok(Built::no_content())
}
