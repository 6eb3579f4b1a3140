use super::entity::{self, page_of};
use super::errors::{self, sub_codes};
use crate::api::ItemResponse;
use crate::api::RestError;
use crate::api::models::users::SITE_ROLES;
use crate::api::models::{DomainType, UserRequest, UserType};
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::ServerState;
use crate::error::SimulationError;

pub fn query_users(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::users().paged(ctx, state)?)
}

pub fn get_user(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::users().get(ctx, state, "user-id")?)
}

pub fn add_user(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let request: UserRequest = ctx.body()?;
    let fields = request.user;
    let qualified = non_blank(fields.name.as_deref()).ok_or_else(|| errors::missing_field("user", "name"))?;
    let site_role = non_blank(fields.site_role.as_deref())
        .ok_or_else(|| errors::missing_field("user", "siteRole"))?;
    validate_site_role(site_role)?;

    let (domain, name) = split_domain(qualified);
    if state.users.iter().any(|user| user.same_identity(name, domain)) {
        return Err(errors::conflict(
            sub_codes::USER_CONFLICT,
            format!("A user named '{}' already exists", qualified),
        )
        .into());
    }

    let mut user = UserType::new(name, site_role).with_domain(domain);
    user.full_name = fields.full_name;
    user.email = fields.email;
    user.auth_setting = Some(fields.auth_setting.unwrap_or_else(|| "ServerDefault".to_string()));
    state.users.push(user.clone());
    Ok(Built::created(ItemResponse::new(user)))
}

pub fn update_user(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let users = entity::users();
    let id = ctx.id_param("user-id")?;
    users.require(state, id)?;
    let request: UserRequest = ctx.body()?;
    let fields = request.user;

    if let Some(site_role) = non_blank(fields.site_role.as_deref()) {
        validate_site_role(site_role)?;
    }
    if let Some(name) = non_blank(fields.name.as_deref()) {
        let domain = users.require(state, id)?.domain.name.clone();
        if state
            .users
            .iter()
            .any(|other| other.id != id && other.same_identity(name, &domain))
        {
            return Err(errors::conflict(
                sub_codes::USER_CONFLICT,
                format!("A user named '{}' already exists", name),
            )
            .into());
        }
    }

    let user = users.require_mut(state, id)?;
    if let Some(name) = non_blank(fields.name.as_deref()) {
        user.name = name.to_string();
    }
    if let Some(site_role) = non_blank(fields.site_role.as_deref()) {
        user.site_role = site_role.to_string();
    }
    if fields.full_name.is_some() {
        user.full_name = fields.full_name;
    }
    if fields.email.is_some() {
        user.email = fields.email;
    }
    if fields.auth_setting.is_some() {
        user.auth_setting = fields.auth_setting;
    }
    Ok(Built::ok(ItemResponse::new(user.clone())))
}

pub fn remove_user(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let removed = entity::users().delete(ctx, state, "user-id")?;
    state.remove_user_references(removed.id);
    Ok(Built::no_content())
}

pub fn query_groups_for_user(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let user = entity::users().require(state, ctx.id_param("user-id")?)?;
    let groups = state.groups_of(user.id);
    Ok(page_of(ctx, groups)?)
}

pub(super) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub(super) fn validate_site_role(site_role: &str) -> Result<(), RestError> {
    if SITE_ROLES.contains(&site_role) {
        Ok(())
    } else {
        Err(errors::bad_request(format!(
            "'{}' is not a valid site role",
            site_role
        )))
    }
}

/// `DOMAIN\name` into its parts; plain names belong to the local domain.
fn split_domain(qualified: &str) -> (&str, &str) {
    match qualified.split_once('\\') {
        Some((domain, name)) if !domain.is_empty() && !name.is_empty() => (domain, name),
        _ => (DomainType::LOCAL, qualified),
    }
}
