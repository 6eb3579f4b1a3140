//! Sign-in, sign-out, server info and site lookup.
//!
//! Passwords and token secrets are never checked; the name alone selects the
//! user to sign in as.

use super::errors::{self, sub_codes};
use crate::api::ItemResponse;
use crate::api::models::{
    CredentialsType, ProductVersionType, ReferenceType, ServerInfoType, SignInRequest,
    SignInSiteType, timestamp_now,
};
use crate::api::RestError;
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::ServerState;
use crate::error::SimulationError;
use log::debug;
use uuid::Uuid;

pub fn sign_in(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let request: SignInRequest = ctx.body()?;
    let credentials = request.credentials;
    let principal = credentials
        .principal()
        .ok_or_else(|| errors::missing_field("credentials", "name"))?;

    if let Some(content_url) = credentials.site.content_url.as_deref() {
        if !content_url.eq_ignore_ascii_case(&state.site.content_url) {
            return Err(sign_in_error(format!("Site '{}' does not exist", content_url)).into());
        }
    }

    let user = state
        .users
        .iter_mut()
        .find(|user| user.name.eq_ignore_ascii_case(principal))
        .ok_or_else(|| sign_in_error(format!("User '{}' cannot sign in", principal)))?;
    user.last_login = Some(timestamp_now());
    let user = ReferenceType::new(user.id);

    let session = state.start_session(user.id);
    debug!("Signed in user {} to site {}", session.user_id, session.site_id);

    Ok(Built::ok(ItemResponse::new(CredentialsType {
        token: session.token,
        site: SignInSiteType {
            id: session.site_id,
            content_url: session.site_content_url,
        },
        user,
    })))
}

fn sign_in_error(detail: String) -> RestError {
    RestError::new(401, sub_codes::SIGN_IN_ERROR, "Signin Error", detail)
}

pub fn sign_out(_ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    state.session = None;
    Ok(Built::no_content())
}

pub fn server_info(ctx: &RequestContext<'_>, _state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(Built::ok(ItemResponse::new(ServerInfoType {
        product_version: ProductVersionType {
            build: format!("{}.0", ctx.config.product_version.replace('.', "")),
            value: ctx.config.product_version.clone(),
        },
        rest_api_version: ctx.config.api_version.clone(),
    })))
}

pub fn get_site(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let requested = ctx.param("site-id")?;
    let matches = if ctx.by_content_url() {
        requested == state.site.content_url
    } else {
        Uuid::parse_str(requested).is_ok_and(|id| id == state.site.id)
    };
    if !matches {
        return Err(errors::not_found(0, "Site", requested).into());
    }
    Ok(Built::ok(ItemResponse::new(state.site.clone())))
}
