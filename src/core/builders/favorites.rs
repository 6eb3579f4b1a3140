use super::entity::{self, page_of};
use super::errors::{self, sub_codes};
use super::users::non_blank;
use crate::api::ListResponse;
use crate::api::RestError;
use crate::api::models::{AddFavoriteRequest, FavoriteContentType, FavoriteType, ReferenceType};
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::ServerState;
use crate::error::SimulationError;
use uuid::Uuid;

pub fn query_favorites(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let user = entity::users().require(state, ctx.id_param("user-id")?)?.id;
    Ok(page_of(ctx, state.favorites_of(user))?)
}

/// Answers with every favorite of the user after the addition.
pub fn add_favorite(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let user = entity::users().require(state, ctx.id_param("user-id")?)?.id;
    let request: AddFavoriteRequest = ctx.body()?;
    let favorite = request.favorite;
    let label = non_blank(favorite.label.as_deref())
        .ok_or_else(|| errors::missing_field("favorite", "label"))?;

    let (kind, content_id) = match favorite.references().as_slice() {
        [(kind, Some(id))] => (*kind, *id),
        [(kind, None)] => return Err(errors::missing_field(kind.element(), "id").into()),
        _ => {
            return Err(errors::bad_request(
                "A favorite must reference exactly one project, workbook, view or datasource",
            )
            .into());
        }
    };
    let content_name = content_name(state, kind, content_id)?;

    let key = (kind, content_id);
    let favorites = state.favorites.entry(user).or_default();
    if favorites.contains_key(&key) {
        return Err(errors::conflict(
            sub_codes::FAVORITE_CONFLICT,
            format!("The {} '{}' is already a favorite", kind.element(), content_id),
        )
        .into());
    }
    favorites.insert(
        key,
        FavoriteType::new(label, kind, ReferenceType::named(content_id, content_name)),
    );
    Ok(Built::ok(ListResponse::new(state.favorites_of(user))))
}

pub fn delete_favorite(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    let user = entity::users().require(state, ctx.id_param("user-id")?)?.id;
    let kind: FavoriteContentType = ctx
        .param("content-type")?
        .parse()
        .map_err(errors::bad_request)?;
    let content_id = ctx.id_param("content-id")?;

    let removed = state
        .favorites
        .get_mut(&user)
        .and_then(|favorites| favorites.shift_remove(&(kind, content_id)));
    if removed.is_none() {
        return Err(errors::not_found(0, "Favorite", content_id).into());
    }
    Ok(Built::no_content())
}

/// Name of the referenced content, or the content type's not-found error.
fn content_name(
    state: &ServerState,
    kind: FavoriteContentType,
    id: Uuid,
) -> Result<String, RestError> {
    let name = match kind {
        FavoriteContentType::Project => entity::projects().require(state, id)?.name.clone(),
        FavoriteContentType::Workbook => entity::workbooks().require(state, id)?.name.clone(),
        FavoriteContentType::View => entity::views().require(state, id)?.name.clone(),
        FavoriteContentType::DataSource => entity::data_sources().require(state, id)?.name.clone(),
    };
    Ok(name)
}
