//! Generic lookup, list, page and delete stages over one entity collection.
//!
//! An [`EntityRoute`] is plain data: fn pointers that select the collection
//! in [`ServerState`] and read the fields lookups and filters need. The
//! per-collection constructors at the bottom wire them to the DTO capability
//! traits.

use super::errors::{self, sub_codes};
use crate::api::models::{
    CustomViewType, DataSourceType, GroupSetType, GroupType, ProjectType, ScheduleType,
    SubscriptionType, TaskType, UserType, ViewType, WorkbookType,
};
use crate::api::traits::{NamedContent, ResponseItem, RestIdentifiable, WithContentUrl};
use crate::api::{ItemResponse, ListResponse, PagedResponse, RestError};
use crate::core::filter::{Filter, FilterField, invalid_filter};
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::ServerState;
use uuid::Uuid;

pub struct EntityRoute<T: 'static> {
    /// Display name used in error details.
    pub kind: &'static str,
    pub select: fn(&ServerState) -> &Vec<T>,
    pub select_mut: fn(&mut ServerState) -> &mut Vec<T>,
    pub id_of: fn(&T) -> Uuid,
    pub name_of: Option<fn(&T) -> &str>,
    pub content_url_of: Option<fn(&T) -> Option<&str>>,
    pub not_found_sub_code: u16,
}

impl<T: ResponseItem> EntityRoute<T> {
    pub fn not_found(&self, id: impl std::fmt::Display) -> RestError {
        errors::not_found(self.not_found_sub_code, self.kind, id)
    }

    pub fn find<'s>(&self, state: &'s ServerState, id: Uuid) -> Option<&'s T> {
        (self.select)(state)
            .iter()
            .find(|item| (self.id_of)(item) == id)
    }

    pub fn require<'s>(&self, state: &'s ServerState, id: Uuid) -> Result<&'s T, RestError> {
        self.find(state, id).ok_or_else(|| self.not_found(id))
    }

    pub fn require_mut<'s>(
        &self,
        state: &'s mut ServerState,
        id: Uuid,
    ) -> Result<&'s mut T, RestError> {
        let id_of = self.id_of;
        (self.select_mut)(state)
            .iter_mut()
            .find(|item| id_of(item) == id)
            .ok_or_else(|| self.not_found(id))
    }

    /// Entity named by path parameter `param`: an id, or a content URL when
    /// the request carries `?key=contentUrl` and the entity has one.
    pub fn lookup<'s>(
        &self,
        ctx: &RequestContext<'_>,
        state: &'s ServerState,
        param: &str,
    ) -> Result<&'s T, RestError> {
        match self.content_url_of {
            Some(content_url_of) if ctx.by_content_url() => {
                let content_url = ctx.param(param)?;
                (self.select)(state)
                    .iter()
                    .find(|item| content_url_of(item) == Some(content_url))
                    .ok_or_else(|| self.not_found(content_url))
            }
            _ => self.require(state, ctx.id_param(param)?),
        }
    }

    pub fn get(
        &self,
        ctx: &RequestContext<'_>,
        state: &ServerState,
        param: &str,
    ) -> Result<Built, RestError> {
        let item = self.lookup(ctx, state, param)?;
        Ok(Built::ok(ItemResponse::new(item.clone())))
    }

    /// Collection narrowed by the request's `filter` expression.
    pub fn filtered(
        &self,
        ctx: &RequestContext<'_>,
        state: &ServerState,
    ) -> Result<Vec<T>, RestError> {
        let filter = ctx.filter()?;
        self.apply_filter(&filter, (self.select)(state).iter())
    }

    pub fn apply_filter<'s>(
        &self,
        filter: &Filter,
        items: impl Iterator<Item = &'s T>,
    ) -> Result<Vec<T>, RestError> {
        for field in filter.fields() {
            let supported = match field {
                FilterField::Name => self.name_of.is_some(),
                FilterField::ContentUrl => self.content_url_of.is_some(),
            };
            if !supported {
                return Err(invalid_filter(format!(
                    "Field '{}' cannot be used to filter {}",
                    field.as_str(),
                    T::COLLECTION
                )));
            }
        }

        Ok(items
            .filter(|item| {
                filter.matches(|field| match field {
                    FilterField::Name => self.name_of.map(|name_of| name_of(*item)),
                    FilterField::ContentUrl => {
                        self.content_url_of.and_then(|url_of| url_of(*item))
                    }
                })
            })
            .cloned()
            .collect())
    }

    /// Unpaged list of the filtered collection.
    pub fn list(&self, ctx: &RequestContext<'_>, state: &ServerState) -> Result<Built, RestError> {
        Ok(Built::ok(ListResponse::new(self.filtered(ctx, state)?)))
    }

    pub fn paged(&self, ctx: &RequestContext<'_>, state: &ServerState) -> Result<Built, RestError> {
        let items = self.filtered(ctx, state)?;
        page_of(ctx, items)
    }

    /// Removes the entity named by `param`; the caller cleans up references.
    pub fn delete(
        &self,
        ctx: &RequestContext<'_>,
        state: &mut ServerState,
        param: &str,
    ) -> Result<T, RestError> {
        let id = ctx.id_param(param)?;
        let id_of = self.id_of;
        let items = (self.select_mut)(state);
        match items.iter().position(|item| id_of(item) == id) {
            Some(index) => Ok(items.remove(index)),
            None => Err(self.not_found(id)),
        }
    }
}

/// One page of an already selected collection.
pub fn page_of<T: ResponseItem>(
    ctx: &RequestContext<'_>,
    items: Vec<T>,
) -> Result<Built, RestError> {
    let page = ctx.page()?;
    let total = items.len();
    let slice = page.slice(&items).to_vec();
    Ok(Built::ok(PagedResponse::new(page.pagination(total), slice)))
}

pub fn users() -> EntityRoute<UserType> {
    EntityRoute {
        kind: "User",
        select: |state| &state.users,
        select_mut: |state| &mut state.users,
        id_of: <UserType as RestIdentifiable>::id,
        name_of: Some(<UserType as NamedContent>::name),
        content_url_of: None,
        not_found_sub_code: sub_codes::USER_NOT_FOUND,
    }
}

pub fn groups() -> EntityRoute<GroupType> {
    EntityRoute {
        kind: "Group",
        select: |state| &state.groups,
        select_mut: |state| &mut state.groups,
        id_of: <GroupType as RestIdentifiable>::id,
        name_of: Some(<GroupType as NamedContent>::name),
        content_url_of: None,
        not_found_sub_code: sub_codes::GROUP_NOT_FOUND,
    }
}

pub fn group_sets() -> EntityRoute<GroupSetType> {
    EntityRoute {
        kind: "Group set",
        select: |state| &state.group_sets,
        select_mut: |state| &mut state.group_sets,
        id_of: <GroupSetType as RestIdentifiable>::id,
        name_of: Some(<GroupSetType as NamedContent>::name),
        content_url_of: None,
        not_found_sub_code: sub_codes::GROUP_NOT_FOUND,
    }
}

pub fn projects() -> EntityRoute<ProjectType> {
    EntityRoute {
        kind: "Project",
        select: |state| &state.projects,
        select_mut: |state| &mut state.projects,
        id_of: <ProjectType as RestIdentifiable>::id,
        name_of: Some(<ProjectType as NamedContent>::name),
        content_url_of: None,
        not_found_sub_code: sub_codes::PROJECT_NOT_FOUND,
    }
}

pub fn workbooks() -> EntityRoute<WorkbookType> {
    EntityRoute {
        kind: "Workbook",
        select: |state| &state.workbooks,
        select_mut: |state| &mut state.workbooks,
        id_of: <WorkbookType as RestIdentifiable>::id,
        name_of: Some(<WorkbookType as NamedContent>::name),
        content_url_of: Some(<WorkbookType as WithContentUrl>::content_url),
        not_found_sub_code: sub_codes::WORKBOOK_NOT_FOUND,
    }
}

pub fn views() -> EntityRoute<ViewType> {
    EntityRoute {
        kind: "View",
        select: |state| &state.views,
        select_mut: |state| &mut state.views,
        id_of: <ViewType as RestIdentifiable>::id,
        name_of: Some(<ViewType as NamedContent>::name),
        content_url_of: Some(<ViewType as WithContentUrl>::content_url),
        not_found_sub_code: sub_codes::VIEW_NOT_FOUND,
    }
}

pub fn custom_views() -> EntityRoute<CustomViewType> {
    EntityRoute {
        kind: "Custom view",
        select: |state| &state.custom_views,
        select_mut: |state| &mut state.custom_views,
        id_of: <CustomViewType as RestIdentifiable>::id,
        name_of: Some(<CustomViewType as NamedContent>::name),
        content_url_of: None,
        not_found_sub_code: sub_codes::VIEW_NOT_FOUND,
    }
}

pub fn data_sources() -> EntityRoute<DataSourceType> {
    EntityRoute {
        kind: "Data source",
        select: |state| &state.data_sources,
        select_mut: |state| &mut state.data_sources,
        id_of: <DataSourceType as RestIdentifiable>::id,
        name_of: Some(<DataSourceType as NamedContent>::name),
        content_url_of: Some(<DataSourceType as WithContentUrl>::content_url),
        not_found_sub_code: sub_codes::DATASOURCE_NOT_FOUND,
    }
}

pub fn subscriptions() -> EntityRoute<SubscriptionType> {
    EntityRoute {
        kind: "Subscription",
        select: |state| &state.subscriptions,
        select_mut: |state| &mut state.subscriptions,
        id_of: <SubscriptionType as RestIdentifiable>::id,
        name_of: None,
        content_url_of: None,
        not_found_sub_code: sub_codes::SUBSCRIPTION_NOT_FOUND,
    }
}

pub fn schedules() -> EntityRoute<ScheduleType> {
    EntityRoute {
        kind: "Schedule",
        select: |state| &state.schedules,
        select_mut: |state| &mut state.schedules,
        id_of: <ScheduleType as RestIdentifiable>::id,
        name_of: Some(<ScheduleType as NamedContent>::name),
        content_url_of: None,
        not_found_sub_code: sub_codes::SCHEDULE_NOT_FOUND,
    }
}

pub fn tasks() -> EntityRoute<TaskType> {
    EntityRoute {
        kind: "Extract refresh task",
        select: |state| &state.extract_refresh_tasks,
        select_mut: |state| &mut state.extract_refresh_tasks,
        id_of: <TaskType as RestIdentifiable>::id,
        name_of: None,
        content_url_of: None,
        not_found_sub_code: sub_codes::TASK_NOT_FOUND,
    }
}
