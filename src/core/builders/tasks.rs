//! Server schedules and site extract refresh tasks.

use super::entity;
use super::errors::{self, sub_codes};
use super::users::non_blank;
use crate::api::ItemResponse;
use crate::api::models::schedules::FREQUENCIES;
use crate::api::models::{
    CreateExtractRefreshTaskRequest, ExtractRefreshType, ReferenceType, TaskScheduleType, TaskType,
};
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::ServerState;
use crate::error::SimulationError;
use uuid::Uuid;

const REFRESH_TYPES: &[&str] = &["FullRefresh", "IncrementalRefresh"];

pub fn query_schedules(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::schedules().paged(ctx, state)?)
}

pub fn get_schedule(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::schedules().get(ctx, state, "schedule-id")?)
}

pub fn query_extract_refresh_tasks(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    Ok(entity::tasks().list(ctx, state)?)
}

/// A refresh of exactly one workbook or data source on a site-local schedule.
/// One task per (target, refresh type).
pub fn create_extract_refresh_task(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let request: CreateExtractRefreshTaskRequest = ctx.body()?;
    let refresh = request.extract_refresh;

    let refresh_type = non_blank(refresh.refresh_type.as_deref()).unwrap_or("FullRefresh");
    if !REFRESH_TYPES.contains(&refresh_type) {
        return Err(errors::bad_request(format!(
            "'{}' is not a valid extract refresh type",
            refresh_type
        ))
        .into());
    }

    let (workbook, datasource) = match (
        refresh.workbook.as_ref().map(|workbook| workbook.id),
        refresh.datasource.as_ref().map(|source| source.id),
    ) {
        (Some(Some(id)), None) => {
            let workbook = entity::workbooks().require(state, id)?;
            (Some(ReferenceType::named(id, workbook.name.clone())), None)
        }
        (None, Some(Some(id))) => {
            let source = entity::data_sources().require(state, id)?;
            (None, Some(ReferenceType::named(id, source.name.clone())))
        }
        (Some(None), None) => return Err(errors::missing_field("workbook", "id").into()),
        (None, Some(None)) => return Err(errors::missing_field("datasource", "id").into()),
        _ => {
            return Err(errors::bad_request(
                "An extract refresh task targets exactly one workbook or datasource",
            )
            .into());
        }
    };

    let frequency = non_blank(request.schedule.frequency.as_deref())
        .ok_or_else(|| errors::missing_field("schedule", "frequency"))?;
    if !FREQUENCIES.contains(&frequency) {
        return Err(errors::bad_request(format!(
            "'{}' is not a valid schedule frequency",
            frequency
        ))
        .into());
    }

    let target = workbook
        .as_ref()
        .or(datasource.as_ref())
        .map(|reference| reference.id);
    if state.extract_refresh_tasks.iter().any(|existing| {
        let refresh = &existing.extract_refresh;
        refresh.refresh_type == refresh_type
            && refresh
                .workbook
                .as_ref()
                .or(refresh.datasource.as_ref())
                .map(|reference| reference.id)
                == target
    }) {
        return Err(errors::conflict(
            sub_codes::TASK_CONFLICT,
            format!("A {} task already exists for this content", refresh_type),
        )
        .into());
    }

    let task = TaskType {
        extract_refresh: ExtractRefreshType {
            id: Uuid::new_v4(),
            priority: 50,
            consecutive_failed_count: 0,
            refresh_type: refresh_type.to_string(),
            schedule: TaskScheduleType {
                frequency: Some(frequency.to_string()),
                frequency_details: request.schedule.frequency_details.clone(),
                ..TaskScheduleType::default()
            },
            workbook,
            datasource,
        },
    };
    state.extract_refresh_tasks.push(task.clone());
    Ok(Built::created(ItemResponse::new(task)))
}

pub fn delete_extract_refresh_task(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    entity::tasks().delete(ctx, state, "task-id")?;
    Ok(Built::no_content())
}
