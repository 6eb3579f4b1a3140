use super::entity;
use super::errors::{self, sub_codes};
use super::users::non_blank;
use crate::api::ItemResponse;
use crate::api::models::{
    CreateSubscriptionRequest, ReferenceType, ScheduleType, SubscriptionContentType,
    SubscriptionType, TaskScheduleType,
};
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::ServerState;
use crate::error::SimulationError;
use uuid::Uuid;

pub fn query_subscriptions(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    Ok(entity::subscriptions().paged(ctx, state)?)
}

pub fn get_subscription(ctx: &RequestContext<'_>, state: &mut ServerState) -> Result<Built, SimulationError> {
    Ok(entity::subscriptions().get(ctx, state, "subscription-id")?)
}

/// Subscribes a user to a workbook or view on an existing schedule.
/// One subscription per (user, content, schedule).
pub fn create_subscription(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let request: CreateSubscriptionRequest = ctx.body()?;
    let fields = request.subscription;
    let subject = non_blank(fields.subject.as_deref())
        .ok_or_else(|| errors::missing_field("subscription", "subject"))?
        .to_string();

    let content = fields
        .content
        .as_ref()
        .ok_or_else(|| errors::missing_field("content", "id"))?;
    let content_id = content
        .id
        .ok_or_else(|| errors::missing_field("content", "id"))?;
    let content_type = non_blank(content.content_type.as_deref())
        .ok_or_else(|| errors::missing_field("content", "type"))?;
    let content_type = if content_type.eq_ignore_ascii_case("workbook") {
        entity::workbooks().require(state, content_id)?;
        "Workbook"
    } else if content_type.eq_ignore_ascii_case("view") {
        entity::views().require(state, content_id)?;
        "View"
    } else {
        return Err(errors::bad_request(format!(
            "Subscription content type '{}' must be Workbook or View",
            content_type
        ))
        .into());
    };

    let schedule_id = reference_id(fields.schedule.as_ref().and_then(|s| s.id), "schedule")?;
    let schedule = entity::schedules().require(state, schedule_id)?;
    let user_id = reference_id(fields.user.as_ref().and_then(|u| u.id), "user")?;
    let user = entity::users().require(state, user_id)?;

    if state.subscriptions.iter().any(|existing| {
        existing.user.id == user_id
            && existing.content.id == content_id
            && existing.schedule.id == Some(schedule_id)
    }) {
        return Err(errors::conflict(
            sub_codes::SUBSCRIPTION_CONFLICT,
            format!(
                "User '{}' is already subscribed to {} '{}' on this schedule",
                user_id, content_type, content_id
            ),
        )
        .into());
    }

    let subscription = SubscriptionType {
        id: Uuid::new_v4(),
        subject,
        message: fields.message.clone(),
        attach_image: fields.attach_image.unwrap_or(true),
        attach_pdf: fields.attach_pdf.unwrap_or(false),
        suspended: false,
        content: SubscriptionContentType {
            id: content_id,
            content_type: content_type.to_string(),
            send_if_view_empty: content.send_if_view_empty.unwrap_or(true),
        },
        schedule: task_schedule(schedule),
        user: ReferenceType::named(user.id, user.name.clone()),
    };
    state.subscriptions.push(subscription.clone());
    Ok(Built::created(ItemResponse::new(subscription)))
}

pub fn delete_subscription(
    ctx: &RequestContext<'_>,
    state: &mut ServerState,
) -> Result<Built, SimulationError> {
    entity::subscriptions().delete(ctx, state, "subscription-id")?;
    Ok(Built::no_content())
}

fn reference_id(id: Option<Uuid>, element: &str) -> Result<Uuid, crate::api::RestError> {
    id.ok_or_else(|| errors::missing_field(element, "id"))
}

/// Full schedule reference as embedded in subscriptions and tasks.
pub(super) fn task_schedule(schedule: &ScheduleType) -> TaskScheduleType {
    TaskScheduleType {
        id: Some(schedule.id),
        name: Some(schedule.name.clone()),
        frequency: Some(schedule.frequency.clone()),
        next_run_at: None,
        frequency_details: schedule.frequency_details.clone(),
    }
}
