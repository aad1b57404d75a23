use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Uri},
    Json,
};
use chrono::{Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::ListParams;
use crate::api::{self, upcoming_query, AppointmentSource};
use crate::datetime::{fixed_offset, format_datetime_in, to_iso_utc};
use crate::error::ApiError;
use crate::messages::SUCCESS_MESSAGES;
use crate::middleware::ApiResponse;
use crate::models::Appointment;
use crate::pagination::{ListController, PageQuery, PageView};
use crate::server::state::{AppState, RequestContext};
use crate::server::view::ViewError;
use crate::validation::{AppointmentForm, EditAppointmentForm};

/// Edit page payload: the appointment plus the prefilled form
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetail {
    pub appointment: Appointment,
    pub scheduled_label: String,
    pub form: EditAppointmentForm,
    pub can_cancel: bool,
}

impl AppointmentDetail {
    /// Label and form as seen in `tz`, the zone the staff member works in
    pub fn in_zone<Tz: TimeZone>(appointment: Appointment, tz: &Tz) -> Self
    where
        Tz::Offset: Display,
    {
        Self {
            scheduled_label: format_datetime_in(&to_iso_utc(&appointment.scheduled_at), tz),
            form: EditAppointmentForm::prefill(&appointment, tz),
            can_cancel: !appointment.is_cancelled(),
            appointment,
        }
    }
}

/// `?utcOffset=` minutes east of UTC; the server's own zone when absent
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneParams {
    pub utc_offset: Option<i32>,
}

async fn load_list(state: &AppState, ctx: &RequestContext, query: PageQuery) -> Result<PageView<Appointment>, ViewError> {
    let mut list = ListController::new(AppointmentSource::new(ctx.http.clone()), query, state.caches.appointments.clone())
        .with_scope(ctx.token.clone());
    ctx.check(list.load().await)
}

/// GET /appointments?page&pageSize&status&from
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Query(params): Query<ListParams>,
) -> Result<ApiResponse<PageView<Appointment>>, ViewError> {
    let query = params.to_query(
        state.config.query.default_page_size,
        &[("status", params.status.as_ref()), ("from", params.from.as_ref())],
    )?;
    let ctx = state.context(&headers, uri.path())?;
    Ok(ApiResponse::success(load_list(&state, &ctx, query).await?))
}

/// GET /appointments/upcoming?page&pageSize
pub async fn upcoming(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Query(params): Query<ListParams>,
) -> Result<ApiResponse<PageView<Appointment>>, ViewError> {
    let sized = params.to_query(state.config.query.default_page_size, &[])?;
    let query = upcoming_query(sized.page(), sized.page_size(), Utc::now());
    let ctx = state.context(&headers, uri.path())?;
    Ok(ApiResponse::success(load_list(&state, &ctx, query).await?))
}

/// POST /appointments
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Json(form): Json<AppointmentForm>,
) -> Result<ApiResponse<Appointment>, ViewError> {
    let new_appointment = form.validate()?;
    let ctx = state.context(&headers, uri.path())?;

    let created = ctx.check(api::create_appointment(&ctx.http, &new_appointment).await)?;
    state.caches.appointment_changed();
    Ok(ApiResponse::created(created).with_message(SUCCESS_MESSAGES.appointment_created))
}

/// GET /appointments/:id
pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Path(id): Path<i64>,
    Query(zone): Query<ZoneParams>,
) -> Result<ApiResponse<AppointmentDetail>, ViewError> {
    let offset = match zone.utc_offset {
        Some(minutes) => Some(
            fixed_offset(minutes).ok_or_else(|| ApiError::bad_request(format!("utcOffset {} is out of range", minutes)))?,
        ),
        None => None,
    };
    let ctx = state.context(&headers, uri.path())?;
    let appointment = ctx.check(api::fetch_appointment(&ctx.http, id).await)?;

    let detail = match offset {
        Some(tz) => AppointmentDetail::in_zone(appointment, &tz),
        None => AppointmentDetail::in_zone(appointment, &Local),
    };
    Ok(ApiResponse::success(detail))
}

/// PATCH /appointments/:id; only the fields sent are changed
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Path(id): Path<i64>,
    Json(form): Json<EditAppointmentForm>,
) -> Result<ApiResponse<Appointment>, ViewError> {
    let patch = form.validate()?;
    let ctx = state.context(&headers, uri.path())?;

    let current = ctx.check(api::fetch_appointment(&ctx.http, id).await)?;
    api::ensure_transition(&current, &patch)?;

    let updated = ctx.check(api::update_appointment(&ctx.http, id, &patch).await)?;
    state.caches.appointment_changed();
    Ok(ApiResponse::success(updated).with_message(SUCCESS_MESSAGES.appointment_updated))
}

/// POST /appointments/:id/cancel
pub async fn cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Appointment>, ViewError> {
    let ctx = state.context(&headers, uri.path())?;
    let cancelled = ctx.check(api::cancel_appointment(&ctx.http, id).await)?;
    state.caches.appointment_changed();
    Ok(ApiResponse::success(cancelled).with_message(SUCCESS_MESSAGES.appointment_cancelled))
}
