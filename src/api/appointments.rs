use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::envelope::{Envelope, ListEnvelope};
use super::http::HttpClient;
use crate::datetime::to_iso_utc;
use crate::error::ApiError;
use crate::messages::ERROR_MESSAGES;
use crate::models::{Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};
use crate::pagination::{ListSource, PageQuery, PageResult};

pub const RESOURCE: &str = "appointments";

/// Query behind the upcoming view: confirmed appointments from `now` on
pub fn upcoming_query(page: u32, page_size: u32, now: DateTime<Utc>) -> PageQuery {
    PageQuery::new(page, page_size)
        .with_filter("status", AppointmentStatus::Confirmed.as_str())
        .with_filter("from", to_iso_utc(&now))
}

/// `GET /appointments?page&pageSize[&from][&status]`
pub async fn fetch_appointments(http: &HttpClient, query: &PageQuery) -> Result<PageResult<Appointment>, ApiError> {
    let envelope: ListEnvelope<Appointment> = http.get("/appointments", &query.to_query_pairs()).await?;
    Ok(envelope.into())
}

pub async fn fetch_appointment(http: &HttpClient, id: i64) -> Result<Appointment, ApiError> {
    let envelope: Envelope<Appointment> = http.get(&format!("/appointments/{}", id), &[]).await?;
    Ok(envelope.data)
}

pub async fn create_appointment(http: &HttpClient, appointment: &NewAppointment) -> Result<Appointment, ApiError> {
    let envelope: Envelope<Appointment> = http.post("/appointments", appointment).await?;
    tracing::info!(id = envelope.data.id, client_id = appointment.client_id, "appointment created");
    Ok(envelope.data)
}

pub async fn update_appointment(http: &HttpClient, id: i64, patch: &AppointmentPatch) -> Result<Appointment, ApiError> {
    let envelope: Envelope<Appointment> = http.patch(&format!("/appointments/{}", id), patch).await?;
    tracing::info!(id, status = %envelope.data.status, "appointment updated");
    Ok(envelope.data)
}

pub async fn cancel_appointment(http: &HttpClient, id: i64) -> Result<Appointment, ApiError> {
    let envelope: Envelope<Appointment> = http.patch_empty(&format!("/appointments/{}/cancel", id)).await?;
    tracing::info!(id, "appointment cancelled");
    Ok(envelope.data)
}

/// Reject a patch that would move a cancelled appointment out of `cancelled`
pub fn ensure_transition(current: &Appointment, patch: &AppointmentPatch) -> Result<(), ApiError> {
    match patch.status {
        Some(next) if !current.status.can_transition_to(next) => {
            let fields = BTreeMap::from([("status".to_string(), ERROR_MESSAGES.cancelled_final.to_string())]);
            Err(ApiError::unprocessable_entity(ERROR_MESSAGES.cancelled_final, fields))
        }
        _ => Ok(()),
    }
}

/// Appointment list (full or upcoming) as a list source
pub struct AppointmentSource {
    http: HttpClient,
}

impl AppointmentSource {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ListSource for AppointmentSource {
    type Item = Appointment;

    fn resource(&self) -> &'static str {
        RESOURCE
    }

    async fn fetch(&self, query: &PageQuery) -> Result<PageResult<Appointment>, ApiError> {
        fetch_appointments(&self.http, query).await
    }
}
