// Form checks run before anything is sent to the backend
use chrono::{FixedOffset, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::api::LoginCredentials;
use crate::datetime::{fixed_offset, local_to_utc, split_local, to_iso_utc};
use crate::error::ApiError;
use crate::messages::ERROR_MESSAGES;
use crate::models::{Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};

/// Failed form: summary message plus one message per offending field
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::unprocessable_entity(err.message, err.fields)
    }
}

#[derive(Default)]
struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    // First message per field wins
    fn add(&mut self, field: &str, message: &str) {
        self.0.entry(field.to_string()).or_insert_with(|| message.to_string());
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationError> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(ValidationError {
                message: ERROR_MESSAGES.validation_failed.to_string(),
                fields: self.0,
            })
        }
    }
}

fn form_error(message: &str) -> ValidationError {
    ValidationError {
        message: message.to_string(),
        fields: BTreeMap::new(),
    }
}

/// Zone a form was filled in: `utcOffset` minutes east of UTC when sent, else this machine's
fn entry_zone(utc_offset: Option<i32>) -> Result<Option<FixedOffset>, ValidationError> {
    match utc_offset {
        None => Ok(None),
        Some(minutes) => fixed_offset(minutes).map(Some).ok_or_else(|| ValidationError {
            message: ERROR_MESSAGES.validation_failed.to_string(),
            fields: BTreeMap::from([("utcOffset".to_string(), ERROR_MESSAGES.utc_offset_invalid.to_string())]),
        }),
    }
}

/// Minimal address shape check: `local@domain.tld`, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginCredentials, ValidationError> {
        let email = self.email.trim();
        let mut errors = FieldErrors::default();
        if !is_valid_email(email) {
            errors.add("email", ERROR_MESSAGES.email_invalid);
        }
        if self.password.is_empty() {
            errors.add("password", ERROR_MESSAGES.password_required);
        }
        errors.finish(|| LoginCredentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// New appointment form; date and time are as entered in the staff member's zone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentForm {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<i32>,
}

impl AppointmentForm {
    pub fn validate(&self) -> Result<NewAppointment, ValidationError> {
        match entry_zone(self.utc_offset)? {
            Some(tz) => self.validate_in(&tz),
            None => self.validate_in(&Local),
        }
    }

    pub fn validate_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<NewAppointment, ValidationError> {
        let mut errors = FieldErrors::default();

        let client_id = self.client_id.trim().parse::<i64>().ok().filter(|id| *id > 0);
        if client_id.is_none() {
            errors.add("clientId", ERROR_MESSAGES.client_required);
        }
        let scheduled_at = check_datetime(&mut errors, tz, &self.date, &self.time);

        errors.finish(|| NewAppointment {
            client_id: client_id.unwrap_or_default(),
            scheduled_at: scheduled_at.unwrap_or_default(),
        })
    }
}

/// Edit form; every field is optional but date and time travel together
///
/// Only what the caller filled in reaches the patch, so a status change never
/// reschedules and a reschedule never touches the status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditAppointmentForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "utcOffset", skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<i32>,
}

impl EditAppointmentForm {
    /// Form prefilled from an existing appointment, as seen in `tz`
    pub fn prefill<Tz: TimeZone>(appointment: &Appointment, tz: &Tz) -> Self
    where
        Tz::Offset: Display,
    {
        let (date, time) = split_local(&appointment.scheduled_at, tz);
        Self {
            date,
            time,
            status: appointment.status.as_str().to_string(),
            utc_offset: None,
        }
    }

    pub fn validate(&self) -> Result<AppointmentPatch, ValidationError> {
        match entry_zone(self.utc_offset)? {
            Some(tz) => self.validate_in(&tz),
            None => self.validate_in(&Local),
        }
    }

    pub fn validate_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<AppointmentPatch, ValidationError> {
        let mut errors = FieldErrors::default();

        let scheduled_at = if self.date.trim().is_empty() && self.time.trim().is_empty() {
            None
        } else {
            check_datetime(&mut errors, tz, &self.date, &self.time)
        };

        let status = match self.status.trim() {
            "" => None,
            raw => {
                let parsed = raw.parse::<AppointmentStatus>().ok();
                if parsed.is_none() {
                    errors.add("status", ERROR_MESSAGES.status_invalid);
                }
                parsed
            }
        };

        let patch = errors.finish(|| AppointmentPatch { scheduled_at, status })?;
        if patch.is_empty() {
            return Err(form_error(ERROR_MESSAGES.nothing_to_update));
        }
        Ok(patch)
    }
}

fn check_datetime<Tz: TimeZone>(errors: &mut FieldErrors, tz: &Tz, date: &str, time: &str) -> Option<String> {
    if date.trim().is_empty() {
        errors.add("date", ERROR_MESSAGES.datetime_required);
    }
    if time.trim().is_empty() {
        errors.add("time", ERROR_MESSAGES.datetime_required);
    }
    if date.trim().is_empty() || time.trim().is_empty() {
        return None;
    }
    match local_to_utc(tz, date, time) {
        Some(instant) => Some(to_iso_utc(&instant)),
        None => {
            errors.add("date", ERROR_MESSAGES.datetime_required);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("admin@clinic.test"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("admin"));
        assert!(!is_valid_email("admin@clinic"));
        assert!(!is_valid_email("@clinic.test"));
        assert!(!is_valid_email("ad min@clinic.test"));
        assert!(!is_valid_email("a@b@clinic.test"));
    }

    #[test]
    fn login_form_reports_each_field() {
        let err = LoginForm { email: "nope".into(), password: String::new() }.validate().unwrap_err();
        assert_eq!(err.message, "Please check the form and try again.");
        assert_eq!(err.field("email"), Some("Please enter a valid email address"));
        assert_eq!(err.field("password"), Some("Password is required"));

        let ok = LoginForm { email: " admin@clinic.test ".into(), password: "secret".into() }.validate().unwrap();
        assert_eq!(ok.email, "admin@clinic.test");
    }

    #[test]
    fn new_appointment_converts_local_time_to_utc() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let form = AppointmentForm {
            client_id: "12".into(),
            date: "2025-04-02".into(),
            time: "09:00".into(),
            utc_offset: None,
        };
        let appointment = form.validate_in(&tz).unwrap();
        assert_eq!(appointment.client_id, 12);
        assert_eq!(appointment.scheduled_at, "2025-04-02T08:00:00.000Z");
    }

    #[test]
    fn sent_utc_offset_decides_the_zone() {
        let form: AppointmentForm = serde_json::from_value(serde_json::json!({
            "clientId": "12", "date": "2025-04-02", "time": "09:00", "utcOffset": -300
        }))
        .unwrap();
        assert_eq!(form.validate().unwrap().scheduled_at, "2025-04-02T14:00:00.000Z");

        let out_of_range = AppointmentForm { utc_offset: Some(24 * 60), ..form };
        let err = out_of_range.validate().unwrap_err();
        assert!(err.field("utcOffset").is_some());
    }

    #[test]
    fn new_appointment_requires_client_and_datetime() {
        let err = AppointmentForm::default().validate_in(&Utc).unwrap_err();
        assert_eq!(err.field("clientId"), Some("Please select a client."));
        assert_eq!(err.field("date"), Some("Please choose a valid date and time."));
        assert_eq!(err.field("time"), Some("Please choose a valid date and time."));

        let garbled = AppointmentForm {
            client_id: "abc".into(),
            date: "2025-13-40".into(),
            time: "09:00".into(),
            utc_offset: None,
        };
        let err = garbled.validate_in(&Utc).unwrap_err();
        assert_eq!(err.fields.len(), 2);
    }

    #[test]
    fn edit_form_prefills_and_validates_status() {
        let appointment: Appointment = serde_json::from_value(serde_json::json!({
            "id": 5,
            "clientId": 2,
            "scheduledAt": "2025-05-06T15:45:00Z",
            "status": "confirmed",
            "createdAt": "2025-05-01T00:00:00Z",
            "updatedAt": "2025-05-01T00:00:00Z"
        }))
        .unwrap();
        let mut form = EditAppointmentForm::prefill(&appointment, &Utc);
        assert_eq!(
            form,
            EditAppointmentForm {
                date: "2025-05-06".into(),
                time: "15:45".into(),
                status: "confirmed".into(),
                utc_offset: None,
            }
        );

        let patch = form.validate_in(&Utc).unwrap();
        assert_eq!(patch.scheduled_at.as_deref(), Some("2025-05-06T15:45:00.000Z"));
        assert_eq!(patch.status, Some(AppointmentStatus::Confirmed));

        form.status = "done".into();
        assert_eq!(form.validate_in(&Utc).unwrap_err().field("status"), Some("Please choose pending, confirmed or cancelled."));
    }

    #[test]
    fn status_only_edit_leaves_schedule_out_of_the_patch() {
        let form = EditAppointmentForm { status: "confirmed".into(), ..Default::default() };
        let patch = form.validate_in(&Utc).unwrap();
        assert_eq!(serde_json::to_value(&patch).unwrap(), serde_json::json!({ "status": "confirmed" }));

        let reschedule = EditAppointmentForm { date: "2025-05-07".into(), time: "10:00".into(), ..Default::default() };
        let patch = reschedule.validate_in(&Utc).unwrap();
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "scheduledAt": "2025-05-07T10:00:00.000Z" })
        );
    }

    #[test]
    fn edit_needs_date_and_time_together_and_something_to_change() {
        let half = EditAppointmentForm { date: "2025-05-07".into(), ..Default::default() };
        assert_eq!(half.validate_in(&Utc).unwrap_err().field("time"), Some("Please choose a valid date and time."));

        let err = EditAppointmentForm::default().validate_in(&Utc).unwrap_err();
        assert_eq!(err.message, "Please change the date, time or status.");
        assert!(err.fields.is_empty());
    }

    #[test]
    fn validation_error_becomes_422() {
        let err: ApiError = AppointmentForm::default().validate_in(&Utc).unwrap_err().into();
        assert_eq!(err.status, Some(422));
        assert_eq!(err.details.unwrap()["fields"]["clientId"], "Please select a client.");
    }
}
