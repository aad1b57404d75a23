/// Display name used in page descriptors and CLI banners
pub const APP_NAME: &str = "Virtual Wellness";

pub struct ErrorMessages {
    pub network_generic: &'static str,
    pub unknown: &'static str,
    pub validation_failed: &'static str,
    pub client_required: &'static str,
    pub datetime_required: &'static str,
    pub status_invalid: &'static str,
    pub cancelled_final: &'static str,
    pub email_invalid: &'static str,
    pub password_required: &'static str,
    pub nothing_to_update: &'static str,
    pub utc_offset_invalid: &'static str,
}

pub struct SuccessMessages {
    pub appointment_created: &'static str,
    pub appointment_updated: &'static str,
    pub appointment_cancelled: &'static str,
    pub signed_in: &'static str,
    pub signed_out: &'static str,
}

pub const ERROR_MESSAGES: ErrorMessages = ErrorMessages {
    network_generic: "Network error. Please try again.",
    unknown: "Something went wrong. Please try again later.",
    validation_failed: "Please check the form and try again.",
    client_required: "Please select a client.",
    datetime_required: "Please choose a valid date and time.",
    status_invalid: "Please choose pending, confirmed or cancelled.",
    cancelled_final: "A cancelled appointment cannot be reopened.",
    email_invalid: "Please enter a valid email address",
    password_required: "Password is required",
    nothing_to_update: "Please change the date, time or status.",
    utc_offset_invalid: "Time zone offset must be within a day of UTC.",
};

pub const SUCCESS_MESSAGES: SuccessMessages = SuccessMessages {
    appointment_created: "Appointment scheduled successfully.",
    appointment_updated: "Appointment updated successfully.",
    appointment_cancelled: "Appointment cancelled successfully.",
    signed_in: "Signed in successfully.",
    signed_out: "Signed out.",
};
