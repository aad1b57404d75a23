use chrono::Utc;
use clap::Subcommand;

use super::page_query;
use crate::api::{self, upcoming_query, AppointmentSource};
use crate::cli::config::CliContext;
use crate::cli::utils::{output_item, output_page, output_success, report_validation};
use crate::cli::OutputFormat;
use crate::datetime::{format_local_datetime, to_iso_utc};
use crate::messages::SUCCESS_MESSAGES;
use crate::models::{Appointment, AppointmentStatus};
use crate::pagination::{ListController, PageQuery};
use crate::validation::{AppointmentForm, EditAppointmentForm};

#[derive(Subcommand)]
pub enum AppointmentCommands {
    #[command(about = "List appointments")]
    List {
        #[arg(long, help = "Filter by status (pending, confirmed, cancelled)")]
        status: Option<AppointmentStatus>,
        #[arg(long, help = "Only appointments at or after this ISO-8601 instant")]
        from: Option<String>,
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: u32,
        #[arg(long, help = "Rows per page (10, 25, 50 or 100)")]
        page_size: Option<u32>,
    },

    #[command(about = "List confirmed appointments from now on")]
    Upcoming {
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: u32,
        #[arg(long, help = "Rows per page (10, 25, 50 or 100)")]
        page_size: Option<u32>,
    },

    #[command(about = "Show one appointment")]
    Show {
        #[arg(help = "Appointment ID")]
        id: i64,
    },

    #[command(about = "Schedule a new appointment")]
    Create {
        #[arg(long, help = "Client ID")]
        client_id: String,
        #[arg(long, help = "Local date, YYYY-MM-DD")]
        date: String,
        #[arg(long, help = "Local time, HH:MM")]
        time: String,
    },

    #[command(about = "Reschedule an appointment or change its status")]
    Update {
        #[arg(help = "Appointment ID")]
        id: i64,
        #[arg(long, requires = "time", help = "New local date, YYYY-MM-DD")]
        date: Option<String>,
        #[arg(long, requires = "date", help = "New local time, HH:MM")]
        time: Option<String>,
        #[arg(long, help = "New status (pending, confirmed, cancelled)")]
        status: Option<String>,
    },

    #[command(about = "Cancel an appointment")]
    Cancel {
        #[arg(help = "Appointment ID")]
        id: i64,
    },
}

pub async fn handle(cmd: AppointmentCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AppointmentCommands::List { status, from, page, page_size } => {
            let ctx = CliContext::open("/appointments").await?;
            ctx.require_session().await?;

            let mut query = page_query(1, page_size, ctx.config.query.default_page_size)?;
            if let Some(status) = status {
                query.set_filter("status", status.as_str());
            }
            if let Some(from) = from {
                query.set_filter("from", from.trim());
            }
            query.set_page(page);
            list(&ctx, query, &output_format, "No appointments found.").await
        }
        AppointmentCommands::Upcoming { page, page_size } => {
            let ctx = CliContext::open("/appointments/upcoming").await?;
            ctx.require_session().await?;

            let sized = page_query(page, page_size, ctx.config.query.default_page_size)?;
            let query = upcoming_query(sized.page(), sized.page_size(), Utc::now());
            list(&ctx, query, &output_format, "No upcoming appointments.").await
        }
        AppointmentCommands::Show { id } => {
            let ctx = CliContext::open(&format!("/appointments/{}", id)).await?;
            ctx.require_session().await?;

            let appointment = ctx.check(api::fetch_appointment(&ctx.http, id).await)?;
            output_appointment(&output_format, &appointment)
        }
        AppointmentCommands::Create { client_id, date, time } => {
            let ctx = CliContext::open("/appointments/new").await?;
            ctx.require_session().await?;

            let new_appointment = AppointmentForm { client_id, date, time, utc_offset: None }
                .validate()
                .map_err(|e| report_validation(&output_format, e))?;
            let created = ctx.check(api::create_appointment(&ctx.http, &new_appointment).await)?;

            output_success(
                &output_format,
                SUCCESS_MESSAGES.appointment_created,
                Some(serde_json::json!({ "appointment": created })),
            )
        }
        AppointmentCommands::Update { id, date, time, status } => {
            let ctx = CliContext::open(&format!("/appointments/{}/edit", id)).await?;
            ctx.require_session().await?;

            let patch = update_form(date, time, status)
                .validate()
                .map_err(|e| report_validation(&output_format, e))?;
            let current = ctx.check(api::fetch_appointment(&ctx.http, id).await)?;
            api::ensure_transition(&current, &patch).map_err(|e| anyhow::anyhow!(e.message))?;
            let updated = ctx.check(api::update_appointment(&ctx.http, id, &patch).await)?;

            output_success(
                &output_format,
                SUCCESS_MESSAGES.appointment_updated,
                Some(serde_json::json!({ "appointment": updated })),
            )
        }
        AppointmentCommands::Cancel { id } => {
            let ctx = CliContext::open("/appointments").await?;
            ctx.require_session().await?;

            let cancelled = ctx.check(api::cancel_appointment(&ctx.http, id).await)?;
            output_success(
                &output_format,
                SUCCESS_MESSAGES.appointment_cancelled,
                Some(serde_json::json!({ "appointment": cancelled })),
            )
        }
    }
}

// Only the flags given make it into the form, so `--status` alone never reschedules
fn update_form(date: Option<String>, time: Option<String>, status: Option<String>) -> EditAppointmentForm {
    EditAppointmentForm {
        date: date.unwrap_or_default(),
        time: time.unwrap_or_default(),
        status: status.unwrap_or_default(),
        utc_offset: None,
    }
}

async fn list(ctx: &CliContext, query: PageQuery, output_format: &OutputFormat, empty: &str) -> anyhow::Result<()> {
    let mut list = ListController::new(AppointmentSource::new(ctx.http.clone()), query, ctx.cache());
    let view = ctx.check(list.load().await)?;

    output_page(
        output_format,
        &view,
        &["ID", "CLIENT", "WHEN", "STATUS"],
        |a: &Appointment| {
            vec![
                a.id.to_string(),
                a.client_name().to_string(),
                format_local_datetime(&to_iso_utc(&a.scheduled_at)),
                a.status.to_string(),
            ]
        },
        empty,
    )
}

fn output_appointment(output_format: &OutputFormat, appointment: &Appointment) -> anyhow::Result<()> {
    let lines = [
        ("ID", appointment.id.to_string()),
        ("Client", appointment.client_name().to_string()),
        ("When", format_local_datetime(&to_iso_utc(&appointment.scheduled_at))),
        ("Status", appointment.status.to_string()),
        ("Created", format_local_datetime(&to_iso_utc(&appointment.created_at))),
        ("Updated", format_local_datetime(&to_iso_utc(&appointment.updated_at))),
    ];
    output_item(output_format, appointment, &lines)
}
