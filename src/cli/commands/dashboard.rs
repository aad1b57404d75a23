use crate::api::fetch_dashboard;
use crate::cli::config::CliContext;
use crate::cli::utils::print_table;
use crate::cli::OutputFormat;
use crate::datetime::{format_local_datetime, to_iso_utc};
use crate::messages::APP_NAME;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::open("/").await?;
    ctx.require_session().await?;

    let dashboard = ctx.check(fetch_dashboard(&ctx.http).await)?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dashboard)?),
        OutputFormat::Text => {
            let cards = &dashboard.cards;
            println!("{} dashboard", APP_NAME);
            println!();
            println!("Total clients          {}", cards.total_clients);
            println!("Upcoming appointments  {}", cards.upcoming_appointments);
            println!("This week              {}", cards.this_week);
            println!("Active clients         {}", cards.active_clients);

            println!();
            println!("Recent clients");
            let rows: Vec<Vec<String>> = dashboard
                .recent_clients
                .iter()
                .map(|c| vec![c.name.clone(), c.contact().to_string()])
                .collect();
            print_table(&["NAME", "CONTACT"], &rows);

            println!();
            println!("Upcoming appointments");
            let rows: Vec<Vec<String>> = dashboard
                .upcoming_appointments_list
                .iter()
                .map(|a| {
                    vec![
                        a.client_name().to_string(),
                        format_local_datetime(&to_iso_utc(&a.scheduled_at)),
                        a.status.to_string(),
                    ]
                })
                .collect();
            print_table(&["CLIENT", "WHEN", "STATUS"], &rows);
        }
    }
    Ok(())
}
