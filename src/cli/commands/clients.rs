use clap::Subcommand;

use super::page_query;
use crate::api::ClientSource;
use crate::cli::config::CliContext;
use crate::cli::utils::output_page;
use crate::cli::OutputFormat;
use crate::pagination::ListController;

#[derive(Subcommand)]
pub enum ClientCommands {
    #[command(about = "List clients")]
    List {
        #[arg(long, help = "Search by name, email or phone")]
        q: Option<String>,
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: u32,
        #[arg(long, help = "Rows per page (10, 25, 50 or 100)")]
        page_size: Option<u32>,
    },
}

pub async fn handle(cmd: ClientCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ClientCommands::List { q, page, page_size } => {
            let ctx = CliContext::open("/clients").await?;
            ctx.require_session().await?;

            let mut query = page_query(1, page_size, ctx.config.query.default_page_size)?;
            if let Some(q) = q {
                query.set_filter("q", q.trim());
            }
            query.set_page(page);

            let mut list = ListController::new(ClientSource::new(ctx.http.clone()), query, ctx.cache());
            let view = ctx.check(list.load().await)?;

            output_page(
                &output_format,
                &view,
                &["ID", "NAME", "CONTACT", "EXTERNAL ID"],
                |client| {
                    vec![
                        client.id.to_string(),
                        client.name.clone(),
                        client.contact().to_string(),
                        client.external_id.clone().unwrap_or_else(|| "-".to_string()),
                    ]
                },
                "No clients found.",
            )
        }
    }
}
