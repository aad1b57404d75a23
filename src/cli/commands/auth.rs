use clap::Subcommand;
use serde_json::json;
use std::io::{self, BufRead, Write};

use crate::api::sign_in;
use crate::cli::config::CliContext;
use crate::cli::utils::{output_item, output_success, report_validation};
use crate::cli::OutputFormat;
use crate::messages::SUCCESS_MESSAGES;
use crate::middleware::GuardDecision;
use crate::validation::LoginForm;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and forget the stored session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => login(email, password, output_format).await,
        AuthCommands::Logout => {
            let ctx = CliContext::open("/logout").await?;
            ctx.session().logout().await;
            output_success(&output_format, SUCCESS_MESSAGES.signed_out, None)
        }
        AuthCommands::Status => {
            let ctx = CliContext::open("/").await?;
            let has_cookie = ctx.cookie.value().await.is_some();
            let user = ctx.session().user();
            let authenticated = has_cookie && ctx.session().is_authenticated();

            let status = json!({
                "authenticated": authenticated,
                "user": user,
                "backend": ctx.http.base_url(),
            });
            let mut lines = vec![
                ("Signed in", if authenticated { "yes".to_string() } else { "no".to_string() }),
                ("Backend", ctx.http.base_url().to_string()),
            ];
            if let Some(user) = &user {
                lines.push(("User", format!("{} <{}>", user.name, user.email)));
            }
            output_item(&output_format, &status, &lines)
        }
        AuthCommands::Whoami => {
            let ctx = CliContext::open("/").await?;
            ctx.require_session().await?;
            let user = ctx
                .session()
                .user()
                .ok_or_else(|| anyhow::anyhow!("No user profile stored. Run `wellness auth login <email>` again."))?;
            let lines = [
                ("Name", user.name.clone()),
                ("Email", user.email.clone()),
                ("Role", user.role.clone()),
                ("ID", user.id.to_string()),
            ];
            output_item(&output_format, &user, &lines)
        }
    }
}

async fn login(email: String, password: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::open(&crate::config::config().session.login_path).await?;

    // A cookie already present sends the login page home
    if let GuardDecision::Redirect(_) = ctx.edge_decision().await {
        let user = ctx.session().user();
        return output_success(&output_format, "Already signed in", Some(json!({ "user": user })));
    }

    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };
    let credentials = LoginForm { email, password }
        .validate()
        .map_err(|e| report_validation(&output_format, e))?;

    let user = ctx.check(sign_in(&ctx.http, &credentials).await)?;
    output_success(
        &output_format,
        &format!("{} Welcome, {}.", SUCCESS_MESSAGES.signed_in, user.name),
        Some(json!({ "user": user })),
    )
}

fn prompt_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
