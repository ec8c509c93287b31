//! Parallax CLI - the admin workspace in your terminal

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};

use parallax_app::pages::{self, invite::InviteState};
use parallax_app::selectors::{BranchSelector, CompanySelector, SwitchOutcome};
use parallax_app::shell::Sidebar;
use parallax_app::{SessionStore, TenantContext, TenantContextStore, TracingNavigator};
use parallax_auth::{GateView, NO_ACTIVE_COMPANY_MESSAGE};
use parallax_backend::BackendClient;
use parallax_core::{BranchId, CompanyId};
use parallax_services::{ReportKind, ReportPeriod};

mod output;

/// Parallax - multi-tenant administration for service businesses
#[derive(Parser)]
#[command(name = "parallax", version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON instead of human-readable lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and load the active company
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PARALLAX_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user and tenant context
    Whoami,

    /// Show the navigation available to the current role
    Nav,

    /// Show today's KPIs and upcoming appointments
    Dashboard,

    /// List companies and mark the active one
    Companies,

    /// Make another company active
    SwitchCompany {
        /// Company id
        company: CompanyId,
    },

    /// Make another branch active ("all" for every branch)
    SwitchBranch {
        /// Branch id or "all"
        branch: String,
    },

    /// Show period reports
    Reports {
        /// 7d, 30d or current_month
        #[arg(long, default_value = "30d")]
        period: ReportPeriod,
    },

    /// Export a report as CSV
    Export {
        /// financial, appointments, clients, professionals or audit
        report: ReportKind,
        /// 7d, 30d or current_month
        #[arg(long, default_value = "30d")]
        period: ReportPeriod,
        /// Directory to write into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Accept a company invite
    AcceptInvite {
        /// Invite token
        token: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.log_json {
        parallax_observability::init();
    } else {
        parallax_observability::init_pretty();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

struct App {
    client: BackendClient,
    session: SessionStore,
    tenant: TenantContextStore,
}

impl App {
    fn from_env() -> Result<Self> {
        let client = BackendClient::from_env()?;
        if !client.is_configured() {
            tracing::warn!("PARALLAX_BACKEND_URL / PARALLAX_BACKEND_KEY not set");
        }
        Ok(Self {
            session: SessionStore::new(client.clone(), Arc::new(TracingNavigator)),
            tenant: TenantContextStore::new(client.clone()),
            client,
        })
    }

    /// Restore the session and load the tenant context; fail unless both are usable.
    async fn ready(&self) -> Result<TenantContext> {
        self.session.load_session().await;
        let session = self.session.snapshot();
        match session.gate_view() {
            GateView::Children => {}
            GateView::ContactAdministrator => bail!(NO_ACTIVE_COMPANY_MESSAGE),
            _ => match session.error {
                Some(error) => bail!("not signed in: {error}"),
                None => bail!("not signed in; run `parallax login`"),
            },
        }
        self.tenant.load_user_context().await;
        let ctx = self.tenant.snapshot();
        if let Some(error) = &ctx.error {
            bail!("{error}");
        }
        Ok(ctx)
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = App::from_env()?;
    let json = cli.json;

    match cli.command {
        Commands::Login { email, password } => {
            if !app.session.sign_in(&email, &password).await {
                let error = app.session.snapshot().error.unwrap_or_default();
                bail!("login failed: {error}");
            }
            let ctx = app.ready().await?;
            output::whoami(&ctx, json)
        }
        Commands::Logout => {
            app.session.sign_out().await;
            output::success("Signed out");
            Ok(())
        }
        Commands::Whoami => {
            let ctx = app.ready().await?;
            output::whoami(&ctx, json)
        }
        Commands::Nav => {
            let ctx = app.ready().await?;
            output::nav(&Sidebar::default(), &ctx, json)
        }
        Commands::Dashboard => {
            let ctx = app.ready().await?;
            let view = pages::dashboard::load_at(&app.client, &ctx, Utc::now()).await;
            output::page(&view, json)
        }
        Commands::Companies => {
            let ctx = app.ready().await?;
            let mut selector = CompanySelector::new();
            selector.load(&app.client).await;
            if let Some(error) = selector.error() {
                bail!("{error}");
            }
            output::companies(&selector.options(&ctx), json)
        }
        Commands::SwitchCompany { company } => {
            let ctx = app.ready().await?;
            let mut selector = CompanySelector::new();
            selector.load(&app.client).await;
            let outcome = selector.select(&app.tenant, &ctx, company).await;
            switched(&app, outcome, json)
        }
        Commands::SwitchBranch { branch } => {
            let ctx = app.ready().await?;
            let branch = match branch.as_str() {
                "all" => None,
                id => Some(id.parse::<BranchId>()?),
            };
            if !BranchSelector::is_visible(&ctx) {
                bail!("branch selection is not available for this role");
            }
            let mut selector = BranchSelector::new();
            selector.load(&app.client, &ctx).await;
            let outcome = selector.select(&app.tenant, &ctx, branch).await;
            switched(&app, outcome, json)
        }
        Commands::Reports { period } => {
            let ctx = app.ready().await?;
            let view = pages::reports::load_at(&app.client, &ctx, period, Utc::now()).await;
            output::page(&view, json)
        }
        Commands::Export { report, period, dir } => {
            let ctx = app.ready().await?;
            let today = Utc::now().date_naive();
            let path = pages::reports::export(&app.client, &ctx, report, period, today, &dir)
                .await
                .into_result()
                .map_err(anyhow::Error::msg)?;
            output::success(&format!("Exported {}", path.display()));
            Ok(())
        }
        Commands::AcceptInvite { token } => {
            app.session.load_session().await;
            match pages::invite::accept(&app.client, &token).await {
                InviteState::Accepted => {
                    output::success("Invite accepted");
                    Ok(())
                }
                InviteState::Failed(message) => bail!(message),
                InviteState::Processing => Ok(()),
            }
        }
    }
}

fn switched(app: &App, outcome: SwitchOutcome, json: bool) -> Result<()> {
    let ctx = app.tenant.snapshot();
    match outcome {
        SwitchOutcome::Unchanged => output::info("Already active"),
        SwitchOutcome::Switched => {}
        SwitchOutcome::Failed => bail!(ctx.error.unwrap_or_default()),
    }
    output::whoami(&ctx, json)
}
