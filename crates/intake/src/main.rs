use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use volunteer_core::config::IntakeConfig;
use volunteer_core::form::FormController;
use volunteer_core::memory::{InMemoryAuthProvider, InMemoryRecordStore};
use volunteer_core::ports::{AuthProvider, RecordStore};
use volunteer_db::{DbConfig, PgAuthProvider, PgRecordStore};
use volunteer_intake::DriveOutcome;

const USAGE: &str = "usage: volunteer-intake <draft.json>";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "volunteer_intake=info,volunteer_core=info,volunteer_db=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(DriveOutcome::Submitted(id)) => {
            tracing::info!(submission_id = id, "Application submitted");
            println!("submitted {id}");
            ExitCode::SUCCESS
        }
        Ok(outcome) => {
            match &outcome {
                DriveOutcome::Blocked { step, reasons } => {
                    eprintln!("blocked on step {}:", step.to_number());
                    for reason in reasons {
                        eprintln!("  {reason}");
                    }
                }
                DriveOutcome::Failed(err) => {
                    tracing::error!(kind = ?err.kind, error = %err, "Submission failed");
                    eprintln!("submission failed: {err}");
                }
                DriveOutcome::Submitted(_) => {}
            }
            outcome.exit_code()
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Intake aborted");
            eprintln!("{e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run() -> anyhow::Result<DriveOutcome> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context(USAGE)?;

    // --- Configuration ---
    let config = IntakeConfig::from_env()?;
    tracing::info!(
        check_timeout_secs = config.check_timeout.as_secs(),
        submit_timeout_secs = config.submit_timeout.as_secs(),
        policy = config.duplicate_policy.as_str(),
        "Loaded intake configuration"
    );

    let draft = volunteer_intake::load_draft(&path)?;

    // --- Adapters ---
    let (store, auth): (Arc<dyn RecordStore>, Arc<dyn AuthProvider>) = if dry_run() {
        tracing::info!("Dry run, using in-memory adapters");
        (
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryAuthProvider::new()),
        )
    } else {
        let db_config = DbConfig::from_env()?;
        let pool = volunteer_db::create_pool(&db_config)
            .await
            .context("Failed to connect to database")?;
        tracing::info!("Database connection pool created");

        volunteer_db::health_check(&pool)
            .await
            .context("Database health check failed")?;

        volunteer_db::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied");

        (
            Arc::new(PgRecordStore::new(pool.clone())),
            Arc::new(PgAuthProvider::new(pool)),
        )
    };

    let mut form = FormController::from_ports(store, auth, &config).with_application(draft);
    Ok(volunteer_intake::drive(&mut form).await)
}

/// `INTAKE_DRY_RUN` set to `1` or `true`.
fn dry_run() -> bool {
    std::env::var("INTAKE_DRY_RUN")
        .map(|v| matches!(v.trim(), "1" | "true"))
        .unwrap_or(false)
}
