use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use onboarding_approvals::config::{AppConfig, BackendSettings, CliConfig, FileConfig};
use onboarding_approvals::workflow::{
    ActionPayload, BulkActionExecutor, Decision, DocumentAggregate, DocumentAggregator,
    DocumentDecision, DocumentReviewRequest, Stage, StageAction, StageActionRequest, StageGate,
    StageTransitionExecutor, Subject,
};
use onboarding_approvals::{ApprovalApi, HttpApprovalApi, InMemoryApprovalApi};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

fn parse_stage(s: &str) -> Result<Stage, String> {
    Stage::from_str(s).ok_or_else(|| format!("unknown stage '{}'", s))
}

fn parse_action(s: &str) -> Result<StageAction, String> {
    StageAction::from_str(s).ok_or_else(|| format!("unknown action '{}'", s))
}

fn parse_decision(s: &str) -> Result<DocumentDecision, String> {
    DocumentDecision::from_str(s).ok_or_else(|| format!("unknown decision '{}'", s))
}

#[derive(Parser, Debug)]
#[command(about = "Drive subjects through the staged onboarding approval workflow")]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Base URL of the approval backend (e.g. "https://hr.example.com/api").
    #[clap(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token sent to the approval backend.
    #[clap(long, global = true)]
    pub api_token: Option<String>,

    /// Per-request timeout in seconds.
    #[clap(long, global = true)]
    pub timeout_sec: Option<u64>,

    /// Maximum number of subjects processed at the same time by bulk actions.
    #[clap(long, global = true)]
    pub max_concurrency: Option<usize>,

    /// JSON file with an array of subjects. When set, no backend is contacted
    /// and every change is kept in memory for the duration of the command.
    #[clap(long, global = true, value_parser = parse_path)]
    pub fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct PayloadArgs {
    /// Reason for the action, required by reject and request-changes.
    #[clap(long)]
    reason: Option<String>,

    /// Role id to assign, may be repeated.
    #[clap(long = "role")]
    roles: Vec<String>,
}

impl From<PayloadArgs> for ActionPayload {
    fn from(args: PayloadArgs) -> Self {
        ActionPayload {
            reason: args.reason,
            role_ids: args.roles,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Applies one stage action to one subject.
    Apply {
        subject_id: String,
        #[clap(long, value_parser = parse_stage)]
        stage: Stage,
        #[clap(long, value_parser = parse_action)]
        action: StageAction,
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Applies the same stage action to many subjects.
    /// Ctrl-C stops dispatching further subjects.
    Bulk {
        #[clap(required = true)]
        subject_ids: Vec<String>,
        #[clap(long, value_parser = parse_stage)]
        stage: Stage,
        #[clap(long, value_parser = parse_action)]
        action: StageAction,
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Records a review decision on one document of a subject.
    ReviewDocument {
        subject_id: String,
        document_id: String,
        #[clap(long, value_parser = parse_decision)]
        decision: DocumentDecision,
        #[clap(long)]
        reason: Option<String>,
    },

    /// Shows a subject, its document aggregate and which stage approvals the
    /// gate would currently allow.
    Inspect { subject_id: String },
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            api_url: self.api_url.clone(),
            api_token: self.api_token.clone(),
            timeout_sec: self.timeout_sec,
            max_concurrency: self.max_concurrency,
            fixture: self.fixture.clone(),
        }
    }
}

#[derive(Serialize)]
struct StageCheck {
    stage: Stage,
    decision: Decision,
}

#[derive(Serialize)]
struct Inspection {
    subject: Subject,
    documents: DocumentAggregate,
    approvals: Vec<StageCheck>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_api(config: &AppConfig) -> Result<Arc<dyn ApprovalApi>> {
    match &config.backend {
        BackendSettings::Http {
            base_url,
            auth_token,
            timeout_sec,
        } => {
            info!("Using approval backend at {}", base_url);
            let api = HttpApprovalApi::new(base_url.clone(), auth_token.clone(), *timeout_sec)
                .context("Failed to create approval backend client")?;
            Ok(Arc::new(api))
        }
        BackendSettings::Fixture(path) => {
            info!("Using in-memory subjects from {:?}", path);
            Ok(Arc::new(InMemoryApprovalApi::from_fixture(path)?))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let api = build_api(&config)?;
    let executor = StageTransitionExecutor::new(api.clone());

    let success = match cli_args.command {
        Command::Apply {
            subject_id,
            stage,
            action,
            payload,
        } => {
            let request =
                StageActionRequest::new(subject_id, stage, action).with_payload(payload.into());
            let outcome = executor.apply(&request).await;
            print_json(&outcome)?;
            outcome.success
        }
        Command::Bulk {
            subject_ids,
            stage,
            action,
            payload,
        } => {
            let bulk = BulkActionExecutor::new(executor, config.bulk.max_concurrency);
            let payload: ActionPayload = payload.into();

            let cancel = CancellationToken::new();
            let signal_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling bulk action");
                    signal_token.cancel();
                }
            });

            let report = bulk
                .apply_bulk_cancellable(&subject_ids, stage, action, &payload, &cancel)
                .await?;
            for (kind, count) in report.failure_breakdown() {
                info!("{} subject(s) failed with {}", count, kind);
            }
            print_json(&report)?;
            report.failed == 0
        }
        Command::ReviewDocument {
            subject_id,
            document_id,
            decision,
            reason,
        } => {
            let mut request = DocumentReviewRequest::new(subject_id, document_id, decision);
            if let Some(reason) = reason {
                request = request.with_reason(reason);
            }
            let outcome = executor.review_document(&request).await;
            print_json(&outcome)?;
            outcome.success
        }
        Command::Inspect { subject_id } => {
            let subject = api
                .get_subject(&subject_id)
                .await
                .with_context(|| format!("Failed to load subject {}", subject_id))?;
            let approvals = Stage::ALL
                .iter()
                .map(|&stage| StageCheck {
                    stage,
                    decision: StageGate::evaluate(&subject, stage, StageAction::Approve),
                })
                .collect();
            let inspection = Inspection {
                documents: DocumentAggregator::compute(&subject.documents),
                approvals,
                subject,
            };
            print_json(&inspection)?;
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
