//! Sub-repo permissions diagnostic tool
//!
//! Evaluates path-level decisions against a rules file, for operators checking
//! what a given actor can read.

use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use subrepo_authz::{
    access_control::{Actor, RepoName, SubRepoPermsClient, actor_permissions},
    config::{AppConfig, LogFormat, load_config},
    feature_flag::FeatureFlag,
    store::InMemoryRuleSetStore,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Sub-repo permissions - path-level read access checks
#[derive(Parser, Debug)]
#[command(name = "subrepo-authz")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "SUBREPO_AUTHZ_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "SUBREPO_AUTHZ_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check which of the given paths an actor can read
    Check(CheckArgs),
}

#[derive(ClapArgs, Debug)]
struct CheckArgs {
    /// TOML rules file seeding the rule store
    #[arg(long)]
    rules: String,

    /// Repository the paths belong to
    #[arg(long)]
    repo: String,

    /// Check as this user ID
    #[arg(long, group = "actor")]
    user: Option<i32>,

    /// Check as a trusted internal caller
    #[arg(long, group = "actor")]
    internal: bool,

    /// Check as an anonymous caller
    #[arg(long, group = "actor")]
    anonymous: bool,

    /// Force enforcement on, regardless of configuration
    #[arg(long, conflicts_with = "no_enforce")]
    enforce: bool,

    /// Force enforcement off, regardless of configuration
    #[arg(long)]
    no_enforce: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Repo-relative paths to check
    #[arg(required = true)]
    paths: Vec<String>,
}

impl CheckArgs {
    fn actor(&self) -> Actor {
        match (self.user, self.internal) {
            (_, true) => Actor::internal(),
            (Some(uid), false) => Actor::from_user(uid),
            (None, false) => Actor::anonymous(),
        }
    }

    fn enforcement(&self, config: &AppConfig) -> bool {
        if self.enforce {
            true
        } else if self.no_enforce {
            false
        } else {
            config.sub_repo_permissions_enabled()
        }
    }
}

#[derive(Serialize)]
struct PathDecision<'a> {
    path: &'a str,
    perms: subrepo_authz::Perms,
}

fn init_logging(args: &Args, config: &AppConfig) {
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

async fn run_check(args: &CheckArgs, config: &AppConfig) -> anyhow::Result<()> {
    let store = InMemoryRuleSetStore::from_file(&args.rules)
        .inspect_err(|e| error!(error = %e, rules = %args.rules, "Failed to load rules file"))?;

    let flag = FeatureFlag::new(args.enforcement(config));
    let client = SubRepoPermsClient::new(flag.clone(), Arc::new(store));
    let actor = args.actor();
    let repo = RepoName::from(args.repo.as_str());

    info!(
        repo = %repo,
        uid = actor.uid,
        internal = actor.internal,
        enforced = flag.enabled(),
        "Checking paths"
    );

    let mut decisions = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        let content = subrepo_authz::RepoContent::new(repo.clone(), path.as_str());
        let perms = actor_permissions(&client, &actor, &content)
            .await
            .inspect_err(|e| error!(error = %e, path = %path, "Permission check failed"))?;
        decisions.push(PathDecision { path, perms });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decisions)?);
    } else {
        for decision in &decisions {
            println!("{}\t{}", decision.perms, decision.path);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = load_config(args.config.as_deref())?;

    // Initialize logging
    init_logging(&args, &config);

    match &args.command {
        Command::Check(check) => run_check(check, &config).await,
    }
}
