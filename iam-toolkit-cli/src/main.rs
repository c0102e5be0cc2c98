use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use iam_toolkit_core::{
    init_group_category_regex, CreateUserOptions, GroupSelection, IamToolkitService, Requirement,
    ToolkitConfig,
};
use log::{debug, info};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "iam-toolkit",
    version,
    about = "Create and delete IAM users, manage groups and access keys"
)]
struct Cli {
    /// TOML configuration file (retry delay, group policy, password length)
    #[arg(long, short = 'c', global = true, env = "IAM_TOOLKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Named AWS credential profile
    #[arg(long, global = true, env = "AWS_PROFILE")]
    profile: Option<String>,

    #[arg(long, global = true, env = "AWS_REGION")]
    region: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a user, optionally with groups, a console password and an access key
    CreateUser {
        user_name: String,

        /// Group to add the user to (repeatable)
        #[arg(long = "group", short = 'g')]
        groups: Vec<String>,

        /// Create a login profile with a generated password
        #[arg(long)]
        with_password: bool,

        /// Force a password change at first sign-in
        #[arg(long, requires = "with_password")]
        require_password_reset: bool,

        #[arg(long)]
        with_access_key: bool,
    },

    /// Delete users, retrying while IAM reports them as busy
    DeleteUsers {
        #[arg(required = true)]
        user_names: Vec<String>,

        /// Remove group memberships, access keys and login profile first
        #[arg(long)]
        purge: bool,
    },

    AddUserToGroup {
        user_name: String,
        group_name: String,

        /// Fail when the user cannot be added
        #[arg(long)]
        required: bool,
    },

    /// Create groups, in order
    CreateGroups {
        #[arg(required = true)]
        group_names: Vec<String>,
    },

    /// Delete groups, retrying while they still have members
    DeleteGroups {
        #[arg(required = true)]
        group_names: Vec<String>,
    },

    ListAccessKeys { user_name: String },

    /// Bucket the account's groups by name pattern
    CategorizeGroups {
        /// LABEL=PATTERN, matched from the start of the group name. One empty
        /// pattern may mark the catch-all category
        #[arg(long = "category", required = true, value_parser = parse_category)]
        categories: Vec<(String, String)>,
    },
}

fn parse_category(value: &str) -> Result<(String, String), String> {
    let (label, pattern) = value
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=PATTERN, got '{value}'"))?;
    if label.is_empty() {
        return Err(format!("category label is empty in '{value}'"));
    }
    Ok((label.to_string(), pattern.to_string()))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn connect(config: ToolkitConfig) -> Result<IamToolkitService> {
    IamToolkitService::new(config)
        .await
        .context("Failed to initialize IAM toolkit")
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = ToolkitConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if cli.profile.is_some() {
        config.aws.profile = cli.profile;
    }
    if cli.region.is_some() {
        config.aws.region = cli.region;
    }
    debug!("Effective configuration: {config:?}");

    match cli.command {
        Commands::CreateUser {
            user_name,
            groups,
            with_password,
            require_password_reset,
            with_access_key,
        } => {
            let service = connect(config).await?;
            let options = CreateUserOptions {
                with_password,
                require_password_reset,
                with_access_key,
            };
            let result = service
                .create_user(&user_name, GroupSelection::Many(groups), options)
                .await;
            print_json(&result)?;
            Ok(exit_code(result.is_success()))
        }
        Commands::DeleteUsers { user_names, purge } => {
            let service = connect(config).await?;
            let report = service
                .delete_users(user_names, purge)
                .await
                .context("Failed to delete users")?;
            print_json(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::AddUserToGroup {
            user_name,
            group_name,
            required,
        } => {
            let service = connect(config).await?;
            service
                .add_user_to_group(&user_name, &group_name, Requirement::from(required))
                .await
                .context("Failed to add user to group")?;
            info!("Done adding {user_name} to {group_name}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::CreateGroups { group_names } => {
            let service = connect(config).await?;
            let errors = service.create_groups(group_names).await;
            print_json(&errors)?;
            Ok(exit_code(errors.is_empty()))
        }
        Commands::DeleteGroups { group_names } => {
            let service = connect(config).await?;
            let report = service
                .delete_groups(group_names)
                .await
                .context("Failed to delete groups")?;
            print_json(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::ListAccessKeys { user_name } => {
            let service = connect(config).await?;
            let keys = service
                .show_access_keys(&user_name)
                .await
                .context("Failed to list access keys")?;
            print_json(&keys)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::CategorizeGroups { categories } => {
            let (labels, patterns): (Vec<String>, Vec<String>) = categories.into_iter().unzip();
            let categories = init_group_category_regex(&labels, &patterns)
                .context("Invalid group categories")?;
            let service = connect(config).await?;
            let buckets = service
                .categorize_groups(&categories)
                .await
                .context("Failed to categorize groups")?;
            print_json(&buckets)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
