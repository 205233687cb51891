// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Operator CLI for insider group sync.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod version;

/// insider-sync - subscription-driven insider group sync.
#[derive(Parser, Debug)]
#[command(name = "insider-sync", about = "Insider group sync operator tool", version)]
struct Args {
	/// Config file (defaults to /etc/insider-sync/config.toml)
	#[arg(long, global = true, env = "INSIDER_SYNC_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
	/// Create or upgrade the database schema
	Migrate,
	/// Manage the insider / non-insider groups
	Groups {
		#[command(subcommand)]
		command: GroupsCommand,
	},
	/// Reconcile one user's groups against a provider user payload
	Sync {
		#[arg(long)]
		username: String,
		/// JSON file holding the provider user object
		#[arg(long)]
		payload: PathBuf,
	},
	/// Run the post-authentication hook on a raw token response
	Authenticate {
		/// JSON file holding the raw token parameters
		#[arg(long)]
		token_params: PathBuf,
		/// Existing local user; omit to simulate a user who has not signed up yet
		#[arg(long)]
		username: Option<String>,
	},
	/// Create a user and run the user-created hook
	Signup {
		#[arg(long)]
		username: String,
		#[arg(long)]
		email: String,
	},
	/// Inspect and clean up staged signups
	Pending {
		#[command(subcommand)]
		command: PendingCommand,
	},
}

#[derive(Subcommand, Debug)]
enum GroupsCommand {
	/// Create the configured groups if they do not exist
	Ensure,
}

#[derive(Subcommand, Debug)]
enum PendingCommand {
	/// List staged signups
	List,
	/// Print the payload staged for an email
	Show {
		#[arg(long)]
		email: String,
	},
	/// Drop the entry staged for an email
	Clear {
		#[arg(long)]
		email: String,
	},
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => insider_sync_config::load_config_with_file(path)?,
		None => insider_sync_config::load_config()?,
	};

	// Logs go to stderr; stdout carries command output.
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	let app = commands::App::open(config).await?;

	match args.command {
		Command::Version => unreachable!("handled before startup"),
		Command::Migrate => commands::migrate(&app),
		Command::Groups {
			command: GroupsCommand::Ensure,
		} => commands::ensure_groups(&app).await,
		Command::Sync { username, payload } => commands::sync(&app, &username, &payload).await,
		Command::Authenticate {
			token_params,
			username,
		} => commands::authenticate(&app, &token_params, username.as_deref()).await,
		Command::Signup { username, email } => commands::signup(&app, &username, &email).await,
		Command::Pending { command } => match command {
			PendingCommand::List => commands::pending_list(&app).await,
			PendingCommand::Show { email } => commands::pending_show(&app, &email).await,
			PendingCommand::Clear { email } => commands::pending_clear(&app, &email).await,
		},
	}
}
