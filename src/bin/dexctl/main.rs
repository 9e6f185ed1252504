// ABOUTME: dexctl - command line companion for a Dex identity provider
// ABOUTME: Wires the signin, client, password, and connector subcommands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors
//!
//! Usage:
//! ```bash
//! # Sign in through a browser and capture the token response
//! dexctl signin
//!
//! # Sign in against a remote issuer, resolving userinfo instead of
//! # verifying the ID token
//! dexctl signin --issuer https://sso.example.com/dex --userinfo
//!
//! # Register an OAuth2 client with a generated id and secret
//! dexctl client create --name "My App"
//!
//! # Inspect the password store
//! dexctl password list
//! dexctl password verify --password hunter2 admin@example.com
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dexctl::utils::{RANDOM_STRING_SENTINEL, RANDOM_UUID_SENTINEL};

#[derive(Parser)]
#[command(
    name = "dexctl",
    about = "A command line interface for Dex",
    long_about = "Command line companion for a Dex identity provider: browser sign-in, OAuth2 client registration, and password store inspection."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Perform a sign-in using a browser
    Signin {
        /// OIDC issuer URL (env `DEXCTL_ISSUER`)
        #[arg(long)]
        issuer: Option<String>,

        /// OAuth2 client id (env `DEXCTL_CLIENT_ID`)
        #[arg(long)]
        client_id: Option<String>,

        /// OAuth2 client secret; empty for public clients (env `DEXCTL_CLIENT_SECRET`)
        #[arg(long)]
        client_secret: Option<String>,

        /// Redirect URI; the callback server binds to its host:port (env `DEXCTL_REDIRECT_URI`)
        #[arg(long)]
        redirect_uri: Option<String>,

        /// Comma-separated scopes to request (default `openid,profile,email`)
        #[arg(long)]
        scopes: Option<String>,

        /// Resolve userinfo instead of verifying the ID token
        #[arg(long)]
        userinfo: bool,

        /// Print the login URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Connector-related commands
    Connector {
        #[command(subcommand)]
        action: ConnectorCommand,
    },

    /// Client-related commands
    Client {
        #[command(subcommand)]
        action: ClientCommand,
    },

    /// Password-related commands
    Password {
        #[command(subcommand)]
        action: PasswordCommand,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum ConnectorCommand {
    /// Command not available
    List,
    /// Command not available
    Create,
    /// Command not available
    Delete,
    /// Command not available
    Update,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum ClientCommand {
    /// Command not available
    List,

    /// Register an OAuth2 client with the provider
    Create {
        /// Administration API base URL (env `DEXCTL_API_URL`)
        #[arg(long)]
        api_url: Option<String>,

        /// Client id
        #[arg(long, short = 'i', default_value = RANDOM_UUID_SENTINEL)]
        id: String,

        /// Human-readable client name
        #[arg(long, short = 'n')]
        name: String,

        /// Client secret
        #[arg(long, short = 's', default_value = RANDOM_STRING_SENTINEL)]
        secret: String,

        /// Redirect URI accepted for this client (repeatable)
        #[arg(long, short = 'r', default_value = "http://127.0.0.1:5555/callback")]
        redirect_uri: Vec<String>,

        /// Logo shown on consent screens
        #[arg(long, short = 'l')]
        logo_url: Option<String>,

        /// Client id allowed to mint tokens audienced to this one (repeatable)
        #[arg(long, short = 't')]
        trusted_peer: Vec<String>,

        /// Register as a public client (no secret)
        #[arg(long, short = 'p')]
        public: bool,
    },

    /// Command not available
    Delete,
    /// Command not available
    Update,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum PasswordCommand {
    /// List password database entries
    List {
        /// Administration API base URL (env `DEXCTL_API_URL`)
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Verify an email/password pair
    Verify {
        /// Administration API base URL (env `DEXCTL_API_URL`)
        #[arg(long)]
        api_url: Option<String>,

        /// Password to check
        #[arg(long, short = 'p')]
        password: String,

        /// Email the password belongs to
        email: String,
    },

    /// Command not available
    Create,
    /// Command not available
    Delete,
    /// Command not available
    Update,
}

#[tokio::main]
async fn main() -> Result<()> {
    dexctl::logging::init_from_env()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Signin {
            issuer,
            client_id,
            client_secret,
            redirect_uri,
            scopes,
            userinfo,
            no_browser,
        } => {
            commands::signin::run(
                issuer,
                client_id,
                client_secret,
                redirect_uri,
                scopes,
                userinfo,
                no_browser,
            )
            .await
        }
        Command::Connector { .. } => commands::not_available(),
        Command::Client { action } => match action {
            ClientCommand::Create {
                api_url,
                id,
                name,
                secret,
                redirect_uri,
                logo_url,
                trusted_peer,
                public,
            } => {
                commands::client::create(
                    api_url,
                    &id,
                    name,
                    &secret,
                    redirect_uri,
                    logo_url,
                    trusted_peer,
                    public,
                )
                .await
            }
            _ => commands::not_available(),
        },
        Command::Password { action } => match action {
            PasswordCommand::List { api_url } => commands::password::list(api_url).await,
            PasswordCommand::Verify {
                api_url,
                password,
                email,
            } => commands::password::verify(api_url, &password, &email).await,
            _ => commands::not_available(),
        },
    }
}
