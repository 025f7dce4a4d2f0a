// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Photofeed command-line client
//!
//! Drives the session core headlessly: log in with an authorization code,
//! page through the feed, like photos and log out.

use anyhow::Context;
use clap::{Parser, Subcommand};
use photofeed::{
    config::Config,
    error::AppError,
    models::Profile,
    services::{EncryptedFileStore, NoSiteData, SessionObserver, SessionState},
    App,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "photofeed", version, about = "Photo feed client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Resume the stored session and show the profile
    Start,
    /// Print the URL where the user grants access
    AuthUrl,
    /// Exchange an authorization code (or the full redirect URL) for a token
    Login { code: String },
    /// Print photos from the feed
    Feed {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Like a photo
    Like { id: String },
    /// Remove a like
    Unlike { id: String },
    /// Forget the stored token and all cached data
    Logout,
}

/// Prints session events to stdout.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn show_login(&self) {
        println!("Not logged in. Open the URL from `photofeed auth-url`, then run `photofeed login <code>`.");
    }

    fn show_login_error(&self, error: &AppError) {
        println!("Login failed: {}", error);
    }

    fn ready(&self, profile: Option<&Profile>) {
        match profile {
            Some(profile) => {
                println!("{} ({})", profile.display_name, profile.login_handle);
                if let Some(bio) = &profile.bio {
                    println!("{}", bio);
                }
            }
            None => println!("Logged in (profile unavailable)"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let passphrase = config
        .token_store_key
        .clone()
        .context("TOKEN_STORE_KEY must be set to encrypt the stored token")?;
    let tokens = Arc::new(EncryptedFileStore::new(config.token_store_path.clone(), &passphrase)?);
    tracing::info!(path = %tokens.path().display(), "Token store opened");

    let app = App::new(config, tokens, Arc::new(NoSiteData), Arc::new(ConsoleObserver))?;

    match cli.command.unwrap_or(Command::Start) {
        Command::Start => {
            app.session.start().await;
            print_avatar(&app).await;
        }
        Command::AuthUrl => println!("{}", app.client.authorize_url()),
        Command::Login { code } => {
            let code = app.client.extract_code(&code).unwrap_or(code);
            app.session.complete_login(&code).await?;
            print_avatar(&app).await;
        }
        Command::Feed { pages } => {
            if app.session.start().await != SessionState::Ready {
                return Ok(());
            }
            for _ in 0..pages {
                app.feed.fetch_next_page().await?;
            }
            for photo in app.feed.photos() {
                println!(
                    "{}  {}x{}  {}  {}",
                    photo.id,
                    photo.width,
                    photo.height,
                    if photo.is_liked { "♥" } else { " " },
                    photo.description.as_deref().unwrap_or("")
                );
            }
        }
        Command::Like { id } => {
            app.feed.toggle_like(&id, true).await?;
            println!("Liked {}", id);
        }
        Command::Unlike { id } => {
            app.feed.toggle_like(&id, false).await?;
            println!("Unliked {}", id);
        }
        Command::Logout => {
            app.session.logout()?;
            println!("Logged out");
        }
    }

    Ok(())
}

async fn print_avatar(app: &App) {
    app.session.avatar_settled().await;
    if let Some(url) = app.avatars.avatar_url() {
        println!("Avatar: {}", url);
    }
}

/// Initialize logging on stderr: JSON when `LOG_FORMAT=json`, plain otherwise.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("photofeed=debug".parse().expect("valid directive"))
        .add_directive("info".parse().expect("valid directive"));

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json") {
        let format = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true);
        tracing_subscriber::registry().with(filter).with(format).init();
    } else {
        let format = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        tracing_subscriber::registry().with(filter).with(format).init();
    }
}
