//! # charlie - terminal front end for the Charlie board
//!
//! Drives the bot check, session, and feed stores against a local storage
//! file. Every invocation restores the session and loads the feed first.

use anyhow::{Context, Result, bail};
use charlie_board::{AppConfig, AppState, encode_image};
use charlie_common::constants::DEFAULT_CONFIG_PATH;
use charlie_common::{LoginRequest, Post, PostSubmission};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Charlie - a simple school board
#[derive(Parser, Debug)]
#[command(name = "charlie")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Local storage file (overrides config)
    #[arg(long, env = "CHARLIE_STORAGE")]
    storage: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in (or sign up) after passing the bot check
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        /// Create an account instead of signing in
        #[arg(long)]
        sign_up: bool,

        /// Required with --sign-up
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Add a post to the feed
    Post {
        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Image file to attach
        #[arg(short, long)]
        image: Option<std::path::PathBuf>,
    },

    /// Print the feed, newest first
    Feed,

    /// Delete every post
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.json_logs)?;

    let mut config = AppConfig::load(&args.config)?;
    if let Some(ref storage) = args.storage {
        config.storage_path = storage.clone();
    }
    info!(storage = %config.storage_path, "Configuration loaded from {}", args.config);

    let state = AppState::new(config).context("Failed to open local storage")?;

    match args.command {
        Command::Login {
            username,
            password,
            sign_up,
            confirm_password,
        } => {
            let request = LoginRequest {
                username,
                password,
                confirm_password,
                is_sign_up: sign_up,
            };
            login(&state, &request).await?;
        }
        Command::Logout => {
            state.logout();
            println!("Signed out.");
        }
        Command::Whoami => match state.session.current().username() {
            Some(username) => println!("Welcome, {}", username),
            None => println!("Not signed in."),
        },
        Command::Post {
            title,
            description,
            image,
        } => {
            let image_data = match image {
                Some(path) => {
                    let bytes = tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    Some(encode_image(&bytes))
                }
                None => None,
            };

            println!("Uploading...");
            let post = state
                .post(PostSubmission {
                    title,
                    description,
                    image_data,
                })
                .await?;
            println!("Posted #{}", post.id);
        }
        Command::Feed => print_feed(&state.feed.list()),
        Command::Clear => {
            state.feed.clear()?;
            println!("Feed cleared.");
        }
    }

    Ok(())
}

/// Run the bot check on stdin, then submit the credentials
async fn login(state: &AppState, request: &LoginRequest) -> Result<()> {
    // Catch blank fields and mismatched passwords before asking the question
    request.validate(true)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !state.captcha.passed() {
        println!("Bot Check: {}", state.captcha.challenge().prompt());
        let Some(line) = lines.next_line().await? else {
            bail!("input closed before the bot check was passed");
        };
        if !state.captcha.submit_input(&line) {
            println!("Incorrect answer. Try again!");
        }
    }
    println!("Bot check passed");

    println!("Loading...");
    let session = state.login(request).await?;
    if let Some(username) = session.username() {
        println!("Welcome, {}", username);
    }

    Ok(())
}

fn print_feed(posts: &[Post]) {
    if posts.is_empty() {
        println!("No posts yet. Be the first to share!");
        return;
    }

    for post in posts {
        println!("#{} {}", post.id, post.title);
        if !post.description.is_empty() {
            println!("    {}", post.description);
        }
        if let Some(ref image) = post.image {
            let mime = image
                .strip_prefix("data:")
                .and_then(|rest| rest.split(';').next())
                .unwrap_or("unknown");
            println!("    [image: {}, {} bytes encoded]", mime, image.len());
        }
        println!("    by {} at {}", post.uploaded_by, post.uploaded_at);
    }
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
