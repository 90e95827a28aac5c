// nowplaying-ascii - Spotify's current track as colored ASCII art in the terminal
// 5 = pause/play, 6 = next, 4 = previous, Ctrl+C to leave

use anyhow::{Context, Result};
use clap::Parser;
use nowplaying_ascii::{
    config::Config,
    spotify::auth::extract_code,
    App, ArtworkConverter, Authorizer, SpotifyClient, TerminalKeys, TerminalManager,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nowplaying-ascii")]
#[command(about = "Mirror Spotify's now playing track in the terminal, album art included")]
struct Args {
    /// Write debug logs to ./logs (nothing is written otherwise)
    #[arg(long)]
    debug: bool,

    /// TOML file with art width and loop timings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging(debug: bool) -> Result<()> {
    // The dashboard owns the screen, so logs only ever go to a file
    if !debug {
        return Ok(());
    }

    let log_dir = PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(&log_dir, "nowplaying-ascii.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let base_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nowplaying_ascii=debug"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(base_filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Keep the writer alive for the whole process
    std::mem::forget(guard);

    Ok(())
}

/// Console OAuth: print the URL, read back where the browser landed.
async fn authorize(auth: &Authorizer, refresh_token: Option<String>) -> Result<()> {
    if let Some(refresh_token) = refresh_token {
        info!("Starting from REFRESH_TOKEN");
        auth.use_refresh_token(refresh_token).await;
        auth.access_token().await.context("REFRESH_TOKEN was rejected")?;
        return Ok(());
    }

    let request = auth.authorize_request()?;
    println!("Open this URL in your browser and approve access:\n");
    println!("  {}\n", request.url);
    print!("Paste the URL you were redirected to: ");
    io::stdout().flush()?;

    let mut redirected = String::new();
    io::stdin().lock().read_line(&mut redirected)?;

    let code = extract_code(&redirected, &request.state)?;
    auth.exchange_code(&code, request.verifier.as_deref()).await?;
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    info!("Loaded config, art width {}", config.ui.art_width);

    let http = reqwest::Client::builder()
        .user_agent(concat!("nowplaying-ascii/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let auth = Authorizer::new(http.clone(), &config.spotify);
    authorize(&auth, config.spotify.refresh_token.clone())
        .await
        .context("Spotify authorization failed")?;

    let client = SpotifyClient::new(http.clone(), auth);
    let converter = ArtworkConverter::new(http, config.ui.art_width);

    println!("Spotify Visualizer Running...");
    println!("If 'Waiting', press Play on Spotify manually once.");

    let terminal = TerminalManager::new()?;
    let mut app = App::new(client, converter, TerminalKeys, terminal, &config.ui);
    app.run().await;

    info!("Dashboard closed");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.debug) {
        eprintln!("Error: could not set up logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    info!("nowplaying-ascii starting up");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
