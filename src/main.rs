use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use toptracks::{
    AppError, BuildOptions, BuildReport, Config, ConsolePicker, MatchPolicy, NoPrompt,
    PlaylistBuilder, PlaylistConfig, SpotifyClient,
};

#[derive(Parser)]
#[command(name = "toptracks")]
#[command(about = "Build a Spotify playlist from the top tracks of a list of artists")]
#[command(version)]
struct Cli {
    /// Playlist config file (INI with [playlist] and [artists] sections)
    config_file: PathBuf,

    /// Build the playlist even if some artists could not be resolved
    #[arg(long = "skip-missing-artists", visible_alias = "sma")]
    skip_missing_artists: bool,

    /// Maximum number of top tracks taken per artist
    #[arg(short = 'n', long = "max-toptracks", default_value_t = 3,
          value_parser = clap::value_parser!(u16).range(1..))]
    max_toptracks: u16,

    /// Take a random sample of each artist's top tracks
    #[arg(long)]
    random: bool,

    /// Only accept search results whose name matches exactly (ignoring case)
    #[arg(long)]
    exact: bool,

    /// Never prompt; artists with several matches stay unresolved
    #[arg(long)]
    no_prompt: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(AppError::UnresolvedArtists(_)) = e.downcast_ref::<AppError>() {
            eprintln!(
                "{}",
                "Fill in their urls in the config file or rerun with --skip-missing-artists."
                    .yellow()
            );
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    println!("{}", "Top Tracks Playlist Builder".cyan().bold());
    println!("{}", "=".repeat(50));

    let mut playlist = PlaylistConfig::load(&cli.config_file)
        .with_context(|| format!("Failed to load {}", cli.config_file.display()))?;

    println!(
        "Playlist: {} ({} artists, {} unresolved)",
        playlist.name.green(),
        playlist.artists().len(),
        playlist.missing_artists().len()
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let missing = config.get_missing_config();
    if !missing.is_empty() {
        println!("{}", "Missing configuration:".red());
        for item in &missing {
            println!("   - {}", item);
        }
        println!(
            "\n{}",
            "Set them in the environment or in a .env file.".yellow()
        );
        std::process::exit(1);
    }

    let client = SpotifyClient::new(&config)
        .await
        .context("Failed to connect to Spotify")?;

    let options = BuildOptions {
        max_tracks_per_artist: usize::from(cli.max_toptracks),
        sample_randomly: cli.random,
        skip_missing_artists: cli.skip_missing_artists,
        match_policy: if cli.exact {
            MatchPolicy::Exact
        } else {
            MatchPolicy::Fuzzy
        },
    };

    let builder = PlaylistBuilder::new(&client, options);
    let mut rng = rand::rng();

    let report = if cli.no_prompt {
        builder.run(&mut playlist, &mut NoPrompt, &mut rng).await?
    } else {
        builder.run(&mut playlist, &mut ConsolePicker, &mut rng).await?
    };

    print_summary(&report);

    Ok(())
}

fn print_summary(report: &BuildReport) {
    println!();
    println!("{}", "=".repeat(50));
    println!("{}", "PLAYLIST CREATED".bold());
    println!("{}", "=".repeat(50));
    println!("Name: {}", report.playlist_name.green());
    println!("Url: {}", report.playlist_url.cyan());
    println!(
        "Tracks added: {} in {} batch(es)",
        report.tracks_added, report.batches
    );
    println!(
        "Artists contributing: {}/{}",
        report.contributing_artists, report.total_artists
    );

    if !report.skipped_artists.is_empty() {
        println!(
            "{} {}",
            "Skipped:".yellow(),
            report.skipped_artists.join(", ")
        );
    }
}
