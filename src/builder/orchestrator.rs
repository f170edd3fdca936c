use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{seq::index, Rng};
use tracing::{debug, info, warn};

use crate::builder::report::BuildReport;
use crate::error::{AppError, Result};
use crate::matcher::MatchPolicy;
use crate::picker::Disambiguator;
use crate::playlist_config::PlaylistConfig;
use crate::resolver::ArtistResolver;
use crate::spotify::{CreatedPlaylist, MusicService, PagedResults};

/// Most items the add-items endpoint accepts per request.
pub const UPLOAD_BATCH_SIZE: usize = 100;

const STEPS: usize = 5;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub max_tracks_per_artist: usize,
    /// Take a random sample of each artist's top tracks instead of the first ones.
    pub sample_randomly: bool,
    /// Build the playlist even when some artists could not be resolved.
    pub skip_missing_artists: bool,
    pub match_policy: MatchPolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_tracks_per_artist: 3,
            sample_randomly: false,
            skip_missing_artists: false,
            match_policy: MatchPolicy::default(),
        }
    }
}

pub struct PlaylistBuilder<'a, S: MusicService + ?Sized> {
    service: &'a S,
    options: BuildOptions,
}

impl<'a, S: MusicService + ?Sized> PlaylistBuilder<'a, S> {
    pub fn new(service: &'a S, options: BuildOptions) -> Self {
        Self { service, options }
    }

    /// Run the whole workflow: check, resolve, fetch, create, populate.
    ///
    /// Every step is fatal on failure and nothing is rolled back; a playlist
    /// created before a failed upload stays on the account.
    pub async fn run<D, R>(
        &self,
        config: &mut PlaylistConfig,
        picker: &mut D,
        rng: &mut R,
    ) -> Result<BuildReport>
    where
        D: Disambiguator + ?Sized,
        R: Rng + ?Sized,
    {
        let mut report = BuildReport::new(config.name.clone(), config.artists().len());

        step(1, format!("Checking that '{}' does not exist yet", config.name));
        self.ensure_playlist_absent(&config.name).await?;

        step(2, "Resolving artists");
        let resolver = ArtistResolver::new(self.service, self.options.match_policy);
        let resolution = resolver.resolve_all(config, picker).await?;
        if config.save()? {
            info!("Saved {} newly resolved artist(s)", resolution.resolved.len());
        }
        if !resolution.is_complete() {
            if !self.options.skip_missing_artists {
                return Err(AppError::UnresolvedArtists(resolution.missing));
            }
            warn!(
                "Continuing without {} unresolved artist(s)",
                resolution.missing.len()
            );
        }
        report.skipped_artists = resolution.missing;

        step(3, "Fetching top tracks");
        let (uris, contributing) = self.fetch_top_tracks(config, rng).await?;
        if uris.is_empty() {
            return Err(AppError::NoTracks);
        }
        report.contributing_artists = contributing;

        step(4, format!("Creating playlist '{}'", config.name));
        let playlist = self.create_playlist(config).await?;
        let playlist_url = playlist.url.clone().unwrap_or_default();

        step(5, format!("Adding {} tracks", uris.len()));
        report.batches = self.populate(&playlist.id, &uris).await?;
        report.tracks_added = uris.len();

        config.set_spotify_url(playlist_url.clone());
        config.save()?;
        report.playlist_url = playlist_url;

        Ok(report)
    }

    /// Fail if the current user already has a playlist with this name.
    pub async fn ensure_playlist_absent(&self, name: &str) -> Result<()> {
        let service = self.service;
        let mut pages = PagedResults::new(|offset| service.current_user_playlists(offset));

        while let Some(page) = pages.next_page().await {
            if page
                .items
                .iter()
                .any(|p| p.name.to_lowercase() == name.to_lowercase())
            {
                return Err(AppError::PlaylistExists(name.to_string()));
            }
        }

        // a partial listing cannot prove the name is free
        if pages.is_truncated() {
            return Err(AppError::ListingTruncated(name.to_string()));
        }

        debug!("Checked {} page(s) of playlists", pages.pages_seen());
        Ok(())
    }

    /// Top track URIs of every resolved artist, in artist order, capped per
    /// artist. Also returns how many artists contributed at least one track.
    pub async fn fetch_top_tracks<R>(
        &self,
        config: &PlaylistConfig,
        rng: &mut R,
    ) -> Result<(Vec<String>, usize)>
    where
        R: Rng + ?Sized,
    {
        let resolved: Vec<(&str, String)> = config
            .artists()
            .iter()
            .filter_map(|a| a.artist_id().map(|id| (a.name.as_str(), id)))
            .collect();

        let pb = ProgressBar::new(resolved.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut uris = Vec::new();
        let mut contributing = 0;

        for (name, id) in resolved {
            pb.set_message(name.to_string());
            let tracks = self.service.artist_top_tracks(&id).await?;
            if tracks.is_empty() {
                warn!("No top tracks for {}", name);
            } else {
                contributing += 1;
            }

            let picked = take_tracks(
                tracks,
                self.options.max_tracks_per_artist,
                self.options.sample_randomly,
                rng,
            );
            debug!("{}: {} track(s)", name, picked.len());
            uris.extend(picked);
            pb.inc(1);
        }

        pb.finish_and_clear();
        info!(
            "Collected {} tracks from {} artist(s)",
            uris.len(),
            contributing
        );

        Ok((uris, contributing))
    }

    /// Create the playlist for the current user. The result always carries a url.
    pub async fn create_playlist(&self, config: &PlaylistConfig) -> Result<CreatedPlaylist> {
        let user_id = self.service.current_user_id().await?;
        let playlist = self
            .service
            .create_playlist(&user_id, &config.name, &config.description)
            .await?;

        if playlist.id.is_empty() || playlist.url.is_none() {
            return Err(AppError::PlaylistCreate(format!(
                "no playlist url returned for '{}'",
                config.name
            )));
        }

        Ok(playlist)
    }

    /// Upload `uris` in order, [`UPLOAD_BATCH_SIZE`] at a time. Returns the
    /// number of batches sent.
    pub async fn populate(&self, playlist_id: &str, uris: &[String]) -> Result<usize> {
        let mut batches = 0;
        for chunk in uris.chunks(UPLOAD_BATCH_SIZE) {
            self.service.add_items(playlist_id, chunk).await?;
            batches += 1;
            debug!("Uploaded batch {} ({} tracks)", batches, chunk.len());
        }
        Ok(batches)
    }
}

fn step(number: usize, message: impl AsRef<str>) {
    println!(
        "{} {}",
        format!("[{}/{}]", number, STEPS).cyan().bold(),
        message.as_ref()
    );
}

/// Keep at most `max` tracks: the first ones, or a random selection that
/// preserves the original ranking order.
fn take_tracks<R>(mut tracks: Vec<String>, max: usize, sample: bool, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
{
    if tracks.len() <= max {
        return tracks;
    }
    if !sample {
        tracks.truncate(max);
        return tracks;
    }

    let mut picked = index::sample(rng, tracks.len(), max).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| tracks[i].clone()).collect()
}
