use colored::Colorize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::matcher::{is_candidate, MatchPolicy};
use crate::picker::Disambiguator;
use crate::playlist_config::PlaylistConfig;
use crate::spotify::{Artist, MusicService, PagedResults};

/// Search result pages inspected per artist name.
const MAX_SEARCH_PAGES: usize = 4;

/// Outcome of resolving every artist of a playlist config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionReport {
    /// Artists newly resolved in this run.
    pub resolved: Vec<String>,
    /// Artists still lacking a Spotify url.
    pub missing: Vec<String>,
    pub changed: bool,
}

impl ResolutionReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub struct ArtistResolver<'a, S: MusicService + ?Sized> {
    service: &'a S,
    policy: MatchPolicy,
}

impl<'a, S: MusicService + ?Sized> ArtistResolver<'a, S> {
    pub fn new(service: &'a S, policy: MatchPolicy) -> Self {
        Self { service, policy }
    }

    /// Search for `name` and keep the artists that plausibly match it.
    pub async fn find_candidates(&self, name: &str) -> Vec<Artist> {
        let service = self.service;
        let mut pages = PagedResults::new(|offset| service.search_artists(name, offset))
            .with_max_pages(MAX_SEARCH_PAGES);

        let mut candidates = Vec::new();
        while let Some(page) = pages.next_page().await {
            candidates.extend(
                page.artists
                    .items
                    .into_iter()
                    .filter(|artist| is_candidate(name, artist, self.policy)),
            );
        }

        if pages.is_truncated() {
            warn!(
                "Search for '{}' was cut short, candidates may be incomplete",
                name
            );
        }

        debug!("'{}': {} candidate(s)", name, candidates.len());
        candidates
    }

    /// Pick the artist for `name`: none, the only candidate, or whatever the
    /// disambiguator chooses among several.
    pub async fn resolve_one<D>(&self, name: &str, picker: &mut D) -> Result<Option<Artist>>
    where
        D: Disambiguator + ?Sized,
    {
        let mut candidates = self.find_candidates(name).await;

        match candidates.len() {
            0 => Ok(None),
            1 => Ok(candidates.pop()),
            _ => {
                let choice = picker.choose(name, &candidates)?;
                Ok(choice.and_then(|index| candidates.into_iter().nth(index)))
            }
        }
    }

    /// Resolve every artist lacking a well-formed url and store the results in
    /// `config`. Unresolved artists are reported, not treated as errors.
    pub async fn resolve_all<D>(
        &self,
        config: &mut PlaylistConfig,
        picker: &mut D,
    ) -> Result<ResolutionReport>
    where
        D: Disambiguator + ?Sized,
    {
        let mut report = ResolutionReport::default();

        let pending: Vec<String> = config
            .missing_artists()
            .into_iter()
            .map(str::to_string)
            .collect();

        info!(
            "{} of {} artists need resolving",
            pending.len(),
            config.artists().len()
        );

        for name in pending {
            match self.resolve_one(&name, picker).await? {
                Some(artist) => {
                    println!(
                        "  {} {} -> {}",
                        "found".green(),
                        name,
                        artist.external_url
                    );
                    report.changed |= config.set_artist_url(&name, Some(artist.external_url));
                    report.resolved.push(name);
                }
                None => {
                    println!("  {} {}", "missing".red(), name);
                    report.missing.push(name);
                }
            }
        }

        Ok(report)
    }
}
