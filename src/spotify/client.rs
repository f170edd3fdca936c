use async_trait::async_trait;
use rspotify::{
    model::{
        ArtistId, FullArtist, Market, PlayableId, PlaylistId, SearchResult, SearchType,
        SimplifiedPlaylist, TrackId, UserId,
    },
    prelude::*,
    scopes, AuthCodeSpotify, Config as RspotifyConfig, Credentials, OAuth,
};
use std::io::{self, Write};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::spotify::models::{artist_url, Artist, ArtistSearch, CreatedPlaylist, Page, PlaylistSummary};

/// Page size used for searches and playlist listings.
pub const PAGE_LIMIT: u32 = 50;

/// The slice of the Spotify Web API the playlist workflow needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Search artists by name, returning the page starting at `offset`.
    async fn search_artists(&self, query: &str, offset: u32) -> Result<ArtistSearch>;

    async fn current_user_playlists(&self, offset: u32) -> Result<Page<PlaylistSummary>>;

    /// Track URIs of an artist's top tracks, most popular first.
    async fn artist_top_tracks(&self, artist_id: &str) -> Result<Vec<String>>;

    async fn current_user_id(&self) -> Result<String>;

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedPlaylist>;

    /// Append up to 100 track URIs to a playlist.
    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()>;
}

pub struct SpotifyClient {
    client: AuthCodeSpotify,
    user_id: String,
}

impl SpotifyClient {
    pub async fn new(config: &Config) -> Result<Self> {
        let creds = Credentials::new(&config.spotify_client_id, &config.spotify_client_secret);

        let oauth = OAuth {
            redirect_uri: config.spotify_redirect_uri.clone(),
            scopes: scopes!(
                "playlist-read-private",
                "playlist-read-collaborative",
                "playlist-modify-private",
                "playlist-modify-public"
            ),
            ..Default::default()
        };

        let client = AuthCodeSpotify::with_config(
            creds,
            oauth,
            RspotifyConfig {
                token_cached: true,
                cache_path: config.token_cache_path.clone(),
                ..Default::default()
            },
        );

        if !Self::load_cached_token(&client).await? {
            Self::authorize(&client).await?;
        }

        let user = client.current_user().await?;
        let user_id = user.id.id().to_string();
        let display_name = user.display_name.unwrap_or_else(|| user_id.clone());

        info!("Successfully authenticated as Spotify user: {}", display_name);

        Ok(Self { client, user_id })
    }

    async fn load_cached_token(client: &AuthCodeSpotify) -> Result<bool> {
        let token = match client.read_token_cache(true).await {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(false),
            Err(e) => {
                debug!("Ignoring unreadable token cache: {}", e);
                return Ok(false);
            }
        };

        let expired = token.is_expired();
        *client
            .get_token()
            .lock()
            .await
            .map_err(|_| AppError::Auth("Token lock poisoned".into()))? = Some(token);

        if expired {
            debug!("Cached token expired, refreshing");
            if let Err(e) = client.refresh_token().await {
                debug!("Token refresh failed, re-authorizing: {}", e);
                return Ok(false);
            }
        }

        Ok(true)
    }

    async fn authorize(client: &AuthCodeSpotify) -> Result<()> {
        let auth_url = client.get_authorize_url(false)?;
        println!("\nOpen this URL in your browser to authorize Spotify:");
        println!("{}\n", auth_url);

        print!("Enter the URL you were redirected to: ");
        io::stdout().flush()?;

        let mut redirect_url = String::new();
        io::stdin().read_line(&mut redirect_url)?;

        let code = client
            .parse_response_code(redirect_url.trim())
            .ok_or_else(|| AppError::Auth("Failed to parse authorization code".into()))?;

        client.request_token(&code).await?;

        Ok(())
    }
}

impl From<FullArtist> for Artist {
    fn from(artist: FullArtist) -> Self {
        let id = artist.id.id().to_string();
        let external_url = artist
            .external_urls
            .get("spotify")
            .cloned()
            .unwrap_or_else(|| artist_url(&id));

        Artist {
            id,
            name: artist.name,
            external_url,
            followers: artist.followers.total,
        }
    }
}

impl From<SimplifiedPlaylist> for PlaylistSummary {
    fn from(playlist: SimplifiedPlaylist) -> Self {
        PlaylistSummary {
            id: playlist.id.id().to_string(),
            name: playlist.name,
        }
    }
}

/// Restrict a search to the artist name field.
fn artist_query(name: &str) -> String {
    format!("name:{}", name.trim())
}

fn convert_page<S, T: From<S>>(page: rspotify::model::Page<S>) -> Page<T> {
    Page {
        items: page.items.into_iter().map(T::from).collect(),
        offset: page.offset,
        limit: page.limit,
        next: page.next,
    }
}

#[async_trait]
impl MusicService for SpotifyClient {
    async fn search_artists(&self, query: &str, offset: u32) -> Result<ArtistSearch> {
        let q = artist_query(query);
        debug!("Searching artists with '{}' at offset {}", q, offset);

        let result = self
            .client
            .search(
                &q,
                SearchType::Artist,
                None,
                None,
                Some(PAGE_LIMIT),
                Some(offset),
            )
            .await?;

        match result {
            SearchResult::Artists(page) => Ok(ArtistSearch {
                artists: convert_page(page),
            }),
            _ => Err(AppError::Config(format!(
                "Artist search for '{}' returned a non-artist result",
                query
            ))),
        }
    }

    async fn current_user_playlists(&self, offset: u32) -> Result<Page<PlaylistSummary>> {
        let page = self
            .client
            .current_user_playlists_manual(Some(PAGE_LIMIT), Some(offset))
            .await?;

        Ok(convert_page(page))
    }

    async fn artist_top_tracks(&self, artist_id: &str) -> Result<Vec<String>> {
        let id = ArtistId::from_id(artist_id)?;
        let tracks = self
            .client
            .artist_top_tracks(id, Some(Market::FromToken))
            .await?;

        // local tracks carry no id and cannot be added to a playlist
        Ok(tracks
            .into_iter()
            .filter_map(|track| track.id.map(|id| id.uri()))
            .collect())
    }

    async fn current_user_id(&self) -> Result<String> {
        Ok(self.user_id.clone())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedPlaylist> {
        let user = UserId::from_id(user_id)?;
        let playlist = self
            .client
            .user_playlist_create(user, name, Some(false), None, Some(description))
            .await?;

        info!("Created playlist {} ({})", playlist.name, playlist.id.id());

        Ok(CreatedPlaylist {
            id: playlist.id.id().to_string(),
            url: playlist.external_urls.get("spotify").cloned(),
        })
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let playlist = PlaylistId::from_id(playlist_id)?;
        let items = uris
            .iter()
            .map(|uri| TrackId::from_uri(uri).map(PlayableId::Track))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.client
            .playlist_add_items(playlist, items, None)
            .await?;

        Ok(())
    }
}
