//! In-memory [`MusicService`] for workflow tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::spotify::client::MusicService;
use crate::spotify::models::{artist_url, Artist, ArtistSearch, CreatedPlaylist, Page, PlaylistSummary};

#[derive(Default)]
pub struct FakeService {
    pub artists: Vec<Artist>,
    pub playlists: Vec<PlaylistSummary>,
    pub top_tracks: HashMap<String, Vec<String>>,
    pub playlist_url: Option<String>,
    pub fail_listing: bool,
    pub fail_upload_batch: Option<usize>,
    pub searches: Mutex<Vec<String>>,
    pub created: Mutex<Vec<(String, String, String)>>,
    pub uploads: Mutex<Vec<Vec<String>>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            playlist_url: Some("https://open.spotify.com/playlist/new".to_string()),
            ..Default::default()
        }
    }

    pub fn with_artist(mut self, id: &str, name: &str, followers: u32) -> Self {
        self.artists.push(Artist {
            id: id.to_string(),
            name: name.to_string(),
            external_url: artist_url(id),
            followers,
        });
        self
    }

    pub fn with_top_tracks(mut self, artist_id: &str, count: usize) -> Self {
        let uris = (0..count)
            .map(|i| format!("spotify:track:{}{}", artist_id, i))
            .collect();
        self.top_tracks.insert(artist_id.to_string(), uris);
        self
    }

    pub fn with_playlist(mut self, name: &str) -> Self {
        self.playlists.push(PlaylistSummary {
            id: format!("pl{}", self.playlists.len()),
            name: name.to_string(),
        });
        self
    }

    pub fn uploads(&self) -> Vec<Vec<String>> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(String, String, String)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl MusicService for FakeService {
    async fn search_artists(&self, query: &str, offset: u32) -> Result<ArtistSearch> {
        self.searches.lock().unwrap().push(query.to_string());
        let items = self
            .artists
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&query.to_lowercase()))
            .cloned()
            .collect();
        Ok(ArtistSearch {
            artists: Page {
                items,
                offset,
                limit: 50,
                next: None,
            },
        })
    }

    async fn current_user_playlists(&self, offset: u32) -> Result<Page<PlaylistSummary>> {
        if self.fail_listing {
            return Err(AppError::Config("listing unavailable".into()));
        }
        // one playlist per page to exercise pagination
        let index = offset as usize;
        let items: Vec<_> = self.playlists.get(index).cloned().into_iter().collect();
        let next = (index + 1 < self.playlists.len()).then(|| format!("offset={}", index + 1));
        Ok(Page {
            items,
            offset,
            limit: 1,
            next,
        })
    }

    async fn artist_top_tracks(&self, artist_id: &str) -> Result<Vec<String>> {
        Ok(self.top_tracks.get(artist_id).cloned().unwrap_or_default())
    }

    async fn current_user_id(&self) -> Result<String> {
        Ok("tester".to_string())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedPlaylist> {
        self.created.lock().unwrap().push((
            user_id.to_string(),
            name.to_string(),
            description.to_string(),
        ));
        Ok(CreatedPlaylist {
            id: "new".to_string(),
            url: self.playlist_url.clone(),
        })
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        assert_eq!(playlist_id, "new");
        let mut uploads = self.uploads.lock().unwrap();
        if self.fail_upload_batch == Some(uploads.len()) {
            return Err(AppError::Config("upload rejected".into()));
        }
        uploads.push(uris.to_vec());
        Ok(())
    }
}
