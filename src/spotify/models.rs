use serde::{Deserialize, Serialize};
use url::Url;

/// One artist returned by a Spotify search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub external_url: String,
    pub followers: u32,
}

impl Artist {
    /// Label shown in the disambiguation picker.
    pub fn label(&self) -> String {
        format!("{}: {} ({})", self.name, self.external_url, self.followers)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedPlaylist {
    pub id: String,
    pub url: Option<String>,
}

/// One page of an offset-paged query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: u32,
    pub limit: u32,
    /// Link to the following page; `None` on the last page.
    pub next: Option<String>,
}

/// Search responses wrap the artist page in an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistSearch {
    pub artists: Page<Artist>,
}

/// Anything that can report where the following page starts.
pub trait Paginated {
    fn next_offset(&self) -> Option<u32>;
}

impl<T> Paginated for Page<T> {
    fn next_offset(&self) -> Option<u32> {
        // an empty page with a next link would loop forever
        if self.next.is_none() || self.items.is_empty() {
            return None;
        }
        Some(self.offset + self.items.len() as u32)
    }
}

impl Paginated for ArtistSearch {
    fn next_offset(&self) -> Option<u32> {
        self.artists.next_offset()
    }
}

/// Extract the artist id from a Spotify artist link.
/// Supports formats:
/// - https://open.spotify.com/artist/0OdUWJ0sBjDrqHygGUXeCF
/// - https://open.spotify.com/intl-de/artist/0OdUWJ0sBjDrqHygGUXeCF?si=...
/// - spotify:artist:0OdUWJ0sBjDrqHygGUXeCF
pub fn artist_id_from_url(url_str: &str) -> Option<String> {
    let url_str = url_str.trim();

    if let Some(id) = url_str.strip_prefix("spotify:artist:") {
        return is_base62_id(id).then(|| id.to_string());
    }

    let url = Url::parse(url_str).ok()?;
    if url.host_str() != Some("open.spotify.com") {
        return None;
    }

    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let position = segments.iter().position(|s| *s == "artist")?;
    let id = segments.get(position + 1)?;

    is_base62_id(id).then(|| id.to_string())
}

pub fn artist_url(id: &str) -> String {
    format!("https://open.spotify.com/artist/{}", id)
}

fn is_base62_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
impl Artist {
    pub fn mock(id: &str, name: &str, followers: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            external_url: artist_url(id),
            followers,
        }
    }
}

#[cfg(test)]
impl<T> Page<T> {
    pub fn mock(items: Vec<T>, offset: u32, has_next: bool) -> Self {
        let limit = items.len() as u32;
        Self {
            items,
            offset,
            limit,
            next: has_next.then(|| format!("https://api.spotify.com/v1/next?offset={}", offset + limit)),
        }
    }
}
