pub mod client;
pub mod models;
pub mod pages;

#[cfg(test)]
pub mod fake;

pub use client::{MusicService, SpotifyClient};
pub use models::{Artist, ArtistSearch, CreatedPlaylist, Page, Paginated, PlaylistSummary};
pub use pages::{Collected, PagedResults};
