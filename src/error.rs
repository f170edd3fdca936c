use thiserror::Error;

use crate::playlist_config::ConfigError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid playlist config: {0}")]
    PlaylistConfig(#[from] ConfigError),

    #[error("Spotify API error: {0}")]
    SpotifyApi(#[from] rspotify::ClientError),

    #[error("Invalid Spotify id: {0}")]
    InvalidId(#[from] rspotify::model::IdError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Playlist '{0}' already exists")]
    PlaylistExists(String),

    #[error("Playlist listing was cut short; cannot confirm '{0}' does not exist")]
    ListingTruncated(String),

    #[error("Unresolved artists: {}", .0.join(", "))]
    UnresolvedArtists(Vec<String>),

    #[error("No tracks found for any artist")]
    NoTracks,

    #[error("Failed to create playlist: {0}")]
    PlaylistCreate(String),
}

impl From<dialoguer::Error> for AppError {
    fn from(err: dialoguer::Error) -> Self {
        AppError::Prompt(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
