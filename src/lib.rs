pub mod builder;
pub mod config;
pub mod error;
pub mod matcher;
pub mod picker;
pub mod playlist_config;
pub mod resolver;
pub mod spotify;

pub use builder::{BuildOptions, BuildReport, PlaylistBuilder};
pub use config::Config;
pub use error::{AppError, Result};
pub use matcher::MatchPolicy;
pub use picker::{ConsolePicker, Disambiguator, NoPrompt};
pub use playlist_config::{ArtistEntry, ConfigError, PlaylistConfig};
pub use resolver::{ArtistResolver, ResolutionReport};
pub use spotify::{Artist, MusicService, SpotifyClient};
