//! The playlist file: one playlist's metadata plus the artists that feed it.
//!
//! ```ini
//! [playlist]
//! name = Road Trip
//! desc = Songs for the car
//! spotify_url = https://open.spotify.com/playlist/...
//!
//! [artists]
//! Artist A =
//! Artist B = https://open.spotify.com/artist/123
//! ```
//!
//! A blank or absent artist value means the artist still has to be resolved,
//! so a bare `Artist A` line is accepted too. Keys and values are written with
//! `:`, `=`, `;` and `#` escaped so artist names containing them survive a reload.

use std::path::{Path, PathBuf};

use ini::{EscapePolicy, Ini, WriteOption};
use thiserror::Error;
use tracing::{debug, warn};

use crate::spotify::models::artist_id_from_url;

pub const PLAYLIST_SECTION: &str = "playlist";
pub const ARTISTS_SECTION: &str = "artists";

const NAME_KEY: &str = "name";
const DESC_KEY: &str = "desc";
const URL_KEY: &str = "spotify_url";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read or write config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config file: {0}")]
    Parse(String),

    #[error("missing [{0}] section")]
    MissingSection(&'static str),

    #[error("missing '{key}' in [{section}]")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },

    #[error("[artists] lists no artists")]
    NoArtists,

    #[error("config has no file to save to")]
    NoPath,

    #[error("artist name '{0}' cannot be stored in the config file")]
    UnwritableArtist(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistEntry {
    pub name: String,
    pub url: Option<String>,
}

impl ArtistEntry {
    /// Spotify artist id, if the stored url is a well-formed artist link.
    pub fn artist_id(&self) -> Option<String> {
        self.url.as_deref().and_then(artist_id_from_url)
    }

    pub fn is_resolved(&self) -> bool {
        self.artist_id().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct PlaylistConfig {
    pub name: String,
    pub description: String,
    spotify_url: Option<String>,
    artists: Vec<ArtistEntry>,
    /// Unrecognized keys of the playlist section, written back untouched.
    extra: Vec<(String, String)>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl PlaylistConfig {
    pub fn new(name: impl Into<String>, description: impl Into<String>, artists: Vec<ArtistEntry>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            spotify_url: None,
            artists,
            extra: Vec::new(),
            path: None,
            dirty: true,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let mut config = Self::parse(&contents)?;
        config.path = Some(path.to_path_buf());

        debug!(
            "Loaded playlist '{}' with {} artists from {}",
            config.name,
            config.artists.len(),
            path.display()
        );

        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let contents = normalize_bare_artists(contents);
        let ini = Ini::load_from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let playlist = ini
            .section(Some(PLAYLIST_SECTION))
            .ok_or(ConfigError::MissingSection(PLAYLIST_SECTION))?;

        let required = |key: &'static str| {
            playlist
                .get(key)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or(ConfigError::MissingKey {
                    section: PLAYLIST_SECTION,
                    key,
                })
        };

        let name = required(NAME_KEY)?;
        let description = required(DESC_KEY)?;
        let spotify_url = playlist.get(URL_KEY).and_then(non_blank);

        let extra = playlist
            .iter()
            .filter(|(key, _)| ![NAME_KEY, DESC_KEY, URL_KEY].contains(key))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        let section = ini
            .section(Some(ARTISTS_SECTION))
            .ok_or(ConfigError::MissingSection(ARTISTS_SECTION))?;

        let mut artists: Vec<ArtistEntry> = Vec::new();
        for (name, value) in section.iter() {
            let name = name.trim();
            if artists.iter().any(|a| a.name == name) {
                warn!("Artist '{}' listed twice, keeping the first entry", name);
                continue;
            }
            artists.push(ArtistEntry {
                name: name.to_string(),
                url: non_blank(value),
            });
        }

        if artists.is_empty() {
            return Err(ConfigError::NoArtists);
        }

        Ok(Self {
            name,
            description,
            spotify_url,
            artists,
            extra,
            path: None,
            dirty: false,
        })
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        let mut set = |section: &str, key: &str, value: &str| {
            ini.set_to(Some(section), key.to_string(), value.to_string());
        };

        set(PLAYLIST_SECTION, NAME_KEY, &self.name);
        set(PLAYLIST_SECTION, DESC_KEY, &self.description);
        if let Some(url) = &self.spotify_url {
            set(PLAYLIST_SECTION, URL_KEY, url);
        }
        for (key, value) in &self.extra {
            set(PLAYLIST_SECTION, key, value);
        }

        for artist in &self.artists {
            set(ARTISTS_SECTION, &artist.name, artist.url.as_deref().unwrap_or(""));
        }

        ini
    }

    fn checked_ini(&self) -> Result<Ini, ConfigError> {
        // a key starting with '[' reads back as a section header
        if let Some(artist) = self
            .artists
            .iter()
            .find(|a| a.name.trim().is_empty() || a.name.trim_start().starts_with('['))
        {
            return Err(ConfigError::UnwritableArtist(artist.name.clone()));
        }
        Ok(self.to_ini())
    }

    /// Render the config in its on-disk format.
    pub fn to_ini_string(&self) -> Result<String, ConfigError> {
        let mut buf = Vec::new();
        self.checked_ini()?.write_to_opt(&mut buf, write_option())?;
        String::from_utf8(buf).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Write the config back to the file it was loaded from.
    /// Returns `false` without touching the file when nothing changed.
    pub fn save(&mut self) -> Result<bool, ConfigError> {
        if !self.dirty {
            return Ok(false);
        }
        let path = self.path.clone().ok_or(ConfigError::NoPath)?;
        self.write(&path)?;
        Ok(true)
    }

    /// Write the config to `path` and remember it for later saves.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref().to_path_buf();
        self.write(&path)?;
        self.path = Some(path);
        Ok(())
    }

    fn write(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.checked_ini()?.write_to_file_opt(path, write_option())?;
        self.dirty = false;
        debug!("Saved playlist config to {}", path.display());
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn spotify_url(&self) -> Option<&str> {
        self.spotify_url.as_deref()
    }

    pub fn set_spotify_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        if self.spotify_url.as_deref() != Some(url.as_str()) {
            self.spotify_url = Some(url);
            self.dirty = true;
        }
    }

    pub fn artists(&self) -> &[ArtistEntry] {
        &self.artists
    }

    pub fn artist(&self, name: &str) -> Option<&ArtistEntry> {
        self.artists.iter().find(|a| a.name == name)
    }

    /// Store the url for a listed artist. Returns whether anything changed;
    /// unknown artists are ignored.
    pub fn set_artist_url(&mut self, name: &str, url: Option<String>) -> bool {
        let Some(entry) = self.artists.iter_mut().find(|a| a.name == name) else {
            warn!("Ignoring url for unlisted artist '{}'", name);
            return false;
        };

        if entry.url == url {
            return false;
        }

        entry.url = url;
        self.dirty = true;
        true
    }

    /// Artists without a well-formed Spotify artist url, in file order.
    pub fn missing_artists(&self) -> Vec<&str> {
        self.artists
            .iter()
            .filter(|a| !a.is_resolved())
            .map(|a| a.name.as_str())
            .collect()
    }
}

fn write_option() -> WriteOption {
    WriteOption {
        escape_policy: EscapePolicy::Reserved,
        ..Default::default()
    }
}

/// Turn bare `Artist A` lines of the artists section into `Artist A =`.
/// Without a separator the INI parser would run the key into the next line.
fn normalize_bare_artists(contents: &str) -> String {
    let mut in_artists = false;
    let mut out = String::with_capacity(contents.len());

    for line in contents.lines() {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[') {
            in_artists = header.trim_end_matches(']').trim() == ARTISTS_SECTION;
            out.push_str(line);
        } else if in_artists
            && !trimmed.is_empty()
            && !trimmed.starts_with([';', '#'])
            && !trimmed.contains(['=', ':'])
        {
            out.push_str(trimmed);
            out.push_str(" =");
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }

    out
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
pub(crate) fn temp_config_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("toptracks-{}-{}.ini", std::process::id(), label))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROAD_TRIP: &str = "\
[playlist]
name = Road Trip
desc = Songs for the car
owner = me

[artists]
Artist A =
Artist B = https://open.spotify.com/artist/123
";

    #[test]
    fn test_parse_reads_sections_in_order() {
        let config = PlaylistConfig::parse(ROAD_TRIP).unwrap();

        assert_eq!(config.name, "Road Trip");
        assert_eq!(config.description, "Songs for the car");
        assert_eq!(config.spotify_url(), None);
        assert_eq!(
            config.artists(),
            &[
                ArtistEntry {
                    name: "Artist A".to_string(),
                    url: None,
                },
                ArtistEntry {
                    name: "Artist B".to_string(),
                    url: Some("https://open.spotify.com/artist/123".to_string()),
                },
            ]
        );
        assert_eq!(config.missing_artists(), vec!["Artist A"]);
        assert!(!config.is_dirty());
    }

    #[test]
    fn test_parse_bare_artist_line_is_unresolved() {
        let config = PlaylistConfig::parse(
            "[playlist]\nname = x\ndesc = y\n[artists]\nArtist A\nArtist B = https://open.spotify.com/artist/123\n",
        )
        .unwrap();

        assert_eq!(
            config.artists(),
            &[
                ArtistEntry {
                    name: "Artist A".to_string(),
                    url: None,
                },
                ArtistEntry {
                    name: "Artist B".to_string(),
                    url: Some("https://open.spotify.com/artist/123".to_string()),
                },
            ]
        );
        assert_eq!(config.missing_artists(), vec!["Artist A"]);
    }

    #[test]
    fn test_bare_line_as_last_artist() {
        let config =
            PlaylistConfig::parse("[playlist]\nname = x\ndesc = y\n[artists]\n# todo\nSolo").unwrap();
        assert_eq!(
            config.artists(),
            &[ArtistEntry {
                name: "Solo".to_string(),
                url: None,
            }]
        );
    }

    #[test]
    fn test_parse_rejects_missing_sections_and_keys() {
        assert!(matches!(
            PlaylistConfig::parse("[artists]\nA =\n"),
            Err(ConfigError::MissingSection(PLAYLIST_SECTION))
        ));
        assert!(matches!(
            PlaylistConfig::parse("[playlist]\nname = x\ndesc = y\n"),
            Err(ConfigError::MissingSection(ARTISTS_SECTION))
        ));
        assert!(matches!(
            PlaylistConfig::parse("[playlist]\nname = x\n[artists]\nA =\n"),
            Err(ConfigError::MissingKey { key: "desc", .. })
        ));
        assert!(matches!(
            PlaylistConfig::parse("[playlist]\nname =\ndesc = y\n[artists]\nA =\n"),
            Err(ConfigError::MissingKey { key: "name", .. })
        ));
        assert!(matches!(
            PlaylistConfig::parse("[playlist]\nname = x\ndesc = y\n[artists]\n"),
            Err(ConfigError::NoArtists)
        ));
    }

    #[test]
    fn test_malformed_artist_url_counts_as_missing() {
        let config = PlaylistConfig::parse(
            "[playlist]\nname = x\ndesc = y\n[artists]\nA = https://example.com/nope\n",
        )
        .unwrap();
        assert_eq!(config.missing_artists(), vec!["A"]);
    }

    #[test]
    fn test_set_artist_url_marks_dirty_only_on_change() {
        let mut config = PlaylistConfig::parse(ROAD_TRIP).unwrap();

        assert!(!config.set_artist_url(
            "Artist B",
            Some("https://open.spotify.com/artist/123".to_string())
        ));
        assert!(!config.is_dirty());

        assert!(!config.set_artist_url("Nobody", Some("https://open.spotify.com/artist/9".to_string())));
        assert!(!config.is_dirty());

        assert!(config.set_artist_url("Artist A", Some("https://open.spotify.com/artist/456".to_string())));
        assert!(config.is_dirty());
        assert!(config.missing_artists().is_empty());
    }

    #[test]
    fn test_round_trip_through_file() {
        let path = temp_config_path("round-trip");
        let artists = vec![
            ArtistEntry {
                name: "Boards of Canada".to_string(),
                url: Some("https://open.spotify.com/artist/2VAvhf61GgLYmC6C8anyX1".to_string()),
            },
            ArtistEntry {
                name: "Aphex Twin".to_string(),
                url: None,
            },
            ArtistEntry {
                name: "Autechre".to_string(),
                url: Some("https://open.spotify.com/artist/6WH1V41LwGDGmlPUhSZLHO".to_string()),
            },
            ArtistEntry {
                name: "Plaid".to_string(),
                url: None,
            },
            ArtistEntry {
                name: "Burial".to_string(),
                url: None,
            },
        ];

        let mut config = PlaylistConfig::new("Warp", "Late night electronics", artists.clone());
        config.save_to(&path).unwrap();
        assert!(!config.is_dirty());

        let reloaded = PlaylistConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded.name, "Warp");
        assert_eq!(reloaded.description, "Late night electronics");
        assert_eq!(reloaded.artists(), artists.as_slice());
        assert_eq!(reloaded.missing_artists(), vec!["Aphex Twin", "Plaid", "Burial"]);
    }

    #[test]
    fn test_save_is_noop_when_clean_and_keeps_extra_keys() {
        let path = temp_config_path("save-noop");
        std::fs::write(&path, ROAD_TRIP).unwrap();

        let mut config = PlaylistConfig::load(&path).unwrap();
        assert!(!config.save().unwrap());

        config.set_spotify_url("https://open.spotify.com/playlist/abc");
        assert!(config.save().unwrap());
        assert!(!config.is_dirty());

        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(written.contains("owner=me"));
        let reloaded = PlaylistConfig::parse(&written).unwrap();
        assert_eq!(reloaded.spotify_url(), Some("https://open.spotify.com/playlist/abc"));
    }

    #[test]
    fn test_round_trip_keeps_reserved_characters_in_names() {
        let path = temp_config_path("reserved-names");
        let artists = vec![
            ArtistEntry {
                name: "Mos Def: Black Star".to_string(),
                url: None,
            },
            ArtistEntry {
                name: ":Wumpscut:".to_string(),
                url: Some("https://open.spotify.com/artist/4jCmGSXnRXIfFpLkjYcBbv".to_string()),
            },
            ArtistEntry {
                name: "#1 Dads".to_string(),
                url: None,
            },
            ArtistEntry {
                name: "Sunn O))) ; Boris".to_string(),
                url: None,
            },
            ArtistEntry {
                name: "A=B".to_string(),
                url: None,
            },
        ];

        let mut config = PlaylistConfig::new("Odd names", "Colons: and = signs", artists.clone());
        config.save_to(&path).unwrap();

        let reloaded = PlaylistConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded.description, "Colons: and = signs");
        assert_eq!(reloaded.artists(), artists.as_slice());
        assert_eq!(reloaded.artists()[1].artist_id(), Some("4jCmGSXnRXIfFpLkjYcBbv".to_string()));
    }

    #[test]
    fn test_bracketed_artist_name_is_refused_on_save() {
        let path = temp_config_path("bracket-name");
        let mut config = PlaylistConfig::new(
            "x",
            "y",
            vec![ArtistEntry {
                name: "[dunkelbunt]".to_string(),
                url: None,
            }],
        );

        let result = config.save_to(&path);

        assert!(matches!(result, Err(ConfigError::UnwritableArtist(name)) if name == "[dunkelbunt]"));
        assert!(!path.exists());
        assert!(config.is_dirty());
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut config = PlaylistConfig::new("x", "y", vec![ArtistEntry { name: "A".into(), url: None }]);
        assert!(matches!(config.save(), Err(ConfigError::NoPath)));
    }
}
