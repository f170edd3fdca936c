use serde::{Deserialize, Serialize};

/// What a successful run produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildReport {
    pub playlist_name: String,
    pub playlist_url: String,
    pub total_artists: usize,
    pub contributing_artists: usize,
    pub skipped_artists: Vec<String>,
    pub tracks_added: usize,
    pub batches: usize,
}

impl BuildReport {
    pub fn new(playlist_name: String, total_artists: usize) -> Self {
        Self {
            playlist_name,
            playlist_url: String::new(),
            total_artists,
            contributing_artists: 0,
            skipped_artists: Vec::new(),
            tracks_added: 0,
            batches: 0,
        }
    }
}
