use dialoguer::{theme::ColorfulTheme, Select};

use crate::error::Result;
use crate::spotify::Artist;

/// Chooses among several artists that all plausibly match a name.
pub trait Disambiguator {
    /// Returns the index of the chosen candidate, or `None` when none fits.
    fn choose(&mut self, query: &str, candidates: &[Artist]) -> Result<Option<usize>>;
}

impl<F> Disambiguator for F
where
    F: FnMut(&str, &[Artist]) -> Result<Option<usize>>,
{
    fn choose(&mut self, query: &str, candidates: &[Artist]) -> Result<Option<usize>> {
        self(query, candidates)
    }
}

/// Interactive terminal picker.
#[derive(Debug, Default)]
pub struct ConsolePicker;

impl Disambiguator for ConsolePicker {
    fn choose(&mut self, query: &str, candidates: &[Artist]) -> Result<Option<usize>> {
        let options = picker_options(candidates);

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Several artists match '{}'", query))
            .items(&options)
            .default(0)
            .interact_opt()?;

        Ok(chosen_candidate(selection, candidates.len()))
    }
}

const NONE_OF_THESE: &str = "None of these";

/// Candidate labels followed by the trailing "none" option.
fn picker_options(candidates: &[Artist]) -> Vec<String> {
    let mut options: Vec<String> = candidates.iter().map(Artist::label).collect();
    options.push(NONE_OF_THESE.to_string());
    options
}

/// Map a menu selection back to a candidate index. The trailing "none" entry
/// and a cancelled prompt both mean no candidate.
fn chosen_candidate(selection: Option<usize>, candidates: usize) -> Option<usize> {
    selection.filter(|&index| index < candidates)
}

/// Leaves every ambiguous artist unresolved; for runs without a terminal.
#[derive(Debug, Default)]
pub struct NoPrompt;

impl Disambiguator for NoPrompt {
    fn choose(&mut self, query: &str, candidates: &[Artist]) -> Result<Option<usize>> {
        tracing::info!(
            "Skipping '{}': {} candidates and prompting is disabled",
            query,
            candidates.len()
        );
        Ok(None)
    }
}
