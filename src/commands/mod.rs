pub mod auth;
pub mod editor;
pub mod search;
pub mod settings;
pub mod viewer;

use std::io::{self, BufRead, Write};

use crate::api::ApiClient;
use crate::render::Theme;
use crate::store::StateStore;

/// Everything a page controller needs: the API client, the persisted state,
/// the active theme and a couple of resolved defaults.
#[derive(Clone, Debug)]
pub struct Ctx {
    pub api: ApiClient,
    pub store: StateStore,
    pub theme: Theme,
    pub editor: Option<String>,
    pub export_file: Option<String>,
}

pub(crate) fn prompt_line(label: &str) -> Result<String, String> {
    eprint!("{label}: ");
    io::stderr()
        .flush()
        .map_err(|e| format!("failed to flush prompt: {e}"))?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("failed to read input: {e}"))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub(crate) fn confirm(question: &str) -> Result<bool, String> {
    let answer = prompt_line(&format!("{question} [y/N]"))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
