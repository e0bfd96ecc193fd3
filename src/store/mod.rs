use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::config;
use crate::render::Theme;

pub const SESSION_KEY: &str = "session";
pub const THEME_KEY: &str = "theme";

/// On-disk key/value state shared by every command: one file per key under
/// `~/.pimctl` (or `$PIMCTL_HOME`). Holds the session token and the display
/// theme; all session lifecycle goes through here.
#[derive(Clone, Debug)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn open_default() -> Result<Self, String> {
        if let Some(dir) = env::var_os("PIMCTL_HOME") {
            return Ok(Self {
                dir: PathBuf::from(dir),
            });
        }
        let home = config::home_dir().ok_or_else(|| "could not locate home directory".to_string())?;
        Ok(Self {
            dir: home.join(".pimctl"),
        })
    }

    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let contents = fs::read_to_string(self.dir.join(key)).ok()?;
        let value = contents.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), String> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            format!(
                "failed to create state directory '{}': {e}",
                self.dir.display()
            )
        })?;
        let path = self.dir.join(key);
        fs::write(&path, value)
            .map_err(|e| format!("failed to write state file '{}': {e}", path.display()))
    }

    pub fn clear(&self, key: &str) -> Result<(), String> {
        let path = self.dir.join(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!(
                "failed to remove state file '{}': {e}",
                path.display()
            )),
        }
    }

    pub fn session(&self) -> Option<String> {
        self.get(SESSION_KEY)
    }

    pub fn set_session(&self, token: &str) -> Result<(), String> {
        self.set(SESSION_KEY, token)
    }

    pub fn clear_session(&self) -> Result<(), String> {
        self.clear(SESSION_KEY)
    }

    /// Anything that is not exactly "light" reads as the dark default.
    pub fn theme(&self) -> Theme {
        self.get(THEME_KEY)
            .and_then(|raw| Theme::parse(&raw))
            .unwrap_or(Theme::Dark)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), String> {
        self.set(THEME_KEY, theme.name())
    }

    /// Session guard: every protected command calls this before doing any
    /// network or rendering work and aborts on `Err`.
    pub fn guard(&self) -> Result<String, String> {
        self.session()
            .ok_or_else(|| "not logged in, run `pimctl login <username>` first".to_string())
    }
}
