//! # Theme Preference
//!
//! Remembers whether the console runs in dark mode.

use std::sync::Arc;

use crate::error::ClientResult;
use crate::storage::Storage;

pub const DARK_THEME_KEY: &str = "id_dark_theme";

#[derive(Clone)]
pub struct ThemePreference {
    storage: Arc<dyn Storage>,
}

impl ThemePreference {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        ThemePreference { storage }
    }

    /// Unset reads as light.
    pub fn is_dark(&self) -> ClientResult<bool> {
        Ok(self
            .storage
            .get(DARK_THEME_KEY)?
            .map(|v| v == "true")
            .unwrap_or(false))
    }

    pub fn set_dark(&self, dark: bool) -> ClientResult<()> {
        self.storage
            .set(DARK_THEME_KEY, if dark { "true" } else { "false" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_theme_toggle() {
        let theme = ThemePreference::new(Arc::new(MemoryStorage::new()));
        assert!(!theme.is_dark().unwrap());
        theme.set_dark(true).unwrap();
        assert!(theme.is_dark().unwrap());
        theme.set_dark(false).unwrap();
        assert!(!theme.is_dark().unwrap());
    }
}
