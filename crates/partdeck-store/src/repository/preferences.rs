//! # Preferences Repository

use tracing::warn;

use partdeck_core::Language;

use crate::error::StoreResult;
use crate::repository::kv::KvRepository;

pub const LANGUAGE_KEY: &str = "partdeck.language";

#[derive(Debug, Clone)]
pub struct PreferencesRepository {
    kv: KvRepository,
}

impl PreferencesRepository {
    pub fn new(kv: KvRepository) -> Self {
        PreferencesRepository { kv }
    }

    /// Stored UI language. Unknown values are ignored.
    pub async fn language(&self) -> StoreResult<Option<Language>> {
        let Some(code) = self.kv.get(LANGUAGE_KEY).await? else {
            return Ok(None);
        };
        match code.parse() {
            Ok(language) => Ok(Some(language)),
            Err(_) => {
                warn!(value = %code, "Ignoring unknown stored language");
                Ok(None)
            }
        }
    }

    pub async fn set_language(&self, language: Language) -> StoreResult<()> {
        self.kv.set(LANGUAGE_KEY, language.code()).await
    }
}
