//! # Preference Commands

use serde::Serialize;
use tracing::info;

use partdeck_core::Language;
use partdeck_store::PreferencesRepository;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDto {
    pub language: Language,
    /// False when the configured default is in effect.
    pub stored: bool,
}

/// The language in effect: the stored choice, else `fallback`.
pub async fn current_language(
    prefs: &PreferencesRepository,
    fallback: Language,
) -> Result<LanguageDto, ApiError> {
    Ok(match prefs.language().await? {
        Some(language) => LanguageDto {
            language,
            stored: true,
        },
        None => LanguageDto {
            language: fallback,
            stored: false,
        },
    })
}

/// Stores the UI language.
///
/// ## Errors
/// - `ValidationError` for anything but `zh-CN` / `en-US`
pub async fn set_language(prefs: &PreferencesRepository, code: &str) -> Result<LanguageDto, ApiError> {
    let language: Language = code
        .parse()
        .map_err(|_| ApiError::validation(format!("Unsupported language: {}", code)))?;
    prefs.set_language(language).await?;
    info!(language = language.code(), "Language changed");
    Ok(LanguageDto {
        language,
        stored: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use partdeck_store::{Database, StoreConfig};

    #[tokio::test]
    async fn test_language_round_trip() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let prefs = db.preferences();

        let dto = current_language(&prefs, Language::EnUs).await.unwrap();
        assert_eq!(dto.language, Language::EnUs);
        assert!(!dto.stored);

        set_language(&prefs, "zh-CN").await.unwrap();
        let dto = current_language(&prefs, Language::EnUs).await.unwrap();
        assert_eq!(dto.language, Language::ZhCn);
        assert!(dto.stored);

        assert!(set_language(&prefs, "fr").await.is_err());
    }
}
