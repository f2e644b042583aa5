//! # Application Context
//!
//! Owns the store and the state objects for one process and dispatches
//! parsed commands to them.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. CatalogConfig::load ──► defaults, catalog.toml, PARTDECK_* env      │
//! │  2. Database::new ────────► partdeck.db (WAL, migrations)               │
//! │  3. State objects ────────► CatalogState, CartState (restored),         │
//! │                             MediaState, AccessState                     │
//! │  4. Gate check ───────────► browsing commands need a valid token        │
//! │  5. Dispatch ─────────────► commands::* ──► render / JSON               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use partdeck_core::Language;
use partdeck_store::{Database, PreferencesRepository, StoreConfig};

use crate::cli::{CartCommand, Command, ConfigCommand};
use crate::commands;
use crate::config::CatalogConfig;
use crate::error::ApiError;
use crate::render;
use crate::shell;
use crate::state::{AccessState, CartState, CatalogState, MediaState};

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Renders `value` as text, or as pretty JSON.
    pub fn emit<T: Serialize>(
        self,
        value: &T,
        text: impl FnOnce(&T) -> String,
    ) -> Result<String, ApiError> {
        match self {
            OutputFormat::Text => Ok(text(value)),
            OutputFormat::Json => serde_json::to_string_pretty(value)
                .map(|json| json + "\n")
                .map_err(|e| ApiError::internal(format!("Failed to serialize output: {}", e))),
        }
    }
}

pub struct App {
    config: CatalogConfig,
    config_path: Option<PathBuf>,
    db: Database,
    pub catalog: CatalogState,
    pub cart: CartState,
    pub media: MediaState,
    pub access: AccessState,
}

impl App {
    /// Opens the store at the configured path and builds the state objects.
    pub async fn open(config: CatalogConfig, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let db_path = config.db_path()?;
        info!(db_path = %db_path.display(), "Opening PartDeck");
        let db = Database::new(StoreConfig::new(db_path)).await?;
        Self::with_database(config, config_path, db).await
    }

    /// Builds the state objects on an already open store.
    pub async fn with_database(
        config: CatalogConfig,
        config_path: Option<PathBuf>,
        db: Database,
    ) -> Result<Self, ApiError> {
        let catalog = CatalogState::new(&config.data.catalog_path, config.data.items_per_page);
        let cart = CartState::load(db.cart()).await?;
        let media = MediaState::from_settings(&config.images)?;
        let access = AccessState::new(db.access(), config.gate.clone())?;
        debug!("State initialized");

        Ok(App {
            config,
            config_path,
            db,
            catalog,
            cart,
            media,
            access,
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn preferences(&self) -> PreferencesRepository {
        self.db.preferences()
    }

    /// Stored language, else the configured one.
    pub async fn language(&self) -> Result<Language, ApiError> {
        let dto = commands::prefs::current_language(&self.preferences(), self.config.ui.language)
            .await?;
        Ok(dto.language)
    }

    pub async fn close(&self) {
        self.db.close().await;
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Runs one command and returns what to print.
    ///
    /// ## Errors
    /// - `AccessDenied` for browsing commands without a valid verification
    /// - Whatever the command itself returns
    pub async fn execute(&self, command: Command, format: OutputFormat) -> Result<String, ApiError> {
        if command.requires_access() {
            self.access.require_access(Utc::now()).await?;
        }

        let language = self.language().await?;
        let (catalog, cart, media) = (&self.catalog, &self.cart, &self.media);
        let screen = |dto: &commands::catalog::ScreenDto| render::screen(dto, language);

        match command {
            Command::Sheets => {
                let dto = commands::catalog::list_sheets(catalog, cart, media).await?;
                format.emit(&dto, screen)
            }
            Command::List { sheet, page } => {
                let dto = commands::catalog::open_sheet(catalog, cart, media, &sheet, page).await?;
                format.emit(&dto, screen)
            }
            Command::Search { terms, page } => {
                let terms = terms.join(" ");
                let dto =
                    commands::catalog::search_products(catalog, cart, media, &terms, page).await?;
                format.emit(&dto, screen)
            }
            Command::Show { code } => {
                let dto = commands::catalog::show_product(catalog, cart, media, &code).await?;
                format.emit(&dto, screen)
            }
            Command::Images { code } => {
                let dto = commands::media::product_images(media, &code).await?;
                format.emit(&dto, render::images)
            }
            Command::Cart(command) => self.execute_cart(command, language, format).await,
            Command::Export { out } => {
                let dto = commands::export::export_order_list(
                    cart,
                    media,
                    &self.config.export,
                    language,
                    out,
                )
                .await?;
                format.emit(&dto, render::export)
            }
            Command::Import { workbook, json } => {
                let output = json.unwrap_or_else(|| self.config.data.catalog_path.clone());
                let dto = commands::import::import_workbook(workbook, output).await?;
                format.emit(&dto, render::import)
            }
            Command::Login { code } => {
                let dto = commands::gate::login(&self.access, &code).await?;
                if !dto.granted && format == OutputFormat::Text {
                    return Err(ApiError::access_denied(dto.message));
                }
                format.emit(&dto, render::login)
            }
            Command::Logout => {
                commands::gate::logout(&self.access).await?;
                format.emit(&serde_json::json!({ "loggedOut": true }), |_| "Logged out\n".to_string())
            }
            Command::Status => {
                let dto = commands::gate::status(&self.access).await?;
                format.emit(&dto, render::gate_status)
            }
            Command::SetCode(args) => {
                let dto =
                    commands::gate::set_code(&self.access, args.code.as_deref(), args.generate)
                        .await?;
                format.emit(&dto, render::code)
            }
            Command::Language { code } => {
                let prefs = self.preferences();
                let dto = match code {
                    Some(code) => commands::prefs::set_language(&prefs, &code).await?,
                    None => commands::prefs::current_language(&prefs, self.config.ui.language).await?,
                };
                format.emit(&dto, render::language)
            }
            Command::Config(ConfigCommand::Show) => format.emit(&self.config, |config| {
                toml::to_string_pretty(config).unwrap_or_else(|e| format!("error: {}\n", e))
            }),
            Command::Config(ConfigCommand::Init) => {
                let path = self.config.save(self.config_path.clone())?;
                format.emit(&serde_json::json!({ "path": path }), |_| {
                    format!("Wrote {}\n", path.display())
                })
            }
            Command::Shell => {
                shell::run(self, language).await?;
                Ok(String::new())
            }
        }
    }

    async fn execute_cart(
        &self,
        command: CartCommand,
        language: Language,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        match command {
            CartCommand::Show => {
                let dto = commands::cart::get_cart(&self.cart, &self.media);
                format.emit(&dto, render::cart)
            }
            CartCommand::Add {
                code,
                quantity,
                brand,
            } => {
                let (dto, fill) = commands::cart::add_to_cart(
                    &self.catalog,
                    &self.cart,
                    &self.media,
                    &code,
                    quantity,
                    brand.as_deref(),
                    language,
                )
                .await?;
                // The process exits after this command; let the image lookup land first
                if let Some(fill) = fill {
                    let _ = fill.await;
                }
                format.emit(&dto, render::cart_update)
            }
            CartCommand::Update { code, quantity } => {
                let dto = commands::cart::update_cart_item(&self.cart, &code, quantity).await?;
                format.emit(&dto, render::cart_update)
            }
            CartCommand::Remove { code } => {
                let dto = commands::cart::remove_from_cart(&self.cart, &code).await;
                format.emit(&dto, render::cart_update)
            }
            CartCommand::Clear => {
                let dto = commands::cart::clear_cart(&self.cart).await;
                format.emit(&dto, render::cart_update)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::catalog::testing::{write_catalog, CATALOG_JSON};

    async fn app(dir: &std::path::Path, gate: bool) -> App {
        let mut config = CatalogConfig::default();
        config.data.catalog_path = write_catalog(dir, CATALOG_JSON);
        config.images.root = dir.display().to_string();
        config.export.dir = dir.join("orders");
        config.gate.enabled = gate;
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        App::with_database(config, Some(dir.join("catalog.toml")), db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_gate_blocks_browsing_until_login() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), true).await;

        let err = app.execute(Command::Sheets, OutputFormat::Text).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccessDenied);

        let err = app
            .execute(Command::Login { code: "WRONG".into() }, OutputFormat::Text)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AccessDenied);

        app.execute(Command::Login { code: "PD2024".into() }, OutputFormat::Text)
            .await
            .unwrap();
        let text = app.execute(Command::Sheets, OutputFormat::Text).await.unwrap();
        assert!(text.contains("3 sheets, 3 products"));
    }

    #[tokio::test]
    async fn test_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), false).await;

        let out = app
            .execute(
                Command::Search {
                    terms: vec!["valve".into()],
                    page: None,
                },
                OutputFormat::Json,
            )
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["screen"], "listing");
        assert_eq!(json["origin"]["kind"], "search");
        assert_eq!(json["products"][0]["code"], "V-1");
        assert_eq!(json["page"]["totalItems"], 1);
    }

    #[tokio::test]
    async fn test_cart_and_export_flow() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), false).await;

        let add = |code: &str, quantity| {
            Command::Cart(CartCommand::Add {
                code: code.to_string(),
                quantity,
                brand: None,
            })
        };
        app.execute(add("P-1", 2), OutputFormat::Text).await.unwrap();
        app.execute(add("P-2", 1), OutputFormat::Text).await.unwrap();

        let text = app
            .execute(Command::Cart(CartCommand::Show), OutputFormat::Text)
            .await
            .unwrap();
        assert!(text.contains("2 lines, 3 items, total 44.80"));

        let text = app
            .execute(Command::Export { out: None }, OutputFormat::Text)
            .await
            .unwrap();
        assert!(text.starts_with("Exported 2 lines (3 items, 0 images)"));
    }

    #[tokio::test]
    async fn test_language_preference_applies() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), false).await;
        assert_eq!(app.language().await.unwrap(), Language::EnUs);

        app.execute(Command::Language { code: Some("zh-CN".into()) }, OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(app.language().await.unwrap(), Language::ZhCn);
    }

    #[tokio::test]
    async fn test_config_init_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), false).await;

        app.execute(Command::Config(ConfigCommand::Init), OutputFormat::Text)
            .await
            .unwrap();
        let written = CatalogConfig::from_file(&dir.path().join("catalog.toml")).unwrap();
        assert_eq!(&written, app.config());
    }
}
