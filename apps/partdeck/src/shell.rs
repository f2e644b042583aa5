//! # Interactive Shell
//!
//! A line-based browsing session over one [`ViewController`]: the same
//! state machine a graphical front end would drive, one command per line.
//!
//! ```text
//! partdeck> open Pumps          sheet listing, page 1
//! partdeck> next                page 2
//! partdeck> search oil pump     every term must match
//! partdeck> show P-2            detail + gallery
//! partdeck> add P-2 3 kelon     cart line, image found in the background
//! partdeck> back                back to the search results
//! [cart: 3 items, total 15.00]  printed whenever the cart totals change
//! ```
//!
//! [`ViewController`]: partdeck_core::ViewController

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{debug, info};

use partdeck_core::validation::{parse_page, parse_quantity};
use partdeck_core::{Language, DEFAULT_BRAND_KEY};

use crate::app::App;
use crate::commands::{self, catalog::ScreenDto};
use crate::error::ApiError;
use crate::render;

const HELP: &str = "\
Browsing:  sheets | open <sheet> | search <terms> | clear | show <code> | back
Paging:    next | prev | first | last | page <n>
Cart:      add <code> [qty] [brand] | cart | update <code> <qty> | remove <code> | empty
Other:     export [path] | images <code> | refresh | lang <en-US|zh-CN> | help | quit
";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Quit,
    Sheets,
    Open(String),
    Search(String),
    ClearSearch,
    Next,
    Prev,
    First,
    Last,
    Page(String),
    Show(String),
    Back,
    Add {
        code: String,
        quantity: i64,
        brand: String,
    },
    Cart,
    Update {
        code: String,
        quantity: i64,
    },
    Remove(String),
    EmptyCart,
    Export(Option<String>),
    Images(String),
    Refresh,
    Language(String),
}

impl ShellCommand {
    /// Parses one input line.
    ///
    /// ## Errors
    /// - `ValidationError` for unknown commands, missing arguments or bad numbers
    pub fn parse(line: &str) -> Result<Self, ApiError> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let required = |name: &str| -> Result<String, ApiError> {
            if rest.is_empty() {
                Err(ApiError::validation(format!("`{}` needs an argument", name)))
            } else {
                Ok(rest.to_string())
            }
        };

        Ok(match word.to_ascii_lowercase().as_str() {
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            "sheets" | "home" => ShellCommand::Sheets,
            "open" | "sheet" => ShellCommand::Open(required("open")?),
            "search" | "find" => ShellCommand::Search(rest.to_string()),
            "clear" => ShellCommand::ClearSearch,
            "next" | "n" => ShellCommand::Next,
            "prev" | "p" => ShellCommand::Prev,
            "first" => ShellCommand::First,
            "last" => ShellCommand::Last,
            "page" => ShellCommand::Page(required("page")?),
            "show" => ShellCommand::Show(required("show")?),
            "back" | "b" => ShellCommand::Back,
            "add" => match args.as_slice() {
                [code] => ShellCommand::Add {
                    code: code.to_string(),
                    quantity: 1,
                    brand: DEFAULT_BRAND_KEY.to_string(),
                },
                [code, quantity] => ShellCommand::Add {
                    code: code.to_string(),
                    quantity: parse_quantity(quantity)?,
                    brand: DEFAULT_BRAND_KEY.to_string(),
                },
                [code, quantity, brand] => ShellCommand::Add {
                    code: code.to_string(),
                    quantity: parse_quantity(quantity)?,
                    brand: brand.to_string(),
                },
                _ => return Err(ApiError::validation("usage: add <code> [qty] [brand]")),
            },
            "cart" => ShellCommand::Cart,
            "update" => match args.as_slice() {
                [code, quantity] => ShellCommand::Update {
                    code: code.to_string(),
                    quantity: parse_quantity(quantity)?,
                },
                _ => return Err(ApiError::validation("usage: update <code> <qty>")),
            },
            "remove" | "rm" => ShellCommand::Remove(required("remove")?),
            "empty" => ShellCommand::EmptyCart,
            "export" => ShellCommand::Export((!rest.is_empty()).then(|| rest.to_string())),
            "images" => ShellCommand::Images(required("images")?),
            "refresh" | "reload" => ShellCommand::Refresh,
            "lang" | "language" => ShellCommand::Language(required("lang")?),
            other => {
                return Err(ApiError::validation(format!(
                    "Unknown command `{}`, type `help`",
                    other
                )))
            }
        })
    }
}

/// Runs the session until `quit` or end of input.
pub async fn run(app: &App, mut language: Language) -> Result<(), ApiError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut totals = app.cart.subscribe();
    totals.borrow_and_update();
    info!("Shell started");

    print(&mut stdout, HELP).await?;
    let first = commands::catalog::list_sheets(&app.catalog, &app.cart, &app.media).await;
    print(&mut stdout, &output(first.map(|dto| render::screen(&dto, language)))).await?;

    loop {
        print(&mut stdout, "partdeck> ").await?;
        let Some(line) = lines.next_line().await.map_err(io_error)? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let result = match ShellCommand::parse(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => {
                debug!(?command, "Shell command");
                execute(app, command, &mut language).await
            }
            Err(e) => Err(e),
        };
        print(&mut stdout, &output(result)).await?;

        if totals.has_changed().unwrap_or(false) {
            let current = *totals.borrow_and_update();
            let text = format!(
                "[cart: {} items, total {}]\n",
                current.total_quantity, current.total_price
            );
            print(&mut stdout, &text).await?;
        }
    }

    info!("Shell closed");
    Ok(())
}

async fn execute(
    app: &App,
    command: ShellCommand,
    language: &mut Language,
) -> Result<String, ApiError> {
    use commands::catalog::{navigate, open_sheet, search_products, show_product};

    let (catalog, cart, media) = (&app.catalog, &app.cart, &app.media);
    let lang = *language;
    let screen = |dto: ScreenDto| render::screen(&dto, lang);

    match command {
        ShellCommand::Help => Ok(HELP.to_string()),
        ShellCommand::Quit => Ok(String::new()),
        ShellCommand::Sheets => commands::catalog::list_sheets(catalog, cart, media)
            .await
            .map(screen),
        ShellCommand::Open(name) => open_sheet(catalog, cart, media, &name, None).await.map(screen),
        ShellCommand::Search(terms) => search_products(catalog, cart, media, &terms, None)
            .await
            .map(screen),
        ShellCommand::ClearSearch => navigate(catalog, cart, media, |view| {
            view.clear_search();
            Ok(())
        })
        .await
        .map(screen),
        ShellCommand::Next => page_step(app, |view| view.next_page()).await.map(screen),
        ShellCommand::Prev => page_step(app, |view| view.prev_page()).await.map(screen),
        ShellCommand::First => page_step(app, |view| view.first_page()).await.map(screen),
        ShellCommand::Last => page_step(app, |view| view.last_page()).await.map(screen),
        ShellCommand::Page(input) => navigate(catalog, cart, media, |view| {
            let page = parse_page(&input, view.pagination().total_pages())?;
            view.go_to_page(page);
            Ok(())
        })
        .await
        .map(screen),
        ShellCommand::Show(code) => show_product(catalog, cart, media, &code).await.map(screen),
        ShellCommand::Back => navigate(catalog, cart, media, |view| {
            view.back_to_list();
            Ok(())
        })
        .await
        .map(screen),
        ShellCommand::Add {
            code,
            quantity,
            brand,
        } => {
            // The image fill runs on; the totals watch reports when it lands
            let (dto, _fill) = commands::cart::add_to_cart(
                catalog,
                cart,
                media,
                &code,
                quantity,
                Some(&brand),
                lang,
            )
            .await?;
            Ok(render::cart_update(&dto))
        }
        ShellCommand::Cart => Ok(render::cart(&commands::cart::get_cart(cart, media))),
        ShellCommand::Update { code, quantity } => {
            let dto = commands::cart::update_cart_item(cart, &code, quantity).await?;
            Ok(render::cart_update(&dto))
        }
        ShellCommand::Remove(code) => Ok(render::cart_update(
            &commands::cart::remove_from_cart(cart, &code).await,
        )),
        ShellCommand::EmptyCart => Ok(render::cart_update(&commands::cart::clear_cart(cart).await)),
        ShellCommand::Export(path) => {
            let dto = commands::export::export_order_list(
                cart,
                media,
                &app.config().export,
                lang,
                path.map(Into::into),
            )
            .await?;
            Ok(render::export(&dto))
        }
        ShellCommand::Images(code) => {
            let dto = commands::media::product_images(media, &code).await?;
            Ok(render::images(&dto))
        }
        ShellCommand::Refresh => {
            let outcome = commands::catalog::reload_catalog(catalog, media).await?;
            let dto = commands::catalog::current_screen(catalog, cart, media).await?;
            Ok(format!(
                "{}{}",
                render::load_outcome(&outcome),
                render::screen(&dto, lang)
            ))
        }
        ShellCommand::Language(code) => {
            let dto = commands::prefs::set_language(&app.preferences(), &code).await?;
            *language = dto.language;
            Ok(render::language(&dto))
        }
    }
}

/// Moves the page and re-renders. Moving past either end leaves the page as is.
async fn page_step<F>(app: &App, step: F) -> Result<ScreenDto, ApiError>
where
    F: FnOnce(&mut partdeck_core::ViewController) -> bool,
{
    commands::catalog::navigate(&app.catalog, &app.cart, &app.media, |view| {
        if !step(view) {
            debug!("Page unchanged");
        }
        Ok(())
    })
    .await
}

fn output(result: Result<String, ApiError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => format!("error: {}\n", e.message),
    }
}

async fn print(stdout: &mut Stdout, text: &str) -> Result<(), ApiError> {
    stdout.write_all(text.as_bytes()).await.map_err(io_error)?;
    stdout.flush().await.map_err(io_error)
}

fn io_error(e: std::io::Error) -> ApiError {
    ApiError::internal(format!("Terminal I/O failed: {}", e))
}
