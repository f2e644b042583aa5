//! # Terminal Rendering
//!
//! Plain-text views of command DTOs. `--json` output bypasses this module.

use std::fmt::Write;

use partdeck_core::Language;

use crate::commands::cart::{CartDto, CartUpdateDto};
use crate::commands::catalog::{ListingDto, ListingOrigin, ProductDetailDto, ScreenDto, SheetsDto};
use crate::commands::export::ExportDto;
use crate::commands::gate::{CodeDto, LoginDto};
use crate::commands::import::ImportDto;
use crate::commands::media::ImagesDto;
use crate::commands::prefs::LanguageDto;
use crate::state::{GateStatus, LoadOutcome};

const RULE: &str = "────────────────────────────────────────────────────────────";

// `write!` into a String cannot fail; results are ignored below.

pub fn screen(screen: &ScreenDto, language: Language) -> String {
    match screen {
        ScreenDto::Empty => "Catalog not loaded.\n".to_string(),
        ScreenDto::LoadError { message } => {
            format!("Failed to load catalog: {}\nRun `refresh` to retry.\n", message)
        }
        ScreenDto::Sheets(sheets) => sheets_overview(sheets),
        ScreenDto::Listing(listing) => self::listing(listing, language),
        ScreenDto::Detail(detail) => self::detail(detail),
    }
}

fn sheets_overview(sheets: &SheetsDto) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} sheets, {} products",
        sheets.sheet_count, sheets.product_count
    );
    let _ = writeln!(out, "{}", RULE);
    for sheet in &sheets.sheets {
        let _ = writeln!(out, "  {:<40} {:>6}", sheet.name, sheet.count);
    }
    out
}

fn listing(listing: &ListingDto, language: Language) -> String {
    let mut out = String::new();
    match &listing.origin {
        ListingOrigin::Sheet { name } => {
            let _ = writeln!(out, "{}", name);
        }
        ListingOrigin::Search { term } => {
            let _ = writeln!(out, "Search: \"{}\" ({} found)", term, listing.page.total_items);
        }
    }
    let _ = writeln!(out, "{}", RULE);

    if listing.products.is_empty() {
        let _ = writeln!(out, "  {}", language.text().no_products);
        return out;
    }

    for card in &listing.products {
        let _ = write!(
            out,
            "  {:<14} {:<34} {:>10}",
            card.code,
            card.name.as_deref().unwrap_or("-"),
            card.price.to_string()
        );
        if card.in_cart > 0 {
            let _ = write!(out, "  [in cart: {}]", card.in_cart);
        }
        out.push('\n');
        if let Some(specs) = &card.specs {
            let _ = writeln!(out, "  {:<14} {}", "", specs);
        }
        if let Some(image) = &card.image {
            let _ = writeln!(out, "  {:<14} {}", "", image);
        }
    }

    let page = &listing.page;
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "Showing {} to {} of {}",
        page.showing_from, page.showing_to, page.total_items
    );
    if page.shows_controls {
        let buttons: Vec<String> = page
            .window
            .iter()
            .map(|p| {
                if *p == page.current_page {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            })
            .collect();
        let _ = writeln!(
            out,
            "Page {} of {}   {} {} {}",
            page.current_page,
            page.total_pages,
            if page.has_prev { "<" } else { " " },
            buttons.join(" "),
            if page.has_next { ">" } else { " " },
        );
    }
    out
}

fn detail(detail: &ProductDetailDto) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", detail.code, detail.name.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  {:<20} {}", "Sheet", detail.sheet);
    if let Some(original) = &detail.original_code {
        let _ = writeln!(out, "  {:<20} {}", "Original code", original);
    }
    for field in &detail.fields {
        let _ = writeln!(out, "  {:<20} {}", field.label, field.value);
    }
    if detail.in_cart > 0 {
        let _ = writeln!(out, "  {:<20} {}", "In cart", detail.in_cart);
    }
    if !detail.images.is_empty() {
        let _ = writeln!(out, "Images:");
        for image in &detail.images {
            let _ = writeln!(out, "  {}", image);
        }
    }
    out
}

pub fn cart(cart: &CartDto) -> String {
    if cart.items.is_empty() {
        return "Cart is empty.\n".to_string();
    }
    let mut out = String::new();
    for (i, line) in cart.items.iter().enumerate() {
        let item = &line.item;
        let _ = writeln!(
            out,
            "{:>3}. {:<14} {:<30} {:<10} x{:<4} {:>10}",
            i + 1,
            item.code,
            item.name,
            item.selected_brand,
            item.quantity,
            line.line_total.to_string()
        );
        if !item.specs.is_empty() {
            let _ = writeln!(out, "     {}", item.specs);
        }
    }
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "{} lines, {} items, total {}",
        cart.totals.line_count, cart.totals.total_quantity, cart.totals.total_price
    );
    out
}

pub fn cart_update(update: &CartUpdateDto) -> String {
    let mut out = format!(
        "{}. Cart: {} items, total {}\n",
        update.summary, update.totals.total_quantity, update.totals.total_price
    );
    if !update.persisted {
        let _ = writeln!(
            out,
            "warning: cart not saved ({})",
            update.persist_error.as_deref().unwrap_or("unknown error")
        );
    }
    out
}

pub fn export(export: &ExportDto) -> String {
    format!(
        "Exported {} lines ({} items, {} images) to {}\n",
        export.line_count,
        export.total_quantity,
        export.images_embedded,
        export.path.display()
    )
}

pub fn import(import: &ImportDto) -> String {
    let mut out = String::new();
    for sheet in &import.sheets {
        let _ = writeln!(out, "  {:<40} {:>6}", sheet.name, sheet.records);
    }
    let _ = writeln!(
        out,
        "Wrote {} records to {}",
        import.total_records,
        import.output.display()
    );
    out
}

pub fn load_outcome(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Loaded { sheets, products } => {
            format!("Catalog reloaded: {} sheets, {} products\n", sheets, products)
        }
        LoadOutcome::Superseded => "Catalog reload superseded by a newer one\n".to_string(),
    }
}

pub fn login(login: &LoginDto) -> String {
    match login.expires_at {
        Some(expires) => format!("{} (valid until {})\n", login.message, expires.format("%Y-%m-%d %H:%M UTC")),
        None => format!("{}\n", login.message),
    }
}

pub fn gate_status(status: &GateStatus) -> String {
    if !status.enabled {
        return "Verification gate disabled\n".to_string();
    }
    let mut out = String::new();
    match status.expires_at {
        Some(expires) if status.authenticated => {
            let _ = writeln!(out, "Verified until {}", expires.format("%Y-%m-%d %H:%M UTC"));
        }
        _ => {
            let _ = writeln!(out, "Not verified");
        }
    }
    if let Some(locked_for) = &status.locked_for {
        let _ = writeln!(out, "Locked for {}", locked_for);
    } else if status.failed_attempts > 0 {
        let _ = writeln!(out, "{} failed attempt(s)", status.failed_attempts);
    }
    out
}

pub fn code(code: &CodeDto) -> String {
    if code.generated {
        format!("New verification code: {}\n", code.code)
    } else {
        "Verification code updated\n".to_string()
    }
}

pub fn images(images: &ImagesDto) -> String {
    if images.images.is_empty() {
        return format!("No images for {}\n", images.code);
    }
    images.images.iter().map(|i| format!("{}\n", i)).collect()
}

pub fn language(language: &LanguageDto) -> String {
    format!(
        "{}{}\n",
        language.language.code(),
        if language.stored { "" } else { " (default)" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::catalog::PageInfo;

    #[test]
    fn test_empty_listing_uses_language_text() {
        let dto = ScreenDto::Listing(ListingDto {
            origin: ListingOrigin::Search { term: "zz".into() },
            products: Vec::new(),
            page: PageInfo {
                current_page: 1,
                total_pages: 0,
                total_items: 0,
                showing_from: 0,
                showing_to: 0,
                window: vec![1],
                shows_controls: false,
                has_prev: false,
                has_next: false,
            },
        });
        let text = screen(&dto, Language::ZhCn);
        assert!(text.contains("暂无商品"));
        assert!(text.contains("Search: \"zz\" (0 found)"));
    }

    #[test]
    fn test_load_error_hints_retry() {
        let dto = ScreenDto::LoadError {
            message: "bad json".into(),
        };
        assert!(screen(&dto, Language::EnUs).contains("retry"));
    }
}
