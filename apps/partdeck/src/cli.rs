//! # Command Line
//!
//! `clap` definitions for the `partdeck` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "partdeck",
    version,
    about = "Browse a parts catalog, collect an order, export it as a workbook"
)]
pub struct Cli {
    /// Config file. Defaults to catalog.toml in the platform config directory.
    #[arg(long, global = true, env = "PARTDECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sheets with their product counts
    Sheets,

    /// One page of a sheet
    List {
        sheet: String,
        #[arg(long)]
        page: Option<usize>,
    },

    /// Search every sheet; all terms must match
    Search {
        #[arg(required = true, num_args = 1..)]
        terms: Vec<String>,
        #[arg(long)]
        page: Option<usize>,
    },

    /// Product detail with its images
    Show { code: String },

    /// Image paths found for a product code
    Images { code: String },

    /// Inspect or change the cart
    #[command(subcommand)]
    Cart(CartCommand),

    /// Write the cart as an .xlsx order list
    Export {
        /// Target file or directory. Defaults to export.dir.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Convert a catalog workbook to catalog JSON
    Import {
        workbook: PathBuf,
        /// Output file. Defaults to data.catalog_path.
        json: Option<PathBuf>,
    },

    /// Unlock the catalog with a verification code
    Login { code: String },

    /// Drop the current verification
    Logout,

    /// Verification status
    Status,

    /// Change the local verification code
    SetCode(SetCodeArgs),

    /// Show or set the UI language (en-US, zh-CN)
    Language { code: Option<String> },

    /// Show or write the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Interactive browsing session
    Shell,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// List cart lines and totals
    Show,

    /// Add a product
    Add {
        code: String,
        #[arg(default_value_t = 1)]
        quantity: i64,
        /// Brand key: no_brand, kelon, lixiong
        #[arg(long)]
        brand: Option<String>,
    },

    /// Set the quantity of a product; 0 removes it
    Update {
        code: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove every line of a product
    Remove { code: String },

    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
pub struct SetCodeArgs {
    /// New code, at least four characters
    #[arg(required_unless_present = "generate")]
    pub code: Option<String>,

    /// Generate a random code instead
    #[arg(long, conflicts_with = "code")]
    pub generate: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write the effective configuration to the config file
    Init,
}

impl Command {
    /// Commands that need a verified session when the gate is on.
    pub fn requires_access(&self) -> bool {
        matches!(
            self,
            Command::Sheets
                | Command::List { .. }
                | Command::Search { .. }
                | Command::Show { .. }
                | Command::Images { .. }
                | Command::Cart(_)
                | Command::Export { .. }
                | Command::SetCode(_)
                | Command::Shell
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_search_terms() {
        let cli = Cli::try_parse_from(["partdeck", "search", "water", "pump", "--page", "2"]).unwrap();
        match cli.command {
            Command::Search { terms, page } => {
                assert_eq!(terms, vec!["water", "pump"]);
                assert_eq!(page, Some(2));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_cart_add_defaults_to_one() {
        let cli = Cli::try_parse_from(["partdeck", "--json", "cart", "add", "X1"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Cart(CartCommand::Add { quantity, brand, .. }) => {
                assert_eq!(quantity, 1);
                assert_eq!(brand, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_gate_requirements() {
        assert!(Command::Sheets.requires_access());
        assert!(!Command::Status.requires_access());
        assert!(!Command::Login { code: "x".into() }.requires_access());
    }
}
