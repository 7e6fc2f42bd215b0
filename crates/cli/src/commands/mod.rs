//! Subcommand implementations.
//!
//! Each command gets a [`Context`] with the API client and the state
//! directory, and writes its result to stdout.

pub mod account;
pub mod catalog;
pub mod checkout;
pub mod shop;

use std::io::Write;

use atelier_cli::api::ApiClient;
use atelier_cli::storage::FileStorage;
use serde::Serialize;
use thiserror::Error;

/// Errors specific to command handling.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0} is not in the cart")]
    NotInCart(String),

    #[error("{0} is not in the wishlist")]
    NotWishlisted(String),

    #[error("{product} does not come in size {size}")]
    SizeUnavailable { product: String, size: String },
}

/// Everything a command needs.
pub struct Context {
    pub api: ApiClient,
    pub storage: FileStorage,
}

/// Result type of every command.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Pretty-print `value` as JSON on stdout.
pub fn print_json(value: &impl Serialize) -> CommandResult {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Print lines of text on stdout.
pub fn print_lines<I, L>(lines: I) -> CommandResult
where
    I: IntoIterator<Item = L>,
    L: std::fmt::Display,
{
    let mut out = std::io::stdout().lock();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
