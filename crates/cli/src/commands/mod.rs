//! Command implementations for the `shop` binary.
//!
//! Every command receives a [`Context`] holding the configured client and
//! the output mode. Commands print either a plain-text table or, with
//! `--json`, the underlying payload as pretty JSON.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod settings;

use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;
use shopfront_client::{ApiClient, ClientConfig, ClientError, ConfigError};
use shopfront_core::{BuilderError, Order};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The client reported an error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Draft products could not be built.
    #[error(transparent)]
    Builder(#[from] BuilderError),

    /// Reading an input file failed.
    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing output failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    /// Output could not be serialized.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    /// A command argument was rejected.
    #[error("{0}")]
    InvalidArgument(String),
}

/// Shared state for one command invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub client: ApiClient,
    pub config: ClientConfig,
    pub json: bool,
}

impl Context {
    /// Build the client from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid or the HTTP client fails
    /// to build.
    pub fn from_env(json: bool) -> Result<Self, CommandError> {
        let config = ClientConfig::from_env()?;
        let client = ApiClient::from_config(&config)?;
        Ok(Self {
            client,
            config,
            json,
        })
    }

    /// Print `value` as JSON in `--json` mode, otherwise run `human`.
    pub fn emit<T, F>(&self, value: &T, human: F) -> Result<(), CommandError>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if self.json {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        } else {
            human(&mut out)?;
        }
        Ok(())
    }

    /// Print a one-line confirmation, or `{"message": ...}` in JSON mode.
    pub fn done(&self, message: &str) -> Result<(), CommandError> {
        self.emit(&serde_json::json!({ "message": message }), |out| {
            writeln!(out, "{message}")
        })
    }
}

/// Write an order table.
pub(crate) fn write_orders(out: &mut dyn Write, orders: &[Order]) -> io::Result<()> {
    if orders.is_empty() {
        return writeln!(out, "No orders.");
    }
    writeln!(
        out,
        "{:>6}  {:<12}  {:>10}  {:<16}  {:>6}",
        "ID", "STATUS", "TOTAL", "CREATED", "USER"
    )?;
    for order in orders {
        let user = order
            .user_id
            .map_or_else(|| "-".to_owned(), |id| id.to_string());
        writeln!(
            out,
            "{:>6}  {:<12}  {:>10}  {:<16}  {:>6}",
            order.id,
            order.status,
            order.total_price.to_string(),
            order.created_at.format("%Y-%m-%d %H:%M"),
            user
        )?;
    }
    Ok(())
}
