use anyhow::Result;
use sendlog_config::{AppConfig, BackendConfig};
use sendlog_core::domain::{CompanyScope, Platform};
use sendlog_ingest::{ContactBackend, HttpBackend};
use sendlog_store::Store;
use serde::Serialize;
use std::io::{self, Write};

use crate::backend::LocalBackend;

pub mod completions;
pub mod contacts;
pub mod export;
pub mod import;
pub mod log;
pub mod lookup;
pub mod template;

pub const DEFAULT_SEND_LIMIT: i64 = 20;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
    pub scope: Option<CompanyScope>,
    pub platform: Platform,
}

impl<'a> Context<'a> {
    /// Backend selected by the `[backend]` config table.
    pub fn backend(&self) -> Result<Box<dyn ContactBackend + 'a>> {
        match &self.config.backend {
            BackendConfig::Local => Ok(Box::new(LocalBackend::new(
                self.store,
                &self.config.matching,
            ))),
            BackendConfig::Remote {
                base_url,
                api_token,
            } => Ok(Box::new(HttpBackend::new(base_url, api_token.clone())?)),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
