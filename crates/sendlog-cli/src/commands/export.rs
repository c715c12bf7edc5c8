use crate::commands::{print_json, Context};
use anyhow::{anyhow, Context as _, Result};
use clap::{Args, Subcommand};
use sendlog_core::domain::{Contact, ContactId};
use sendlog_ingest::{export_sends, ExportRow};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Subcommand)]
pub enum ExportCommand {
    /// Export logged sends in the import template layout
    Csv(ExportCsvArgs),
}

#[derive(Debug, Args)]
pub struct ExportCsvArgs {
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    format: String,
    count: usize,
    output: Option<String>,
}

pub fn export_csv(ctx: &Context<'_>, args: ExportCsvArgs) -> Result<()> {
    let contacts: HashMap<ContactId, Contact> = ctx
        .store
        .contacts()
        .list(None)?
        .into_iter()
        .map(|contact| (contact.id.clone(), contact))
        .collect();
    let sends = ctx.store.sends().list_all()?;

    let mut rows = Vec::with_capacity(sends.len());
    for send in &sends {
        match contacts.get(&send.contact_id) {
            Some(contact) => rows.push(ExportRow { contact, send }),
            None => warn!(send = %send.id, "send without contact, skipping"),
        }
    }

    let data = export_sends(&rows)?;
    let report = ExportReport {
        format: "csv".to_string(),
        count: rows.len(),
        output: args.out.as_ref().map(|path| path.display().to_string()),
    };
    write_export(ctx, report, args.out.as_deref(), &data)
}

fn write_export(
    ctx: &Context<'_>,
    report: ExportReport,
    out: Option<&Path>,
    data: &str,
) -> Result<()> {
    if ctx.json && out.is_none() {
        return Err(anyhow!("--json requires --out for export commands"));
    }

    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("create export directory {}", parent.display()))?;
                }
            }
            fs::write(path, data)
                .with_context(|| format!("write export file {}", path.display()))?;
            if ctx.json {
                print_json(&report)?;
            } else {
                println!("Exported {} sends to {}", report.count, path.display());
            }
            Ok(())
        }
        None => {
            print!("{}", data);
            Ok(())
        }
    }
}
