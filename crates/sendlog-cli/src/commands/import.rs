use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::{contact_line, parse_contact_id, read_input};
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use sendlog_core::time::{format_date, today_local};
use sendlog_ingest::{import_parsed, parse_csv, BatchOptions, Confirmations, CsvOptions};
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum ImportCommand {
    /// Import sends from a CSV file (stdin when omitted)
    Csv(ImportCsvArgs),
}

#[derive(Debug, Args)]
pub struct ImportCsvArgs {
    pub file: Option<PathBuf>,
    /// Print the extracted records without resolving or saving them
    #[arg(long)]
    pub dry_run: bool,
    /// Attach a fuzzy-matched address to a contact: <email>=<contact-id>
    #[arg(long, value_name = "EMAIL=ID")]
    pub confirm: Vec<String>,
}

pub fn import_csv(ctx: &Context<'_>, args: ImportCsvArgs) -> Result<()> {
    let data = read_input(args.file.as_deref())?;
    let confirmations = parse_confirmations(&args.confirm)?;
    let parsed = parse_csv(
        &data,
        &CsvOptions {
            default_platform: ctx.platform.clone(),
            today: today_local(),
        },
    )
    .with_context(|| "parse csv")?;

    if args.dry_run {
        if ctx.json {
            return print_json(&parsed);
        }
        println!(
            "Parsed {} records, skipped {} rows (dry run)",
            parsed.entries.len(),
            parsed.skipped.len()
        );
        for entry in &parsed.entries {
            let record = &entry.record;
            println!(
                "  row {}: {} {} [{}] {}",
                entry.row,
                format_date(record.sent_date),
                record.email,
                record.platform,
                record.subject.as_deref().unwrap_or("(no subject)")
            );
        }
        for skipped in &parsed.skipped {
            println!("  row {}: skipped, invalid email {:?}", skipped.row, skipped.email);
        }
        print_list("Warnings:", &parsed.warnings);
        return Ok(());
    }

    let backend = ctx.backend()?;
    let report = import_parsed(
        &backend,
        parsed,
        BatchOptions {
            scope: ctx.scope.as_ref(),
            confirmations: &confirmations,
        },
    );

    if ctx.json {
        return print_json(&report);
    }

    println!(
        "Import complete: saved {}, skipped {}, pending {} (created {} contacts)",
        report.saved,
        report.skipped,
        report.pending.len(),
        report.created_contacts
    );
    print_list("Errors:", &report.errors);
    print_list("Warnings:", &report.warnings);
    if !report.pending.is_empty() {
        println!("Needs confirmation:");
        for pending in &report.pending {
            println!("- row {}: {}", pending.row, pending.email);
            for candidate in &pending.candidates {
                println!("    {}", contact_line(candidate));
            }
        }
        println!("Re-run with --confirm <email>=<contact-id> to attach these rows.");
    }
    Ok(())
}

fn parse_confirmations(raw: &[String]) -> Result<Confirmations> {
    let mut confirmations = Confirmations::new();
    for pair in raw {
        let (email, id) = pair
            .split_once('=')
            .ok_or_else(|| invalid_input(format!("invalid --confirm {pair:?}: expected EMAIL=ID")))?;
        let id = parse_contact_id(id)?;
        confirmations.insert(email, id)?;
    }
    Ok(confirmations)
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}", title);
    for item in items {
        println!("- {}", item);
    }
}
