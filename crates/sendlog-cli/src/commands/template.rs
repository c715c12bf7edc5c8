use crate::commands::print_json;
use anyhow::{anyhow, Context as _, Result};
use clap::{Args, Subcommand};
use sendlog_ingest::csv_template;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    /// Write the CSV import template
    Csv(TemplateCsvArgs),
}

#[derive(Debug, Args)]
pub struct TemplateCsvArgs {
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TemplateReport {
    format: &'static str,
    output: String,
}

pub fn run(cmd: TemplateCommand, json: bool) -> Result<()> {
    match cmd {
        TemplateCommand::Csv(args) => write_csv_template(args, json),
    }
}

fn write_csv_template(args: TemplateCsvArgs, json: bool) -> Result<()> {
    let template = csv_template()?;
    let Some(path) = args.out else {
        if json {
            return Err(anyhow!("--json requires --out for template commands"));
        }
        print!("{}", template);
        return Ok(());
    };

    fs::write(&path, template)
        .with_context(|| format!("write template file {}", path.display()))?;
    if json {
        print_json(&TemplateReport {
            format: "csv",
            output: path.display().to_string(),
        })
    } else {
        println!("Wrote CSV template to {}", path.display());
        Ok(())
    }
}
