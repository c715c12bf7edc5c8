use crate::commands::{print_json, Context};
use crate::util::contact_line;
use anyhow::Result;
use clap::Args;
use sendlog_core::domain::MatchResult;
use sendlog_ingest::resolve_match;

#[derive(Debug, Args)]
pub struct LookupArgs {
    pub email: String,
}

pub fn lookup(ctx: &Context<'_>, args: LookupArgs) -> Result<()> {
    let backend = ctx.backend()?;
    let result = resolve_match(&backend, &args.email, ctx.scope.as_ref())?;

    if ctx.json {
        return print_json(&result);
    }
    match &result {
        MatchResult::ExactMatch { contact } => {
            println!("exact match: {}", contact_line(contact));
        }
        MatchResult::FuzzyMatch { .. } | MatchResult::MultipleFuzzyMatches { .. } => {
            println!("same-domain suggestions (confirmation required):");
            for contact in result.candidates() {
                println!("  {}", contact_line(contact));
            }
        }
        MatchResult::NoMatch => match &ctx.scope {
            Some(scope) => println!("no match; a new contact would be created in {}", scope),
            None => println!("no match; set a company scope to create new contacts"),
        },
    }
    Ok(())
}
