use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::{contact_line, parse_contact_id, parse_sent_date_arg, read_input};
use anyhow::Result;
use clap::Args;
use sendlog_core::domain::{ContactId, NormalizedEmailRecord};
use sendlog_core::time::today_local;
use sendlog_ingest::{parse_email_blob, BlobRecordOptions, ContactBackend, LogSession, SessionState};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Args)]
pub struct LogEmailArgs {
    /// File holding the pasted email (stdin when omitted)
    pub file: Option<PathBuf>,
    /// Recipient address when the paste has no usable To: header
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Contact id chosen from the suggested matches
    #[arg(long)]
    pub confirm: Option<String>,
    /// Print the parsed email without resolving or saving it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct LogSendArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub subject: Option<String>,
    #[arg(long)]
    pub body: Option<String>,
    /// Date sent (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Contact id chosen from the suggested matches
    #[arg(long)]
    pub confirm: Option<String>,
}

pub fn log_email(ctx: &Context<'_>, args: LogEmailArgs) -> Result<()> {
    let data = read_input(args.file.as_deref())?;
    let parsed = parse_email_blob(&data);
    if args.dry_run {
        if ctx.json {
            return print_json(&parsed);
        }
        print_field("from", parsed.from.as_deref());
        print_field("from_email", parsed.from_email.as_deref());
        print_field("to", parsed.to.as_deref());
        print_field("to_email", parsed.to_email.as_deref());
        let sent = parsed.sent.as_ref().map(|sent| sent.as_text());
        print_field("sent", sent.as_deref());
        print_field("subject", parsed.subject.as_deref());
        println!("body:\n{}", parsed.body);
        return Ok(());
    }
    if let Some(raw) = parsed.unparsed_sent() {
        warn!(sent = raw, "unreadable Sent: header, logging with today's date");
    }

    let confirm = parse_confirm(args.confirm.as_deref())?;
    let options = BlobRecordOptions {
        platform: ctx.platform.clone(),
        notes: args.notes,
        today: today_local(),
        recipient_override: args.to,
    };
    let mut session = LogSession::new(ctx.backend()?, ctx.scope.clone());
    session.load_blob(&data, &options)?;
    finish(ctx, &mut session, confirm)
}

pub fn log_send(ctx: &Context<'_>, args: LogSendArgs) -> Result<()> {
    if !args.email.contains('@') {
        return Err(invalid_input(format!("invalid email address: {:?}", args.email)));
    }
    let confirm = parse_confirm(args.confirm.as_deref())?;
    let record = NormalizedEmailRecord {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        subject: args.subject,
        body: args.body,
        sent_date: parse_sent_date_arg(args.date.as_deref())?,
        platform: ctx.platform.clone(),
        notes: args.notes,
    };

    let mut session = LogSession::new(ctx.backend()?, ctx.scope.clone());
    session.load_record(record)?;
    finish(ctx, &mut session, confirm)
}

fn parse_confirm(raw: Option<&str>) -> Result<Option<ContactId>> {
    raw.map(parse_contact_id).transpose()
}

/// Applies any confirmation, then saves. A match still waiting on the user
/// is reported as a prompt, not an error.
fn finish<B: ContactBackend>(
    ctx: &Context<'_>,
    session: &mut LogSession<B>,
    confirm: Option<ContactId>,
) -> Result<()> {
    if let Some(id) = confirm {
        if matches!(session.state(), SessionState::AwaitingConfirmation { .. }) {
            session.confirm(id)?;
        }
    }
    if !matches!(session.state(), SessionState::AwaitingConfirmation { .. }) {
        session.save()?;
    }

    let state = session.state();
    if ctx.json {
        return print_json(state);
    }
    match state {
        SessionState::AwaitingConfirmation { record, result } => {
            println!(
                "{} has no exact match; {} same-domain contact(s) found:",
                record.email,
                result.candidates().len()
            );
            for contact in result.candidates() {
                println!("  {}", contact_line(contact));
            }
            println!("Re-run with --confirm <contact-id> to log against one of them.");
        }
        SessionState::Saved {
            contact,
            created_contact,
        } => {
            if *created_contact {
                println!("created contact {}", contact_line(contact));
            }
            println!("logged send for {}", contact_line(contact));
        }
        other => println!("{}", other.label()),
    }
    Ok(())
}

fn print_field(name: &str, value: Option<&str>) {
    println!("{}: {}", name, value.unwrap_or("-"));
}
