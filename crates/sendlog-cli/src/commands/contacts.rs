use crate::commands::{print_json, Context, DEFAULT_SEND_LIMIT};
use crate::error::{invalid_input, not_found};
use crate::util::{contact_line, format_timestamp_datetime, parse_contact_id};
use anyhow::Result;
use clap::Args;
use sendlog_core::dto::ContactDetailDto;
use sendlog_core::time::{format_date, now_utc};
use sendlog_store::repo::ContactNew;

#[derive(Debug, Args)]
pub struct AddContactArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only contacts whose address is at this domain
    #[arg(long)]
    pub domain: Option<String>,
}

pub fn add_contact(ctx: &Context<'_>, args: AddContactArgs) -> Result<()> {
    if !args.email.contains('@') {
        return Err(invalid_input(format!("invalid email address: {:?}", args.email)));
    }
    let contact = ctx.store.contacts().create(
        now_utc(),
        ContactNew {
            company_scope: ctx.scope.clone(),
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            title: args.title,
            company_name: args.company,
        },
    )?;

    if ctx.json {
        print_json(&contact)?;
    } else {
        println!("created {} {}", contact.id, contact.display_name());
    }
    Ok(())
}

pub fn show_contact(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let id = parse_contact_id(&args.id)?;
    let stored = ctx
        .store
        .contacts()
        .get(&id)?
        .ok_or_else(|| not_found("contact not found"))?;
    let sends = ctx
        .store
        .sends()
        .list_for_contact(&id, DEFAULT_SEND_LIMIT, 0)?;

    let detail = ContactDetailDto {
        contact: stored.contact,
        company_scope: stored.company_scope,
        created_at: stored.created_at,
        sends,
    };

    if ctx.json {
        print_json(&detail)?;
        return Ok(());
    }

    let contact = &detail.contact;
    println!("id: {}", contact.id);
    println!("name: {}", contact.display_name());
    println!("email: {}", contact.email);
    if let Some(title) = contact.title.as_deref() {
        println!("title: {}", title);
    }
    if let Some(company) = contact.company_name.as_deref() {
        println!("company: {}", company);
    }
    if let Some(scope) = detail.company_scope.as_deref() {
        println!("company_scope: {}", scope);
    }
    println!(
        "created_at: {}",
        format_timestamp_datetime(detail.created_at)
    );

    if detail.sends.is_empty() {
        println!("sends: none");
    } else {
        println!("sends:");
        for logged in &detail.sends {
            let send = &logged.send;
            let subject = send.subject.as_deref().unwrap_or("(no subject)");
            println!(
                "  {} [{}] {}",
                format_date(send.sent_date),
                send.platform,
                subject
            );
        }
    }
    Ok(())
}

pub fn list_contacts(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let contacts = ctx.store.contacts();
    let contacts = match args.domain.as_deref() {
        Some(domain) => contacts.list_by_domain(domain, ctx.scope.as_ref())?,
        None => contacts.list(ctx.scope.as_ref())?,
    };

    if ctx.json {
        return print_json(&contacts);
    }
    if contacts.is_empty() {
        println!("no contacts");
    }
    for contact in &contacts {
        println!("{}", contact_line(contact));
    }
    Ok(())
}
