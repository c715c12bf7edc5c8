use crate::error::{Result, StoreError};
use sendlog_core::domain::{
    email_domain, is_plausible_email, normalize_email, CompanyScope, Contact, ContactDraft,
    ContactId,
};
use sendlog_core::CoreError;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

const CONTACT_COLUMNS: &str = "id, company_scope, first_name, last_name, email, title, company_name, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct ContactNew {
    pub company_scope: Option<CompanyScope>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub title: Option<String>,
    pub company_name: Option<String>,
}

impl From<ContactDraft> for ContactNew {
    fn from(draft: ContactDraft) -> Self {
        Self {
            company_scope: Some(draft.company_scope),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            title: None,
            company_name: None,
        }
    }
}

/// A contact row with the bookkeeping columns the domain type leaves out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContact {
    pub contact: Contact,
    pub company_scope: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub struct ContactsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ContactsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: ContactNew) -> Result<Contact> {
        if !is_plausible_email(&input.email) {
            return Err(CoreError::InvalidEmail(input.email).into());
        }
        let email = normalize_email(&input.email).ok_or(CoreError::EmptyEmail)?;
        let domain = email_domain(&email).ok_or_else(|| CoreError::InvalidEmail(email.clone()))?;

        if self.exists_in_scope(&email, input.company_scope.as_ref())? {
            return Err(StoreError::DuplicateEmail(email));
        }

        let contact = Contact {
            id: ContactId::new(),
            first_name: clean(input.first_name),
            last_name: clean(input.last_name),
            email,
            title: clean(input.title),
            company_name: clean(input.company_name),
        };

        self.conn.execute(
            "INSERT INTO contacts (id, company_scope, first_name, last_name, email, email_domain, title, company_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9);",
            params![
                contact.id.as_str(),
                input.company_scope.as_ref().map(CompanyScope::as_str),
                contact.first_name,
                contact.last_name,
                contact.email,
                domain,
                contact.title,
                contact.company_name,
                now_utc,
            ],
        )?;
        Ok(contact)
    }

    pub fn get(&self, id: &ContactId) -> Result<Option<StoredContact>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1;"
        ))?;
        let mut rows = stmt.query([id.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(stored_contact_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Exact lookup on the normalized address. Without a scope every
    /// contact is visible.
    pub fn find_by_email(
        &self,
        email: &str,
        scope: Option<&CompanyScope>,
    ) -> Result<Option<Contact>> {
        let Some(email) = normalize_email(email) else {
            return Ok(None);
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS}
             FROM contacts
             WHERE email = ?1 AND (?2 IS NULL OR company_scope = ?2)
             ORDER BY created_at ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![email, scope.map(CompanyScope::as_str)])?;
        match rows.next()? {
            Some(row) => Ok(Some(stored_contact_from_row(row)?.contact)),
            None => Ok(None),
        }
    }

    pub fn list_by_domain(
        &self,
        domain: &str,
        scope: Option<&CompanyScope>,
    ) -> Result<Vec<Contact>> {
        let domain = domain.trim().trim_start_matches('@').to_ascii_lowercase();
        if domain.is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS}
             FROM contacts
             WHERE email_domain = ?1 AND (?2 IS NULL OR company_scope = ?2)
             ORDER BY last_name COLLATE NOCASE ASC, first_name COLLATE NOCASE ASC, email ASC;"
        ))?;
        let rows = stmt.query(params![domain, scope.map(CompanyScope::as_str)])?;
        collect_contacts(rows)
    }

    pub fn list(&self, scope: Option<&CompanyScope>) -> Result<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS}
             FROM contacts
             WHERE (?1 IS NULL OR company_scope = ?1)
             ORDER BY last_name COLLATE NOCASE ASC, first_name COLLATE NOCASE ASC, email ASC;"
        ))?;
        let rows = stmt.query(params![scope.map(CompanyScope::as_str)])?;
        collect_contacts(rows)
    }

    fn exists_in_scope(&self, email: &str, scope: Option<&CompanyScope>) -> Result<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM contacts WHERE email = ?1 AND IFNULL(company_scope, '') = ?2;",
                params![email, scope.map(CompanyScope::as_str).unwrap_or("")],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn collect_contacts(mut rows: rusqlite::Rows<'_>) -> Result<Vec<Contact>> {
    let mut contacts = Vec::new();
    while let Some(row) = rows.next()? {
        contacts.push(stored_contact_from_row(row)?.contact);
    }
    Ok(contacts)
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn stored_contact_from_row(row: &rusqlite::Row<'_>) -> Result<StoredContact> {
    let id_str: String = row.get(0)?;
    let id = ContactId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    Ok(StoredContact {
        contact: Contact {
            id,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            email: row.get(4)?,
            title: row.get(5)?,
            company_name: row.get(6)?,
        },
        company_scope: row.get(1)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
