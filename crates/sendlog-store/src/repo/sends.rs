use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use sendlog_core::domain::{ContactId, LoggedSend, OffPlatformSend, Platform, SendId};
use sendlog_core::time::{format_date, parse_iso_date};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct SendNew {
    pub contact_id: ContactId,
    pub send: OffPlatformSend,
}

pub struct SendsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> SendsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn record(&self, now_utc: i64, input: SendNew) -> Result<LoggedSend> {
        let exists: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM contacts WHERE id = ?1;",
                [input.contact_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(StoreError::NotFound(format!("contact {}", input.contact_id)));
        }

        let logged = LoggedSend {
            id: SendId::new(),
            contact_id: input.contact_id,
            created_at: now_utc,
            send: input.send,
        };
        self.conn.execute(
            "INSERT INTO off_platform_sends (id, contact_id, sent_date, subject, body, platform, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                logged.id.as_str(),
                logged.contact_id.as_str(),
                format_date(logged.send.sent_date),
                logged.send.subject,
                logged.send.body,
                logged.send.platform.as_str(),
                logged.send.notes,
                logged.created_at,
            ],
        )?;
        Ok(logged)
    }

    /// Newest sends first.
    pub fn list_for_contact(
        &self,
        contact_id: &ContactId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LoggedSend>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_id, sent_date, subject, body, platform, notes, created_at
             FROM off_platform_sends
             WHERE contact_id = ?1
             ORDER BY sent_date DESC, created_at DESC, id ASC
             LIMIT ?2 OFFSET ?3;",
        )?;
        let mut rows = stmt.query(params![contact_id.as_str(), limit, offset])?;
        let mut sends = Vec::new();
        while let Some(row) = rows.next()? {
            sends.push(send_from_row(row)?);
        }
        Ok(sends)
    }

    pub fn list_all(&self) -> Result<Vec<LoggedSend>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_id, sent_date, subject, body, platform, notes, created_at
             FROM off_platform_sends
             ORDER BY sent_date ASC, created_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut sends = Vec::new();
        while let Some(row) = rows.next()? {
            sends.push(send_from_row(row)?);
        }
        Ok(sends)
    }
}

fn send_from_row(row: &rusqlite::Row<'_>) -> Result<LoggedSend> {
    let id_str: String = row.get(0)?;
    let id = SendId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let contact_str: String = row.get(1)?;
    let contact_id =
        ContactId::from_str(&contact_str).map_err(|_| StoreError::InvalidId(contact_str.clone()))?;
    let date_str: String = row.get(2)?;
    let sent_date =
        parse_iso_date(&date_str).map_err(|_| StoreError::InvalidDate(date_str.clone()))?;
    let platform_str: String = row.get(5)?;
    let platform = Platform::from_str(&platform_str)?;
    Ok(LoggedSend {
        id,
        contact_id,
        created_at: row.get(7)?,
        send: OffPlatformSend {
            sent_date,
            subject: row.get(3)?,
            body: row.get(4)?,
            platform,
            notes: row.get(6)?,
        },
    })
}
