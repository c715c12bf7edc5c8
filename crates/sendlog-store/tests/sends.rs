use chrono::NaiveDate;
use sendlog_core::domain::{ContactId, OffPlatformSend, Platform};
use sendlog_store::error::StoreErrorKind;
use sendlog_store::repo::{ContactNew, SendNew};
use sendlog_store::Store;

fn send(date: (i32, u32, u32), subject: &str) -> OffPlatformSend {
    OffPlatformSend {
        sent_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("date"),
        subject: Some(subject.to_string()),
        body: Some("Hi John,\n\nLet's meet.".to_string()),
        platform: Platform::Outlook,
        notes: None,
    }
}

#[test]
fn record_and_list_sends_newest_first() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");

    let now = 1_700_000_000;
    let contact = store
        .contacts()
        .create(
            now,
            ContactNew {
                email: "john@acme.com".to_string(),
                ..Default::default()
            },
        )
        .expect("create contact");

    store
        .sends()
        .record(
            now,
            SendNew {
                contact_id: contact.id.clone(),
                send: send((2024, 3, 5), "First"),
            },
        )
        .expect("record");
    store
        .sends()
        .record(
            now + 1,
            SendNew {
                contact_id: contact.id.clone(),
                send: send((2024, 4, 1), "Second"),
            },
        )
        .expect("record");

    let list = store
        .sends()
        .list_for_contact(&contact.id, 10, 0)
        .expect("list");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].send.subject.as_deref(), Some("Second"));
    assert_eq!(list[1].send.body.as_deref(), Some("Hi John,\n\nLet's meet."));
    assert_eq!(list[1].send.platform, Platform::Outlook);

    let all = store.sends().list_all().expect("list all");
    assert_eq!(all[0].send.subject.as_deref(), Some("First"));
}

#[test]
fn record_for_unknown_contact_is_not_found() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");

    let err = store
        .sends()
        .record(
            1,
            SendNew {
                contact_id: ContactId::new(),
                send: send((2024, 3, 5), "Orphan"),
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
}
