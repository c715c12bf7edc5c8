use crate::backend::{ContactBackend, Lookup};
use crate::error::BackendError;
use sendlog_core::domain::{CompanyScope, Contact, ContactDraft, ContactId, OffPlatformSend};

#[cfg(feature = "remote")]
mod imp {
    use super::{BackendError, CompanyScope, Contact, ContactBackend, ContactDraft, ContactId};
    use super::{Lookup, OffPlatformSend};
    use reqwest::blocking::{Client, RequestBuilder, Response};
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use std::str::FromStr;
    use url::Url;

    /// Contact store reached over JSON/HTTP. No request timeout is set here;
    /// whatever the transport applies is what callers get.
    #[derive(Debug, Clone)]
    pub struct HttpBackend {
        base: Url,
        api_token: Option<String>,
        client: Client,
    }

    impl HttpBackend {
        pub fn new(base_url: &str, api_token: Option<String>) -> Result<Self, BackendError> {
            let base = Url::parse(base_url)
                .map_err(|err| BackendError::Transport(format!("invalid base url: {err}")))?;
            if base.cannot_be_a_base() {
                return Err(BackendError::Transport(format!(
                    "invalid base url: {base_url}"
                )));
            }
            let client = Client::builder()
                .user_agent(concat!("sendlog/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(transport)?;
            Ok(Self {
                base,
                api_token,
                client,
            })
        }

        fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
            let mut url = self.base.clone();
            url.path_segments_mut()
                .map_err(|_| BackendError::Transport(format!("invalid base url: {}", self.base)))?
                .pop_if_empty()
                .extend(segments);
            Ok(url)
        }

        fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
            let request = match &self.api_token {
                Some(token) => request.bearer_auth(token),
                None => request,
            };
            let response = request
                .header("Accept", "application/json")
                .send()
                .map_err(transport)?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }
            let message = response
                .text()
                .map(|text| text.trim().to_string())
                .ok()
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| status.to_string());
            if status.is_server_error() {
                Err(BackendError::Server {
                    status: status.as_u16(),
                    message,
                })
            } else {
                Err(BackendError::Rejected {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    impl ContactBackend for HttpBackend {
        fn backend_name(&self) -> &'static str {
            "remote"
        }

        fn find_contact_by_email(
            &self,
            email: &str,
            scope: Option<&CompanyScope>,
        ) -> Result<Lookup, BackendError> {
            let mut url = self.endpoint(&["contacts", "find-by-email"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("email", email);
                if let Some(scope) = scope {
                    query.append_pair("companyId", scope.as_str());
                }
            }

            let response = match self.send(self.client.get(url)) {
                Ok(response) => response,
                Err(BackendError::Rejected { status: 404, .. }) => {
                    return Ok(Lookup::Fuzzy(Vec::new()))
                }
                Err(err) => return Err(err),
            };
            let found: FindResponse = decode(response)?;
            found.into_lookup()
        }

        fn create_contact(&self, draft: &ContactDraft) -> Result<Contact, BackendError> {
            let url = self.endpoint(&["contacts"])?;
            let body = CreateContactRequest {
                email: &draft.email,
                first_name: draft.first_name.as_deref(),
                last_name: draft.last_name.as_deref(),
                company_scope_id: draft.company_scope.as_str(),
            };
            let created: CreateContactResponse = decode(self.send(self.client.post(url).json(&body))?)?;
            created.contact.into_contact()
        }

        fn record_off_platform_send(
            &self,
            contact_id: &ContactId,
            send: &OffPlatformSend,
        ) -> Result<(), BackendError> {
            let url = self.endpoint(&["contacts", contact_id.as_str(), "off-platform-sends"])?;
            let response = self.send(self.client.post(url).json(send))?;
            let status = response.status().as_u16();
            let ack: SuccessResponse = decode(response)?;
            if ack.success {
                Ok(())
            } else {
                Err(BackendError::Rejected {
                    status,
                    message: ack
                        .message
                        .unwrap_or_else(|| "send was not recorded".to_string()),
                })
            }
        }
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct CreateContactRequest<'a> {
        email: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        first_name: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_name: Option<&'a str>,
        company_scope_id: &'a str,
    }

    #[derive(Debug, Deserialize)]
    struct CreateContactResponse {
        contact: WireContact,
    }

    #[derive(Debug, Deserialize)]
    struct SuccessResponse {
        success: bool,
        #[serde(default)]
        message: Option<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct FindResponse {
        exact: bool,
        contact: Option<WireContact>,
        candidates: Vec<WireContact>,
    }

    impl FindResponse {
        fn into_lookup(self) -> Result<Lookup, BackendError> {
            if self.exact {
                if let Some(contact) = self.contact {
                    return Ok(Lookup::Exact(contact.into_contact()?));
                }
            }
            let mut candidates = self
                .candidates
                .into_iter()
                .map(WireContact::into_contact)
                .collect::<Result<Vec<_>, _>>()?;
            if candidates.is_empty() {
                if let Some(contact) = self.contact {
                    candidates.push(contact.into_contact()?);
                }
            }
            Ok(Lookup::Fuzzy(candidates))
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct WireContact {
        id: Value,
        #[serde(default)]
        first_name: Option<String>,
        #[serde(default)]
        last_name: Option<String>,
        email: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        company_name: Option<String>,
    }

    impl WireContact {
        fn into_contact(self) -> Result<Contact, BackendError> {
            let raw_id = match &self.id {
                Value::String(id) => id.clone(),
                Value::Number(id) => id.to_string(),
                other => {
                    return Err(BackendError::Transport(format!(
                        "unexpected contact id: {other}"
                    )))
                }
            };
            let id = ContactId::from_str(&raw_id)
                .map_err(|_| BackendError::Transport(format!("unexpected contact id: {raw_id}")))?;
            Ok(Contact {
                id,
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                title: self.title,
                company_name: self.company_name,
            })
        }
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let text = response.text().map_err(transport)?;
        serde_json::from_str(&text)
            .map_err(|err| BackendError::Transport(format!("invalid response body: {err}")))
    }

    fn transport(err: reqwest::Error) -> BackendError {
        BackendError::Transport(err.to_string())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;
        use sendlog_core::domain::Platform;
        use std::io::{Read, Write};
        use std::net::TcpListener;
        use std::thread::{self, JoinHandle};

        /// Answers a single request with `status` and `body`, handing back
        /// the raw request text.
        fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base = format!("http://{}/api", listener.local_addr().unwrap());
            let handle = thread::spawn(move || {
                let (mut stream, _) = listener.accept().unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    let read = stream.read(&mut buf).unwrap();
                    if read == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..read]);
                    let text = String::from_utf8_lossy(&request);
                    if let Some(head_end) = text.find("\r\n\r\n") {
                        let length = text[..head_end]
                            .lines()
                            .find_map(|line| {
                                let (name, value) = line.split_once(':')?;
                                name.eq_ignore_ascii_case("content-length")
                                    .then(|| value.trim().parse::<usize>().ok())
                                    .flatten()
                            })
                            .unwrap_or(0);
                        if request.len() >= head_end + 4 + length {
                            break;
                        }
                    }
                }
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).unwrap();
                String::from_utf8_lossy(&request).into_owned()
            });
            (base, handle)
        }

        fn send() -> OffPlatformSend {
            OffPlatformSend {
                sent_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                subject: Some("Intro".to_string()),
                body: None,
                platform: Platform::Linkedin,
                notes: None,
            }
        }

        #[test]
        fn exact_lookup_sends_scope_and_token() {
            let (base, handle) = serve_once(
                "200 OK",
                r#"{"exact":true,"contact":{"id":42,"firstName":"Jane","email":"jane@acme.com"}}"#,
            );
            let backend = HttpBackend::new(&base, Some("secret".to_string())).unwrap();
            let scope = CompanyScope::new("acme").unwrap();

            let lookup = backend
                .find_contact_by_email("jane@acme.com", Some(&scope))
                .unwrap();
            let Lookup::Exact(contact) = lookup else {
                panic!("expected exact match, got {lookup:?}");
            };
            assert_eq!(contact.id.as_str(), "42");
            assert_eq!(contact.first_name.as_deref(), Some("Jane"));

            let request = handle.join().unwrap();
            assert!(request.starts_with(
                "GET /api/contacts/find-by-email?email=jane%40acme.com&companyId=acme "
            ));
            assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"));
        }

        #[test]
        fn fuzzy_lookup_returns_candidates() {
            let (base, handle) = serve_once(
                "200 OK",
                r#"{"exact":false,"fuzzy":true,"candidates":[{"id":"a","email":"amy@acme.com"},{"id":"b","email":"bob@acme.com"}]}"#,
            );
            let backend = HttpBackend::new(&base, None).unwrap();
            let lookup = backend.find_contact_by_email("new@acme.com", None).unwrap();
            handle.join().unwrap();
            let Lookup::Fuzzy(candidates) = lookup else {
                panic!("expected fuzzy candidates, got {lookup:?}");
            };
            let emails: Vec<_> = candidates.iter().map(|c| c.email.as_str()).collect();
            assert_eq!(emails, vec!["amy@acme.com", "bob@acme.com"]);
        }

        #[test]
        fn server_errors_are_classified() {
            let (base, handle) = serve_once("503 Service Unavailable", r#"{"error":"down"}"#);
            let backend = HttpBackend::new(&base, None).unwrap();
            let err = backend
                .record_off_platform_send(&ContactId::from_str("7").unwrap(), &send())
                .unwrap_err();
            let request = handle.join().unwrap();
            assert!(request.starts_with("POST /api/contacts/7/off-platform-sends "));
            assert!(request.contains(r#""sentDate":"2024-03-05""#));
            assert!(err.is_server_error());
        }

        #[test]
        fn unsuccessful_ack_is_rejected() {
            let (base, handle) = serve_once("200 OK", r#"{"success":false,"message":"locked"}"#);
            let backend = HttpBackend::new(&base, None).unwrap();
            let err = backend
                .record_off_platform_send(&ContactId::from_str("7").unwrap(), &send())
                .unwrap_err();
            handle.join().unwrap();
            assert_eq!(
                err,
                BackendError::Rejected {
                    status: 200,
                    message: "locked".to_string()
                }
            );
        }

        #[test]
        fn create_contact_posts_camel_case_draft() {
            let (base, handle) = serve_once(
                "201 Created",
                r#"{"contact":{"id":"c-1","email":"new@acme.com","lastName":"New"}}"#,
            );
            let backend = HttpBackend::new(&base, None).unwrap();
            let draft = ContactDraft::new(
                "New@Acme.com",
                None,
                Some("New"),
                CompanyScope::new("acme").unwrap(),
            )
            .unwrap();
            let contact = backend.create_contact(&draft).unwrap();
            let request = handle.join().unwrap();
            assert!(request.starts_with("POST /api/contacts "));
            assert!(request.contains(r#""companyScopeId":"acme""#));
            assert!(request.contains(r#""email":"new@acme.com""#));
            assert!(!request.contains("firstName"));
            assert_eq!(contact.id.as_str(), "c-1");
        }
    }
}

#[cfg(not(feature = "remote"))]
mod imp {
    use super::{BackendError, CompanyScope, Contact, ContactBackend, ContactDraft, ContactId};
    use super::{Lookup, OffPlatformSend};

    #[derive(Debug, Clone)]
    pub struct HttpBackend {
        base_url: String,
        api_token: Option<String>,
    }

    impl HttpBackend {
        pub fn new(base_url: &str, api_token: Option<String>) -> Result<Self, BackendError> {
            Ok(Self {
                base_url: base_url.to_string(),
                api_token,
            })
        }

        fn unavailable(&self) -> BackendError {
            let _ = (&self.base_url, &self.api_token);
            BackendError::Unavailable(
                "the remote backend requires the remote feature".to_string(),
            )
        }
    }

    impl ContactBackend for HttpBackend {
        fn backend_name(&self) -> &'static str {
            "remote"
        }

        fn find_contact_by_email(
            &self,
            _email: &str,
            _scope: Option<&CompanyScope>,
        ) -> Result<Lookup, BackendError> {
            Err(self.unavailable())
        }

        fn create_contact(&self, _draft: &ContactDraft) -> Result<Contact, BackendError> {
            Err(self.unavailable())
        }

        fn record_off_platform_send(
            &self,
            _contact_id: &ContactId,
            _send: &OffPlatformSend,
        ) -> Result<(), BackendError> {
            Err(self.unavailable())
        }
    }
}

pub use imp::HttpBackend;
