//! HTTP client implementation for the darshan booking backend.
//!
//! This module provides a reqwest-based implementation of the
//! [`BookingClient`](crate::BookingClient) trait. All role-specific methods go
//! through one generic call; the role tables in [`crate::endpoints`] decide
//! the path and verb.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE, SET_COOKIE};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use crate::config::Config;
use crate::endpoints::{LOGIN_PATH, LOGOUT_PATH, Operation, Role, SlotBook, Verb};
use crate::models::{AppointmentFilter, LoginResponse};
use crate::observability::{Outcome, record_request};
use crate::session::Session;
use crate::{BookingClient, BookingError};

const BODY_SNIPPET_CHARS: usize = 256;

/// Client for the booking backend using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestBookingClient {
    base_url: String,
    role: Role,
    session: Session,
    client: reqwest::Client,
}

impl ReqwestBookingClient {
    /// Create a new client instance with an empty session.
    ///
    /// # Arguments
    /// * `base_url` - Origin of the Frappe site (e.g. "https://booking.example.org")
    /// * `role` - Which profile's method family to call
    pub fn new(base_url: &str, role: Role) -> Self {
        Self::with_session(base_url, role, Session::new())
    }

    /// Create a client sharing an existing session.
    pub fn with_session(base_url: &str, role: Role, session: Session) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            role,
            session,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_base, config.role)
    }

    /// Same backend and session, acting as another role.
    pub fn as_role(&self, role: Role) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Build a request carrying the session cookie, if any.
    async fn request(&self, verb: Verb, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .client
            .request(verb.into(), url)
            .header(ACCEPT, "application/json");
        if let Some(cookie) = self.session.cookie_header().await {
            req = req.header(COOKIE, cookie);
        }
        req
    }

    /// Send a request and return the decoded body.
    ///
    /// GET bodies are sent as query parameters, POST bodies as JSON.
    async fn call(&self, verb: Verb, path: &str, body: Option<&Value>) -> Result<Value, BookingError> {
        let endpoint = endpoint_name(path);
        let mut req = self.request(verb, path).await;
        if let Some(body) = body {
            req = match verb {
                Verb::Get => req.query(&query_pairs(body)),
                Verb::Post => req.json(body),
            };
        }

        tracing::debug!(?verb, endpoint, "darshan request");
        let resp = send(req, endpoint).await?;

        self.handle_response(resp).await.inspect_err(|e| {
            tracing::error!(endpoint, error = %e, "darshan call failed");
        })
    }

    /// Call a method of the client's role and unwrap Frappe's `message` envelope.
    async fn call_role(&self, op: Operation, body: Option<Value>) -> Result<Value, BookingError> {
        let Some(verb) = self.role.verb(op) else {
            record_request(op.method_name(), Outcome::Rejected);
            return Err(BookingError::InvalidInput(format!(
                "role {} cannot call {op}",
                self.role
            )));
        };
        let body = self
            .call(verb, &self.role.method_path(op), body.as_ref())
            .await?;
        Ok(unwrap_message(body))
    }

    /// Handle a response, converting status codes and server exceptions to errors.
    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, BookingError> {
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        // Read body as text first so decode errors can show what came back.
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let body: Value = serde_json::from_str(&text).map_err(|e| {
            BookingError::Decode(format!("{e} - body: {}", snippet(&text)))
        })?;
        if let Some(exc) = server_exception(&body) {
            return Err(BookingError::Frappe(exc));
        }
        Ok(body)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> BookingError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        BookingError::from_status(status, snippet(&body))
    }
}

/// Send a request, counting the outcome and logging transport failures.
async fn send(
    req: reqwest::RequestBuilder,
    endpoint: &str,
) -> Result<reqwest::Response, BookingError> {
    let resp = req.send().await.map_err(|e| {
        record_request(endpoint, Outcome::Transport);
        tracing::error!(endpoint, error = %e, "request failed");
        BookingError::Http(e)
    })?;
    record_request(endpoint, Outcome::from_status(resp.status().as_u16()));
    Ok(resp)
}

/// Phone numbers go out as JSON numbers, the way the OTP and registration
/// methods expect them. Anything that would not survive that (leading zero,
/// `+`, too long) is sent as a string.
fn phone_value(phone: &str) -> Value {
    let phone = phone.trim();
    match phone.parse::<u64>() {
        Ok(n) if !phone.starts_with('0') => Value::from(n),
        _ => Value::from(phone),
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

/// Last dotted segment of a method path, used as the metrics label.
fn endpoint_name(path: &str) -> &str {
    path.rsplit(['.', '/']).next().unwrap_or(path)
}

fn unwrap_message(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("message") => {
            map.remove("message").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Frappe reports server-side exceptions in a 200 body via `exc_type` / `exc`.
fn server_exception(body: &Value) -> Option<String> {
    if let Some(kind) = body.get("exc_type").and_then(Value::as_str) {
        return Some(kind.to_string());
    }
    body.get("exc")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(snippet)
}

/// Flatten a JSON object into query pairs, skipping nulls.
fn query_pairs(body: &Value) -> Vec<(String, String)> {
    let Some(obj) = body.as_object() else {
        return Vec::new();
    };
    obj.iter()
        .filter_map(|(k, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((k.clone(), s.clone())),
            other => Some((k.clone(), other.to_string())),
        })
        .collect()
}

#[async_trait]
impl BookingClient for ReqwestBookingClient {
    async fn login(
        &self,
        phone: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, BookingError> {
        let body = json!({ "usr": phone, "pwd": password.expose_secret() });
        let req = self.request(Verb::Post, LOGIN_PATH).await.json(&body);
        let resp = send(req, endpoint_name(LOGIN_PATH)).await?;
        let set_cookies: Vec<String> = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();

        let body = self.handle_response(resp).await.inspect_err(|e| {
            tracing::error!(error = %e, "login failed");
        })?;
        if !self.session.capture(set_cookies.iter().map(String::as_str)).await {
            tracing::warn!("login succeeded without a session cookie");
        }
        let login: LoginResponse =
            serde_json::from_value(body).map_err(|e| BookingError::Decode(e.to_string()))?;
        tracing::info!(role = %self.role, "logged in");
        Ok(login)
    }

    async fn logout(&self) -> Result<(), BookingError> {
        let result = self.call(Verb::Post, LOGOUT_PATH, None).await;
        self.session.clear().await;
        result.map(|_| ())
    }

    async fn login_request(&self, phone: &str) -> Result<Value, BookingError> {
        self.call_role(Operation::LoginRequest, Some(json!({ "phone": phone_value(phone) })))
            .await
    }

    async fn register_devotee(&self, phone: &str) -> Result<Value, BookingError> {
        self.call_role(Operation::CreateUser, Some(json!({ "phone": phone_value(phone) })))
            .await
    }

    async fn get_profile(&self) -> Result<Value, BookingError> {
        self.call_role(Operation::GetProfile, None).await
    }

    async fn update_profile(&self, info: &Value) -> Result<Value, BookingError> {
        self.call_role(Operation::UpdateProfile, Some(json!({ "info": info })))
            .await
    }

    async fn get_appointment_list(&self, filter: &AppointmentFilter) -> Result<Value, BookingError> {
        let body =
            serde_json::to_value(filter).map_err(|e| BookingError::InvalidInput(e.to_string()))?;
        self.call_role(Operation::GetAppointmentList, Some(body))
            .await
    }

    async fn get_appointment(&self, appointment_id: &str) -> Result<Value, BookingError> {
        self.call_role(
            Operation::GetAppointment,
            Some(json!({ "appointment_id": appointment_id })),
        )
        .await
    }

    async fn create_appointment(&self, info: &Value) -> Result<Value, BookingError> {
        self.call_role(Operation::CreateAppointment, Some(json!({ "info": info })))
            .await
    }

    async fn get_appointment_stats(&self) -> Result<Value, BookingError> {
        self.call_role(Operation::GetAppointmentStats, None).await
    }

    async fn approve_appointment(&self, appointment_id: &str) -> Result<Value, BookingError> {
        self.call_role(
            Operation::ApproveAppointment,
            Some(json!({ "appointment_id": appointment_id })),
        )
        .await
    }

    async fn reject_appointment(&self, appointment_id: &str) -> Result<Value, BookingError> {
        self.call_role(
            Operation::RejectAppointment,
            Some(json!({ "appointment_id": appointment_id })),
        )
        .await
    }

    async fn get_slot_occupancy(
        &self,
        book: SlotBook,
        slot_date: &str,
    ) -> Result<Value, BookingError> {
        let body = json!({ "slot_date": slot_date });
        self.call(Verb::Post, &book.occupancy_path(), Some(&body))
            .await
            .map(unwrap_message)
    }
}
