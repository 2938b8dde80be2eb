//! Request counters for calls to the booking backend.

pub const REQUESTS_TOTAL: &str = "darshan_client_requests_total";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    ClientError,
    ServerError,
    Transport,
    Rejected,
}

impl Outcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=399 => Outcome::Ok,
            400..=499 => Outcome::ClientError,
            _ => Outcome::ServerError,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::ClientError => "client_error",
            Outcome::ServerError => "server_error",
            Outcome::Transport => "transport",
            Outcome::Rejected => "rejected",
        }
    }
}

/// Count one backend call. A no-op until the host installs a metrics recorder.
pub fn record_request(endpoint: &str, outcome: Outcome) {
    metrics::counter!(
        REQUESTS_TOTAL,
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}
