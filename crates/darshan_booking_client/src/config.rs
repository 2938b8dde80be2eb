use std::fmt;

use secrecy::SecretString;

use crate::BookingError;
use crate::endpoints::Role;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Dev,
    Prod,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Dev => "dev",
            Mode::Prod => "prod",
        })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub mode: Mode,
    pub role: Role,
    pub phone: Option<String>,
    pub password: Option<SecretString>,
}

impl Config {
    pub fn from_env() -> Result<Self, BookingError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, BookingError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api_base = get("DARSHAN_API_BASE")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| BookingError::Config("DARSHAN_API_BASE missing".into()))?;
        let mode = match get("DARSHAN_MODE").as_deref().map(str::trim) {
            None | Some("") | Some("dev") | Some("development") => Mode::Dev,
            Some("prod") | Some("production") => Mode::Prod,
            Some(other) => {
                return Err(BookingError::Config(format!("unknown DARSHAN_MODE: {other}")));
            }
        };
        let role = match get("DARSHAN_ROLE") {
            Some(r) if !r.trim().is_empty() => r.parse()?,
            _ => Role::default(),
        };
        let phone = get("DARSHAN_PHONE").filter(|v| !v.is_empty());
        let password = get("DARSHAN_PASSWORD")
            .filter(|v| !v.is_empty())
            .map(|p| SecretString::new(p.into()));

        tracing::info!("Mode: {} | API_BASE={} | role={}", mode, api_base, role);
        Ok(Self {
            api_base,
            mode,
            role,
            phone,
            password,
        })
    }

    /// Phone and password, when both are configured.
    pub fn credentials(&self) -> Option<(&str, &SecretString)> {
        Some((self.phone.as_deref()?, self.password.as_ref()?))
    }
}
