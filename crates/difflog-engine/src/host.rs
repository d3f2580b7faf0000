//! Host identity included in every log record.

use std::fs;

const HOSTNAME_FILE: &str = "/etc/hostname";
const FALLBACK_HOSTNAME: &str = "localhost";

/// Source of the host identifier string.
pub trait HostIdentity: Send + Sync {
    fn host_identifier(&self) -> String;
}

/// A configured, constant identifier.
#[derive(Debug, Clone)]
pub struct FixedHostIdentity(String);

impl FixedHostIdentity {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }
}

impl HostIdentity for FixedHostIdentity {
    fn host_identifier(&self) -> String {
        self.0.clone()
    }
}

/// The machine's hostname, resolved once at construction.
///
/// Lookup order: `HOSTNAME` environment variable, `/etc/hostname`, then
/// `localhost`.
#[derive(Debug, Clone)]
pub struct SystemHostIdentity {
    hostname: String,
}

impl SystemHostIdentity {
    pub fn new() -> Self {
        let hostname = std::env::var("HOSTNAME")
            .ok()
            .and_then(non_blank)
            .or_else(|| fs::read_to_string(HOSTNAME_FILE).ok().and_then(non_blank))
            .unwrap_or_else(|| FALLBACK_HOSTNAME.to_string());
        Self { hostname }
    }
}

impl Default for SystemHostIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl HostIdentity for SystemHostIdentity {
    fn host_identifier(&self) -> String {
        self.hostname.clone()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_identity() {
        assert_eq!(FixedHostIdentity::new("web-01").host_identifier(), "web-01");
    }

    #[test]
    fn test_system_identity_is_never_blank() {
        let id = SystemHostIdentity::new().host_identifier();
        assert!(!id.trim().is_empty());
        assert_eq!(id, id.trim());
    }

    #[test]
    fn test_non_blank_trims() {
        assert_eq!(non_blank("host\n".to_string()).as_deref(), Some("host"));
        assert_eq!(non_blank(" \n".to_string()), None);
    }
}
