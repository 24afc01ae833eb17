//! Shared networking constants and helpers used by client and server.

/// TCP port of the stocks service (quote queries and saved watchlists).
pub const SERVICE_PORT: u16 = 8080;

/// Default request timeout in milliseconds for client calls.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Helper to format an IPv4 address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}
