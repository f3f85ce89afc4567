//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:4000`).
    pub listen_addr: SocketAddr,

    /// Capacity given to lobbies whose creator does not ask for one.
    pub default_lobby_capacity: usize,

    /// Upper bound on any lobby's capacity.
    pub max_lobby_capacity: usize,

    /// Members required before a lobby can become `AllReady`. At least 1.
    pub min_ready_members: usize,

    /// Per-connection outbound queue length. A connection whose queue
    /// overflows is closed.
    pub outbound_buffer: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 4000)),
            default_lobby_capacity: 8,
            max_lobby_capacity: 16,
            min_ready_members: 1,
            outbound_buffer: 64,
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set or does not parse.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr: SocketAddr = match std::env::var("LISTEN_ADDR") {
            Ok(addr) => addr.parse()?,
            Err(_) => defaults.listen_addr,
        };

        let max_lobby_capacity =
            parse_env("MAX_LOBBY_CAPACITY", defaults.max_lobby_capacity).max(1);
        let default_lobby_capacity = parse_env(
            "DEFAULT_LOBBY_CAPACITY",
            defaults.default_lobby_capacity,
        )
        .clamp(1, max_lobby_capacity);
        let min_ready_members = parse_env("MIN_READY_MEMBERS", defaults.min_ready_members).max(1);
        let outbound_buffer = parse_env("OUTBOUND_BUFFER", defaults.outbound_buffer).max(1);

        Ok(Self {
            listen_addr,
            default_lobby_capacity,
            max_lobby_capacity,
            min_ready_members,
            outbound_buffer,
        })
    }

    /// Resolves a requested capacity against the configured bounds.
    #[must_use]
    pub fn lobby_capacity(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_lobby_capacity)
            .clamp(1, self.max_lobby_capacity.max(1))
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr.port(), 4000);
        assert!(config.default_lobby_capacity <= config.max_lobby_capacity);
        assert_eq!(config.min_ready_members, 1);
    }

    #[test]
    fn capacity_is_clamped() {
        let config = GatewayConfig::default();
        assert_eq!(config.lobby_capacity(None), 8);
        assert_eq!(config.lobby_capacity(Some(0)), 1);
        assert_eq!(config.lobby_capacity(Some(3)), 3);
        assert_eq!(config.lobby_capacity(Some(1_000)), 16);
    }

    #[test]
    fn parse_env_falls_back_on_missing_key() {
        let value: usize = parse_env("LOBBY_GATEWAY_TEST_UNSET_KEY", 42);
        assert_eq!(value, 42);
    }
}
