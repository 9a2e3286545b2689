//! Shared blocking HTTP client setup.

use crate::error::Result;
use reqwest::blocking::Client;
use std::time::Duration;

/// Install the process-wide TLS crypto provider. Safe to call more than once.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Blocking client with the given request timeout.
pub fn client(timeout: Duration) -> Result<Client> {
    install_crypto_provider();
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("bugwatch/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
