//! TLS termination setup.
//!
//! # Responsibilities
//! - Check the configured PEM files before handing them to rustls
//! - Pick the process-wide rustls crypto provider
//!
//! Both ring (reqwest) and aws-lc-rs (axum-server) are linked, so rustls
//! cannot choose a default on its own.

use std::io;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

/// Load the server certificate chain and private key.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> io::Result<RustlsConfig> {
    require_file(cert_path, "Certificate")?;
    require_file(key_path, "Private key")?;

    install_crypto_provider();

    let config = RustlsConfig::from_pem_file(cert_path, key_path).await?;
    tracing::info!(
        cert = %cert_path.display(),
        key = %key_path.display(),
        "TLS certificate loaded"
    );
    Ok(config)
}

/// Install ring as the default provider.
///
/// Returns `false` when a provider was already in place; that one is kept.
pub fn install_crypto_provider() -> bool {
    match rustls::crypto::ring::default_provider().install_default() {
        Ok(()) => true,
        Err(_) => {
            tracing::debug!("rustls crypto provider already installed, keeping it");
            false
        }
    }
}

fn require_file(path: &Path, what: &str) -> io::Result<()> {
    if path.is_file() {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} file not found: {}", what, path.display()),
    ))
}
