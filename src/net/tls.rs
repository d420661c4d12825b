//! TLS configuration and certificate loading.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;

/// Load the listener's certificate and key (PEM).
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, std::io::Error> {
    let cert_path = Path::new(&config.cert_path);
    let key_path = Path::new(&config.key_path);

    for (kind, path) in [("Certificate", cert_path), ("Private key", key_path)] {
        if !path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} file not found: {:?}", kind, path),
            ));
        }
    }

    tracing::debug!(cert = ?cert_path, key = ?key_path, "Loading TLS certificate");
    RustlsConfig::from_pem_file(cert_path, key_path).await
}
