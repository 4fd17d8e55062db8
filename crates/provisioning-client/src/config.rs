use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ClientConfigError {
    #[error("Valor inválido para {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
    #[error("No se pudo construir el cliente HTTP: {0}")]
    Http(#[from] reqwest::Error),
}

/// Parámetros de conexión con el servicio de aprovisionamiento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL base, incluido el proyecto (p. ej. `http://host:8386/v1.1/<proyecto>`).
    pub base_url: String,
    /// Token enviado en `X-Auth-Token`, si existe.
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), token: None, timeout_secs: DEFAULT_TIMEOUT_SECS }
    }

    /// Lee `PROVISIONING_API_URL`, `PROVISIONING_API_TOKEN` y
    /// `PROVISIONING_API_TIMEOUT_SECS` (cargando antes `.env` si existe).
    /// Devuelve `None` si no hay URL configurada.
    pub fn from_env() -> Result<Option<Self>, ClientConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Igual que `from_env` pero con una función de búsqueda arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ClientConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let base_url = match lookup("PROVISIONING_API_URL").filter(|u| !u.trim().is_empty()) {
            Some(u) => u.trim().trim_end_matches('/').to_string(),
            None => return Ok(None),
        };
        let token = lookup("PROVISIONING_API_TOKEN").filter(|t| !t.trim().is_empty());
        let timeout_secs = match lookup("PROVISIONING_API_TIMEOUT_SECS") {
            Some(raw) => raw.trim()
                            .parse::<u64>()
                            .map_err(|_| ClientConfigError::InvalidVar { var: "PROVISIONING_API_TIMEOUT_SECS", value: raw })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Some(Self { base_url, token, timeout_secs }))
    }
}
