use crate::errors::GuideError;
use crate::polling::PollConfig;
use serde::{Deserialize, Serialize};

/// Opciones de las guías.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideConfig {
    pub poll: PollConfig,
}

impl GuideConfig {
    /// Lee `GUIDE_POLL_INTERVAL_MS` y `GUIDE_POLL_TIMEOUT_SECS` (tras cargar
    /// `.env`). Las variables ausentes toman el valor por defecto.
    pub fn from_env() -> Result<Self, GuideError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, GuideError>
        where F: Fn(&str) -> Option<String>
    {
        let mut poll = PollConfig::default();
        if let Some(ms) = parse_u64(&lookup, "GUIDE_POLL_INTERVAL_MS")? {
            poll.interval_ms = ms;
        }
        if let Some(secs) = parse_u64(&lookup, "GUIDE_POLL_TIMEOUT_SECS")? {
            poll.timeout_ms = secs.saturating_mul(1_000);
        }
        Ok(GuideConfig { poll })
    }
}

fn parse_u64<F>(lookup: &F, var: &str) -> Result<Option<u64>, GuideError>
    where F: Fn(&str) -> Option<String>
{
    match lookup(var) {
        Some(raw) => raw.trim()
                        .parse::<u64>()
                        .map(Some)
                        .map_err(|_| GuideError::Config(format!("{} no es un número: {}", var, raw))),
        None => Ok(None),
    }
}
