use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::ai::{AnswerProvider, HttpProvider, LoggingProvider, StubProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Stub,
    Http,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Stub => "stub",
            ProviderKind::Http => "http",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "stub" => Some(ProviderKind::Stub),
            "http" => Some(ProviderKind::Http),
            _ => None,
        }
    }

    pub fn all() -> Vec<ProviderKind> {
        vec![ProviderKind::Stub, ProviderKind::Http]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Stub => "Canned answers (offline)",
            ProviderKind::Http => "HTTP backend",
        }
    }

    /// Build the provider, wrapped so every call is logged.
    ///
    /// `endpoint` is only consulted for [`ProviderKind::Http`], where it is
    /// required.
    pub fn build(&self, endpoint: Option<&str>, latency: Duration) -> Result<Arc<dyn AnswerProvider>> {
        let inner: Arc<dyn AnswerProvider> = match self {
            ProviderKind::Stub => Arc::new(StubProvider::with_latency(latency)),
            ProviderKind::Http => {
                let endpoint = endpoint
                    .filter(|e| !e.trim().is_empty())
                    .ok_or_else(|| anyhow!("The http provider needs an endpoint (--endpoint or ASKBOX_ENDPOINT)"))?;
                Arc::new(HttpProvider::new(endpoint))
            }
        };
        Ok(Arc::new(LoggingProvider::new(inner)))
    }
}
