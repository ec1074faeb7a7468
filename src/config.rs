use std::fmt;

use serde::Deserialize;
use url::Url;

const RECLAIM: &str = "reclaim";
const MOCK: &str = "mock";
const PRIMUS: &str = "primus";

const DEFAULT_SHARE_PAGE_URL: &str = "https://portal.reclaimprotocol.org/kernel";

/// Configuration for the [Verifier](crate::verifier::Verifier).
#[derive(Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VerifierConfig {
    pub app_id: String,
    pub app_secret: String,
    /// Provider to construct. Defaults to Reclaim.
    #[serde(default)]
    pub default_provider: Option<ProviderSelection>,
    /// `mock` forces the mock provider regardless of `default_provider`.
    #[serde(default)]
    pub mode: Option<Mode>,
}

impl VerifierConfig {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            ..Default::default()
        }
    }

    pub fn with_provider(mut self, provider: impl Into<ProviderSelection>) -> Self {
        self.default_provider = Some(provider.into());
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }
}

impl fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("default_provider", &self.default_provider)
            .field("mode", &self.mode)
            .finish()
    }
}

/// The provider a [VerifierConfig] asks for.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String")]
pub enum ProviderSelection {
    Reclaim,
    Mock,
    /// Recognized but not yet implemented.
    Primus,
    /// A provider that is unknown to this library.
    Unsupported(String),
}

impl From<String> for ProviderSelection {
    fn from(s: String) -> Self {
        match s.as_str() {
            // An empty selection means the default provider.
            "" | RECLAIM => ProviderSelection::Reclaim,
            MOCK => ProviderSelection::Mock,
            PRIMUS => ProviderSelection::Primus,
            _ => ProviderSelection::Unsupported(s),
        }
    }
}

impl From<&str> for ProviderSelection {
    fn from(s: &str) -> Self {
        s.to_owned().into()
    }
}

impl fmt::Display for ProviderSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderSelection::Reclaim => RECLAIM,
            ProviderSelection::Mock => MOCK,
            ProviderSelection::Primus => PRIMUS,
            ProviderSelection::Unsupported(u) => u,
        }
        .fmt(f)
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Reclaim,
    Mock,
}

/// Options handed to the proof-request system when a session is initialized.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequestSetup {
    pub use_app_clip: bool,
    pub log: bool,
    pub custom_share_page_url: Option<Url>,
}

impl Default for ProofRequestSetup {
    fn default() -> Self {
        Self {
            use_app_clip: false,
            log: true,
            custom_share_page_url: DEFAULT_SHARE_PAGE_URL.parse().ok(),
        }
    }
}
