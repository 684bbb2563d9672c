//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use parking_lot::RwLock;

use gramasathi_agent::{AgentError, GramaSathiAgent};
use gramasathi_config::Settings;

use crate::telephony::TelephonyClient;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration wrapped in RwLock so middleware reads a consistent snapshot
    pub config: Arc<RwLock<Settings>>,
    /// Message analysis
    pub agent: Arc<GramaSathiAgent>,
    /// Media fetch and transcription relay
    pub telephony: Arc<TelephonyClient>,
}

impl AppState {
    /// Build the agent and telephony client from settings
    pub fn new(config: Settings) -> Result<Self, AgentError> {
        let agent = GramaSathiAgent::from_settings(&config)?;
        Ok(Self::with_agent(config, agent))
    }

    /// Use a pre-built agent (tests, custom backends)
    pub fn with_agent(config: Settings, agent: GramaSathiAgent) -> Self {
        let telephony = TelephonyClient::new(&config.telephony);
        Self {
            config: Arc::new(RwLock::new(config)),
            agent: Arc::new(agent),
            telephony: Arc::new(telephony),
        }
    }
}
