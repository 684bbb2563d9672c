//! Action server (M3) trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Entities, Intent};

/// Payload forwarded to the action server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub intent: Intent,
    pub entities: Entities,
    pub message: String,
}

/// Forwards actionable intents downstream
///
/// `dispatch` is infallible by contract: transport failures are folded into a
/// status object so the citizen still gets a reply.
#[async_trait]
pub trait ActionDispatcher: Send + Sync + 'static {
    /// Send the request and return the server's JSON answer (or a status stand-in)
    async fn dispatch(&self, request: ActionRequest) -> serde_json::Value;

    /// Whether the action server currently answers
    async fn is_reachable(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_request_wire_shape() {
        let mut entities = Entities::new();
        entities.insert("problem".into(), "water issue".into());

        let request = ActionRequest {
            intent: Intent::WaterComplaint,
            entities,
            message: "vellam illa".into(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["intent"], "water_complaint");
        assert_eq!(json["entities"]["problem"], "water issue");
        assert_eq!(json["message"], "vellam illa");
    }
}
