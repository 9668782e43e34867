//! Argument generator port
//!
//! One uniform interface over every external text producer the engine
//! calls: the bull and bear advocates, the judge, and the synthesizer.
//! Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use debate_domain::{FailureKind, ResearchContext, RoundRecord, Side, Sides};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors a generator can report.
///
/// Each variant maps to a [`FailureKind`] through [`GeneratorError::kind`],
/// which is what the reliability layer acts on.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid output: {0}")]
    InvalidOutput(String),
}

impl GeneratorError {
    /// Transient errors are retried, permanent ones are not.
    pub fn kind(&self) -> FailureKind {
        match self {
            GeneratorError::Connection(_)
            | GeneratorError::RateLimited(_)
            | GeneratorError::Protocol(_)
            | GeneratorError::Timeout(_) => FailureKind::Transient,
            GeneratorError::InvalidRequest(_)
            | GeneratorError::Authentication(_)
            | GeneratorError::InvalidOutput(_) => FailureKind::Permanent,
        }
    }
}

/// What a generator is being asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Bull,
    Bear,
    Judge,
    Synthesizer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Bull => "bull",
            Role::Bear => "bear",
            Role::Judge => "judge",
            Role::Synthesizer => "synthesizer",
        }
    }
}

impl From<Side> for Role {
    fn from(side: Side) -> Self {
        match side {
            Side::Bull => Role::Bull,
            Side::Bear => Role::Bear,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a generator gets to work with.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub debate_id: String,
    pub role: Role,
    /// Current round (1-indexed)
    pub round: u32,
    pub max_rounds: u32,
    /// Shared research context (analyst reports passed verbatim)
    pub research: Arc<ResearchContext>,
    /// Completed rounds so far
    pub history: Vec<RoundRecord>,
    /// The round's arguments (judge requests only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Sides<String>>,
}

/// An external text producer.
#[async_trait]
pub trait ArgumentGenerator: Send + Sync {
    /// Name of the dependency behind this generator.
    ///
    /// Generators reporting the same name share one circuit breaker.
    fn dependency(&self) -> &str;

    /// Produce text for `request`.
    async fn invoke(&self, request: &GenerationRequest) -> Result<String, GeneratorError>;
}

/// The four generators a debate needs.
#[derive(Clone)]
pub struct DebateParticipants {
    pub bull: Arc<dyn ArgumentGenerator>,
    pub bear: Arc<dyn ArgumentGenerator>,
    pub judge: Arc<dyn ArgumentGenerator>,
    pub synthesizer: Arc<dyn ArgumentGenerator>,
}

impl DebateParticipants {
    pub fn new(
        bull: Arc<dyn ArgumentGenerator>,
        bear: Arc<dyn ArgumentGenerator>,
        judge: Arc<dyn ArgumentGenerator>,
        synthesizer: Arc<dyn ArgumentGenerator>,
    ) -> Self {
        Self {
            bull,
            bear,
            judge,
            synthesizer,
        }
    }

    pub fn advocate(&self, side: Side) -> &Arc<dyn ArgumentGenerator> {
        match side {
            Side::Bull => &self.bull,
            Side::Bear => &self.bear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert_eq!(
            GeneratorError::Connection("reset".into()).kind(),
            FailureKind::Transient
        );
        assert_eq!(
            GeneratorError::RateLimited("429".into()).kind(),
            FailureKind::Transient
        );
        assert_eq!(
            GeneratorError::Timeout(Duration::from_secs(5)).kind(),
            FailureKind::Transient
        );
        assert_eq!(
            GeneratorError::Authentication("401".into()).kind(),
            FailureKind::Permanent
        );
        assert_eq!(
            GeneratorError::InvalidRequest("bad".into()).kind(),
            FailureKind::Permanent
        );
    }

    #[test]
    fn test_role_from_side() {
        assert_eq!(Role::from(Side::Bull), Role::Bull);
        assert_eq!(Role::from(Side::Bear).to_string(), "bear");
    }

    #[test]
    fn test_request_serializes_research() {
        let request = GenerationRequest {
            debate_id: "d-1".to_string(),
            role: Role::Judge,
            round: 1,
            max_rounds: 2,
            research: Arc::new(ResearchContext::new("NVDA")),
            history: Vec::new(),
            arguments: Some(Sides::new("up".to_string(), "down".to_string())),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["role"], "judge");
        assert_eq!(json["research"]["ticker"], "NVDA");
        assert_eq!(json["arguments"]["bear"], "down");
    }
}
