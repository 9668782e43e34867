//! Research context shared by every participant of a debate.

use serde::{Deserialize, Serialize};

/// One upstream analyst report (market, news, social, fundamentals, ...).
///
/// Passed through to synthesis verbatim; the engine never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalystReport {
    /// Which analyst produced the report (e.g. "market")
    pub analyst: String,
    /// Report body
    pub content: String,
}

impl AnalystReport {
    pub fn new(analyst: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            analyst: analyst.into(),
            content: content.into(),
        }
    }
}

/// What the debate is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchContext {
    /// Instrument under debate
    pub ticker: String,
    /// Trade date the research refers to, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_date: Option<String>,
    /// Upstream analyst reports
    #[serde(default)]
    pub reports: Vec<AnalystReport>,
}

impl ResearchContext {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            trade_date: None,
            reports: Vec::new(),
        }
    }

    pub fn with_trade_date(mut self, date: impl Into<String>) -> Self {
        self.trade_date = Some(date.into());
        self
    }

    pub fn with_report(mut self, report: AnalystReport) -> Self {
        self.reports.push(report);
        self
    }

    pub fn report(&self, analyst: &str) -> Option<&AnalystReport> {
        self.reports.iter().find(|r| r.analyst == analyst)
    }
}
