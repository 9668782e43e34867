//! Loading upstream analyst reports.
//!
//! Two JSON shapes are accepted:
//!
//! ```json
//! {"ticker": "AAPL", "trade_date": "2024-05-10",
//!  "reports": [{"analyst": "market", "content": "..."}]}
//! ```
//!
//! or a flat object mapping analyst name to report text:
//!
//! ```json
//! {"market": "...", "news": "...", "fundamentals": "..."}
//! ```

use debate_domain::{AnalystReport, ResearchContext};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read reports from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse reports in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReportFile {
    Context(ResearchContext),
    ByAnalyst(BTreeMap<String, String>),
}

/// Read the research context for `ticker` from a reports file.
///
/// `ticker` wins over a ticker named in the file.
pub fn load_research(path: &Path, ticker: &str) -> Result<ResearchContext, ReportError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_research(&raw, ticker).map_err(|source| ReportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a reports document (see module docs for the shapes).
pub fn parse_research(raw: &str, ticker: &str) -> Result<ResearchContext, serde_json::Error> {
    let context = match serde_json::from_str::<ReportFile>(raw)? {
        ReportFile::Context(mut context) => {
            context.ticker = ticker.to_string();
            context
        }
        ReportFile::ByAnalyst(reports) => reports.into_iter().fold(
            ResearchContext::new(ticker),
            |context, (analyst, content)| context.with_report(AnalystReport::new(analyst, content)),
        ),
    };
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_context() {
        let raw = r#"{
            "ticker": "aapl",
            "trade_date": "2024-05-10",
            "reports": [
                {"analyst": "market", "content": "Uptrend"},
                {"analyst": "news", "content": "Launch event"}
            ]
        }"#;
        let context = parse_research(raw, "AAPL").unwrap();

        assert_eq!(context.ticker, "AAPL");
        assert_eq!(context.trade_date.as_deref(), Some("2024-05-10"));
        assert_eq!(context.reports.len(), 2);
        assert_eq!(context.report("news").unwrap().content, "Launch event");
    }

    #[test]
    fn test_parse_flat_object() {
        let raw = r#"{"social": "Mixed sentiment", "fundamentals": "Strong margins"}"#;
        let context = parse_research(raw, "TSLA").unwrap();

        assert_eq!(context.ticker, "TSLA");
        let analysts: Vec<&str> = context.reports.iter().map(|r| r.analyst.as_str()).collect();
        assert_eq!(analysts, vec!["fundamentals", "social"]);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(parse_research("[1, 2, 3]", "X").is_err());
        assert!(parse_research("not json", "X").is_err());
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = load_research(Path::new("/no/such/reports.json"), "X").unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn test_load_reports_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.json");
        std::fs::write(&path, r#"{"market": "Sideways"}"#).unwrap();

        let context = load_research(&path, "IBM").unwrap();
        assert_eq!(context.reports[0].content, "Sideways");
    }
}
