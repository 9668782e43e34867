//! Judge verdicts and verdict parsing.
//!
//! The judge is an external text producer. These functions extract a
//! structured decision from its free-form reply. Pure text matching, no I/O.
//!
//! # Supported Formats
//!
//! 1. **JSON** (preferred): `{"consensus": true, "score": 8, "feedback": "..."}`
//! 2. **Keywords**: `CONSENSUS: YES` / `CONSENSUS: NO` and `Score: 7/10`
//!
//! Ambiguous replies never produce consensus, and a missing score is the
//! minimum.

use serde::{Deserialize, Serialize};

/// Lowest quality score; also the score of a verdict the judge never gave.
pub const QUALITY_MIN: f64 = 0.0;
/// Highest quality score.
pub const QUALITY_MAX: f64 = 10.0;

/// Structured judge decision for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    /// Whether the judge considers the debate settled
    pub consensus: bool,
    /// Quality of the round's arguments, 0 to 10
    pub quality_score: f64,
    /// Judge's reasoning (or the reason no judgment was made)
    pub feedback: String,
    /// False when the verdict was substituted because the judge was unavailable
    pub judged: bool,
}

impl JudgeVerdict {
    pub fn new(consensus: bool, quality_score: f64, feedback: impl Into<String>) -> Self {
        Self {
            consensus,
            quality_score: quality_score.clamp(QUALITY_MIN, QUALITY_MAX),
            feedback: feedback.into(),
            judged: true,
        }
    }

    /// Verdict used when no judgment could be obtained: no consensus and the
    /// minimum score, which forces another round or a best-effort finalize.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            consensus: false,
            quality_score: QUALITY_MIN,
            feedback: format!("[judge unavailable: {}]", reason.into()),
            judged: false,
        }
    }

    /// Apply a minimum quality bar: consensus below it does not count.
    pub fn meets_bar(&self, min_quality_score: f64) -> bool {
        self.consensus && self.quality_score >= min_quality_score
    }
}

/// Parse a judge reply into a verdict.
///
/// # Examples
///
/// ```
/// use debate_domain::debate::verdict::parse_verdict;
///
/// let v = parse_verdict(r#"{"consensus": true, "score": 8, "feedback": "Bull case holds"}"#);
/// assert!(v.consensus);
/// assert_eq!(v.quality_score, 8.0);
///
/// let v = parse_verdict("CONSENSUS: NO. Quality 4/10, bear ignored guidance.");
/// assert!(!v.consensus);
/// assert_eq!(v.quality_score, 4.0);
/// ```
pub fn parse_verdict(response: &str) -> JudgeVerdict {
    if let Some(verdict) = parse_json_verdict(response) {
        return verdict;
    }

    JudgeVerdict::new(
        parse_consensus_keyword(response),
        parse_score(response).unwrap_or(QUALITY_MIN),
        response.trim(),
    )
}

fn parse_json_verdict(response: &str) -> Option<JudgeVerdict> {
    let start = response.find('{')?;
    let end = response[start..].rfind('}')?;
    let parsed: serde_json::Value = serde_json::from_str(&response[start..start + end + 1]).ok()?;
    let object = parsed.as_object()?;

    let consensus = match object.get("consensus")? {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "yes" | "true" | "reached"
        ),
        _ => false,
    };

    let score = object
        .get("score")
        .or_else(|| object.get("quality_score"))
        .and_then(|v| v.as_f64())
        .unwrap_or(QUALITY_MIN);

    let feedback = object
        .get("feedback")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| response.trim().to_string());

    Some(JudgeVerdict::new(consensus, score, feedback))
}

/// Keyword fallback. Conservative: defaults to no consensus when ambiguous.
fn parse_consensus_keyword(response: &str) -> bool {
    let upper = response.to_uppercase();

    let negative = upper.contains("NO CONSENSUS")
        || upper.contains("CONSENSUS: NO")
        || upper.contains("CONSENSUS NOT REACHED")
        || upper.contains("NOT REACHED");

    let positive = upper.contains("CONSENSUS: YES") || upper.contains("CONSENSUS REACHED");

    positive && !negative
}

fn parse_score(response: &str) -> Option<f64> {
    // "N/10" anywhere
    for word in response.split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_ascii_digit());
        if let Some(num_str) = word.strip_suffix("/10")
            && let Ok(num) = num_str.parse::<f64>()
        {
            return Some(num.clamp(QUALITY_MIN, QUALITY_MAX));
        }
    }

    // "score: N" / "score N"
    let lower = response.to_lowercase();
    let idx = lower.find("score")?;
    let rest = lower[idx + "score".len()..]
        .trim_start_matches(|c: char| c == ':' || c == '=' || c.is_whitespace());
    let number: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .map(|n| n.clamp(QUALITY_MIN, QUALITY_MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_verdict() {
        let v = parse_verdict(r#"{"consensus": false, "score": 6.5, "feedback": "Needs data"}"#);
        assert!(!v.consensus);
        assert_eq!(v.quality_score, 6.5);
        assert_eq!(v.feedback, "Needs data");
        assert!(v.judged);
    }

    #[test]
    fn test_parse_json_in_code_block() {
        let response = r#"
My evaluation:
```json
{"consensus": "yes", "quality_score": 9}
```
"#;
        let v = parse_verdict(response);
        assert!(v.consensus);
        assert_eq!(v.quality_score, 9.0);
    }

    #[test]
    fn test_parse_json_clamps_score() {
        let v = parse_verdict(r#"{"consensus": true, "score": 42}"#);
        assert_eq!(v.quality_score, QUALITY_MAX);
        let v = parse_verdict(r#"{"consensus": true, "score": -3}"#);
        assert_eq!(v.quality_score, QUALITY_MIN);
    }

    #[test]
    fn test_keyword_consensus() {
        let v = parse_verdict("CONSENSUS: YES. Score: 8");
        assert!(v.consensus);
        assert_eq!(v.quality_score, 8.0);
    }

    #[test]
    fn test_keyword_negative_wins() {
        let v = parse_verdict("Consensus reached? No consensus yet, 5/10.");
        assert!(!v.consensus);
        assert_eq!(v.quality_score, 5.0);
    }

    #[test]
    fn test_ambiguous_defaults_to_no_consensus_and_min_score() {
        let v = parse_verdict("Both sides raise interesting points.");
        assert!(!v.consensus);
        assert_eq!(v.quality_score, QUALITY_MIN);
    }

    #[test]
    fn test_unavailable_verdict() {
        let v = JudgeVerdict::unavailable("circuit open");
        assert!(!v.consensus);
        assert!(!v.judged);
        assert_eq!(v.quality_score, QUALITY_MIN);
        assert!(v.feedback.contains("circuit open"));
    }

    #[test]
    fn test_meets_bar() {
        let v = JudgeVerdict::new(true, 6.0, "ok");
        assert!(v.meets_bar(0.0));
        assert!(v.meets_bar(6.0));
        assert!(!v.meets_bar(7.0));
        assert!(!JudgeVerdict::new(false, 10.0, "").meets_bar(0.0));
    }
}
