//! Console output formatter for debate results

use colored::{ColoredString, Colorize};
use debate_application::DebateResult;
use debate_domain::{ArgumentStatus, FinalizeReason, Rendezvous, RoundRecord, Side};

/// Longest argument excerpt shown per side in the round report
const ARGUMENT_EXCERPT_CHARS: usize = 400;

/// Formats debate results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete debate result
    pub fn format(result: &DebateResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Research Debate: {}", result.ticker)));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Debate:".cyan().bold(),
            result.debate_id
        ));
        output.push_str(&format!(
            "{} {} ({})\n",
            "Rounds:".cyan().bold(),
            result.rounds,
            Self::reason_label(result.finalize_reason)
        ));

        for record in &result.history {
            output.push_str(&Self::format_round(record));
        }

        output.push_str(&Self::section_header("Recommendation"));
        output.push('\n');
        output.push_str(&result.output);
        output.push('\n');

        if result.degraded {
            output.push_str(&format!(
                "\n{}\n",
                "Synthesis was unavailable; showing the best available fallback.".yellow()
            ));
        }

        if !result.failures.is_empty() {
            output.push_str(&format!("\n{}\n", "Failed calls:".red().bold()));
            for failure in &result.failures {
                output.push_str(&format!("  * {}\n", failure));
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &DebateResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the recommendation only (concise output)
    pub fn format_recommendation_only(result: &DebateResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            format!("=== {} Recommendation ===", result.ticker).cyan().bold()
        ));
        output.push_str(&format!(
            "{} {} round(s), {}\n\n",
            "Debated:".dimmed(),
            result.rounds,
            Self::reason_label(result.finalize_reason)
        ));

        output.push_str(&result.output);
        output.push('\n');

        output
    }

    fn format_round(record: &RoundRecord) -> String {
        let mut output = Self::section_header(&format!("Round {}", record.round));

        let verdict = if record.consensus {
            "consensus".green().bold()
        } else {
            "no consensus".yellow()
        };
        output.push_str(&format!(
            "{} {} (score {:.1}/10, {})\n",
            "Verdict:".bold(),
            verdict,
            record.quality_score,
            Self::rendezvous_label(&record.rendezvous)
        ));

        for side in Side::ALL {
            let text = match side {
                Side::Bull => &record.bull_argument,
                Side::Bear => &record.bear_argument,
            };
            output.push_str(&format!(
                "\n{} {}\n{}\n",
                format!("── {} ──", side.display_name()).yellow().bold(),
                Self::status_label(*record.status.get(side)),
                Self::indent(&Self::excerpt(text), "  ")
            ));
        }

        if !record.judge_feedback.is_empty() {
            output.push_str(&format!(
                "\n{}\n{}\n",
                "Judge:".cyan().bold(),
                Self::indent(&record.judge_feedback, "  ")
            ));
        }

        output
    }

    fn status_label(status: ArgumentStatus) -> ColoredString {
        match status {
            ArgumentStatus::Ready => "[ready]".green(),
            ArgumentStatus::Failed => "[failed]".red(),
            ArgumentStatus::TimedOut => "[timed out]".red(),
            ArgumentStatus::CarriedOver => "[carried over]".yellow(),
        }
    }

    fn rendezvous_label(rendezvous: &Rendezvous) -> String {
        match rendezvous {
            Rendezvous::Complete => "both sides in time".to_string(),
            Rendezvous::Partial { missing } => {
                let sides: Vec<&str> = missing.iter().map(Side::as_str).collect();
                format!("missing: {}", sides.join(", "))
            }
            Rendezvous::Empty => "no arguments".to_string(),
        }
    }

    fn reason_label(reason: Option<FinalizeReason>) -> &'static str {
        match reason {
            Some(FinalizeReason::Consensus) => "consensus reached",
            Some(FinalizeReason::RoundLimit) => "round limit reached",
            Some(FinalizeReason::NoArguments) => "no arguments delivered",
            None => "unfinished",
        }
    }

    fn excerpt(text: &str) -> String {
        if text.chars().count() <= ARGUMENT_EXCERPT_CHARS {
            return text.to_string();
        }
        let cut: String = text.chars().take(ARGUMENT_EXCERPT_CHARS).collect();
        format!("{}...", cut.trim_end())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debate_domain::{CallFailure, FailureKind, Sides};

    fn record(round: u32, consensus: bool) -> RoundRecord {
        RoundRecord {
            round,
            bull_argument: "Services margin keeps expanding".to_string(),
            bear_argument: "[bear argument unavailable]".to_string(),
            judge_feedback: "Bull case is better supported".to_string(),
            quality_score: 7.5,
            consensus,
            status: Sides::new(ArgumentStatus::Ready, ArgumentStatus::TimedOut),
            rendezvous: Rendezvous::Partial {
                missing: vec![Side::Bear],
            },
        }
    }

    fn result() -> DebateResult {
        DebateResult {
            debate_id: "aapl-1-0".to_string(),
            ticker: "AAPL".to_string(),
            rounds: 2,
            consensus_reached: false,
            finalize_reason: Some(FinalizeReason::RoundLimit),
            output: "Hold: upside is priced in.".to_string(),
            degraded: true,
            history: vec![record(1, false), record(2, false)],
            failures: vec![CallFailure::new(
                "synth-llm",
                FailureKind::Permanent,
                "exit 2",
                1,
            )],
        }
    }

    #[test]
    fn test_format_lists_rounds_and_output() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&result());

        assert!(text.contains("Research Debate: AAPL"));
        assert!(text.contains("Round 1"));
        assert!(text.contains("Round 2"));
        assert!(text.contains("round limit reached"));
        assert!(text.contains("missing: bear"));
        assert!(text.contains("[timed out]"));
        assert!(text.contains("Hold: upside is priced in."));
        assert!(text.contains("fallback"));
        assert!(text.contains("synth-llm"));
    }

    #[test]
    fn test_format_json_is_valid() {
        let json = ConsoleFormatter::format_json(&result());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ticker"], "AAPL");
        assert_eq!(value["rounds"], 2);
        assert_eq!(value["history"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_recommendation_only() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_recommendation_only(&result());
        assert!(text.contains("AAPL Recommendation"));
        assert!(text.contains("Hold: upside is priced in."));
        assert!(!text.contains("Round 1"));
    }

    #[test]
    fn test_long_arguments_are_cut() {
        let long = "x".repeat(ARGUMENT_EXCERPT_CHARS + 50);
        let cut = ConsoleFormatter::excerpt(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), ARGUMENT_EXCERPT_CHARS + 3);
    }
}
