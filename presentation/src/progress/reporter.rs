//! Progress reporting for debate execution
//!
//! Both reporters write to stderr so that `--output json` keeps stdout clean.

use colored::Colorize;
use debate_application::ports::progress::{DebateProgressNotifier, ReliabilityObserver};
use debate_domain::{ArgumentOutcome, CircuitState, CircuitTransition, RoundRecord, Side};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress during a debate with one spinner per round
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<RoundBar>>,
}

struct RoundBar {
    bar: ProgressBar,
    arrived: Vec<String>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_round_bar(&self, f: impl FnOnce(&mut RoundBar)) {
        if let Ok(mut guard) = self.round_bar.lock()
            && let Some(round_bar) = guard.as_mut()
        {
            f(round_bar);
        }
    }

    fn println(&self, line: String) {
        if self.multi.println(&line).is_err() {
            eprintln!("{}", line);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DebateProgressNotifier for ProgressReporter {
    fn on_round_start(&self, round: u32, max_rounds: u32) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(Self::round_style());
        bar.set_prefix(format!("Round {}/{}", round, max_rounds));
        bar.set_message("waiting for bull and bear...");
        bar.enable_steady_tick(Duration::from_millis(120));

        if let Ok(mut guard) = self.round_bar.lock() {
            if let Some(previous) = guard.take() {
                previous.bar.finish_and_clear();
            }
            *guard = Some(RoundBar {
                bar,
                arrived: Vec::new(),
            });
        }
    }

    fn on_argument_ready(&self, side: Side, outcome: &ArgumentOutcome) {
        self.with_round_bar(|round_bar| {
            let mark = if outcome.is_success() {
                format!("{} {}", "v".green(), side)
            } else {
                format!("{} {}", "x".red(), side)
            };
            round_bar.arrived.push(mark);
            round_bar.bar.set_message(round_bar.arrived.join("  "));
        });
    }

    fn on_argument_missing(&self, side: Side) {
        self.with_round_bar(|round_bar| {
            round_bar
                .arrived
                .push(format!("{} {} (deadline)", "-".yellow(), side));
            round_bar.bar.set_message(round_bar.arrived.join("  "));
        });
    }

    fn on_round_evaluated(&self, record: &RoundRecord) {
        if let Ok(mut guard) = self.round_bar.lock()
            && let Some(round_bar) = guard.take()
        {
            let verdict = if record.consensus {
                "consensus".green().to_string()
            } else {
                "no consensus".yellow().to_string()
            };
            round_bar.bar.finish_with_message(format!(
                "{}  judged: {} (score {:.1})",
                round_bar.arrived.join("  "),
                verdict,
                record.quality_score
            ));
        }
    }

    fn on_finalized(&self, degraded: bool) {
        if degraded {
            self.println(format!(
                "{} synthesis unavailable, using fallback output",
                "!".yellow()
            ));
        } else {
            self.println(format!("{} recommendation ready", "v".green()));
        }
    }
}

impl ReliabilityObserver for ProgressReporter {
    fn on_retry(&self, dependency: &str, attempt: u32, max_retries: u32, error: &str) {
        self.println(format!(
            "  {} {} retry {}/{}: {}",
            "~".yellow(),
            dependency,
            attempt,
            max_retries,
            error.dimmed()
        ));
    }

    fn on_circuit_transition(&self, dependency: &str, transition: CircuitTransition) {
        self.println(circuit_line(dependency, transition));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl DebateProgressNotifier for SimpleProgress {
    fn on_round_start(&self, round: u32, max_rounds: u32) {
        eprintln!(
            "{} {}",
            "->".cyan(),
            format!("Round {}/{}", round, max_rounds).bold()
        );
    }

    fn on_argument_ready(&self, side: Side, outcome: &ArgumentOutcome) {
        if outcome.is_success() {
            eprintln!("  {} {}", "v".green(), side);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), side);
        }
    }

    fn on_argument_missing(&self, side: Side) {
        eprintln!("  {} {} (missed deadline)", "-".yellow(), side);
    }

    fn on_round_evaluated(&self, record: &RoundRecord) {
        eprintln!(
            "  judge: consensus={} score={:.1}",
            record.consensus, record.quality_score
        );
    }

    fn on_finalized(&self, degraded: bool) {
        if degraded {
            eprintln!("{} synthesis unavailable, using fallback output", "!".yellow());
        }
        eprintln!();
    }
}

impl ReliabilityObserver for SimpleProgress {
    fn on_retry(&self, dependency: &str, attempt: u32, max_retries: u32, error: &str) {
        eprintln!(
            "  {} {} retry {}/{}: {}",
            "~".yellow(),
            dependency,
            attempt,
            max_retries,
            error
        );
    }

    fn on_circuit_transition(&self, dependency: &str, transition: CircuitTransition) {
        eprintln!("{}", circuit_line(dependency, transition));
    }
}

fn circuit_line(dependency: &str, transition: CircuitTransition) -> String {
    let to = match transition.to {
        CircuitState::Open => transition.to.to_string().red(),
        CircuitState::HalfOpen => transition.to.to_string().yellow(),
        CircuitState::Closed => transition.to.to_string().green(),
    };
    format!(
        "  {} circuit for {}: {} -> {}",
        "*".bold(),
        dependency,
        transition.from,
        to
    )
}
