//! Progress reporting for orchestration runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sage_application::OrchestrationProgress;
use sage_domain::core::string::{single_line, truncate};
use sage_domain::{Attempt, SubTaskOutcome, SubTaskSpec, SubTaskStatus};
use std::sync::Mutex;

/// Reports progress with an `indicatif` bar over the sub-tasks
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn attempt_status(attempt: &Attempt) -> String {
    let model = &attempt.assignment().model_name;
    match attempt.confidence() {
        Some(confidence) => format!("{} scored {:.2}", model, confidence),
        None => format!("{} failed", model),
    }
}

fn outcome_mark(outcome: &SubTaskOutcome) -> colored::ColoredString {
    match outcome.status() {
        SubTaskStatus::Accepted => "v".green(),
        _ => "x".yellow(),
    }
}

impl OrchestrationProgress for ProgressReporter {
    fn on_decomposed(&self, specs: &[SubTaskSpec]) {
        let pb = ProgressBar::new(specs.len() as u64);
        pb.set_style(Self::bar_style());
        pb.set_prefix("Sub-tasks");
        pb.set_message("Starting...");
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(pb);
        }
    }

    fn on_subtask_start(&self, spec: &SubTaskSpec, _position: usize, _total: usize) {
        self.with_bar(|pb| {
            pb.set_message(format!(
                "{} [{}] {}",
                spec.id,
                spec.task_type,
                truncate(&single_line(&spec.prompt_text), 48)
            ))
        });
    }

    fn on_attempt(&self, spec: &SubTaskSpec, attempt: &Attempt) {
        self.with_bar(|pb| pb.set_message(format!("{}: {}", spec.id, attempt_status(attempt))));
    }

    fn on_subtask_complete(&self, outcome: &SubTaskOutcome) {
        self.with_bar(|pb| {
            pb.set_message(format!("{} {}", outcome_mark(outcome), outcome.id()));
            pb.inc(1);
        });
    }

    fn on_aggregating(&self) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_with_message(format!("{}", "aggregating".green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl OrchestrationProgress for SimpleProgress {
    fn on_decomposed(&self, specs: &[SubTaskSpec]) {
        println!(
            "{} {} ({} sub-tasks)",
            "->".cyan(),
            "Decomposed".bold(),
            specs.len()
        );
    }

    fn on_subtask_start(&self, spec: &SubTaskSpec, position: usize, total: usize) {
        println!(
            "{} [{}/{}] {} ({}) {}",
            "->".cyan(),
            position + 1,
            total,
            spec.id.as_str().bold(),
            spec.task_type,
            truncate(&single_line(&spec.prompt_text), 72).dimmed()
        );
    }

    fn on_attempt(&self, _spec: &SubTaskSpec, attempt: &Attempt) {
        println!("   {}", attempt_status(attempt));
    }

    fn on_subtask_complete(&self, outcome: &SubTaskOutcome) {
        println!("  {} {} {}", outcome_mark(outcome), outcome.id(), outcome.status());
    }

    fn on_aggregating(&self) {
        println!("{} {}", "->".cyan(), "Aggregating".bold());
    }
}
