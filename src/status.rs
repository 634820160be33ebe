//! Pipeline step reporting.
//!
//! The executor announces every step through a [`StepReporter`]. The default
//! [`LogReporter`] emits `tracing` events, [`IndicatifReporter`] keeps one
//! persistent terminal line per step and [`SilentReporter`] discards
//! everything.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// Lifecycle state of a pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// The step is executing.
    Running,
    /// The step was up to date and not executed.
    Skipped,
    /// The step finished successfully.
    Done,
    /// The step failed and the pipeline stopped.
    Failed,
}

impl StepState {
    /// Label shown next to the step.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Skipped => "up to date",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn step_label(current: usize, total: usize, name: &str) -> String {
    format!("[{current}/{total}] {name}")
}

fn step_summary(state: StepState, current: usize, total: usize, name: &str) -> String {
    format!("{}: {state}", step_label(current, total, name))
}

/// Report pipeline progress to the user.
pub trait StepReporter {
    /// Emit a status update for the 1-based step `current` of `total`.
    fn report_step(&self, current: usize, total: usize, name: &str, state: StepState);

    /// Emit a completion message after every scheduled step succeeded.
    fn report_complete(&self, executed: usize, skipped: usize);
}

/// Reports steps as `tracing` events.
#[derive(Debug, Default)]
pub struct LogReporter;

impl StepReporter for LogReporter {
    fn report_step(&self, current: usize, total: usize, name: &str, state: StepState) {
        let summary = step_summary(state, current, total, name);
        match state {
            StepState::Failed => warn!("{summary}"),
            StepState::Running | StepState::Skipped | StepState::Done => info!("{summary}"),
        }
    }

    fn report_complete(&self, executed: usize, skipped: usize) {
        info!(executed, skipped, "Pipeline finished");
    }
}

/// Silent reporter: emits nothing.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl StepReporter for SilentReporter {
    fn report_step(&self, _current: usize, _total: usize, _name: &str, _state: StepState) {}
    fn report_complete(&self, _executed: usize, _skipped: usize) {}
}

#[derive(Debug)]
struct IndicatifState {
    progress: MultiProgress,
    bars: Vec<ProgressBar>,
    running: Option<usize>,
}

/// Terminal reporter backed by `indicatif::MultiProgress`.
///
/// Bars are added as steps start, so skipped steps and steps after a failure
/// never show up as pending.
pub struct IndicatifReporter {
    style: ProgressStyle,
    state: Mutex<IndicatifState>,
}

impl IndicatifReporter {
    /// Construct a reporter drawing to stderr.
    #[must_use]
    pub fn new() -> Self {
        let progress = MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        progress.set_move_cursor(false);
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        Self {
            style,
            state: Mutex::new(IndicatifState {
                progress,
                bars: Vec::new(),
                running: None,
            }),
        }
    }

    fn bar_for(&self, state: &mut IndicatifState, index: usize) -> Option<ProgressBar> {
        while state.bars.len() <= index {
            let bar = state.progress.add(ProgressBar::new_spinner());
            bar.set_style(self.style.clone());
            state.bars.push(bar);
        }
        state.bars.get(index).cloned()
    }
}

impl fmt::Debug for IndicatifReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatifReporter").finish_non_exhaustive()
    }
}

impl Default for IndicatifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StepReporter for IndicatifReporter {
    fn report_step(&self, current: usize, total: usize, name: &str, step_state: StepState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let message = step_summary(step_state, current, total, name);
        if state.progress.is_hidden() {
            drop(writeln!(io::stderr(), "{message}"));
            return;
        }
        let index = current.saturating_sub(1);
        let Some(bar) = self.bar_for(&mut state, index) else {
            return;
        };
        if step_state == StepState::Running {
            bar.set_message(message);
            state.running = Some(index);
        } else {
            bar.finish_with_message(message);
            if state.running == Some(index) {
                state.running = None;
            }
        }
    }

    fn report_complete(&self, executed: usize, skipped: usize) {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let message = format!("Pipeline finished: {executed} executed, {skipped} up to date");
        if state.progress.is_hidden() {
            drop(writeln!(io::stderr(), "{message}"));
        } else {
            drop(state.progress.println(message));
        }
    }
}

impl Drop for IndicatifReporter {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = state.running.take().and_then(|i| state.bars.get(i)) {
            bar.abandon();
        }
    }
}
