use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use molcov::engine::progress::{Progress, ProgressCallback};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 100;

/// Renders engine progress on stderr: a spinner while a phase loads or
/// persists, a record-counting bar while the matching task runs. Finished
/// phases are cleared rather than left on screen; the run summary is
/// printed by the command afterwards.
pub struct MatchProgress {
    bar: ProgressBar,
}

impl MatchProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        bar.finish_and_clear();
        Self { bar }
    }

    /// Builds the reporter callback. `ProgressBar` clones share state, so
    /// this handle stays usable after the callback is handed off.
    pub fn callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();
        Box::new(move |event| match event {
            Progress::PhaseStart { name } => {
                bar.reset();
                bar.set_style(spinner_style());
                bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                bar.set_message(name);
            }
            Progress::PhaseFinish => {
                bar.disable_steady_tick();
                bar.finish_and_clear();
            }
            Progress::TaskStart { total } => {
                bar.reset();
                bar.set_style(counter_style());
                bar.set_length(total);
                bar.set_message("records");
            }
            Progress::TaskIncrement => bar.inc(1),
            Progress::TaskFinish => bar.finish_and_clear(),
            Progress::Message(msg) => bar.println(msg),
        })
    }
}

impl Default for MatchProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}...").expect("static template")
}

fn counter_style() -> ProgressStyle {
    ProgressStyle::with_template("{bar:36.green/dim} {human_pos}/{human_len} {msg} ({per_sec})")
        .expect("static template")
        .progress_chars("=>-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_cleared() {
        let progress = MatchProgress::new();
        assert!(progress.bar.is_finished());
    }

    #[test]
    fn phase_events_drive_the_spinner() {
        let progress = MatchProgress::new();
        let callback = progress.callback();

        callback(Progress::PhaseStart { name: "Loading" });
        assert_eq!(progress.bar.message(), "Loading");
        assert!(!progress.bar.is_finished());

        callback(Progress::PhaseFinish);
        assert!(progress.bar.is_finished());
    }

    #[test]
    fn task_events_drive_the_counter() {
        let progress = MatchProgress::new();
        let callback = progress.callback();

        callback(Progress::TaskStart { total: 3 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        assert_eq!(progress.bar.length(), Some(3));
        assert_eq!(progress.bar.position(), 2);

        callback(Progress::TaskFinish);
        assert!(progress.bar.is_finished());
    }

    #[test]
    fn callback_outlives_the_thread_it_runs_on() {
        let progress = MatchProgress::new();
        let callback = progress.callback();

        std::thread::spawn(move || {
            callback(Progress::TaskStart { total: 1 });
            callback(Progress::TaskIncrement);
            callback(Progress::TaskFinish);
        })
        .join()
        .unwrap();

        assert!(progress.bar.is_finished());
        assert_eq!(progress.bar.position(), 1);
    }
}
