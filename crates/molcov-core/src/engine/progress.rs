//! Progress reporting between long-running engine work and its caller.
//!
//! The engine stays ignorant of terminals and progress bars: it emits
//! [`Progress`] events through an optional callback and the frontend
//! decides how to render them.

#[derive(Debug, Clone)]
pub enum Progress {
    /// A named phase begins (loading, matching, persisting).
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// A counted task begins; one [`Progress::TaskIncrement`] follows per
    /// completed work item.
    TaskStart { total: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
