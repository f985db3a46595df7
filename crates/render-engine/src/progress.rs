//! Export run state and progress reporting.

use serde::Serialize;

/// Stages of an export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    Preparing,
    Capturing,
    Encoding,
    Done,
    Failed,
}

impl RunStatus {
    /// Whether a run in this status still holds the export lock.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Preparing | Self::Capturing | Self::Encoding)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::Capturing => "capturing",
            Self::Encoding => "encoding",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Progress event delivered on every state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportProgress {
    pub stage: RunStatus,

    /// Overall progress in `[0.0, 1.0]`; exactly `1.0` only once done.
    pub fraction: f64,

    /// Human-readable step, e.g. "Capturing frame 2 of 5".
    pub label: String,

    pub frames_captured: usize,
    pub total_frames: usize,
}

/// Progress callback for export runs.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Observable record of the current (or last finished) run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExportRun {
    pub status: RunStatus,
    pub frames_captured: usize,
    pub total_frames: usize,
    pub progress: f64,
    pub label: String,

    /// Display form of the failure, when `status` is `Failed`.
    pub error: Option<String>,
}

impl ExportRun {
    /// Fresh record for a run about to start.
    pub(crate) fn preparing(total_frames: usize) -> Self {
        Self {
            status: RunStatus::Preparing,
            total_frames,
            label: "Loading assets".to_string(),
            ..Self::default()
        }
    }

    pub fn to_progress(&self) -> ExportProgress {
        ExportProgress {
            stage: self.status,
            fraction: self.progress,
            label: self.label.clone(),
            frames_captured: self.frames_captured,
            total_frames: self.total_frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(RunStatus::Capturing.is_active());
        assert!(!RunStatus::Idle.is_active());
        assert!(RunStatus::Failed.is_terminal());
        assert!(!RunStatus::Encoding.is_terminal());
        assert_eq!(RunStatus::Encoding.to_string(), "encoding");
    }

    #[test]
    fn test_preparing_record() {
        let run = ExportRun::preparing(3);
        assert_eq!(run.status, RunStatus::Preparing);
        assert_eq!(run.total_frames, 3);
        assert_eq!(run.progress, 0.0);

        let event = run.to_progress();
        assert_eq!(event.stage, RunStatus::Preparing);
        assert_eq!(event.label, "Loading assets");
    }
}
