use serde::{Deserialize, Serialize};

use crate::error::StylingError;
use crate::session::LoadingLabel;

/// A transient failure message for the user. Notices are never stored in
/// the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    /// Shown when the initial outfit critique fails.
    pub const ANALYSIS_FAILED: &'static str = "分析失敗，請重試";
    /// Shown when any step of a generation fails.
    pub const GENERATION_FAILED: &'static str = "處理失敗，請嘗試不同的圖片或描述";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The generic notice for a failed gateway call. The detail is logged,
    /// never shown.
    pub fn for_failure(error: &StylingError) -> Self {
        use crate::error::StylingStage;
        match error.stage() {
            StylingStage::Analysis => Self::new(Self::ANALYSIS_FAILED),
            _ => Self::new(Self::GENERATION_FAILED),
        }
    }
}

/// Events published by the workflow while it drives a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// A gateway-calling operation started, or moved on to its next step.
    LoadingStarted { label: LoadingLabel },
    /// The operation settled and the session is interactive again.
    LoadingFinished,
    /// Something the user should see once.
    Notice { notice: Notice },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_notice_is_generic() {
        let notice = Notice::for_failure(&StylingError::MatchAnalysis("HTTP 500".into()));
        assert_eq!(notice.message, Notice::GENERATION_FAILED);
        assert!(!notice.message.contains("500"));

        let notice = Notice::for_failure(&StylingError::Analysis("timeout".into()));
        assert_eq!(notice.message, Notice::ANALYSIS_FAILED);
    }

    #[test]
    fn test_event_tagging() {
        let event = WorkflowEvent::LoadingStarted {
            label: LoadingLabel::AnalyzingMatch,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "loading_started");
        assert_eq!(json["label"], "analyzing_match");
    }
}
