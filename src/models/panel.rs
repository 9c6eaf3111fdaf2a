use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::Caption;

/// Per-panel state machine: Pending → Generating → {Succeeded | Failed}.
/// Terminal states are final; the pipeline never regresses a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelStatus {
    Pending,
    Generating,
    Succeeded { image: Vec<u8> },
    Failed { reason: String },
}

impl PanelStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PanelStatus::Succeeded { .. } | PanelStatus::Failed { .. }
        )
    }
}

/// One comic frame corresponding to one caption line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub position: usize,
    pub caption: String,
    pub status: PanelStatus,
}

impl Panel {
    pub fn pending(caption: &Caption) -> Self {
        Self {
            position: caption.position,
            caption: caption.text.clone(),
            status: PanelStatus::Pending,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.status, PanelStatus::Succeeded { .. })
    }

    /// Decoded image bytes, if this panel reached Succeeded.
    pub fn image(&self) -> Option<&[u8]> {
        match &self.status {
            PanelStatus::Succeeded { image } => Some(image.as_slice()),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            PanelStatus::Failed { reason } => Some(reason.as_str()),
            _ => None,
        }
    }
}

/// Everything one image-edit call needs. Built fresh per panel and
/// never mutated after the request is issued. The reference image is
/// shared read-only across all panels of a run.
#[derive(Debug, Clone)]
pub struct PanelRequest {
    pub caption: String,
    pub position: usize,
    pub total: usize,
    pub prompt: String,
    pub reference_image: Arc<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_pending_from_caption() {
        let caption = Caption::new("The hero arrives", 2);
        let panel = Panel::pending(&caption);

        assert_eq!(panel.position, 2);
        assert_eq!(panel.caption, "The hero arrives");
        assert_eq!(panel.status, PanelStatus::Pending);
        assert!(!panel.status.is_terminal());
        assert!(panel.image().is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(PanelStatus::Succeeded { image: vec![1] }.is_terminal());
        assert!(PanelStatus::Failed {
            reason: "boom".into()
        }
        .is_terminal());
        assert!(!PanelStatus::Generating.is_terminal());
    }
}
