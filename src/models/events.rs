use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::models::Panel;

/// Events produced by one pipeline run, in order: interleaved Progress
/// and per-panel outcomes, then a final Progress at 1.0, then
/// RunComplete carrying every panel (Failed ones included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineEvent {
    Progress { fraction: f64, message: String },
    PanelCompleted { position: usize, caption: String },
    PanelFailed { position: usize, reason: String },
    RunComplete { panels: Vec<Panel> },
}

/// Where the pipeline publishes its events. Implementations must not
/// block for long; the pipeline emits from its own task.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Sink that drops every event, for callers that only want the
/// returned panel list.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}

/// Sink backed by an unbounded tokio channel so a reactive consumer
/// can drive a view from the event feed.
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<PipelineEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, UnboundedReceiverStream<PipelineEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, UnboundedReceiverStream::new(receiver))
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: PipelineEvent) {
        // Receiver gone means nobody is watching anymore; the run
        // itself must not fail because of that.
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (sink, mut stream) = ChannelSink::new();

        sink.emit(PipelineEvent::Progress {
            fraction: 0.0,
            message: "start".into(),
        });
        sink.emit(PipelineEvent::PanelCompleted {
            position: 1,
            caption: "a".into(),
        });
        drop(sink);

        let first = stream.next().await.unwrap();
        assert!(matches!(first, PipelineEvent::Progress { .. }));
        let second = stream.next().await.unwrap();
        assert!(matches!(
            second,
            PipelineEvent::PanelCompleted { position: 1, .. }
        ));
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn test_channel_sink_ignores_dropped_receiver() {
        let (sink, stream) = ChannelSink::new();
        drop(stream);
        sink.emit(PipelineEvent::Progress {
            fraction: 1.0,
            message: "done".into(),
        });
    }
}
