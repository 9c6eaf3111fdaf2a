use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use uuid::Uuid;

use crate::{
    config::RunConfig,
    error::{ComicError, Result},
    models::{
        Caption, EventSink, Panel, PanelRequest, PanelStatus, PipelineEvent, ReferenceImage,
    },
    prompt,
};

/// Seam between the pipeline and the image endpoint. The production
/// implementation is `openai::ImageClient`; tests supply their own.
/// Returns the base64 payload of the generated panel image.
#[async_trait]
pub trait PanelGenerator: Send + Sync {
    async fn generate(&self, request: &PanelRequest) -> Result<String>;
}

/// Sequential orchestrator for one comic run. Constructed per run; the
/// growing panel list lives inside `run`, never on the pipeline value,
/// so nothing leaks across runs.
///
/// Panels are generated strictly in order because each panel's
/// continuity context depends on the immediately preceding successful
/// panel. Failure of one panel never aborts the run.
pub struct PanelPipeline<G> {
    config: RunConfig,
    generator: G,
    cancelled: Arc<AtomicBool>,
}

impl<G: PanelGenerator> PanelPipeline<G> {
    pub fn new(config: RunConfig, generator: G) -> Self {
        Self {
            config,
            generator,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for cancelling the run. Checked between panel iterations
    /// only, never mid-request; panels not yet attempted stay Pending.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Drives panel generation across the full caption list. Returns
    /// Err only when input validation fails before any panel is
    /// attempted; individual panel failures are recorded on the panel
    /// and the run continues.
    pub async fn run(
        &self,
        raw_captions: &str,
        reference_image: &ReferenceImage,
        sink: &dyn EventSink,
    ) -> Result<Vec<Panel>> {
        self.validate_api_key()?;

        if reference_image.is_empty() {
            return Err(ComicError::Validation("Please upload an image".into()));
        }

        let captions = crate::models::parse_captions(raw_captions);
        if captions.is_empty() {
            return Err(ComicError::Validation(
                "Please enter captions for your comic panels".into(),
            ));
        }

        let run_id = Uuid::new_v4();
        let total = captions.len();
        log::info!("🎬 Starting run {} with {} panels", run_id, total);

        let mut panels: Vec<Panel> = captions.iter().map(Panel::pending).collect();

        for index in 0..total {
            if self.cancelled.load(Ordering::SeqCst) {
                log::warn!(
                    "Run {} cancelled after {} of {} panels",
                    run_id,
                    index,
                    total
                );
                sink.emit(PipelineEvent::RunComplete {
                    panels: panels.clone(),
                });
                return Ok(panels);
            }

            let position = index + 1;
            panels[index].status = PanelStatus::Generating;
            sink.emit(PipelineEvent::Progress {
                fraction: index as f64 / total as f64,
                message: progress_message(&captions[index], total),
            });

            // Continuity context comes from the position-1 panel, and
            // only if it succeeded. A failed predecessor contributes
            // nothing.
            let previous = if index > 0 && panels[index - 1].succeeded() {
                Some(panels[index - 1].clone())
            } else {
                None
            };

            let composed = prompt::compose(
                &captions[index],
                &captions,
                &self.config.templates,
                previous.as_ref(),
                &self.config.generation.prompt_prefix,
            );

            let request = PanelRequest {
                caption: captions[index].text.clone(),
                position,
                total,
                prompt: composed,
                reference_image: reference_image.bytes(),
            };

            let outcome = self.generator.generate(&request).await.and_then(|b64| {
                BASE64
                    .decode(b64.as_bytes())
                    .map_err(|e| ComicError::Response(format!("Invalid image payload: {}", e)))
            });

            match outcome {
                Ok(image) => {
                    log::info!("✅ Panel {}/{} generated", position, total);
                    panels[index].status = PanelStatus::Succeeded { image };
                    sink.emit(PipelineEvent::PanelCompleted {
                        position,
                        caption: captions[index].text.clone(),
                    });
                }
                Err(e) => {
                    let reason = e.to_string();
                    log::error!("❌ Panel {}/{} failed: {}", position, total, reason);
                    panels[index].status = PanelStatus::Failed {
                        reason: reason.clone(),
                    };
                    sink.emit(PipelineEvent::PanelFailed { position, reason });
                }
            }
        }

        sink.emit(PipelineEvent::Progress {
            fraction: 1.0,
            message: "Complete!".into(),
        });
        sink.emit(PipelineEvent::RunComplete {
            panels: panels.clone(),
        });

        let succeeded = panels.iter().filter(|p| p.succeeded()).count();
        log::info!(
            "🎉 Run {} finished: {}/{} panels succeeded",
            run_id,
            succeeded,
            total
        );

        Ok(panels)
    }

    fn validate_api_key(&self) -> Result<()> {
        match self.config.api.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(ComicError::Validation("Please enter your API key".into())),
        }
    }
}

fn progress_message(caption: &Caption, total: usize) -> String {
    if caption.position == 1 {
        format!("Drawing the opening panel: {}", caption.text)
    } else if caption.position == total {
        format!("Drawing the final panel: {}", caption.text)
    } else {
        format!(
            "Drawing panel {}/{}: {}",
            caption.position, total, caption.text
        )
    }
}
