//! Comicgen turns one reference image plus an ordered list of captions
//! into a sequence of AI-generated comic panels.
//!
//! The core is two pieces: the [`prompt`] composer, a pure function
//! that layers narrative context onto each caption, and the
//! [`pipeline`], a strictly sequential orchestrator that isolates
//! per-panel failures so one bad panel never sinks the run. Around
//! them sit the HTTP clients ([`openai`]), artifact export
//! ([`export`], [`layout`]) and persisted settings ([`settings`]).

pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod logger;
pub mod models;
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod settings;

pub use config::{ApiConfig, GenerationConfig, RunConfig, TemplateSet};
pub use error::{ComicError, Result};
pub use models::{
    Caption, ChannelSink, EventSink, NullSink, Panel, PanelRequest, PanelStatus, PipelineEvent,
    ReferenceImage,
};
pub use openai::{ChatClient, ImageClient, OpenAiClient};
pub use pipeline::{PanelGenerator, PanelPipeline};
