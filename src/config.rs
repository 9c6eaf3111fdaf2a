use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("COMICGEN_API_KEY").ok();
        let base_url = env::var("COMICGEN_BASE_URL").ok();

        ApiConfig { api_key, base_url }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

/// Knobs forwarded to the image-edit endpoint, plus the prompt prefix
/// that opens every composed prompt.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub prompt_prefix: String,
    pub model: String,
    pub input_fidelity: String,
    pub quality: String,
    pub output_format: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            prompt_prefix: "Create a single comic panel featuring the character from the reference image:".to_string(),
            model: "gpt-image-1".to_string(),
            input_fidelity: "high".to_string(),
            quality: "high".to_string(),
            output_format: "jpeg".to_string(),
        }
    }
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prompt_prefix = prefix.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }
}

/// User-editable narrative templates. Blank templates contribute
/// nothing to the composed prompt; recognized placeholder tokens are
/// `{totalPanels}`, `{fullStory}`, `{panelNumber}`, `{previousPanel}`
/// and `{previousCaption}`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TemplateSet {
    pub story_context: String,
    pub opening_panel: String,
    pub middle_panel: String,
    pub final_panel: String,
    pub visual_continuity: String,
    pub impact: String,
}

impl Default for TemplateSet {
    fn default() -> Self {
        TemplateSet {
            story_context: "This is panel {panelNumber} of a {totalPanels}-panel comic strip telling one continuous story: {fullStory}".to_string(),
            opening_panel: "This is the opening panel. Establish the scene, the setting and the mood of the story.".to_string(),
            middle_panel: "This panel continues the story. Keep the scene and characters consistent with the previous panels.".to_string(),
            final_panel: "This is the final panel. Bring the story to its conclusion.".to_string(),
            visual_continuity: "Maintain visual continuity with panel {previousPanel}, which showed: {previousCaption}".to_string(),
            impact: "Use bold comic-book linework, dramatic lighting and vivid colors.".to_string(),
        }
    }
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// All six templates blank; compose() will emit the base
    /// instruction only.
    pub fn empty() -> Self {
        TemplateSet {
            story_context: String::new(),
            opening_panel: String::new(),
            middle_panel: String::new(),
            final_panel: String::new(),
            visual_continuity: String::new(),
            impact: String::new(),
        }
    }

    pub fn with_story_context(mut self, template: impl Into<String>) -> Self {
        self.story_context = template.into();
        self
    }

    pub fn with_visual_continuity(mut self, template: impl Into<String>) -> Self {
        self.visual_continuity = template.into();
        self
    }

    pub fn with_impact(mut self, template: impl Into<String>) -> Self {
        self.impact = template.into();
        self
    }
}

/// Immutable per-run configuration, assembled by the caller and handed
/// to the pipeline. The pipeline never mutates it.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub api: ApiConfig,
    pub generation: GenerationConfig,
    pub templates: TemplateSet,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        RunConfig {
            api: ApiConfig::from_env(),
            generation: GenerationConfig::default(),
            templates: TemplateSet::default(),
        }
    }

    pub fn with_api(mut self, api: ApiConfig) -> Self {
        self.api = api;
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_templates(mut self, templates: TemplateSet) -> Self {
        self.templates = templates;
        self
    }
}
