use std::env;
use std::fs;
use std::path::PathBuf;

use futures::StreamExt;

use comicgen::{
    export, layout,
    logger::{self, LoggerConfig},
    settings::{SettingsStore, StoredSettings},
    ChannelSink, OpenAiClient, PanelPipeline, PipelineEvent, ReferenceImage, RunConfig,
    TemplateSet,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    logger::init_with_config(LoggerConfig::development())?;
    logger::log_startup_info("comicgen", env!("CARGO_PKG_VERSION"));

    let image_path = env::args()
        .nth(1)
        .or_else(|| env::var("COMICGEN_IMAGE").ok())
        .ok_or("Usage: comicgen <reference-image> <captions-file>")?;
    let captions_path = env::args()
        .nth(2)
        .or_else(|| env::var("COMICGEN_CAPTIONS").ok())
        .ok_or("Usage: comicgen <reference-image> <captions-file>")?;

    // Persisted settings seed the run config; environment variables win.
    let settings_path =
        env::var("COMICGEN_SETTINGS").unwrap_or_else(|_| "comicgen_settings.json".to_string());
    let store = SettingsStore::new(&settings_path);
    let stored = match store.load() {
        Ok(Some(stored)) => {
            log::info!("⚙️  Settings loaded from {}", settings_path);
            stored
        }
        Ok(None) => StoredSettings::default(),
        Err(e) => {
            log::warn!("⚠️  Could not read settings: {}", e);
            StoredSettings::default()
        }
    };

    let mut api = stored.api_config();
    let env_api = comicgen::ApiConfig::from_env();
    if env_api.api_key.is_some() {
        api.api_key = env_api.api_key;
    }
    if env_api.base_url.is_some() {
        api.base_url = env_api.base_url;
    }

    let templates = stored.templates.clone().unwrap_or_else(TemplateSet::default);
    let config = RunConfig::new().with_api(api).with_templates(templates);

    // Write the effective settings back, like the browser original did
    // on every edit.
    let _ = store.save(&StoredSettings {
        api_key: config.api.api_key.clone(),
        base_url: config.api.base_url.clone(),
        templates: Some(config.templates.clone()),
    });

    log::info!("🖼️  Loading reference image: {}", image_path);
    let reference = ReferenceImage::from_bytes(fs::read(&image_path)?)?;
    log::info!(
        "   {} bytes, format {:?}",
        reference.len(),
        reference.format()
    );

    let raw_captions = fs::read_to_string(&captions_path)?;

    let client = OpenAiClient::new(&config)?;
    let pipeline = PanelPipeline::new(config.clone(), client.image().clone());

    let (sink, mut events) = ChannelSink::new();
    let consumer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                PipelineEvent::Progress { fraction, message } => {
                    log::info!("📊 {:>5.1}% — {}", fraction * 100.0, message);
                }
                PipelineEvent::PanelCompleted { position, caption } => {
                    log::info!("🖌️  Panel {} done: {}", position, caption);
                }
                PipelineEvent::PanelFailed { position, reason } => {
                    log::error!("❌ Panel {} failed: {}", position, reason);
                }
                PipelineEvent::RunComplete { panels } => {
                    let ok = panels.iter().filter(|p| p.succeeded()).count();
                    log::info!("🏁 Run complete: {}/{} panels", ok, panels.len());
                }
            }
        }
    });

    let timer = logger::timer("comic run");
    let panels = pipeline.run(&raw_captions, &reference, &sink).await?;
    drop(sink);
    timer.stop();
    let _ = consumer.await;

    let out_dir = PathBuf::from(
        env::var("COMICGEN_OUT_DIR").unwrap_or_else(|_| "comic_output".to_string()),
    );
    fs::create_dir_all(&out_dir)?;

    for panel in panels.iter().filter(|p| p.succeeded()) {
        export::save_panel(panel, &out_dir, &config.generation.output_format)?;
    }

    match export::save_panels_zip(&panels, &out_dir) {
        Ok(path) => log::info!("📦 Archive: {}", path.display()),
        Err(e) => log::error!("❌ Archive failed: {}", e),
    }

    let html = match env::var("COMICGEN_HTML_PROMPT") {
        Ok(template) if !template.trim().is_empty() => {
            layout::custom_comic_html(client.chat(), &template, &panels).await
        }
        _ => layout::default_comic_html(&panels),
    };

    match html {
        Ok(html) => {
            let path = export::save_comic_html(&html, &out_dir)?;
            log::info!("📖 Comic: {}", path.display());
        }
        Err(e) => log::error!("❌ Comic export failed: {}", e),
    }

    log::info!("🎉 All done, artifacts in {}", out_dir.display());
    Ok(())
}
