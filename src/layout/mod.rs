use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;

use crate::{
    error::{ComicError, Result},
    export::panel_filename,
    models::{ChatMessage, Panel},
    openai::ChatClient,
};

const LAYOUT_MODEL: &str = "gpt-4o-mini";
const LAYOUT_MAX_TOKENS: u32 = 2000;
const LAYOUT_TEMPERATURE: f32 = 0.3;

const SYSTEM_INSTRUCTION: &str = "You are a web developer creating HTML comic layouts. \
     Generate only clean, valid HTML code without any explanations or markdown formatting.";

/// Deterministic HTML document: one card per succeeded panel, in
/// ascending position order, images inlined as base64 data URIs.
pub fn default_comic_html(panels: &[Panel]) -> Result<String> {
    let succeeded = succeeded_panels(panels)?;
    Ok(render_default(&succeeded))
}

/// LLM-generated layout from a caller-supplied template. The template
/// may reference `{panelCount}`, `{panelImages}` and `{captions}`;
/// the model is told to answer with bare HTML, and placeholder
/// filenames in its answer are replaced by the matching panel's data
/// URI. Any failure falls back to the default layout.
pub async fn custom_comic_html(
    chat: &ChatClient,
    template: &str,
    panels: &[Panel],
) -> Result<String> {
    let succeeded = succeeded_panels(panels)?;

    match request_custom(chat, template, &succeeded).await {
        Ok(html) => Ok(html),
        Err(e) => {
            log::warn!("Custom layout failed, using default: {}", e);
            Ok(render_default(&succeeded))
        }
    }
}

fn succeeded_panels<'a>(panels: &'a [Panel]) -> Result<Vec<&'a Panel>> {
    let succeeded: Vec<&Panel> = panels.iter().filter(|p| p.succeeded()).collect();
    if succeeded.is_empty() {
        return Err(ComicError::Validation(
            "No comic panels to download".into(),
        ));
    }
    Ok(succeeded)
}

async fn request_custom(
    chat: &ChatClient,
    template: &str,
    succeeded: &[&Panel],
) -> Result<String> {
    let filenames: Vec<String> = succeeded
        .iter()
        .map(|p| panel_filename(p.position, "jpg"))
        .collect();
    let captions: Vec<&str> = succeeded.iter().map(|p| p.caption.as_str()).collect();

    let processed = template
        .replace("{panelCount}", &succeeded.len().to_string())
        .replace(
            "{panelImages}",
            &serde_json::to_string(&filenames)
                .map_err(|e| ComicError::Serialization(e.to_string()))?,
        )
        .replace(
            "{captions}",
            &serde_json::to_string(&captions)
                .map_err(|e| ComicError::Serialization(e.to_string()))?,
        );

    let content = chat
        .complete(
            LAYOUT_MODEL,
            vec![
                ChatMessage::system(SYSTEM_INSTRUCTION),
                ChatMessage::user(processed),
            ],
            LAYOUT_MAX_TOKENS,
            LAYOUT_TEMPERATURE,
        )
        .await?;

    let mut html = strip_markdown_fences(content.trim());

    // Models answer with the placeholder filenames they were given;
    // swap each one for the real image data.
    for (panel, filename) in succeeded.iter().zip(&filenames) {
        if let Some(image) = panel.image() {
            html = html.replace(filename.as_str(), &data_uri(image));
        }
    }

    Ok(html.trim().to_string())
}

fn strip_markdown_fences(content: &str) -> String {
    let mut html = content.replace("```html\n", "").replace("```html", "");
    let trimmed = html.trim_end();
    if let Some(stripped) = trimmed.strip_suffix("```") {
        html = stripped.to_string();
    }
    html
}

fn data_uri(image: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64.encode(image))
}

fn render_default(succeeded: &[&Panel]) -> String {
    let timestamp = Utc::now().format("%B %-d, %Y %-H:%M");

    let panels_html: String = succeeded
        .iter()
        .map(|panel| {
            format!(
                r#"
      <div class="card mb-4 border-dark">
        <div class="card-header bg-danger text-white">
          <h5 class="card-title mb-0">Panel {position}</h5>
        </div>
        <img src="{src}" alt="Panel {position}" class="card-img-top">
        <div class="card-footer bg-dark text-white">
          <p class="card-text mb-0 fw-bold">{caption}</p>
        </div>
      </div>"#,
                position = panel.position,
                src = data_uri(panel.image().unwrap_or_default()),
                caption = panel.caption,
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generated Comic</title>
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css" rel="stylesheet">
</head>
<body class="bg-light">
    <div class="container my-5">
        <div class="row justify-content-center">
            <div class="col-lg-8">
                <div class="card shadow">
                    <div class="card-header text-center bg-dark text-white">
                        <h1 class="display-4 mb-0">Generated Comic</h1>
                        <p class="lead mb-0">Created on {timestamp}</p>
                    </div>
                    <div class="card-body">{panels_html}</div>
                    <div class="card-footer text-center text-muted">
                        <p class="mb-1">Generated with high input fidelity from one reference image</p>
                        <p class="mb-0">Total panels: {count}</p>
                    </div>
                </div>
            </div>
        </div>
    </div>
</body>
</html>"#,
        timestamp = timestamp,
        panels_html = panels_html,
        count = succeeded.len(),
    )
}
