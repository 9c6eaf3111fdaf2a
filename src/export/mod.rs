use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::{
    error::{ComicError, Result},
    models::Panel,
};

/// `panel_001.jpg`, `panel_002.png`, ...
pub fn panel_filename(position: usize, ext: &str) -> String {
    format!("panel_{:03}.{}", position, ext)
}

pub fn archive_filename() -> String {
    format!("comic_panels_{}.zip", Utc::now().format("%Y-%m-%d"))
}

pub fn comic_filename() -> String {
    format!("comic_{}.html", Utc::now().format("%Y-%m-%d"))
}

/// Writes one succeeded panel's image into `dir` and returns the path.
pub fn save_panel(panel: &Panel, dir: &Path, ext: &str) -> Result<PathBuf> {
    let image = panel.image().ok_or_else(|| {
        ComicError::Validation(format!("Panel {} has no image to download", panel.position))
    })?;

    let path = dir.join(panel_filename(panel.position, ext));
    fs::write(&path, image)?;
    log::info!("💾 Panel saved to: {}", path.display());
    Ok(path)
}

/// Zip archive of every succeeded panel as JPEG, in position order.
/// Refuses to produce an empty archive.
pub fn panels_zip(panels: &[Panel]) -> Result<Vec<u8>> {
    let succeeded: Vec<&Panel> = panels.iter().filter(|p| p.succeeded()).collect();
    if succeeded.is_empty() {
        return Err(ComicError::Validation("No panels to download".into()));
    }

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for panel in &succeeded {
            zip.start_file(panel_filename(panel.position, "jpg"), options)
                .map_err(|e| ComicError::File(e.to_string()))?;
            zip.write_all(panel.image().unwrap_or_default())?;
        }
        zip.finish().map_err(|e| ComicError::File(e.to_string()))?;
    }

    Ok(buffer.into_inner())
}

/// Writes the panel archive into `dir` with a date-stamped name.
pub fn save_panels_zip(panels: &[Panel], dir: &Path) -> Result<PathBuf> {
    let bytes = panels_zip(panels)?;
    let path = dir.join(archive_filename());
    fs::write(&path, bytes)?;
    log::info!("💾 Panel archive saved to: {}", path.display());
    Ok(path)
}

/// Writes an already-rendered comic HTML document into `dir`.
pub fn save_comic_html(html: &str, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(comic_filename());
    fs::write(&path, html)?;
    log::info!("💾 Comic saved to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PanelStatus;
    use std::io::Read;
    use zip::ZipArchive;

    fn succeeded(position: usize, image: &[u8]) -> Panel {
        Panel {
            position,
            caption: format!("caption {}", position),
            status: PanelStatus::Succeeded {
                image: image.to_vec(),
            },
        }
    }

    fn failed(position: usize) -> Panel {
        Panel {
            position,
            caption: format!("caption {}", position),
            status: PanelStatus::Failed {
                reason: "boom".into(),
            },
        }
    }

    #[test]
    fn test_panel_filename_zero_padded() {
        assert_eq!(panel_filename(1, "jpg"), "panel_001.jpg");
        assert_eq!(panel_filename(42, "png"), "panel_042.png");
        assert_eq!(panel_filename(137, "jpg"), "panel_137.jpg");
    }

    #[test]
    fn test_zip_contains_only_succeeded_panels() {
        let panels = vec![succeeded(1, b"one"), failed(2), succeeded(3, b"three")];
        let bytes = panels_zip(&panels).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["panel_001.jpg", "panel_003.jpg"]);

        let mut entry = archive.by_name("panel_003.jpg").unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"three");
    }

    #[test]
    fn test_zip_refuses_empty_run() {
        assert!(matches!(
            panels_zip(&[]),
            Err(ComicError::Validation(_))
        ));
        assert!(matches!(
            panels_zip(&[failed(1), failed(2)]),
            Err(ComicError::Validation(_))
        ));
    }

    #[test]
    fn test_save_panel_writes_image_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let panel = succeeded(7, b"payload");

        let path = save_panel(&panel, dir.path(), "png").unwrap();
        assert!(path.ends_with("panel_007.png"));
        assert_eq!(fs::read(&path).unwrap(), b"payload");
    }

    #[test]
    fn test_save_panel_rejects_failed_panel() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            save_panel(&failed(1), dir.path(), "jpg"),
            Err(ComicError::Validation(_))
        ));
    }

    #[test]
    fn test_save_comic_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_comic_html("<html></html>", dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
        assert!(path.to_string_lossy().contains("comic_"));
    }
}
