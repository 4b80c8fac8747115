use std::path::Path;

use eframe::egui;

use crate::element::image::data_uri_from_bytes;

/// What a dropped file turned into
#[derive(Debug, Clone, PartialEq)]
pub enum DroppedItem {
    /// An image, already embedded as a data URI
    Image { name: String, data_uri: String },
    /// Raw bytes of a PDF to import
    Pdf { name: String, bytes: Vec<u8> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Image,
    Pdf,
}

#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up files dropped this frame. Returns true if there are any.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
            }
        });
        !self.dropped_files.is_empty()
    }

    /// Read and classify the pending files. Unsupported or unreadable files
    /// are logged and skipped.
    pub fn process_dropped_files(&mut self) -> Vec<DroppedItem> {
        std::mem::take(&mut self.dropped_files)
            .iter()
            .filter_map(|file| {
                let name = display_name(file);
                let Some(kind) = classify(file) else {
                    log::warn!("Dropped file is not a supported type: {}", name);
                    return None;
                };
                let bytes = read_bytes(file, &name)?;
                match kind {
                    FileKind::Image => match data_uri_from_bytes(&bytes) {
                        Ok(data_uri) => {
                            log::info!("Embedding dropped image {} ({} bytes)", name, bytes.len());
                            Some(DroppedItem::Image { name, data_uri })
                        }
                        Err(err) => {
                            log::error!("Failed to decode image {}: {}", name, err);
                            None
                        }
                    },
                    FileKind::Pdf => Some(DroppedItem::Pdf { name, bytes }),
                }
            })
            .collect()
    }

    /// Preview files being dragged over the application
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, FontId, Id, LayerId, Order};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }
        let text = ctx.input(|i| {
            let mut text = "Drop images to place them, or a PDF to import it:\n".to_owned();
            for file in &i.raw.hovered_files {
                if let Some(path) = &file.path {
                    text += &format!("\n{}", path.display());
                } else if !file.mime.is_empty() {
                    text += &format!("\n{}", file.mime);
                }
            }
            text
        });

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            FontId::proportional(20.0),
            Color32::WHITE,
        );
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// By MIME type when known, otherwise by extension
fn classify(file: &egui::DroppedFile) -> Option<FileKind> {
    if file.mime == "application/pdf" {
        return Some(FileKind::Pdf);
    }
    if file.mime.starts_with("image/") {
        return Some(FileKind::Image);
    }
    let name = file
        .path
        .as_deref()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| file.name.clone().into());
    classify_extension(&name)
}

fn classify_extension(path: &Path) -> Option<FileKind> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "pdf" => Some(FileKind::Pdf),
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" => Some(FileKind::Image),
        _ => None,
    }
}

fn read_bytes(file: &egui::DroppedFile, name: &str) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Some(bytes.to_vec());
    }
    let path = file.path.as_ref()?;
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            log::error!("Failed to read dropped file {}: {}", name, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(classify_extension(Path::new("scan.PDF")), Some(FileKind::Pdf));
        assert_eq!(classify_extension(Path::new("logo.png")), Some(FileKind::Image));
        assert_eq!(classify_extension(Path::new("notes.txt")), None);
        assert_eq!(classify_extension(Path::new("README")), None);
    }

    #[test]
    fn test_process_in_memory_image() {
        let mut png = Vec::new();
        image::RgbaImage::new(2, 2)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let mut handler = FileHandler::new();
        handler.dropped_files = vec![egui::DroppedFile {
            name: "dot.png".to_owned(),
            mime: "image/png".to_owned(),
            bytes: Some(png.into()),
            ..Default::default()
        }];

        let items = handler.process_dropped_files();
        assert!(matches!(&items[..], [DroppedItem::Image { data_uri, .. }] if data_uri.starts_with("data:image/png;base64,")));
        assert!(handler.dropped_files.is_empty());
    }
}
