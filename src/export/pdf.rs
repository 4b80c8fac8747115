use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Document, Object, Stream, dictionary};

use crate::error::ExportError;

/// A4 in PDF points
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

/// One page worth of raster, 8-bit RGB rows
#[derive(Debug, Clone)]
pub struct Strip {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Cut an RGBA canvas into A4-proportioned strips from the top.
/// A remainder shorter than `min_tail` rows is merged into the last strip.
pub fn slice_strips(rgba: &[u8], width: u32, height: u32, min_tail: u32) -> Vec<Strip> {
    let page_rows = ((width as f32) * A4_HEIGHT_PT / A4_WIDTH_PT).floor().max(1.0) as u32;

    let mut bounds = Vec::new();
    let mut top = 0;
    while top < height {
        let bottom = (top + page_rows).min(height);
        bounds.push((top, bottom));
        top = bottom;
    }
    if bounds.len() > 1 {
        if let Some(&(tail_top, tail_bottom)) = bounds.last() {
            if tail_bottom - tail_top < min_tail {
                bounds.pop();
                if let Some(last) = bounds.last_mut() {
                    last.1 = tail_bottom;
                }
            }
        }
    }

    let row_bytes = width as usize * 4;
    bounds
        .into_iter()
        .map(|(top, bottom)| {
            let rows = &rgba[top as usize * row_bytes..bottom as usize * row_bytes];
            let rgb = rows
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            Strip {
                width,
                height: bottom - top,
                rgb,
            }
        })
        .collect()
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// One A4 page per strip, each image full width and anchored to the top.
/// Strips taller than a page are scaled to fit the page height.
pub fn assemble(strips: &[Strip]) -> Result<Document, ExportError> {
    if strips.is_empty() {
        return Err(ExportError::EmptyDocument);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(strips.len());

    for strip in strips {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => strip.width as i64,
                "Height" => strip.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(&strip.rgb)?,
        )
        .with_compression(false);
        let image_id = doc.add_object(image);

        let px_per_pt = strip.width as f32 / A4_WIDTH_PT;
        let mut draw_height = strip.height as f32 / px_per_pt;
        let mut draw_width = A4_WIDTH_PT;
        if draw_height > A4_HEIGHT_PT {
            draw_width *= A4_HEIGHT_PT / draw_height;
            draw_height = A4_HEIGHT_PT;
        }
        let y = A4_HEIGHT_PT - draw_height;
        let ops = format!(
            "q\n{:.2} 0 0 {:.2} 0 {:.2} cm\n/Im0 Do\nQ\n",
            draw_width, draw_height, y
        );
        let content_id = doc.add_object(Stream::new(dictionary! {}, ops.into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(A4_WIDTH_PT), Object::Real(A4_HEIGHT_PT)],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    Ok(doc)
}
