//! First-page geometry extraction
//!
//! Reads the first page's MediaBox and reports physical size in centimeters
//! plus orientation. A document that cannot be parsed is surfaced as an
//! error; the pipeline never guesses a size, since a wrong size misfeeds the
//! rasterizer's page matching.

use lopdf::{Document, Object, ObjectId};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// 1 cm = 28.3465 PostScript points
pub const POINTS_PER_CM: f64 = 28.3465;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("failed to parse PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF has no pages")]
    NoPages,

    #[error("first page has no usable MediaBox")]
    NoMediaBox,
}

/// Physical first-page geometry. `is_landscape` holds exactly when width
/// exceeds height; a square page is portrait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_cm: f64,
    pub height_cm: f64,
    pub is_landscape: bool,
}

impl PageGeometry {
    pub fn from_points(width_pt: f64, height_pt: f64) -> Self {
        let width_cm = round2(width_pt / POINTS_PER_CM);
        let height_cm = round2(height_pt / POINTS_PER_CM);
        Self {
            width_cm,
            height_cm,
            is_landscape: width_cm > height_cm,
        }
    }

    pub fn width_points(&self) -> f64 {
        self.width_cm * POINTS_PER_CM
    }

    pub fn height_points(&self) -> f64 {
        self.height_cm * POINTS_PER_CM
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Inspect the first page of the document at `path`.
pub fn inspect(path: &Path) -> Result<PageGeometry, InspectError> {
    let doc = Document::load(path)?;
    let pages = doc.get_pages();
    let (_, first_page) = pages.iter().next().ok_or(InspectError::NoPages)?;

    let media_box = media_box_of(&doc, *first_page).ok_or(InspectError::NoMediaBox)?;
    let width_pt = (media_box[2] - media_box[0]).abs();
    let height_pt = (media_box[3] - media_box[1]).abs();

    let geometry = PageGeometry::from_points(width_pt, height_pt);
    debug!(
        file = %path.display(),
        width_cm = geometry.width_cm,
        height_cm = geometry.height_cm,
        landscape = geometry.is_landscape,
        "page geometry"
    );
    Ok(geometry)
}

/// MediaBox of a page, following `Parent` links for inherited boxes.
fn media_box_of(doc: &Document, page_id: ObjectId) -> Option<[f64; 4]> {
    let mut dict = doc.get_object(page_id).ok()?.as_dict().ok()?;

    // page trees are shallow; the cap guards against reference cycles
    for _ in 0..16 {
        if let Ok(value) = dict.get(b"MediaBox") {
            let resolved = match value.as_reference() {
                Ok(id) => doc.get_object(id).ok()?,
                Err(_) => value,
            };
            if let Ok(array) = resolved.as_array() {
                if array.len() >= 4 {
                    let mut coords = [0f64; 4];
                    for (slot, object) in coords.iter_mut().zip(array.iter()) {
                        *slot = number(object)?;
                    }
                    return Some(coords);
                }
            }
            return None;
        }

        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}
