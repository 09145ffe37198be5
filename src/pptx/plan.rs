//! The substitution plan: one up-front mapping from shape name to the
//! action taken on it, so the slide rewrite is a single lookup per shape
//! instead of string comparisons scattered through the traversal.

use std::collections::HashMap;

use crate::assets::PictureAsset;
use crate::models::store::Record;

/// Shape names the engine knows about. Anything else is left untouched,
/// and a template whose layout drifted simply gets fewer substitutions.
const FOOTNOTE_SHAPE: &str = "Footer Placeholder 4";
const UPDATED_SHAPE: &str = "TextBox 11";
const TITLE_SHAPE: &str = "Title 1";
const SUBTITLE_SHAPE: &str = "TextBox 2";
const SECTIONS_SHAPE: &str = "TextBox 5";
const QR_SHAPE: &str = "QR CODE";
const IMAGE_SHAPE: &str = "IMAGE";

const SECTION_COLUMNS: [&str; 3] = ["Section 1", "Section 2", "Section 3"];

/// What to do with a text shape.
#[derive(Debug, Clone)]
pub enum TextAction {
    /// Overwrite the text of every run in the shape, keeping the
    /// paragraph/run structure (and run formatting) intact.
    Runs(String),
    /// Clear the whole text frame and set it to this text, one
    /// paragraph per line.
    Frame(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureKind {
    QrCode,
    Photo,
}

pub struct SubstitutionPlan {
    text: HashMap<&'static str, TextAction>,
    pictures: HashMap<&'static str, PictureKind>,
    assets: HashMap<PictureKind, PictureAsset>,
}

impl SubstitutionPlan {
    /// Precompute every substitution from the first matched person record
    /// and the first category-matched product record. Pictures are planned
    /// only for assets that were actually produced; a missing asset leaves
    /// the placeholder shape alone.
    pub fn build(
        person: &Record,
        product: &Record,
        qr: Option<PictureAsset>,
        photo: Option<PictureAsset>,
    ) -> Self {
        let mut text = HashMap::new();
        text.insert(FOOTNOTE_SHAPE, TextAction::Runs(person.get("FootNote").to_string()));
        text.insert(UPDATED_SHAPE, TextAction::Runs(person.get("Updated").to_string()));
        text.insert(TITLE_SHAPE, TextAction::Runs(person.get("Title").to_string()));
        text.insert(SUBTITLE_SHAPE, TextAction::Frame(person.get("SubTitle").to_string()));
        text.insert(SECTIONS_SHAPE, TextAction::Frame(combined_sections(product, person)));

        let mut pictures = HashMap::new();
        let mut assets = HashMap::new();
        if let Some(asset) = qr {
            pictures.insert(QR_SHAPE, PictureKind::QrCode);
            assets.insert(PictureKind::QrCode, asset);
        }
        if let Some(asset) = photo {
            pictures.insert(IMAGE_SHAPE, PictureKind::Photo);
            assets.insert(PictureKind::Photo, asset);
        }

        Self { text, pictures, assets }
    }

    pub fn text_action(&self, shape_name: &str) -> Option<&TextAction> {
        self.text.get(shape_name)
    }

    pub fn picture(&self, shape_name: &str) -> Option<PictureKind> {
        self.pictures.get(shape_name).copied()
    }

    pub fn asset(&self, kind: PictureKind) -> &PictureAsset {
        &self.assets[&kind]
    }
}

/// Zip the product's `Section 1..3` (questions) with the person's
/// (answers): each pair renders as `"{q}:\n{a}"`, pairs separated by a
/// blank line. Always three pairs; absent fields are empty strings.
fn combined_sections(product: &Record, person: &Record) -> String {
    SECTION_COLUMNS
        .iter()
        .map(|column| format!("{}:\n{}", product.get(column), person.get(column)))
        .collect::<Vec<_>>()
        .join("\n\n")
}
