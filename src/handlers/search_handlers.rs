use std::path::Path;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::assets::{self, PictureAsset};
use crate::config::Config;
use crate::errors::{render, AppError};
use crate::models::search;
use crate::models::store::RecordStore;
use crate::pptx::{self, SubstitutionPlan};
use crate::templates_structs::IndexTemplate;

pub const NO_PEOPLE_MATCH: &str = "No matching data found in People.csv.";
pub const NO_PRODUCTS_MATCH: &str = "No matching data found in Products.csv.";

const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

#[derive(Deserialize)]
pub struct GeneralSearchForm {
    pub general_search_term: String,
}

#[derive(Deserialize)]
pub struct SpecificSearchForm {
    pub column: String,
    pub specific_search_term: String,
    pub template: String,
}

/// GET / — search form listing the people store's columns
pub async fn index(config: web::Data<Config>) -> Result<HttpResponse, AppError> {
    let people = RecordStore::load(&config.people_csv)?;
    let tmpl = IndexTemplate {
        columns: people.columns,
        search_term: String::new(),
        results: Vec::new(),
        searched: false,
    };
    render(tmpl)
}

/// POST /general_search — substring match across every column
pub async fn general_search(
    config: web::Data<Config>,
    form: web::Form<GeneralSearchForm>,
) -> Result<HttpResponse, AppError> {
    let term = form.general_search_term.trim().to_lowercase();
    let people = RecordStore::load(&config.people_csv)?;
    log::debug!("general search for {term:?}");

    let results = search::general_match(&people, &term)
        .into_iter()
        .map(|row| people.row_values(row))
        .collect();

    let tmpl = IndexTemplate {
        columns: people.columns.clone(),
        search_term: term,
        results,
        searched: true,
    };
    render(tmpl)
}

/// POST /specific_search — exact-column match, category join, then deck
/// generation streamed back as a download. Empty match results are plain
/// informational messages, not errors.
pub async fn specific_search(
    config: web::Data<Config>,
    form: web::Form<SpecificSearchForm>,
) -> Result<HttpResponse, AppError> {
    let term = form.specific_search_term.trim().to_lowercase();
    let people = RecordStore::load(&config.people_csv)?;
    let products = RecordStore::load(&config.products_csv)?;

    // Several rows may match; the first is authoritative.
    let Some(person) = search::specific_match(&people, &form.column, &term)
        .into_iter()
        .next()
    else {
        return Ok(plain_message(NO_PEOPLE_MATCH));
    };
    let Some(product) = search::category_matches(&products, person.get("Category"))
        .into_iter()
        .next()
    else {
        return Ok(plain_message(NO_PRODUCTS_MATCH));
    };

    let qr = build_qr_asset(person.get("QRCodeURL"));
    let photo = build_photo_asset(person.get("ImgURL")).await;
    let plan = SubstitutionPlan::build(person, product, qr, photo);
    let bytes = pptx::generate(Path::new(&form.template), &plan)?;

    Ok(HttpResponse::Ok()
        .content_type(PPTX_CONTENT_TYPE)
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"Updated_Presentation.pptx\"",
        ))
        .body(bytes))
}

fn plain_message(msg: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(msg.to_string())
}

/// A failed QR synthesis degrades to a deck without the picture.
fn build_qr_asset(url: &str) -> Option<PictureAsset> {
    if url.trim().is_empty() {
        return None;
    }
    match assets::qr_png(url) {
        Ok(asset) => Some(asset),
        Err(e) => {
            log::warn!("QR code generation failed: {e}");
            None
        }
    }
}

/// A failed download likewise leaves the IMAGE placeholder in place.
async fn build_photo_asset(url: &str) -> Option<PictureAsset> {
    if url.trim().is_empty() {
        return None;
    }
    match assets::fetch_image(url).await {
        Ok(asset) => Some(asset),
        Err(e) => {
            log::warn!("Image download failed: {e}");
            None
        }
    }
}
