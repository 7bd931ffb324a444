use axum::body::Bytes;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use blogsift_core::ExtractionResult;
use blogsift_core::fetch::{fetch_url, parse_http_url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::AppContext;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: Option<String>,
}

pub fn routes() -> Router {
    Router::new().route("/scrape-blog", post(scrape_blog))
}

pub fn health_check() -> Router {
    Router::new().route("/health", get(|| async { "ok" }))
}

/// The body is read as JSON whatever its declared content type.
async fn scrape_blog(Extension(context): Extension<AppContext>, body: Bytes) -> Result<Json<ExtractionResult>> {
    let request: ScrapeRequest = serde_json::from_slice(&body).map_err(|e| Error::BadRequest(e.to_string()))?;
    let url = request
        .url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(Error::MissingUrl)?;
    let target = parse_http_url(&url).map_err(|e| Error::BadRequest(e.to_string()))?;

    info!(url = %target, "Scraping blog");
    let page = fetch_url(target.as_str(), &context.fetch).await?;
    debug!(final_url = %page.url, bytes = page.html.len(), "Fetched page");

    let extractor = context.extractor.clone();
    let result = tokio::task::spawn_blocking(move || extractor.extract(&page.html, Some(page.url.as_str()))).await??;

    info!(title = %result.title, images = result.images.len(), "Extracted blog post");
    Ok(Json(result))
}
