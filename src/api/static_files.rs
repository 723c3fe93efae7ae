//! Embedded static asset serving
//!
//! Serves the built-in scripts and styles under /static from the binary.
//! Uploaded files are served separately via tower-http's ServeDir.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::site::StaticAssets;

/// GET /static/*path
pub async fn serve_static(Path(path): Path<String>) -> Response {
    let Some(asset) = StaticAssets::get(&path) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    (
        [
            (header::CONTENT_TYPE, content_type_for(&path)),
            // Embedded assets only change on redeploy
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        asset.data.into_owned(),
    )
        .into_response()
}

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("js") => "application/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_known_assets_with_types() {
        let response = serve_static(Path("slider.js".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/javascript; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn unknown_asset_is_404() {
        let response = serve_static(Path("nope.js".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn extension_mapping() {
        assert_eq!(content_type_for("style.css"), "text/css; charset=utf-8");
        assert_eq!(content_type_for("weird.bin"), "application/octet-stream");
    }
}
