mod assets;
mod graphql;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use graphql::Schema;

async fn graphql_handler(State(schema): State<Schema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Build a cache-controlled static file router.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Map images, screenshots and region datasets from the assets directory,
/// plus the built frontend bundles.
fn static_routes(assets_dir: &Path, dist_dir: &Path) -> Router {
    Router::new()
        .nest("/static", cached_static_router(assets_dir, CACHE_1DAY))
        .nest("/dist", cached_static_router(dist_dir, CACHE_IMMUTABLE))
        .nest(
            "/assets",
            cached_static_router(&dist_dir.join("assets"), CACHE_IMMUTABLE),
        )
}

/// Build the full application router.
fn build_app(schema: Schema, assets_dir: &Path) -> Router {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/", get(serve_index))
        .route("/game", get(serve_index))
        .with_state(schema)
        .merge(static_routes(assets_dir, Path::new("dist")))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let assets_dir =
        PathBuf::from(std::env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".to_string()));
    let loaded_assets = match assets::Assets::load(&assets_dir) {
        Ok(assets) => Arc::new(assets),
        Err(e) => {
            tracing::error!(error = %e, dir = %assets_dir.display(), "Failed to load assets");
            std::process::exit(1);
        }
    };

    let schema = graphql::build_schema(loaded_assets);
    let app = build_app(schema, &assets_dir);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!("Server running at http://localhost:{}", port);
    tracing::info!("GraphiQL playground at http://localhost:{}/graphql", port);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn serve_index() -> Html<String> {
    match tokio::fs::read_to_string("dist/index.html").await {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Spot Guess</title></head>
<body>
<h1>Spot Guess</h1>
<p>Frontend not built yet. Visit <a href="/graphql">GraphiQL</a> to explore the API.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use spotguess_shared::models::Region;
    use tower::ServiceExt;

    /// Create a temp dir with a test file and return the dir path.
    fn temp_dir_with_file(file_name: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(file_name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        dir
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn schema() -> Schema {
        let regions = vec![Region {
            display_name: "Ascent".to_string(),
            file_name: "ascent".to_string(),
            active: true,
        }];
        graphql::build_schema(Arc::new(assets::Assets::from_parts(regions, HashMap::new())))
    }

    #[tokio::test]
    async fn test_screenshots_have_1day_cache() {
        let assets_dir = temp_dir_with_file("maps/ascent/easy/market.webp", "img");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");

        let app = static_routes(assets_dir.path(), dist_dir.path());
        let resp = app
            .oneshot(get("/static/maps/ascent/easy/market.webp"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=86400, must-revalidate"
        );
    }

    #[tokio::test]
    async fn test_dist_bundles_have_immutable_cache() {
        let assets_dir = temp_dir_with_file("regions.json", "[]");
        let dist_dir = temp_dir_with_file("app-abc123.js", "bundle()");

        let app = static_routes(assets_dir.path(), dist_dir.path());
        let resp = app.oneshot(get("/dist/app-abc123.js")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[tokio::test]
    async fn test_dist_assets_served_from_dist_subdir() {
        let assets_dir = temp_dir_with_file("regions.json", "[]");
        let dist_dir = temp_dir_with_file("assets/style-xyz.css", "body{}");

        let app = static_routes(assets_dir.path(), dist_dir.path());
        let resp = app.oneshot(get("/assets/style-xyz.css")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[tokio::test]
    async fn test_missing_screenshot_returns_404() {
        let assets_dir = temp_dir_with_file("regions.json", "[]");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");

        let app = static_routes(assets_dir.path(), dist_dir.path());
        let resp = app
            .oneshot(get("/static/maps/ascent/easy/nope.webp"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_game_route_serves_index() {
        let assets_dir = temp_dir_with_file("regions.json", "[]");
        let app = build_app(schema(), assets_dir.path());

        let resp = app.oneshot(get("/game")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_graphql_endpoint_answers_queries() {
        let assets_dir = temp_dir_with_file("regions.json", "[]");
        let app = build_app(schema(), assets_dir.path());

        let req = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"query":"{ regions { fileName } }"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["data"]["regions"][0]["fileName"], "ascent");
    }
}
