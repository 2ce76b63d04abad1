//! Router composition for the tile server.
//!
//! This module wires handlers into an axum `Router` without mixing in server lifecycle.

use super::{
	handlers::{TileHandlerState, error_404, ok_json, serve_tile},
	sources::TileSource,
};
use axum::{Router, routing::get};
use std::sync::Arc;

/// Attach `/tiles/{name}/...` for all sources in `state`.
pub fn add_tile_sources_to_app(app: Router, state: TileHandlerState) -> Router {
	let tile_router = Router::new().route("/tiles/{*path}", get(serve_tile)).with_state(state);
	app.merge(tile_router)
}

/// Attach `/tiles/index.json`, the sorted list of source names.
pub fn add_api_to_app(app: Router, sources: &[Arc<TileSource>]) -> Router {
	let mut names: Vec<&str> = sources.iter().map(|source| source.name.as_str()).collect();
	names.sort_unstable();
	let index_json = serde_json::to_string(&names).unwrap_or_else(|_| String::from("[]"));

	let api_app = Router::new().route(
		"/tiles/index.json",
		get(move || async move { ok_json(&index_json).await }),
	);
	app.merge(api_app)
}

/// Attach `/status` and a plain 404 for every path no other route matches.
pub fn add_status_to_app(app: Router) -> Router {
	app.route("/status", get(|| async { "ready!" }))
		.fallback(|| async { error_404() })
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{body::Body, http::StatusCode};
	use std::collections::HashMap;
	use tokio::sync::Semaphore;
	use tower::ServiceExt as _;

	async fn get_body_text(app: Router, path: &str) -> (StatusCode, String) {
		let req = axum::http::Request::builder().uri(path).body(Body::empty()).unwrap();
		let res = app.oneshot(req).await.unwrap();
		let status = res.status();
		let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
		(status, String::from_utf8_lossy(&bytes).into_owned())
	}

	fn empty_state() -> TileHandlerState {
		TileHandlerState {
			sources: Arc::new(HashMap::new()),
			minimal_recompression: false,
			base_url: Arc::from(""),
			recompression_permits: Arc::new(Semaphore::new(1)),
		}
	}

	#[tokio::test]
	async fn index_json_is_empty_without_sources() {
		let app = add_api_to_app(Router::new(), &[]);
		let (status, body) = get_body_text(app, "/tiles/index.json").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, "[]");
	}

	#[tokio::test]
	async fn unknown_source_yields_404() {
		let app = add_tile_sources_to_app(Router::new(), empty_state());
		let (status, body) = get_body_text(app, "/tiles/any/1/2/3").await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body, "Not Found");
	}

	#[tokio::test]
	async fn status_and_fallback() {
		let app = add_status_to_app(Router::new());
		assert_eq!(get_body_text(app.clone(), "/status").await, (StatusCode::OK, "ready!".into()));
		assert_eq!(get_body_text(app, "/nowhere").await.0, StatusCode::NOT_FOUND);
	}
}
