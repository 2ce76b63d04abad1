//! HTTP handlers and small response helpers for the tile server.
//!
//! - `serve_tile` answers everything below `/tiles/{name}/`.
//! - `ok_data` negotiates the response encoding and sets the caching headers.
//! - `ok_json` is a tiny helper used by the API routes.

use super::{
	encoding::get_encoding,
	sources::{SourceResponse, TileRequest, TileSource},
};
use anyhow::Result;
use axum::{
	body::Body,
	extract::{Path, State},
	http::{HeaderMap, HeaderValue, StatusCode, header},
	response::Response,
};
use enumset::EnumSet;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Semaphore;
use vtiles_core::{
	Blob, TileCompression,
	compression::{TargetCompression, negotiate_compression},
};

const CACHE_CONTROL: &str = "public, max-age=2419200, no-transform";

/// Shared by all tile requests.
#[derive(Clone)]
pub struct TileHandlerState {
	pub sources: Arc<HashMap<String, Arc<TileSource>>>,
	pub minimal_recompression: bool,
	pub base_url: Arc<str>,
	/// Caps the number of recompressions running on the blocking pool.
	pub recompression_permits: Arc<Semaphore>,
}

/// Handles `/tiles/{name}/{z}/{x}/{y}`, `/tiles/{name}/meta.json` and `/tiles/{name}/info.json`.
pub async fn serve_tile(
	Path(path): Path<String>,
	headers: HeaderMap,
	State(state): State<TileHandlerState>,
) -> Response<Body> {
	log::debug!("handle tile request: {path}");

	let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
	let Some((name, rest)) = parts.split_first() else {
		return error_404();
	};
	let Some(tile_source) = state.sources.get(*name) else {
		log::debug!("tile source '{name}' not found");
		return error_404();
	};

	let request = match TileRequest::parse(rest) {
		Ok(Some(request)) => request,
		Ok(None) => return error_404(),
		Err(err) => {
			log::debug!("send 400 for tile request: {path}: {err}");
			return error_400(&err.to_string());
		}
	};

	let mut target = get_encoding(&headers);
	if state.minimal_recompression {
		target.set_fast_compression();
	}

	match tile_source.get_data(&request, &state.base_url).await {
		Ok(Some(result)) => {
			log::debug!("send response for tile request: {path}");
			ok_data(result, target, &state.recompression_permits).await
		}
		Ok(None) => {
			log::debug!("send 404 for tile request: {path}");
			error_404()
		}
		Err(err) => {
			log::error!("send 500 for tile request: {path}. Error:\n{}", format_error_chain(&err));
			error_500(&err)
		}
	}
}

// --- small helpers -----------------------------------------------------------

pub fn format_error_chain(err: &anyhow::Error) -> String {
	let mut result = err.to_string();

	for (i, cause) in err.chain().skip(1).enumerate() {
		if i == 0 {
			result.push_str("\n  Caused by:");
		}
		result.push_str(&format!("\n    {cause}"));
	}

	result
}

fn error_with(status: StatusCode, message: &str) -> Response<Body> {
	let mut response = Response::new(Body::from(message.to_owned()));
	*response.status_mut() = status;
	response.headers_mut().insert(
		header::CONTENT_TYPE,
		HeaderValue::from_static("text/plain; charset=utf-8"),
	);
	response
}

pub fn error_400(message: &str) -> Response<Body> {
	error_with(StatusCode::BAD_REQUEST, message)
}

pub fn error_404() -> Response<Body> {
	error_with(StatusCode::NOT_FOUND, "Not Found")
}

pub fn error_500(err: &anyhow::Error) -> Response<Body> {
	error_with(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
}

/// Responses that go out as stored skip the blocking pool; everything else is transcoded there.
async fn negotiate(
	result: SourceResponse,
	target: TargetCompression,
	permits: &Semaphore,
) -> Result<(Blob, TileCompression, String)> {
	let SourceResponse { blob, compression, mime } = result;
	let passes_through = target.contains(compression)
		&& (compression != TileCompression::Uncompressed
			|| target.is_fast()
			|| target.compressions == EnumSet::only(TileCompression::Uncompressed));
	if passes_through {
		return Ok((blob, compression, mime));
	}

	log::trace!("negotiate_compression from {compression:?} with target {target:?}");
	let _permit = permits.acquire().await?;
	let (blob, compression) =
		tokio::task::spawn_blocking(move || negotiate_compression(blob, compression, &target)).await??;
	Ok((blob, compression, mime))
}

pub async fn ok_data(result: SourceResponse, target: TargetCompression, permits: &Semaphore) -> Response<Body> {
	let (blob, compression, mime) = match negotiate(result, target, permits).await {
		Ok(negotiated) => negotiated,
		Err(err) => {
			log::error!("send 500, compression negotiation failed:\n{}", format_error_chain(&err));
			return error_500(&err);
		}
	};

	let mut response = Response::builder()
		.status(StatusCode::OK)
		.header(header::CONTENT_TYPE, mime)
		.header(header::CONTENT_LENGTH, blob.len())
		.header(header::CACHE_CONTROL, CACHE_CONTROL)
		.header(header::VARY, "accept-encoding");

	if let Some(encoding) = compression.as_content_encoding() {
		response = response.header(header::CONTENT_ENCODING, encoding);
	}

	log::trace!("send response with headers: {:?}", response.headers_ref());

	match response.body(Body::from(blob.into_vec())) {
		Ok(response) => response,
		Err(err) => {
			let err = anyhow::Error::from(err).context("building tile response");
			log::error!("send 500:\n{}", format_error_chain(&err));
			error_500(&err)
		}
	}
}

/// Tiny JSON helper used by API routes.
pub async fn ok_json(message: &str) -> Response<Body> {
	let permits = Semaphore::new(1);
	ok_data(
		SourceResponse {
			blob: Blob::from(message),
			compression: TileCompression::Uncompressed,
			mime: String::from("application/json"),
		},
		TargetCompression::from_none(),
		&permits,
	)
	.await
}
