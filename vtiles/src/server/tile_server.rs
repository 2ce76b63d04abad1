//! Tile server lifecycle and composition.
//!
//! The request logic lives in focused modules:
//! - `handlers` implement the HTTP handlers and response helpers.
//! - `routes` composes handlers into an axum `Router`.
//! - `encoding` parses `Accept-Encoding` into the allowed compressions.
//!
//! `TileServer` owns configuration ingestion, building the router, the global protection
//! layers, listening on a socket and graceful shutdown.

use super::{handlers::TileHandlerState, routes, sources::TileSource};
use crate::config::{Config, ServerConfig, TileSourceConfig};
use anyhow::{Result, bail};
use axum::{
	BoxError, Router,
	error_handling::HandleErrorLayer,
	http::StatusCode,
	response::IntoResponse,
};
use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};
use tokio::{
	net::TcpListener,
	sync::{Semaphore, oneshot},
	task::JoinHandle,
};
use tower::{ServiceBuilder, timeout::TimeoutLayer};
use tower_http::catch_panic::CatchPanicLayer;
use vtiles_core::ConcurrencyLimits;
use vtiles_derive::context;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Serves any number of containers over HTTP.
///
/// Starting twice stops the previous instance first; stopping twice is a no-op.
pub struct TileServer {
	ip: String,
	port: u16,
	base_url: String,
	tile_sources: Vec<Arc<TileSource>>,
	minimal_recompression: bool,
	limits: ConcurrencyLimits,
	exit_signal: Option<oneshot::Sender<()>>,
	join: Option<JoinHandle<()>>,
	local_addr: Option<SocketAddr>,
}

impl TileServer {
	/// Creates a server without tile sources. Nothing is bound until [`TileServer::start`].
	///
	/// # Arguments
	///
	/// * `server_config` - Listen address, port, public base URL and recompression mode.
	///   Unset fields fall back to their defaults.
	pub fn new(server_config: &ServerConfig) -> TileServer {
		TileServer {
			ip: server_config.ip().to_owned(),
			port: server_config.port(),
			base_url: server_config.base_url(),
			tile_sources: Vec::new(),
			minimal_recompression: server_config.minimal_recompression(),
			limits: ConcurrencyLimits::default(),
			exit_signal: None,
			join: None,
			local_addr: None,
		}
	}

	/// Builds a server and opens every configured tile source. A source that cannot be
	/// opened fails the whole startup.
	pub async fn from_config(config: &Config) -> Result<TileServer> {
		let mut server = TileServer::new(&config.server);
		for tile_config in &config.tile_sources {
			server.add_tile_source_config(tile_config).await?;
		}
		Ok(server)
	}

	pub async fn add_tile_source_config(&mut self, tile_config: &TileSourceConfig) -> Result<()> {
		let source = TileSource::open(tile_config).await?;
		self.add_tile_source(source)
	}

	/// Registers a source under `/tiles/{name}/`. Names must be unique.
	pub fn add_tile_source(&mut self, source: TileSource) -> Result<()> {
		if source.name.is_empty() || source.name.contains('/') || source.name == "index.json" {
			bail!("'{}' is not a valid tile source name", source.name);
		}
		if self.tile_sources.iter().any(|other| other.name == source.name) {
			bail!("multiple sources with the name '{}' are defined", source.name);
		}
		log::info!("add source: name='{}', source={source:?}", source.name);
		self.tile_sources.push(Arc::new(source));
		Ok(())
	}

	/// The complete application: tile routes, API, status probe and fallback.
	pub fn router(&self) -> Router {
		let state = TileHandlerState {
			sources: Arc::new(
				self.tile_sources
					.iter()
					.map(|source| (source.name.clone(), Arc::clone(source)))
					.collect::<HashMap<_, _>>(),
			),
			minimal_recompression: self.minimal_recompression,
			base_url: Arc::from(self.base_url.as_str()),
			recompression_permits: Arc::new(Semaphore::new(self.limits.cpu_bound)),
		};

		let mut router = Router::new();
		router = routes::add_tile_sources_to_app(router, state);
		router = routes::add_api_to_app(router, &self.tile_sources);
		routes::add_status_to_app(router)
	}

	/// Binds the socket and spawns the serving task.
	#[context("starting server on {}:{}", self.ip, self.port)]
	pub async fn start(&mut self) -> Result<()> {
		if self.exit_signal.is_some() || self.join.is_some() {
			self.stop().await;
		}

		log::info!("starting server");

		let timeout_handler = HandleErrorLayer::new(|err: BoxError| async move {
			if err.is::<tower::timeout::error::Elapsed>() {
				(StatusCode::SERVICE_UNAVAILABLE, "Request timed out").into_response()
			} else {
				(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
			}
		});
		let protection = ServiceBuilder::new()
			.layer(timeout_handler)
			.layer(CatchPanicLayer::new())
			.layer(TimeoutLayer::new(REQUEST_TIMEOUT));
		let router = self.router().layer(protection);

		let listener = TcpListener::bind((self.ip.as_str(), self.port)).await?;
		let local_addr = listener.local_addr()?;
		log::info!("server listening on {local_addr}, serving at {}", self.base_url);

		let (tx, rx) = oneshot::channel::<()>();
		let handle = tokio::spawn(async move {
			if let Err(err) = axum::serve(listener, router.into_make_service())
				.with_graceful_shutdown(async {
					rx.await.ok();
				})
				.await
			{
				log::error!("server task exited with error: {err}");
			}
		});

		self.exit_signal = Some(tx);
		self.join = Some(handle);
		self.local_addr = Some(local_addr);

		Ok(())
	}

	/// Triggers graceful shutdown and waits for the serving task to finish.
	pub async fn stop(&mut self) {
		if self.exit_signal.is_none() && self.join.is_none() {
			return;
		}

		log::info!("stopping server");

		if let Some(tx) = self.exit_signal.take() {
			let _ = tx.send(());
		}

		if let Some(handle) = self.join.take() {
			match tokio::time::timeout(Duration::from_secs(10), handle).await {
				Ok(Err(join_err)) => log::warn!("server task join error: {join_err}"),
				Ok(Ok(())) => {}
				Err(_) => log::warn!("server task did not shutdown within timeout; continuing"),
			}
		}
		self.local_addr = None;
	}

	/// Address actually bound while running. Useful with port 0.
	pub fn local_addr(&self) -> Option<SocketAddr> {
		self.local_addr
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// `(url prefix, source name)` for every tile source, sorted by prefix.
	pub fn get_url_mapping(&self) -> Vec<(String, String)> {
		let mut result: Vec<(String, String)> = self
			.tile_sources
			.iter()
			.map(|source| (source.prefix.clone(), source.get_source_name().to_owned()))
			.collect();
		result.sort();
		result
	}
}
