//! Range reads from an HTTP(S) endpoint.
//!
//! Each `read_range` call issues one `Range` request. Transient failures (connection errors,
//! timeouts, interrupted bodies, HTTP 5xx) are retried with exponential backoff; anything else
//! fails immediately. A semaphore caps the number of requests in flight per reader.
//!
//! ```rust,no_run
//! use vtiles_core::{io::{DataReaderHttp, DataReaderTrait}, ByteRange};
//! use reqwest::Url;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let reader = DataReaderHttp::from_url(Url::parse("https://example.org/planet.versatiles")?)?;
//! let magic = reader.read_range(&ByteRange::new(0, 14)).await?;
//! # Ok(())
//! # }
//! ```

use super::DataReaderTrait;
use crate::{Blob, ByteRange, ConcurrencyLimits};
use anyhow::{Context, Error, Result, anyhow, bail};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use reqwest::{
	Client, Response, StatusCode, Url,
	header::{CONTENT_RANGE, RANGE},
};
use std::{future::Future, sync::LazyLock, time::Duration};
use tokio::{sync::Semaphore, time::sleep};

/// Tuning knobs for [`DataReaderHttp`].
#[derive(Clone, Debug)]
pub struct HttpReaderOptions {
	/// Timeout for a single request, including the body.
	pub timeout: Duration,
	/// Retries after the first attempt. Backoff doubles each time, starting at `retry_delay`.
	pub max_retries: u32,
	pub retry_delay: Duration,
	/// Requests allowed in flight at the same time.
	pub max_concurrent_requests: usize,
}

impl Default for HttpReaderOptions {
	fn default() -> Self {
		Self {
			timeout: Duration::from_secs(30),
			max_retries: 3,
			retry_delay: Duration::from_secs(1),
			max_concurrent_requests: ConcurrencyLimits::default().io_bound,
		}
	}
}

#[derive(Debug)]
pub struct DataReaderHttp {
	client: Client,
	name: String,
	url: Url,
	options: HttpReaderOptions,
	permits: Semaphore,
}

/// Outcome of one failed attempt.
enum Failure {
	Transient(Error),
	Fatal(Error),
}

impl From<reqwest::Error> for Failure {
	fn from(err: reqwest::Error) -> Self {
		if err.is_connect() || err.is_timeout() || err.is_body() {
			Failure::Transient(err.into())
		} else {
			Failure::Fatal(err.into())
		}
	}
}

impl DataReaderHttp {
	pub fn from_url(url: Url) -> Result<Box<DataReaderHttp>> {
		Self::from_url_with_options(url, HttpReaderOptions::default())
	}

	pub fn from_url_with_options(url: Url, options: HttpReaderOptions) -> Result<Box<DataReaderHttp>> {
		match url.scheme() {
			"http" | "https" => (),
			other => bail!("unsupported URL scheme '{other}' in '{url}', expected 'http' or 'https'"),
		}

		let client = Client::builder()
			.tcp_keepalive(Duration::from_secs(600))
			.timeout(options.timeout)
			.build()?;

		Ok(Box::new(DataReaderHttp {
			client,
			name: url.to_string(),
			url,
			permits: Semaphore::new(options.max_concurrent_requests.max(1)),
			options,
		}))
	}

	async fn with_retries<F, Fut>(&self, what: &str, mut attempt_fn: F) -> Result<Blob>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<Blob, Failure>>,
	{
		let _permit = self.permits.acquire().await.context("request limiter was closed")?;

		let mut attempt: u32 = 0;
		loop {
			match attempt_fn().await {
				Ok(blob) => return Ok(blob),
				Err(Failure::Transient(err)) if attempt < self.options.max_retries => {
					attempt += 1;
					let backoff = self.options.retry_delay * (1 << (attempt - 1));
					log::warn!(
						"retry {attempt}/{} {what} from '{}' in {backoff:?}: {err}",
						self.options.max_retries,
						self.url
					);
					sleep(backoff).await;
				}
				Err(Failure::Transient(err) | Failure::Fatal(err)) => {
					return Err(err.context(format!("{what} from '{}'", self.url)));
				}
			}
		}
	}

	async fn fetch_range(&self, range: &ByteRange) -> Result<Blob, Failure> {
		let response = self
			.client
			.get(self.url.clone())
			.header(RANGE, format!("bytes={}-{}", range.offset, range.end() - 1))
			.send()
			.await?;

		check_server_error(&response)?;
		if response.status() != StatusCode::PARTIAL_CONTENT {
			return Err(Failure::Fatal(anyhow!(
				"expected HTTP 206 (Partial Content), got {}",
				response.status()
			)));
		}
		check_content_range(&response, range).map_err(Failure::Fatal)?;

		let bytes = response.bytes().await?;
		if bytes.len() as u64 != range.length {
			return Err(Failure::Fatal(anyhow!(
				"expected {} bytes, got {}",
				range.length,
				bytes.len()
			)));
		}
		Ok(Blob::from(&*bytes))
	}

	async fn fetch_all(&self) -> Result<Blob, Failure> {
		let response = self.client.get(self.url.clone()).send().await?;
		check_server_error(&response)?;
		if !response.status().is_success() {
			return Err(Failure::Fatal(anyhow!(
				"HTTP request failed with status {}",
				response.status()
			)));
		}
		let bytes = response.bytes().await?;
		Ok(Blob::from(&*bytes))
	}
}

fn check_server_error(response: &Response) -> Result<(), Failure> {
	if response.status().is_server_error() {
		Err(Failure::Transient(anyhow!("server responded with {}", response.status())))
	} else {
		Ok(())
	}
}

fn check_content_range(response: &Response, range: &ByteRange) -> Result<()> {
	static RE_RANGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
		RegexBuilder::new(r"^bytes (\d+)-(\d+)/(\d+|\*)$")
			.case_insensitive(true)
			.build()
			.ok()
	});

	let content_range = response
		.headers()
		.get(CONTENT_RANGE)
		.ok_or_else(|| anyhow!("response is missing Content-Range header"))?
		.to_str()?;

	let caps = RE_RANGE
		.as_ref()
		.and_then(|re| re.captures(content_range))
		.ok_or_else(|| anyhow!("unexpected Content-Range format: '{content_range}'"))?;
	let start: u64 = caps[1].parse()?;
	let end: u64 = caps[2].parse()?;

	if start != range.offset || end != range.end() - 1 {
		bail!(
			"Content-Range mismatch: requested {}-{}, got {start}-{end}",
			range.offset,
			range.end() - 1
		);
	}
	Ok(())
}

#[async_trait]
impl DataReaderTrait for DataReaderHttp {
	async fn read_range(&self, range: &ByteRange) -> Result<Blob> {
		if range.is_empty() {
			return Ok(Blob::new_empty());
		}
		log::trace!("read {range:?} from '{}'", self.url);
		self
			.with_retries(&format!("reading {range:?}"), || self.fetch_range(range))
			.await
	}

	async fn read_all(&self) -> Result<Blob> {
		self.with_retries("reading all data", || self.fetch_all()).await
	}

	fn get_name(&self) -> &str {
		&self.name
	}
}
