use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    StatusCode,
};
use snafu::prelude::*;
use url::Url;

// setlist.fm serves an error page to clients with a default library agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/102.0.0.0 Safari/537.36";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to build http client: {message}"))]
    Client { message: String },
    #[snafu(display("Not a setlist.fm setlist url: {url}"))]
    InvalidUrl { url: String },
    #[snafu(display("Request to {url} failed: {message}"))]
    Http { url: String, message: String },
    #[snafu(display("Got status {status} from {url}"))]
    Status { status: StatusCode, url: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The seam the orchestrator fetches pages through, so batches can be
/// driven against canned pages in tests.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// True when the url points at a setlist page on www.setlist.fm.
pub fn is_setlist_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            parsed.host_str() == Some("www.setlist.fm") && parsed.path().contains("/setlist/")
        }
        Err(_) => false,
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(BROWSER_USER_AGENT),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Client {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        ensure!(is_setlist_url(url), InvalidUrlSnafu { url });

        debug!("fetching {url}");

        let response = self.client.get(url).send().await.map_err(|e| Error::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        ensure!(status.is_success(), StatusSnafu { status, url });

        response.text().await.map_err(|e| Error::Http {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
