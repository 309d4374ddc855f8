use std::{io::Write, path::Path};

use anyhow::Context;
use log::debug;
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    StatusCode,
};
use url::Url;

use crate::{fs_util, schema::StepRequest, wizard_trait::QueryWizard};

/// A response body together with what the transport observed.
#[derive(Debug)]
pub struct FetchedPage {
    pub status: StatusCode,
    /// The url after following redirects.
    pub url: Url,
    pub body: Vec<u8>,
}

#[derive(Debug)]
pub enum Download {
    Saved { bytes: u64 },
    Rejected(StatusCode),
}

/// Transport of one traversal.  Cookies persist across calls on the same value,
/// and a new value starts with an empty jar.
#[allow(async_fn_in_trait)]
pub trait SessionClient {
    async fn get(&self, url: Url) -> anyhow::Result<FetchedPage>;

    async fn post_form(&self, url: Url, form: &StepRequest) -> anyhow::Result<FetchedPage>;

    /// Streams the body into `destination` on a success status.
    /// On any other status nothing is written.
    async fn download(&self, url: Url, destination: &Path) -> anyhow::Result<Download>;
}

pub struct WizardSession {
    client: reqwest::Client,
}

impl WizardSession {
    pub fn new<T: QueryWizard>() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(T::USER_AGENT)
            .cookie_store(true)
            .connection_verbose(true)
            .build()?;
        Ok(Self { client })
    }

    async fn into_page(response: reqwest::Response) -> anyhow::Result<FetchedPage> {
        let status = response.status();
        let url = response.url().clone();
        debug!("{status} from {url}");
        let body = response.bytes().await?.to_vec();
        Ok(FetchedPage { status, url, body })
    }
}

impl SessionClient for WizardSession {
    async fn get(&self, url: Url) -> anyhow::Result<FetchedPage> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("While fetching {url}"))?;
        Self::into_page(response).await
    }

    async fn post_form(&self, url: Url, form: &StepRequest) -> anyhow::Result<FetchedPage> {
        let response = self
            .client
            .post(url.clone())
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(form.query_string()?)
            .send()
            .await
            .with_context(|| format!("While posting to {url}"))?;
        Self::into_page(response).await
    }

    async fn download(&self, url: Url, destination: &Path) -> anyhow::Result<Download> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("While downloading {url}"))?;
        if !response.status().is_success() {
            return Ok(Download::Rejected(response.status()));
        }
        let mut writer = fs_util::create_writer(destination)?;
        let mut bytes = 0;
        while let Some(chunk) = response.chunk().await? {
            writer.write_all(&chunk)?;
            bytes += chunk.len() as u64;
        }
        writer.flush()?;
        Ok(Download::Saved { bytes })
    }
}
