use crate::domain::model::FetchedFragment;
use crate::domain::ports::FragmentSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;

/// Fetches fragments over HTTP with caching disabled.
#[derive(Debug, Clone)]
pub struct HttpFragmentSource {
    client: Client,
}

impl HttpFragmentSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("static-scaffold/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FragmentSource for HttpFragmentSource {
    async fn fetch(&self, url: &str) -> Result<FetchedFragment> {
        tracing::debug!("Fetching fragment: {}", url);
        let response = self
            .client
            .get(url)
            // 片段每次都要拿最新版本
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        // 非 2xx 也回傳 Ok，由呼叫端決定怎麼處理
        let status = response.status().as_u16();
        tracing::debug!("Fragment response status: {}", status);

        let body = response.text().await?;
        Ok(FetchedFragment { status, body })
    }
}
