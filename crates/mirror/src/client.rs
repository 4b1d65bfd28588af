use log::{debug, info};
use reqwest::Client as HttpClient;
use serde_json::Value;
use url::Url;

use crate::{
    error::MirrorError,
    model::{BlocksResponse, LogOrder, LogPage},
};

/// REST client for a mirror node's `/api/v1` surface.
#[derive(Clone, Debug)]
pub struct MirrorClient {
    http: HttpClient,
    base_url: Url,
    page_limit: Option<u32>,
}

impl MirrorClient {
    /// `base_url` is the API root, e.g. `https://testnet.mirrornode.hedera.com/api/v1`.
    pub fn new(base_url: &str, page_limit: Option<u32>) -> Result<Self, MirrorError> {
        Self::with_http(HttpClient::new(), base_url, page_limit)
    }

    pub fn with_http(
        http: HttpClient,
        base_url: &str,
        page_limit: Option<u32>,
    ) -> Result<Self, MirrorError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| MirrorError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(MirrorError::InvalidUrl(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }
        // `Url::join` drops the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            page_limit,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn logs_url(&self, contract: &str, order: LogOrder) -> Result<Url, MirrorError> {
        let mut url = self
            .base_url
            .join(&format!("contracts/{contract}/results/logs"))
            .map_err(|e| MirrorError::InvalidUrl(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("order", order.as_str());
            if let Some(limit) = self.page_limit {
                query.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }

    /// Fetches the first page of contract logs. Calling again re-issues the request.
    pub async fn fetch_logs(&self, contract: &str, order: LogOrder) -> Result<LogPage, MirrorError> {
        let url = self.logs_url(contract, order)?;
        debug!("Fetching contract logs from {url}");

        let mut body = self.get_json(url).await?;
        let entries = match body.get_mut("logs").map(Value::take) {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(MirrorError::MalformedResponse(format!(
                    "`logs` is not an array: {other}"
                )));
            }
            None => {
                return Err(MirrorError::MalformedResponse(
                    "missing `logs` field".to_string(),
                ));
            }
        };
        let next = body
            .pointer("/links/next")
            .and_then(Value::as_str)
            .map(str::to_string);

        info!("Fetched {} log(s) for contract {contract}", entries.len());
        Ok(LogPage::new(entries, next))
    }

    /// Number of the newest block the mirror node has indexed, `None` when it reports no blocks.
    pub async fn latest_indexed_block(&self) -> Result<Option<u64>, MirrorError> {
        let mut url = self
            .base_url
            .join("blocks")
            .map_err(|e| MirrorError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("order", LogOrder::Desc.as_str())
            .append_pair("limit", "1");

        let body = self.get_json(url).await?;
        let blocks: BlocksResponse = serde_json::from_value(body)
            .map_err(|e| MirrorError::MalformedResponse(e.to_string()))?;
        Ok(blocks.blocks.first().map(|block| block.number))
    }

    async fn get_json(&self, url: Url) -> Result<Value, MirrorError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(MirrorError::UnexpectedStatus {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| MirrorError::MalformedResponse(e.to_string()))
    }
}
