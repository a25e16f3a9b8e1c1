use crate::{
    config::ResolvedConfig,
    error::ApiError,
    transport::{ApiHost, ApiRequest, ApiResponse, Transport},
};
use async_trait::async_trait;
use reqwest::{StatusCode, Url, header};
use tracing::{debug, warn};

const CONTINUATION_HEADER: &str = "x-ms-continuationtoken";
const ACCOUNTS_BASE: &str = "https://app.vssps.visualstudio.com";
const MAX_ERROR_BODY: usize = 512;

/// Base URL of every service host, derived from the organization URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBases {
    organization: Url,
    release: Url,
    graph: Url,
    accounts: Url,
}

impl HostBases {
    /// `https://dev.azure.com/{org}` and `https://{org}.visualstudio.com`
    /// map to their release and graph siblings. Any other host (an on-premises
    /// server or a test double) serves every API from the given URL.
    pub fn from_org_url(url: &str) -> Result<Self, ApiError> {
        let organization = parse(url.trim().trim_end_matches('/'))?;
        let host = organization.host_str().unwrap_or_default().to_string();

        let with_host = |new_host: &str| -> Result<Url, ApiError> {
            let mut derived = organization.clone();
            derived
                .set_host(Some(new_host))
                .map_err(|err| ApiError::InvalidUrl(format!("{new_host}: {err}")))?;
            Ok(derived)
        };

        if host.eq_ignore_ascii_case("dev.azure.com") {
            Ok(HostBases {
                release: with_host("vsrm.dev.azure.com")?,
                graph: with_host("vssps.dev.azure.com")?,
                accounts: parse(ACCOUNTS_BASE)?,
                organization,
            })
        } else if let Some(org) = host.strip_suffix(".visualstudio.com") {
            Ok(HostBases {
                release: with_host(&format!("{org}.vsrm.visualstudio.com"))?,
                graph: with_host(&format!("{org}.vssps.visualstudio.com"))?,
                accounts: parse(ACCOUNTS_BASE)?,
                organization,
            })
        } else {
            Ok(HostBases {
                release: organization.clone(),
                graph: organization.clone(),
                accounts: organization.clone(),
                organization,
            })
        }
    }

    pub fn base(&self, host: ApiHost) -> &Url {
        match host {
            ApiHost::Organization => &self.organization,
            ApiHost::Release => &self.release,
            ApiHost::Graph => &self.graph,
            ApiHost::Accounts => &self.accounts,
        }
    }

    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self.base(request.host).clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl("host URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(&request.path);
        url.query_pairs_mut()
            .append_pair("api-version", request.api_version)
            .extend_pairs(&request.query);
        Ok(url)
    }
}

fn parse(url: &str) -> Result<Url, ApiError> {
    Url::parse(url).map_err(|err| ApiError::InvalidUrl(format!("{url}: {err}")))
}

/// [`Transport`] over HTTPS with personal-access-token authentication.
pub struct HttpTransport {
    client: reqwest::Client,
    bases: HostBases,
    token: String,
}

impl HttpTransport {
    pub fn new(config: &ResolvedConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("azdo-connector/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(HttpTransport {
            client: builder.build()?,
            bases: HostBases::from_org_url(&config.organization_url)?,
            token: config.personal_access_token.clone(),
        })
    }

    pub fn bases(&self) -> &HostBases {
        &self.bases
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.bases.url_for(request)?;
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .basic_auth("", Some(&self.token))
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let header_token = response
            .headers()
            .get(CONTINUATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        let continuation = header_token.or_else(|| {
            body.get("continuationToken")
                .and_then(|token| token.as_str())
                .map(str::to_string)
        });

        Ok(ApiResponse { body, continuation })
    }
}
