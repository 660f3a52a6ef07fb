use super::{
    models::{
        BackupObject,
        ManagedServer,
        Page,
        Proxy,
        Repositories,
        RepositoryConfig,
        RepositoryState,
        ServerInfo,
        Session,
    },
    BackupSource,
};
use crate::{
    error::{
        CollectError,
        Component,
        Result,
    },
    health::Probe,
};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{
    de::DeserializeOwned,
    Deserialize,
};
use std::{
    sync::Arc,
    time::Duration,
};
use tokio::{
    sync::Mutex,
    time::Instant,
};
use url::Url;
use vbr_metrics_config::VeeamConfig;

const API_VERSION_HEADER: &str = "x-api-version";

const TOKEN_PATH: &str = "api/oauth2/token";
const SERVER_INFO_PATH: &str = "api/v1/serverInfo";
const SESSIONS_PATH: &str = "api/v1/sessions";
const MANAGED_SERVERS_PATH: &str = "api/v1/backupInfrastructure/managedServers";
const REPOSITORIES_PATH: &str = "api/v1/backupInfrastructure/repositories";
const REPOSITORY_STATES_PATH: &str = "api/v1/backupInfrastructure/repositories/states";
const PROXIES_PATH: &str = "api/v1/backupInfrastructure/proxies";
const BACKUP_OBJECTS_PATH: &str = "api/v1/backupObjects";

/// Tokens are renewed this long before the server would reject them.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// HTTP client for the Veeam B&R REST API using the OAuth2 password grant.
///
/// Clones share the HTTP connection pool and the current access token.
#[derive(Clone)]
pub struct VeeamClient {
    http: HttpClient,
    base_url: Url,
    api_version: String,
    username: String,
    password: String,
    token: Arc<Mutex<Option<AccessToken>>>,
}

impl VeeamClient {
    pub fn new(config: &VeeamConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .danger_accept_invalid_certs(config.trust_self_signed_cert)
            .build()
            .map_err(|e| CollectError::connectivity(Component::Veeam, "building the http client", e))?;

        Ok(Self {
            http,
            base_url: config.host.clone(),
            api_version: config.x_api_version.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            token: Arc::new(Mutex::new(None)),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CollectError::connectivity(Component::Veeam, format!("resolving {path}"), e))
    }

    async fn authenticate(&self) -> Result<AccessToken> {
        debug!(username = %self.username, "Requesting veeam access token");

        let response = self
            .http
            .post(self.endpoint(TOKEN_PATH)?)
            .header(API_VERSION_HEADER, &self.api_version)
            .form(&[
                ("grant_type", "password"),
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CollectError::connectivity(Component::Veeam, "requesting an access token", e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| CollectError::connectivity(Component::Veeam, "reading the token response", e))?;

        if !status.is_success() {
            error!(status = %status, auth_response = %String::from_utf8_lossy(&body), "Error creating Veeam token");
            return Err(CollectError::Authentication(format!("token request answered {status}")));
        }

        let token: TokenResponse =
            serde_json::from_slice(&body).map_err(|e| CollectError::decode("token response", e))?;

        Ok(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    async fn bearer(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref().filter(|t| t.is_fresh()) {
            return Ok(current.value.clone());
        }

        let fresh = self.authenticate().await?;
        let value = fresh.value.clone();
        *token = Some(fresh);
        Ok(value)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)], context: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let bearer = self.bearer().await?;

        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(bearer)
            .header(API_VERSION_HEADER, &self.api_version)
            .send()
            .await
            .map_err(|e| CollectError::connectivity(Component::Veeam, format!("getting {context}"), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectError::Status {
                component: Component::Veeam,
                context: format!("getting {context}"),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CollectError::connectivity(Component::Veeam, format!("reading {context}"), e))?;

        serde_json::from_slice(&body).map_err(|e| CollectError::decode(context, e))
    }

    async fn list<T: DeserializeOwned>(&self, path: &str, context: &str) -> Result<Vec<T>> {
        let page: Page<T> = self.get(path, &[], context).await?;
        Ok(page.data)
    }
}

#[async_trait]
impl BackupSource for VeeamClient {
    async fn server_info(&self) -> Result<ServerInfo> {
        info!("Collecting veeam server info");
        let server_info: ServerInfo = self.get(SERVER_INFO_PATH, &[], "server info").await?;
        info!(
            name = %server_info.name,
            build_version = %server_info.build_version,
            "Veeam server information"
        );
        Ok(server_info)
    }

    async fn sessions(&self) -> Result<Vec<Session>> {
        info!("Collecting sessions information");
        self.list(SESSIONS_PATH, "sessions").await
    }

    async fn managed_servers(&self) -> Result<Vec<ManagedServer>> {
        info!("Collecting managed servers information");
        self.list(MANAGED_SERVERS_PATH, "managed servers").await
    }

    async fn repositories(&self) -> Result<Repositories> {
        info!("Collecting repositories information");
        let configs: Vec<RepositoryConfig> = self.list(REPOSITORIES_PATH, "repositories").await?;

        // TODO: the per-repository state requests could run concurrently once
        // large installations make the sequential fan-out too slow.
        let mut states = Vec::with_capacity(configs.len());
        for config in &configs {
            let page: Page<RepositoryState> = self
                .get(REPOSITORY_STATES_PATH, &[("idFilter", config.id.as_str())], "repository states")
                .await?;
            states.extend(page.data);
        }

        debug!(repositories = configs.len(), states = states.len(), "Collected repository views");
        Ok(Repositories { configs, states })
    }

    async fn proxies(&self) -> Result<Vec<Proxy>> {
        info!("Collecting proxies information");
        self.list(PROXIES_PATH, "proxies").await
    }

    async fn backup_objects(&self) -> Result<Vec<BackupObject>> {
        info!("Collecting backup objects information");
        self.list(BACKUP_OBJECTS_PATH, "backup objects").await
    }
}

#[async_trait]
impl Probe for VeeamClient {
    fn component(&self) -> Component {
        Component::Veeam
    }

    async fn probe(&self) -> Result<()> {
        self.server_info().await.map(|_| ())
    }
}
