//! Directory API client using delegated service-account credentials.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Value, json};
use tracing::{debug, warn};

use authz_core::config::directory::DirectoryConfig;
use authz_core::error::{AppError, ErrorKind, codes};
use authz_core::result::AppResult;
use authz_core::traits::directory::DirectoryClient;

use crate::service_account::{ServiceAccountKey, ServiceAccountTokenSource};

/// Upper bound on group pages followed for a single user.
const MAX_GROUP_PAGES: usize = 50;

/// Reads users and group memberships from the Workspace Directory API.
#[derive(Debug)]
pub struct GoogleDirectoryClient {
    http: reqwest::Client,
    tokens: ServiceAccountTokenSource,
    base_url: String,
    schema_name: String,
}

impl GoogleDirectoryClient {
    /// Build the client from configuration, loading the key file.
    pub fn from_config(config: &DirectoryConfig) -> AppResult<Self> {
        let delegated_user = config
            .delegated_user
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::configuration("directory.delegated_user is required"))?;

        let key = ServiceAccountKey::from_file(&config.service_account_file)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(1)))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    codes::CONFIGURATION_ERROR,
                    "Failed to build directory HTTP client",
                    e,
                )
            })?;

        let tokens =
            ServiceAccountTokenSource::new(key, delegated_user, &config.additional_scopes, http.clone())?;

        Ok(Self {
            http,
            tokens,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            schema_name: config.auth_schema.clone(),
        })
    }

    fn user_url(&self, email: &str) -> AppResult<Url> {
        let mut url = self.parse_base()?;
        url.path_segments_mut()
            .map_err(|_| AppError::configuration("directory.api_base_url cannot be a base URL"))?
            .push("users")
            .push(email);
        url.query_pairs_mut()
            .append_pair("projection", "full")
            .append_pair("customFieldMask", &self.schema_name)
            .append_pair("viewType", "admin_view");
        Ok(url)
    }

    fn groups_url(&self, email: &str, page_token: Option<&str>) -> AppResult<Url> {
        let mut url = self.parse_base()?;
        url.path_segments_mut()
            .map_err(|_| AppError::configuration("directory.api_base_url cannot be a base URL"))?
            .push("groups");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("userKey", email);
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }

    fn parse_base(&self) -> AppResult<Url> {
        Url::parse(&self.base_url).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                codes::CONFIGURATION_ERROR,
                "directory.api_base_url is not a valid URL",
                e,
            )
        })
    }

    async fn get_json(&self, url: Url) -> AppResult<Value> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Directory request failed");
                AppError::with_source(
                    ErrorKind::Upstream,
                    codes::WORKSPACE_UNAVAILABLE,
                    "Directory request failed",
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Directory API returned an error status");
            return Err(AppError::upstream(
                codes::WORKSPACE_UNAVAILABLE,
                format!("Directory API returned {status}"),
            ));
        }

        response.json::<Value>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Upstream,
                codes::WORKSPACE_UNAVAILABLE,
                "Directory API returned an unreadable body",
                e,
            )
        })
    }
}

#[async_trait]
impl DirectoryClient for GoogleDirectoryClient {
    async fn get_user(&self, email: &str) -> AppResult<Value> {
        debug!(email, "Fetching directory user");
        self.get_json(self.user_url(email)?).await
    }

    async fn list_groups(&self, email: &str) -> AppResult<Value> {
        let mut groups = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_GROUP_PAGES {
            let page = self
                .get_json(self.groups_url(email, page_token.as_deref())?)
                .await?;
            if let Some(Value::Array(items)) = page.get("groups") {
                groups.extend(items.iter().cloned());
            }
            page_token = page
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }

        if page_token.is_some() {
            warn!(email, pages = MAX_GROUP_PAGES, "Group listing truncated");
        }
        debug!(email, count = groups.len(), "Fetched directory groups");
        Ok(json!({ "groups": groups }))
    }
}
