//! JSON-over-HTTP client for the server's management API.
//!
//! Read-only methods are `GET <namespace>/<method>?<params>`, everything else
//! is `POST` with a JSON object body. Every response is wrapped in
//! `{"success": bool, "result": ..., "message": ...}`. The session cookie set
//! by `auth/login` is kept in the client's cookie store.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    Channel, ContentFilter, CriteriaDefinition, Environment, FilterCriteria, FilterRule, Package,
    Project, ProjectFilter, ProjectSource,
};
use crate::infrastructure::error::{ApiError, ApiResult};
use crate::infrastructure::traits::ContentApi;

/// Response envelope shared by all API methods.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    messages: Vec<String>,
}

impl Envelope {
    fn error_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| (!self.messages.is_empty()).then(|| self.messages.join("; ")))
            .unwrap_or_else(|| "request was not successful".to_string())
    }
}

/// Authenticated API session.
pub struct HttpContentApi {
    client: Client,
    base_url: String,
    logged_in: bool,
}

impl HttpContentApi {
    /// Log in and return a ready client.
    ///
    /// `base_url` is the API root, e.g. `https://suma.example.com/rhn/manager/api`.
    #[instrument(skip(password))]
    pub fn connect(
        base_url: &str,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        let mut api = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            logged_in: false,
        };
        api.login(username, password)?;
        Ok(api)
    }

    fn login(&mut self, username: &str, password: &str) -> ApiResult<()> {
        let url = self.url("auth.login");
        debug!("login: url={} user={}", url, username);
        let resp = self
            .client
            .post(&url)
            .json(&json!({ "login": username, "password": password }))
            .send()?;

        let status = resp.status();
        let envelope: Option<Envelope> = resp.json().ok();
        match envelope {
            Some(env) if status.is_success() && env.success => {
                info!("logged in as {}", username);
                self.logged_in = true;
                Ok(())
            }
            Some(env) => Err(ApiError::Auth {
                user: username.to_string(),
                message: env.error_message(),
            }),
            None => Err(ApiError::Auth {
                user: username.to_string(),
                message: format!("server answered {status}"),
            }),
        }
    }

    /// Ends the session now. Dropping the client does the same but only logs failures.
    pub fn close(mut self) -> ApiResult<()> {
        self.logout()
    }

    fn logout(&mut self) -> ApiResult<()> {
        if !self.logged_in {
            return Ok(());
        }
        self.logged_in = false;
        let url = self.url("auth.logout");
        let resp = self.client.post(&url).send()?;
        Self::decode::<Value>("auth.logout", resp)?;
        info!("logged out");
        Ok(())
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method.replace('.', "/"))
    }

    fn get<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> ApiResult<T> {
        debug!("GET {} {:?}", method, params);
        let resp = self.client.get(self.url(method)).query(params).send()?;
        Self::decode(method, resp)
    }

    fn post<T: DeserializeOwned>(&self, method: &str, body: Value) -> ApiResult<T> {
        debug!("POST {} {}", method, body);
        let resp = self.client.post(self.url(method)).json(&body).send()?;
        Self::decode(method, resp)
    }

    /// POST where the result is not needed.
    fn call(&self, method: &str, body: Value) -> ApiResult<()> {
        self.post::<Value>(method, body).map(|_| ())
    }

    fn decode<T: DeserializeOwned>(method: &str, resp: Response) -> ApiResult<T> {
        let status = resp.status();
        let text = resp.text()?;
        let envelope: Envelope = match serde_json::from_str(&text) {
            Ok(env) => env,
            Err(_) if !status.is_success() => {
                return Err(ApiError::remote(method, format!("server answered {status}")))
            }
            Err(source) => {
                return Err(ApiError::Decode {
                    method: method.to_string(),
                    source,
                })
            }
        };

        if !status.is_success() || !envelope.success {
            return Err(ApiError::remote(method, envelope.error_message()));
        }

        serde_json::from_value(envelope.result).map_err(|source| ApiError::Decode {
            method: method.to_string(),
            source,
        })
    }
}

impl Drop for HttpContentApi {
    fn drop(&mut self) {
        if let Err(e) = self.logout() {
            warn!("logout failed: {}", e);
        }
    }
}

impl ContentApi for HttpContentApi {
    fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.get("contentmanagement.listProjects", &[])
    }

    fn lookup_project(&self, project: &str) -> ApiResult<Project> {
        self.get(
            "contentmanagement.lookupProject",
            &[("projectLabel", project)],
        )
    }

    fn list_project_environments(&self, project: &str) -> ApiResult<Vec<Environment>> {
        self.get(
            "contentmanagement.listProjectEnvironments",
            &[("projectLabel", project)],
        )
    }

    fn list_project_sources(&self, project: &str) -> ApiResult<Vec<ProjectSource>> {
        self.get(
            "contentmanagement.listProjectSources",
            &[("projectLabel", project)],
        )
    }

    fn list_project_filters(&self, project: &str) -> ApiResult<Vec<ProjectFilter>> {
        self.get(
            "contentmanagement.listProjectFilters",
            &[("projectLabel", project)],
        )
    }

    fn list_filters(&self) -> ApiResult<Vec<ContentFilter>> {
        self.get("contentmanagement.listFilters", &[])
    }

    fn list_filter_criteria(&self) -> ApiResult<Vec<CriteriaDefinition>> {
        self.get("contentmanagement.listFilterCriteria", &[])
    }

    fn build_project(&self, project: &str) -> ApiResult<()> {
        self.call(
            "contentmanagement.buildProject",
            json!({ "projectLabel": project }),
        )
    }

    fn promote_project(&self, project: &str, env: &str) -> ApiResult<()> {
        self.call(
            "contentmanagement.promoteProject",
            json!({ "projectLabel": project, "envLabel": env }),
        )
    }

    fn create_project(&self, label: &str, name: &str, description: &str) -> ApiResult<()> {
        self.call(
            "contentmanagement.createProject",
            json!({ "projectLabel": label, "name": name, "description": description }),
        )
    }

    fn attach_source(&self, project: &str, source_type: &str, source: &str) -> ApiResult<()> {
        self.call(
            "contentmanagement.attachSource",
            json!({ "projectLabel": project, "sourceType": source_type, "sourceLabel": source }),
        )
    }

    fn detach_source(&self, project: &str, source_type: &str, source: &str) -> ApiResult<()> {
        self.call(
            "contentmanagement.detachSource",
            json!({ "projectLabel": project, "sourceType": source_type, "sourceLabel": source }),
        )
    }

    fn create_environment(
        &self,
        project: &str,
        predecessor: &str,
        label: &str,
        name: &str,
        description: &str,
    ) -> ApiResult<()> {
        self.call(
            "contentmanagement.createEnvironment",
            json!({
                "projectLabel": project,
                "predecessorLabel": predecessor,
                "envLabel": label,
                "name": name,
                "description": description,
            }),
        )
    }

    fn remove_environment(&self, project: &str, env: &str) -> ApiResult<()> {
        self.call(
            "contentmanagement.removeEnvironment",
            json!({ "projectLabel": project, "envLabel": env }),
        )
    }

    fn create_filter(
        &self,
        name: &str,
        rule: FilterRule,
        entity_type: &str,
        criteria: &FilterCriteria,
    ) -> ApiResult<()> {
        self.call(
            "contentmanagement.createFilter",
            json!({
                "name": name,
                "rule": rule.as_str(),
                "entityType": entity_type,
                "criteria": criteria,
            }),
        )
    }

    fn attach_filter(&self, project: &str, filter_id: i64) -> ApiResult<()> {
        self.call(
            "contentmanagement.attachFilter",
            json!({ "projectLabel": project, "filterId": filter_id }),
        )
    }

    fn detach_filter(&self, project: &str, filter_id: i64) -> ApiResult<()> {
        self.call(
            "contentmanagement.detachFilter",
            json!({ "projectLabel": project, "filterId": filter_id }),
        )
    }

    fn create_appstream_filters(
        &self,
        prefix: &str,
        channel: &str,
        project: &str,
    ) -> ApiResult<()> {
        self.call(
            "contentmanagement.createAppStreamFilters",
            json!({ "prefix": prefix, "channelLabel": channel, "projectLabel": project }),
        )
    }

    fn list_software_channels(&self) -> ApiResult<Vec<Channel>> {
        self.get("channel.listSoftwareChannels", &[])
    }

    fn list_channel_packages(&self, channel: &str) -> ApiResult<Vec<Package>> {
        self.get(
            "channel.software.listAllPackages",
            &[("channelLabel", channel)],
        )
    }
}
