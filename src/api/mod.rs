use std::time::Duration;

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

/// A particle as the backend serves it. The body is rich-text HTML and is
/// only ever interpreted by the render module.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Particle {
    pub id: String,
    pub user_facing_id: i64,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A single search result row. Slimmer than a full particle: the backend
/// sends a relevance score and a plain-text snippet instead of the body.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct QueryHit {
    pub id: String,
    pub user_facing_id: i64,
    pub created_at: String,
    pub title: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {status}")]
    Status { status: u16, detail: Option<String> },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SessionBody<'a> {
    session: &'a str,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    title: &'a str,
    body: &'a str,
    tags: &'a [String],
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct NewBodyBody<'a> {
    new_body: &'a str,
}

#[derive(Serialize)]
struct TagsBody<'a> {
    tags: &'a [String],
}

#[derive(Deserialize)]
struct LoginResponse {
    session: String,
}

#[derive(Deserialize)]
struct WhoamiResponse {
    username: String,
}

fn detail_field(value: &Value) -> Option<String> {
    value
        .get("detail")
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Thin wrapper over one `reqwest::Client` and the backend base URL. The
/// session token rides as a `session` query parameter on every protected
/// call; JSON in, JSON out; no retries, a failure ends the current action.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(server: &str, timeout_seconds: usize) -> Result<Self, String> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("pimctl"),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_seconds.try_into().unwrap_or(10)))
            .build()
            .map_err(|e| format!("failed to build http client: {e}"))?;
        Ok(Self {
            client,
            base_url: server.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        url: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let resp = builder.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        debug!("{url} -> {}", status.as_u16());
        if status.is_success() {
            return Ok(resp);
        }
        let detail = resp.json::<Value>().await.ok().as_ref().and_then(detail_field);
        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }

    async fn decode<T: DeserializeOwned>(
        url: String,
        resp: reqwest::Response,
    ) -> Result<T, ApiError> {
        resp.json::<T>()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let resp = self.send(&url, self.client.get(&url).query(query)).await?;
        Self::decode(url, resp).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let resp = self
            .send(&url, self.client.post(&url).query(query).json(body))
            .await?;
        Self::decode(url, resp).await
    }

    async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let resp = self
            .send(&url, self.client.put(&url).query(query).json(body))
            .await?;
        Self::decode(url, resp).await
    }

    // Auth

    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let resp: LoginResponse = self
            .post_json("/login", &[], &Credentials { username, password })
            .await?;
        Ok(resp.session)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let _: Value = self
            .post_json("/register", &[], &Credentials { username, password })
            .await?;
        Ok(())
    }

    pub async fn logout(&self, session: &str) -> Result<(), ApiError> {
        let _: Value = self
            .post_json("/logout", &[], &SessionBody { session })
            .await?;
        Ok(())
    }

    pub async fn whoami(&self, session: &str) -> Result<String, ApiError> {
        let resp: WhoamiResponse = self.get_json("/whoami", &[("session", session)]).await?;
        Ok(resp.username)
    }

    // Particles

    pub async fn particle(&self, session: &str, id: &str) -> Result<Particle, ApiError> {
        self.get_json(&format!("/particles/{id}"), &[("session", session)])
            .await
    }

    pub async fn create_particle(
        &self,
        session: &str,
        title: &str,
        body: &str,
        tags: &[String],
    ) -> Result<Particle, ApiError> {
        self.post_json(
            "/particles",
            &[("session", session)],
            &CreateBody { title, body, tags },
        )
        .await
    }

    /// Full update: one PUT carrying title and body, never a partial write.
    pub async fn update_particle(
        &self,
        session: &str,
        id: &str,
        title: &str,
        body: &str,
    ) -> Result<Particle, ApiError> {
        self.put_json(
            &format!("/particles/{id}"),
            &[("session", session)],
            &UpdateBody { title, body },
        )
        .await
    }

    pub async fn update_particle_body(
        &self,
        session: &str,
        id: &str,
        new_body: &str,
    ) -> Result<Particle, ApiError> {
        self.put_json(
            &format!("/particles/{id}/body"),
            &[("session", session)],
            &NewBodyBody { new_body },
        )
        .await
    }

    pub async fn add_tags(
        &self,
        session: &str,
        id: &str,
        tags: &[String],
    ) -> Result<Particle, ApiError> {
        self.put_json(
            &format!("/particles/{id}/tags/add"),
            &[("session", session)],
            &TagsBody { tags },
        )
        .await
    }

    pub async fn remove_tags(
        &self,
        session: &str,
        id: &str,
        tags: &[String],
    ) -> Result<Particle, ApiError> {
        self.put_json(
            &format!("/particles/{id}/tags/remove"),
            &[("session", session)],
            &TagsBody { tags },
        )
        .await
    }

    pub async fn delete_particle(&self, session: &str, id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/particles/{id}"));
        self.send(&url, self.client.delete(&url).query(&[("session", session)]))
            .await?;
        Ok(())
    }

    // Search and export

    pub async fn search(&self, session: &str, query: &str) -> Result<Vec<QueryHit>, ApiError> {
        self.get_json("/search", &[("q", query), ("session", session)])
            .await
    }

    pub async fn export(&self, session: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.url("/export");
        let resp = self
            .send(&url, self.client.get(&url).query(&[("session", session)]))
            .await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { url, source })?;
        Ok(bytes.to_vec())
    }
}
