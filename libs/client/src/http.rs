//! HTTP transport for the marketplace API
//!
//! One request path for every call: attach the bearer token at send time,
//! decode the uniform envelope, classify failures into [`ApiError`], and on
//! a 401 from an authenticated call run the session teardown protocol. A
//! response only counts as successful when the HTTP status is 2xx and the
//! envelope reports `success: true`.

use std::collections::HashMap;
use std::time::Duration;

use common::config::ClientConfig;
use common::envelope::Envelope;
use reqwest::{RequestBuilder, StatusCode, multipart::Form};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::session::SessionHandle;

/// Transport shared by the session store and every resource store
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
    session: SessionHandle,
}

impl HttpClient {
    pub fn new(config: ClientConfig, session: SessionHandle) -> ApiResult<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(ApiError::Connection)?;

        Ok(Self {
            inner,
            config,
            session,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ApiResult<T> {
        let mut request = self.inner.get(self.config.endpoint(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        self.execute(request, true).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.inner.post(self.config.endpoint(path)).json(body), true)
            .await
    }

    /// POST without a bearer token.
    ///
    /// Used by auth-establishing calls so an invalid-credentials 401 cannot
    /// tear down an existing session.
    pub async fn post_public<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.inner.post(self.config.endpoint(path)).json(body), false)
            .await
    }

    /// POST whose response carries no `data` payload.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.inner.post(self.config.endpoint(path)).json(body), true)
            .await?;
        Ok(())
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.inner.put(self.config.endpoint(path)).json(body), true)
            .await
    }

    /// PUT whose response carries no `data` payload.
    pub async fn put_unit<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.inner.put(self.config.endpoint(path)).json(body), true)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(self.inner.delete(self.config.endpoint(path)), true)
            .await?;
        Ok(())
    }

    /// Multipart POST under the same envelope and error contract.
    ///
    /// Updates of file-bearing resources go through here too, with a
    /// `_method=PUT` override field inside the form.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> ApiResult<T> {
        self.execute(
            self.inner.post(self.config.endpoint(path)).multipart(form),
            true,
        )
        .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        authenticated: bool,
    ) -> ApiResult<T> {
        let envelope = self.send(request, authenticated).await?;
        let data = envelope
            .data
            .ok_or_else(|| ApiError::Decode("envelope is missing its data field".to_string()))?;
        serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send(
        &self,
        mut request: RequestBuilder,
        authenticated: bool,
    ) -> ApiResult<Envelope<Value>> {
        let mut bearer_attached = false;
        if authenticated {
            // Read the latest token at send time, never a captured copy.
            if let Some(token) = self.session.bearer_token() {
                request = request.bearer_auth(token);
                bearer_attached = true;
            }
        }

        let response = request.send().await.map_err(ApiError::Connection)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::Connection)?;

        let envelope: Envelope<Value> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                if status == StatusCode::UNAUTHORIZED {
                    if bearer_attached {
                        self.handle_unauthorized();
                    }
                    return Err(ApiError::Unauthorized("Unauthenticated".to_string()));
                }
                if !status.is_success() {
                    return Err(ApiError::Api {
                        status: status.as_u16(),
                        message: format!("HTTP {status}"),
                    });
                }
                return Err(ApiError::Decode(e.to_string()));
            }
        };

        if status.is_success() && envelope.success {
            return Ok(envelope);
        }

        if status == StatusCode::UNAUTHORIZED && bearer_attached {
            self.handle_unauthorized();
        }

        Err(classify(status, envelope.message, envelope.errors))
    }

    fn handle_unauthorized(&self) {
        if self.session.invalidate() {
            warn!("authorization failure, session torn down");
        }
    }
}

fn classify(
    status: StatusCode,
    message: String,
    errors: Option<HashMap<String, Vec<String>>>,
) -> ApiError {
    if status == StatusCode::UNAUTHORIZED {
        return ApiError::Unauthorized(message);
    }

    let has_field_errors = errors.as_ref().is_some_and(|e| !e.is_empty());
    if status == StatusCode::UNPROCESSABLE_ENTITY || has_field_errors {
        return ApiError::Validation {
            message,
            errors: errors.unwrap_or_default(),
        };
    }

    if status == StatusCode::FORBIDDEN && message.to_lowercase().contains("activat") {
        return ApiError::AccountNotActivated(message);
    }

    ApiError::Api {
        status: status.as_u16(),
        message,
    }
}
