//! HTTP client for the backend `/v1` endpoints.
//!
//! Write calls validate their input locally first; a document that fails
//! validation never reaches the network.

use reetr_core::assessment::{Assessment, AssessmentRecord};
use reetr_core::error::CoreError;
use reetr_core::life_hack::{LifeHack, LifeHackInput};
use reetr_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// HTTP client for the content backend.
#[derive(Debug, Clone)]
pub struct BackendApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the backend REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum BackendApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The request was rejected locally before being sent.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// The backend answers either with a bare payload or wrapped in `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(data) => data,
        }
    }
}

impl BackendApi {
    /// Create a client for the backend at `api_url`, e.g.
    /// `http://localhost:8000`. A trailing slash is ignored.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- life hacks ----

    /// `GET /v1/life-hacks/`
    pub async fn list_life_hacks(&self, token: &str) -> Result<Vec<LifeHack>, BackendApiError> {
        self.get(token, "/v1/life-hacks/").await
    }

    /// `POST /v1/life-hacks/` with the validated payload.
    pub async fn create_life_hack(
        &self,
        token: &str,
        input: &LifeHackInput,
    ) -> Result<LifeHack, BackendApiError> {
        let payload = input.to_payload()?;
        self.send_json(reqwest::Method::POST, token, "/v1/life-hacks/", &payload)
            .await
    }

    /// `PATCH /v1/life-hacks/{id}` with the validated payload.
    pub async fn update_life_hack(
        &self,
        token: &str,
        id: DbId,
        input: &LifeHackInput,
    ) -> Result<LifeHack, BackendApiError> {
        let payload = input.to_payload()?;
        let path = format!("/v1/life-hacks/{id}");
        self.send_json(reqwest::Method::PATCH, token, &path, &payload)
            .await
    }

    // ---- assessments ----

    /// `GET /v1/assessments/`
    pub async fn list_assessments(
        &self,
        token: &str,
    ) -> Result<Vec<AssessmentRecord>, BackendApiError> {
        self.get(token, "/v1/assessments/").await
    }

    /// `GET /v1/assessments/{id}`
    pub async fn get_assessment(
        &self,
        token: &str,
        id: DbId,
    ) -> Result<AssessmentRecord, BackendApiError> {
        self.get(token, &format!("/v1/assessments/{id}")).await
    }

    /// `POST /v1/assessments/`. The document must already pass validation.
    pub async fn create_assessment(
        &self,
        token: &str,
        assessment: &Assessment,
    ) -> Result<AssessmentRecord, BackendApiError> {
        assessment.validate()?;
        self.send_json(reqwest::Method::POST, token, "/v1/assessments/", assessment)
            .await
    }

    /// `PATCH /v1/assessments/{id}`. The document must already pass
    /// validation.
    pub async fn update_assessment(
        &self,
        token: &str,
        id: DbId,
        assessment: &Assessment,
    ) -> Result<AssessmentRecord, BackendApiError> {
        assessment.validate()?;
        let path = format!("/v1/assessments/{id}");
        self.send_json(reqwest::Method::PATCH, token, &path, assessment)
            .await
    }

    /// `DELETE /v1/assessments/{id}`
    pub async fn delete_assessment(&self, token: &str, id: DbId) -> Result<(), BackendApiError> {
        let url = self.url(&format!("/v1/assessments/{id}"));
        tracing::debug!(%url, "DELETE backend");
        let response = self.client.delete(url).bearer_auth(token).send().await?;
        Self::check_status(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, BackendApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET backend");
        let response = self.client.get(url).bearer_auth(token).send().await?;
        Self::parse_response(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        token: &str,
        path: &str,
        body: &B,
    ) -> Result<T, BackendApiError> {
        let url = self.url(path);
        tracing::debug!(%url, %method, "Sending to backend");
        let response = self
            .client
            .request(method, url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Returns the response unchanged on success, or
    /// [`BackendApiError::ApiError`] with the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), %body, "Backend request failed");
            return Err(BackendApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendApiError> {
        let response = Self::ensure_success(response).await?;
        let envelope = response.json::<Envelope<T>>().await?;
        Ok(envelope.into_inner())
    }

    async fn check_status(response: reqwest::Response) -> Result<(), BackendApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reetr_core::life_hack::LifeHackCategory;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = BackendApi::new("http://localhost:8000/");
        assert_eq!(api.url("/v1/life-hacks/"), "http://localhost:8000/v1/life-hacks/");
    }

    #[test]
    fn envelope_accepts_wrapped_and_bare() {
        let wrapped: Envelope<Vec<i32>> = serde_json::from_str(r#"{"data":[1,2]}"#).unwrap();
        assert_eq!(wrapped.into_inner(), vec![1, 2]);
        let bare: Envelope<Vec<i32>> = serde_json::from_str("[3]").unwrap();
        assert_eq!(bare.into_inner(), vec![3]);
    }

    #[test]
    fn envelope_unwraps_records() {
        let hack: Envelope<LifeHack> = serde_json::from_str(
            r#"{"data":{"id":1,"type":"Walk","category":"fitness"}}"#,
        )
        .unwrap();
        let hack = hack.into_inner();
        assert_eq!(hack.id, 1);
        assert_eq!(hack.category, Some(LifeHackCategory::Fitness));
    }
}
