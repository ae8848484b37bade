use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Thin JSON client over the backend's REST API.
///
/// Paths are relative to the configured base URL (which already ends in
/// `/api`). Protected calls take the bearer token explicitly.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError::Url` for an invalid base URL, or
    /// `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Url::parse(&config.base_url)?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.base_url,
            path.trim_start_matches('/')
        ))?)
    }

    /// `GET` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-2xx status or a body that
    /// does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        self.get_with_query(path, &[], token).await
    }

    /// `GET` with query-string pairs.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut url = self.url(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let request = authorize(self.client.get(url), token);
        decode(send(request, "GET", path).await?).await
    }

    /// `POST` a JSON body and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let request = authorize(self.client.post(self.url(path)?), token).json(body);
        decode(send(request, "POST", path).await?).await
    }

    /// `PATCH` with an optional JSON body. The reply body is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or non-2xx status.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut request = authorize(self.client.patch(self.url(path)?), token);
        if let Some(body) = body {
            request = request.json(body);
        }
        send(request, "PATCH", path).await?;
        Ok(())
    }

    /// `DELETE`. The reply body is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or non-2xx status.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(), ApiError> {
        let request = authorize(self.client.delete(self.url(path)?), token);
        send(request, "DELETE", path).await?;
        Ok(())
    }
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn send(request: RequestBuilder, method: &str, path: &str) -> Result<Response, ApiError> {
    tracing::debug!(method, path, "api request");
    let response = request.send().await.map_err(|err| {
        tracing::warn!(method, path, error = %err, "api request failed");
        ApiError::Network(err)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = error_for_status(status, &body);
    tracing::warn!(method, path, %status, error = %err, "api request rejected");
    Err(err)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Map a non-2xx reply to an error, keeping the backend's `detail` text.
pub(crate) fn error_for_status(status: StatusCode, body: &str) -> ApiError {
    let detail = extract_detail(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ApiError::Unauthorized { status, detail }
        }
        StatusCode::NOT_FOUND => ApiError::NotFound { detail },
        _ => ApiError::Status { status, detail },
    }
}

// `detail` is a string for handled errors and a list of objects for request
// validation failures.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_under_the_api_prefix() {
        let client = ApiClient::new(&ApiConfig::default()).unwrap();
        let url = client.url("/dedaena/gogebashvili_1/position/3").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/dedaena/gogebashvili_1/position/3"
        );
    }

    #[test]
    fn string_detail_becomes_the_message() {
        let err = error_for_status(StatusCode::BAD_REQUEST, r#"{"detail": "უკვე არსებობს"}"#);
        assert!(matches!(err, ApiError::Status { .. }));
        assert_eq!(err.user_message(), "უკვე არსებობს");
    }

    #[test]
    fn auth_statuses_map_to_unauthorized() {
        let err = error_for_status(StatusCode::FORBIDDEN, r#"{"detail": "Admin only"}"#);
        assert!(err.is_auth());
        let err = error_for_status(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.user_message(), "Unauthorized");
    }

    #[test]
    fn validation_detail_list_is_joined() {
        let body = r#"{"detail": [{"msg": "field required"}, {"msg": "too short"}]}"#;
        let err = error_for_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(err.user_message(), "field required; too short");
    }

    #[test]
    fn missing_detail_falls_back_to_reason() {
        let err = error_for_status(StatusCode::NOT_FOUND, "<html>");
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert_eq!(err.user_message(), "Not Found");
    }
}
