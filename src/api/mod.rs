use crate::models::{
    AnnotationId, CreatedSmell, MoreCodeRequest, MoreCodeResponse, PreviewResponse,
};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    Network,
    Http,
    Parse,
    /// The server answered 2xx but reported a failure in the body.
    Rejected,
}

/// `message` is what gets shown to the viewer, verbatim.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    pub(crate) fn http(status: u16, body: String) -> Self {
        let message = if body.trim().is_empty() {
            format!("Request failed ({status})")
        } else {
            body
        };
        Self {
            kind: ApiErrorKind::Http,
            message,
        }
    }

    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Rejected,
            message: message.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Clone, Debug)]
struct PreviewRequest<'a> {
    comment: &'a str,
}

/// Thin client over the page's same-origin endpoints.
#[derive(Clone, Debug)]
pub struct ApiClient {
    pub(crate) base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub(crate) fn smell_path(item_id: &str, line: usize) -> String {
        format!("/smell/{}/{}", urlencoding::encode(item_id), line)
    }

    pub(crate) fn smell_remove_path(id: &AnnotationId) -> String {
        format!("/smell_remove/{}", urlencoding::encode(id.as_str()))
    }

    pub(crate) fn remove_comment_path(comment_id: &str) -> String {
        format!("/remove_comment/{}", urlencoding::encode(comment_id))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        let res = req.send().await.map_err(ApiError::network)?;
        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body))
        }
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        let res = self.send(req).await?;
        res.json().await.map_err(ApiError::parse)
    }

    async fn send_empty(&self, req: reqwest::RequestBuilder) -> ApiResult<()> {
        // Success bodies of the remove endpoints are ignored.
        self.send(req).await.map(|_| ())
    }

    pub async fn create_smell(&self, item_id: &str, line: usize) -> ApiResult<CreatedSmell> {
        let req = self.http.post(self.url(&Self::smell_path(item_id, line)));
        self.send_json(req).await
    }

    pub async fn remove_smell(&self, id: &AnnotationId) -> ApiResult<()> {
        let req = self.http.post(self.url(&Self::smell_remove_path(id)));
        self.send_empty(req).await
    }

    pub async fn comment_preview(&self, comment: &str) -> ApiResult<PreviewResponse> {
        let req = self
            .http
            .post(self.url("/comment_preview"))
            .form(&PreviewRequest { comment });
        self.send_json(req).await
    }

    pub async fn more_code(&self, request: &MoreCodeRequest) -> ApiResult<MoreCodeResponse> {
        let req = self.http.get(self.url("/more_code")).query(request);
        self.send_json(req).await
    }

    pub async fn remove_comment(&self, comment_id: &str) -> ApiResult<()> {
        let req = self
            .http
            .post(self.url(&Self::remove_comment_path(comment_id)));
        self.send_empty(req).await
    }
}
