//! Synthetic HTTP request and response values handled by the dispatcher.

use crate::api::RestError;
use crate::api::serialization::MediaType;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderName};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use std::borrow::Cow;
use url::Url;

pub const AUTH_HEADER: &str = "X-Tableau-Auth";

#[derive(Debug, Clone)]
pub struct SimulatedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl SimulatedRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn parse(method: Method, url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(method, Url::parse(url)?))
    }

    /// Adds a header; names or values that are not valid HTTP are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_auth(self, token: &str) -> Self {
        self.with_header(AUTH_HEADER, token)
    }

    pub fn with_accept(self, media_type: MediaType) -> Self {
        let value = media_type.content_type();
        self.with_header(ACCEPT.as_str(), value)
    }

    pub fn with_body(mut self, content_type: &str, body: impl Into<Bytes>) -> Self {
        self.headers.remove(CONTENT_TYPE);
        self = self.with_header(CONTENT_TYPE.as_str(), content_type);
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.header(AUTH_HEADER)
    }

    pub fn accept(&self) -> MediaType {
        MediaType::from_accept(self.header(ACCEPT.as_str()))
    }

    pub fn is_multipart(&self) -> bool {
        self.content_type()
            .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/"))
    }

    pub fn query(&self) -> QueryParams {
        QueryParams(
            self.url
                .query_pairs()
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect(),
        )
    }

    /// Non-empty path segments, as sent.
    pub fn path_segments(&self) -> Vec<&str> {
        self.url
            .path_segments()
            .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Query string parameters; names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// `true` only for a case-insensitive `true` value.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl SimulatedResponse {
    pub fn new(status: StatusCode, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// One part of a multipart request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    /// Parses a `multipart/*` body. Both `form-data` and `mixed` subtypes are
    /// accepted; only the boundary parameter is required.
    pub async fn parse(content_type: &str, body: Bytes) -> Result<Self, RestError> {
        let boundary = boundary_of(content_type).ok_or_else(|| {
            RestError::new(
                400,
                0,
                "Bad Request",
                "Multipart request is missing the boundary parameter",
            )
        })?;
        let stream = futures::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(|mime| mime.to_string());
            let data = field.bytes().await.map_err(multipart_error)?;
            parts.push(FormPart {
                name,
                file_name,
                content_type,
                data,
            });
        }
        Ok(Self { parts })
    }

    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|part| part.name == name)
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }
}

fn multipart_error(error: multer::Error) -> RestError {
    RestError::new(400, 0, "Bad Request", format!("Malformed multipart body: {}", error))
}

fn boundary_of(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';');
    let essence = params.next()?.trim().to_ascii_lowercase();
    if !essence.starts_with("multipart/") {
        return None;
    }
    params.find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"').to_string())
            .filter(|boundary| !boundary.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::form::MultipartBuilder;

    #[test]
    fn test_query_params() {
        let request = SimulatedRequest::parse(
            Method::GET,
            "http://localhost/api/3.19/sites/x/users?PageSize=5&overwrite=TRUE&filter=name%3Aeq%3AJo",
        )
        .expect("url");
        let query = request.query();
        assert_eq!(query.get("pageSize"), Some("5"));
        assert!(query.flag("overwrite"));
        assert!(!query.flag("missing"));
        assert_eq!(query.get("filter"), Some("name:eq:Jo"));
    }

    #[test]
    fn test_headers() {
        let request = SimulatedRequest::parse(Method::GET, "http://localhost/api/3.19/serverinfo")
            .expect("url")
            .with_auth("token-1")
            .with_accept(MediaType::Json);
        assert_eq!(request.auth_token(), Some("token-1"));
        assert_eq!(request.accept(), MediaType::Json);
        assert!(!request.is_multipart());
    }

    #[test]
    fn test_boundary_of() {
        assert_eq!(
            boundary_of("multipart/mixed; boundary=abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(
            boundary_of("multipart/form-data; charset=utf-8; boundary=\"q\""),
            Some("q".to_string())
        );
        assert_eq!(boundary_of("application/xml; boundary=abc"), None);
        assert_eq!(boundary_of("multipart/mixed"), None);
    }

    #[tokio::test]
    async fn test_form_data_parse() {
        let (content_type, body) = MultipartBuilder::new()
            .text_part("request_payload", "text/xml", "<tsRequest/>")
            .file_part(
                "tableau_file",
                "chunk.bin",
                "application/octet-stream",
                b"\x00\x01\x02".to_vec(),
            )
            .build();

        let form = FormData::parse(&content_type, Bytes::from(body))
            .await
            .expect("multipart");
        assert_eq!(form.parts().len(), 2);
        assert_eq!(
            form.part("request_payload").map(|part| part.data.as_ref()),
            Some(b"<tsRequest/>".as_ref())
        );
        let file = form.part("tableau_file").expect("file part");
        assert_eq!(file.file_name.as_deref(), Some("chunk.bin"));
        assert_eq!(file.data.len(), 3);
    }

    #[tokio::test]
    async fn test_form_data_without_boundary() {
        let error = FormData::parse("multipart/mixed", Bytes::new())
            .await
            .expect_err("missing boundary");
        assert_eq!(error.status, 400);
    }
}
