//! Multipart body builder for publish and upload requests.

use uuid::Uuid;

#[derive(Debug, Clone)]
struct Part {
    name: String,
    file_name: Option<String>,
    content_type: String,
    data: Vec<u8>,
}

/// Builds a `multipart/mixed` body in the layout the publish endpoints expect.
#[derive(Debug, Clone)]
pub struct MultipartBuilder {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for MultipartBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self {
            boundary: Uuid::new_v4().simple().to_string(),
            parts: Vec::new(),
        }
    }

    pub fn text_part(mut self, name: &str, content_type: &str, text: &str) -> Self {
        self.parts.push(Part {
            name: name.to_string(),
            file_name: None,
            content_type: content_type.to_string(),
            data: text.as_bytes().to_vec(),
        });
        self
    }

    pub fn file_part(
        mut self,
        name: &str,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(Part {
            name: name.to_string(),
            file_name: Some(file_name.to_string()),
            content_type: content_type.to_string(),
            data,
        });
        self
    }

    /// Returns the `Content-Type` header value and the encoded body.
    pub fn build(self) -> (String, Vec<u8>) {
        let mut body = Vec::new();
        for part in &self.parts {
            body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            let disposition = match &part.file_name {
                Some(file_name) => format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, file_name
                ),
                None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
            body.extend_from_slice(&part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        (
            format!("multipart/mixed; boundary={}", self.boundary),
            body,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_layout() {
        let (content_type, body) = MultipartBuilder::new()
            .text_part("request_payload", "text/xml", "<tsRequest/>")
            .build();
        let boundary = content_type
            .strip_prefix("multipart/mixed; boundary=")
            .expect("boundary");
        let text = String::from_utf8(body).expect("utf-8");

        assert!(text.starts_with(&format!("--{}\r\n", boundary)));
        assert!(text.contains("name=\"request_payload\""));
        assert!(text.ends_with(&format!("--{}--\r\n", boundary)));
    }
}
