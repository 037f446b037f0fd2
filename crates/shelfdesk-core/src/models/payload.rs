use reqwest::StatusCode;
use serde_json::Value;

/// Response body as received from the backend.
///
/// Bodies are never validated against a schema; they are decoded only so
/// they can be pretty-printed for display.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    /// Body that is not valid JSON (HTML error pages, plain text)
    Text(String),
    Empty,
}

impl Payload {
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return Payload::Empty;
        }
        match serde_json::from_str(body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(body.to_string()),
        }
    }

    /// Render for a display sink: JSON pretty-printed with two-space indent.
    pub fn to_display(&self) -> String {
        match self {
            Payload::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Payload::Text(text) => text.clone(),
            Payload::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub payload: Payload,
}

impl ApiResponse {
    pub fn is_no_content(&self) -> bool {
        self.status == StatusCode::NO_CONTENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_body_json() {
        let payload = Payload::from_body(r#"{"id": 1, "titulo": "Dom Casmurro"}"#);
        assert_eq!(payload, Payload::Json(json!({"id": 1, "titulo": "Dom Casmurro"})));
    }

    #[test]
    fn test_from_body_empty_and_whitespace() {
        assert!(Payload::from_body("").is_empty());
        assert!(Payload::from_body("  \n").is_empty());
    }

    #[test]
    fn test_from_body_non_json_kept_verbatim() {
        let payload = Payload::from_body("<h1>Server Error (500)</h1>");
        assert_eq!(payload, Payload::Text("<h1>Server Error (500)</h1>".to_string()));
        assert_eq!(payload.to_display(), "<h1>Server Error (500)</h1>");
    }

    #[test]
    fn test_to_display_pretty_prints_in_server_order() {
        let payload = Payload::from_body(r#"{"titulo":"A","autor":"B"}"#);
        assert_eq!(payload.to_display(), "{\n  \"titulo\": \"A\",\n  \"autor\": \"B\"\n}");
    }

    #[test]
    fn test_is_no_content() {
        let resp = ApiResponse { status: StatusCode::NO_CONTENT, payload: Payload::Empty };
        assert!(resp.is_no_content());
        let resp = ApiResponse { status: StatusCode::OK, payload: Payload::Empty };
        assert!(!resp.is_no_content());
    }
}
