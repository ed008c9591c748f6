use serde_json::{json, Value};

/// Body of a successful upstream response.
///
/// A body that does not decode as JSON is kept as text instead of failing the
/// call, so HTML error pages and empty bodies never crash the proxy.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Parsed(Value),
    Raw(String),
}

impl Payload {
    /// Decode `body` as JSON, ignoring a leading byte-order mark.
    pub fn from_body(body: &str) -> Self {
        let json = body.strip_prefix('\u{feff}').unwrap_or(body);
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::Parsed(value),
            Err(_) => Self::Raw(body.to_owned()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// `{data: json}` for decoded bodies, `{content: text}` otherwise.
    pub fn into_data_envelope(self) -> Value {
        match self {
            Self::Parsed(value) => json!({ "data": value }),
            Self::Raw(text) => json!({ "content": text }),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_bodies_are_parsed() {
        let payload = Payload::from_body(r#"{"features": []}"#);
        assert_eq!(payload, Payload::Parsed(json!({"features": []})));
        assert_eq!(
            payload.into_data_envelope(),
            json!({"data": {"features": []}})
        );
    }

    #[test]
    fn html_and_empty_bodies_degrade_to_text() {
        let html = Payload::from_body("<html>maintenance</html>");
        assert!(matches!(html, Payload::Raw(_)));
        assert_eq!(
            html.into_data_envelope(),
            json!({"content": "<html>maintenance</html>"})
        );

        assert_eq!(Payload::from_body(""), Payload::Raw(String::new()));
    }

    #[test]
    fn byte_order_mark_does_not_block_json_decoding() {
        let payload = Payload::from_body("\u{feff}{\"features\": []}");
        assert_eq!(payload, Payload::Parsed(json!({"features": []})));
    }
}
