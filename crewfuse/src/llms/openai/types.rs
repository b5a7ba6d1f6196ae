//! Chat completions wire format.
//!
//! Requests borrow from the caller's [`ChatRequest`](crate::chat::ChatRequest);
//! responses keep only the fields the crew reads.

use serde::{Deserialize, Serialize};

use crate::usage::Usage;

#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage<'a> {
    pub role: &'static str,
    pub content: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<WireChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireChoice {
    pub message: WireReply,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant message; the role is always `assistant` and is not kept.
#[derive(Debug, Deserialize)]
pub(crate) struct WireReply {
    #[serde(default)]
    pub content: Option<String>,
}

/// `{"error": {...}}` body of a failed call.
#[derive(Debug, Deserialize)]
pub(crate) struct WireErrorEnvelope {
    pub error: WireError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_sampling_is_omitted() {
        let request = WireRequest {
            model: "gpt-4o-mini",
            messages: vec![WireMessage {
                role: "user",
                content: Some("hi"),
            }],
            temperature: None,
            max_tokens: Some(256),
            stream: false,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "hi"}],
                "max_tokens": 256,
                "stream": false
            })
        );
    }

    #[test]
    fn null_content_and_missing_usage_are_accepted() {
        let response: WireResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();

        assert!(response.choices[0].message.content.is_none());
        assert!(response.usage.is_none());
    }
}
