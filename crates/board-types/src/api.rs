use serde::{Deserialize, Serialize};

// -- Messages --

/// Form body of `POST /submit`. A missing field is treated like an empty one.
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub content: String,
}

/// `?id=` query used by the delete and favorite endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

// -- Favorites --

/// Browsers send the id as a string, scripts tend to send a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageRef {
    Number(i64),
    Text(String),
}

impl MessageRef {
    pub fn into_raw(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub msg_id: MessageRef,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub success: bool,
}
