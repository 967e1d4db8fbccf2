use serde::{Deserialize, Serialize};

/// Response from the v1.1 media upload endpoint, only the id is needed
#[derive(Deserialize)]
pub struct MediaUploadResponse {
    pub media_id_string: String,
}

/// Request body for the v2 create tweet endpoint
#[derive(Serialize)]
pub struct TweetRequest {
    pub text: String,
    pub media: TweetMedia,
}

#[derive(Serialize)]
pub struct TweetMedia {
    pub media_ids: Vec<String>,
}
