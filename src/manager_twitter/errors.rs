use thiserror::Error;

#[derive(Error, Debug)]
#[error("error publishing post to Twitter: {0}")]
pub struct PublishError(pub String);
impl From<reqwest::Error> for PublishError {
    fn from(e: reqwest::Error) -> PublishError {
        PublishError(format!("http request error: {}", e))
    }
}
impl From<serde_json::Error> for PublishError {
    fn from(e: serde_json::Error) -> PublishError {
        PublishError(format!("json document error: {}", e))
    }
}
impl From<std::io::Error> for PublishError {
    fn from(e: std::io::Error) -> PublishError {
        PublishError(format!("image file error: {}", e))
    }
}
