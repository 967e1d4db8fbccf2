pub mod errors;

use std::fs;
use std::path::Path;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distributions::Alphanumeric;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use sha1::Sha1;
use crate::config::TwitterKeys;
use crate::manager_twitter::errors::PublishError;
use crate::models::twitter::{MediaUploadResponse, TweetMedia, TweetRequest};
use crate::worker::Publisher;

const MEDIA_UPLOAD_URL: &str = "https://upload.twitter.com/1.1/media/upload.json";
const CREATE_TWEET_URL: &str = "https://api.twitter.com/2/tweets";

type HmacSha1 = Hmac<Sha1>;

/// Struct for publishing image posts to the bot's Twitter account.
///
/// Both endpoints are called with OAuth 1.0a user context authentication,
/// the media upload on the v1.1 API and the tweet creation on v2.
pub struct Twitter {
    client: Client,
    keys: TwitterKeys,
}

impl Twitter {
    /// Returns a Twitter struct ready for posting
    ///
    /// # Arguments
    ///
    /// * 'keys' - OAuth 1.0a credentials from the configuration file
    pub fn new(keys: TwitterKeys) -> Twitter {
        let client = Client::new();

        Twitter { client, keys }
    }

    /// Uploads the image through the v1.1 simple upload endpoint and returns
    /// the media id to reference from the tweet.
    ///
    /// The multipart body is excluded from the signature base string, only
    /// the oauth parameters are signed.
    ///
    /// # Arguments
    ///
    /// * 'image_path' - path to the PNG to upload
    fn upload_media(&self, image_path: &Path) -> Result<String, PublishError> {
        let bytes = fs::read(image_path)?;
        let part = Part::bytes(bytes)
            .file_name("graph.png")
            .mime_str("image/png")?;
        let form = Form::new().part("media", part);

        let auth = self.authorization("POST", MEDIA_UPLOAD_URL)?;
        let res = self.client
            .post(MEDIA_UPLOAD_URL)
            .header(AUTHORIZATION, auth)
            .multipart(form)
            .send()?;

        if !res.status().is_success() {
            return Err(PublishError(format!("media upload failed: http {}", res.status())))
        }

        let doc: MediaUploadResponse = serde_json::from_str(&res.text()?)?;

        Ok(doc.media_id_string)
    }

    /// Posts the captioned tweet referencing an uploaded media id
    ///
    /// # Arguments
    ///
    /// * 'caption' - the tweet text
    /// * 'media_id' - media id returned by the upload endpoint
    fn create_tweet(&self, caption: &str, media_id: &str) -> Result<(), PublishError> {
        let req = TweetRequest {
            text: caption.to_string(),
            media: TweetMedia { media_ids: vec![media_id.to_string()] },
        };
        let json = serde_json::to_string(&req)?;

        let auth = self.authorization("POST", CREATE_TWEET_URL)?;
        let res = self.client
            .post(CREATE_TWEET_URL)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, "application/json")
            .body(json)
            .send()?;

        if !res.status().is_success() {
            return Err(PublishError(format!("tweet creation failed: http {}", res.status())))
        }

        Ok(())
    }

    /// Builds the OAuth Authorization header for a request without signable
    /// body or query parameters
    ///
    /// # Arguments
    ///
    /// * 'method' - HTTP method of the request
    /// * 'url' - base url of the request, without query string
    fn authorization(&self, method: &str, url: &str) -> Result<String, PublishError> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = Utc::now().timestamp().to_string();

        let mut params = vec![
            ("oauth_consumer_key".to_string(), self.keys.api_key.clone()),
            ("oauth_nonce".to_string(), nonce),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), timestamp),
            ("oauth_token".to_string(), self.keys.access_token.clone()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ];

        let signature = sign(method, url, &params, &self.keys.api_secret, &self.keys.access_token_secret)?;
        params.push(("oauth_signature".to_string(), signature));

        let fields = params.iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<String>>()
            .join(", ");

        Ok(format!("OAuth {}", fields))
    }
}

impl Publisher for Twitter {
    /// Uploads the rendered chart and posts a tweet with the given caption
    /// referencing it. No retry on failure.
    ///
    /// # Arguments
    ///
    /// * 'image_path' - path to the rendered chart
    /// * 'caption' - the tweet text
    fn publish_image_post(&self, image_path: &Path, caption: &str) -> Result<(), PublishError> {
        let media_id = self.upload_media(image_path)?;
        self.create_tweet(caption, &media_id)?;

        Ok(())
    }
}

/// Computes the HMAC-SHA1 request signature as per RFC 5849.
///
/// All request parameters that take part in signing must be in 'params',
/// unencoded. Keys and values are percent encoded before sorting.
///
/// # Arguments
///
/// * 'method' - HTTP method of the request
/// * 'url' - base url of the request
/// * 'params' - oauth, query and form parameters of the request
/// * 'consumer_secret' - app consumer secret
/// * 'token_secret' - user access token secret
fn sign(
    method: &str,
    url: &str,
    params: &[(String, String)],
    consumer_secret: &str,
    token_secret: &str) -> Result<String, PublishError> {

    let mut encoded = params.iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect::<Vec<(String, String)>>();
    encoded.sort();

    let param_string = encoded.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<String>>()
        .join("&");

    let base = format!("{}&{}&{}", method, percent_encode(url), percent_encode(&param_string));
    let key = format!("{}&{}", percent_encode(consumer_secret), percent_encode(token_secret));

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| PublishError(format!("signing key error: {}", e)))?;
    mac.update(base.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Percent encodes a string as required by RFC 5849, leaving only
/// unreserved characters untouched
///
/// # Arguments
///
/// * 'value' - the string to encode
fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
