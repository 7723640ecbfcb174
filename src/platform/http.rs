//! HTTP adapters: catalog lookup, track ingestion and model asset download

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{multipart, Client, Url};
use serde_json::Value;

use crate::error::{FetchError, InitializationError};
use crate::model::{Mood, Song};
use super::Catalog;

/// Weight manifests for the tiny face detector and the expression network
pub const MODEL_MANIFESTS: [&str; 2] = [
    "tiny_face_detector_model-weights_manifest.json",
    "face_expression_model-weights_manifest.json",
];

#[derive(Debug, thiserror::Error)]
#[error("'{0}' cannot be used as a base URL")]
pub struct BaseUrlError(String);

/// Join a path onto a base URL without dropping the base's own path segments
fn endpoint(base: &Url, path: &str) -> Result<Url, BaseUrlError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| BaseUrlError(base.to_string()))?
        .pop_if_empty()
        .push(path);
    Ok(url)
}

/// Client for the song catalog service
#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base: Url,
}

impl HttpCatalog {
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    pub async fn fetch_songs(&self, mood: Mood) -> Result<Vec<Song>, FetchError> {
        let url = endpoint(&self.base, "songs").map_err(|e| FetchError::Network(e.to_string()))?;
        crate::log_api_request!("songs", mood = %mood);

        let response = self
            .client
            .get(url)
            .query(&[("mood", mood.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(operation = "songs", status = status.as_u16(), "API request failed");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        let songs = songs_from_json(value);
        tracing::info!(operation = "songs", mood = %mood, count = songs.len(), "API request successful");
        Ok(songs)
    }

    /// Upload a new track to the catalog
    pub async fn upload(&self, track: NewTrack) -> Result<()> {
        let url = endpoint(&self.base, "create")?;
        let file_name = track
            .audio
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        let bytes = tokio::fs::read(&track.audio)
            .await
            .with_context(|| format!("Unable to read {}", track.audio.display()))?;

        let track_title = track.title.clone();
        let form = multipart::Form::new()
            .text("title", track.title)
            .text("artist", track.artist)
            .text("mood", track.mood.as_str().to_string())
            .part("audio", multipart::Part::bytes(bytes).file_name(file_name));

        crate::log_api_request!("create", title = %track_title);
        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!("Upload failed with status {}", status.as_u16());
        }
        tracing::info!(operation = "create", "API request successful");
        Ok(())
    }
}

impl Catalog for HttpCatalog {
    fn songs_by_mood(&self, mood: Mood) -> BoxFuture<'static, Result<Vec<Song>, FetchError>> {
        let catalog = self.clone();
        async move { catalog.fetch_songs(mood).await }.boxed()
    }
}

/// Song list from a catalog response body. Anything but an array is an empty list and
/// elements that are not songs are skipped.
pub fn songs_from_json(value: Value) -> Vec<Song> {
    let Value::Array(items) = value else {
        tracing::warn!("Catalog returned a non-array body, treating as empty");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Song>(item) {
            Ok(song) => Some(song),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed catalog entry");
                None
            }
        })
        .collect()
}

/// A track for the ingestion endpoint
#[derive(Clone, Debug)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub mood: Mood,
    pub audio: PathBuf,
}

/// Downloads the face model weight manifests
#[derive(Clone)]
pub struct HttpModelAssets {
    client: Client,
    base: Url,
}

impl HttpModelAssets {
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    async fn fetch(&self, name: &str) -> Result<Vec<u8>, InitializationError> {
        let url = endpoint(&self.base, name)
            .map_err(|e| InitializationError::ModelAssets(e.to_string()))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InitializationError::ModelAssets(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(InitializationError::ModelAssets(format!(
                "{name} returned status {}",
                status.as_u16()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| InitializationError::ModelAssets(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Fetch both manifests concurrently; either failing fails the load
    pub async fn load(&self) -> Result<usize, InitializationError> {
        let [detector, expressions] = MODEL_MANIFESTS;
        let (detector, expressions) =
            futures::try_join!(self.fetch(detector), self.fetch(expressions))?;
        let total = detector.len() + expressions.len();
        tracing::info!(bytes = total, base = %self.base, "Face model assets loaded");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog(server: &MockServer) -> HttpCatalog {
        HttpCatalog::new(Client::new(), Url::parse(&server.uri()).unwrap())
    }

    #[tokio::test]
    async fn fetches_songs_in_server_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .and(query_param("mood", "happy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "b", "title": "Second", "artist": "B", "mood": "happy", "audioUrl": "http://a/b.mp3"},
                {"_id": "a", "title": "First", "artist": "A", "mood": "happy", "audioUrl": "http://a/a.mp3"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let songs = catalog(&server).fetch_songs(Mood::Happy).await.unwrap();
        let ids: Vec<_> = songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(songs[1].audio_url, "http://a/a.mp3");
    }

    #[tokio::test]
    async fn non_array_body_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"songs": []})))
            .mount(&server)
            .await;

        let songs = catalog(&server).fetch_songs(Mood::Sad).await.unwrap();
        assert!(songs.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = catalog(&server).fetch_songs(Mood::Angry).await.unwrap_err();
        assert_eq!(err, FetchError::Status(503));
        assert_eq!(err.to_string(), "Request failed with status 503");
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = catalog(&server).fetch_songs(Mood::Angry).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn base_path_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/songs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/api/", server.uri())).unwrap();
        let songs = HttpCatalog::new(Client::new(), base)
            .fetch_songs(Mood::Neutral)
            .await
            .unwrap();
        assert!(songs.is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let songs = songs_from_json(json!([
            {"_id": "1", "title": "Ok", "artist": "A", "mood": "sad", "audioUrl": "u"},
            {"title": "missing id"},
            42
        ]));
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id, "1");
    }

    #[tokio::test]
    async fn upload_posts_multipart_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("tune.mp3");
        std::fs::write(&audio, b"ID3fake").unwrap();

        catalog(&server)
            .upload(NewTrack {
                title: "Tune".into(),
                artist: "Band".into(),
                mood: Mood::Happy,
                audio,
            })
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"title\""));
        assert!(body.contains("Tune"));
        assert!(body.contains("name=\"audio\"; filename=\"tune.mp3\""));
        assert!(body.contains("happy"));
    }

    #[tokio::test]
    async fn upload_failure_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create"))
            .respond_with(ResponseTemplate::new(413))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("big.mp3");
        std::fs::write(&audio, b"data").unwrap();

        let err = catalog(&server)
            .upload(NewTrack {
                title: "Big".into(),
                artist: "Band".into(),
                mood: Mood::Sad,
                audio,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Upload failed with status 413");
    }

    #[tokio::test]
    async fn model_assets_need_both_manifests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/models/{}", MODEL_MANIFESTS[0])))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let assets = HttpModelAssets::new(
            Client::new(),
            Url::parse(&format!("{}/models", server.uri())).unwrap(),
        );
        let err = assets.load().await.unwrap_err();
        assert!(matches!(err, InitializationError::ModelAssets(_)));

        Mock::given(method("GET"))
            .and(path(format!("/models/{}", MODEL_MANIFESTS[1])))
            .respond_with(ResponseTemplate::new(200).set_body_string("[{}]"))
            .mount(&server)
            .await;
        assert_eq!(assets.load().await.unwrap(), 6);
    }
}
