//! Platform seams - everything the session controller talks to but does not own
//!
//! - `http`: catalog lookup, track ingestion and model asset download over HTTP
//! - `replay`: capture-replay camera and expression model
//! - `audio`: rodio-backed media elements
//!
//! The controller only sees the traits below, so tests swap in in-memory fakes.

pub mod audio;
pub mod http;
pub mod replay;

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::broadcast;

use crate::error::{DetectionError, FetchError, InitializationError, PlaybackError};
use crate::model::{ExpressionScores, Mood, Song};

/// One captured camera frame, opaque to the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub data: Vec<u8>,
}

/// Initial frame metadata reported by a stream
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
}

/// Face detector plus expression classifier
pub trait ExpressionModel: Send + Sync {
    fn load_assets(&self) -> BoxFuture<'_, Result<(), InitializationError>>;

    /// `Ok(None)` when no face is present in the frame
    fn detect<'a>(
        &'a self,
        frame: &'a Frame,
    ) -> BoxFuture<'a, Result<Option<ExpressionScores>, DetectionError>>;
}

/// Source of camera streams; opening one is the permission prompt
pub trait Camera: Send + Sync {
    fn open(&self) -> BoxFuture<'_, Result<Box<dyn VideoStream>, InitializationError>>;
}

/// A live camera stream made of one or more tracks
pub trait VideoStream: Send {
    fn wait_for_metadata(&mut self) -> BoxFuture<'_, Result<FrameInfo, InitializationError>>;
    fn start(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    /// Grab the current frame; `None` when the stream has nothing to show
    fn capture(&mut self) -> BoxFuture<'_, Option<Frame>>;
    fn stop_tracks(&mut self);
}

/// Catalog service lookup
pub trait Catalog: Send + Sync {
    fn songs_by_mood(&self, mood: Mood) -> BoxFuture<'static, Result<Vec<Song>, FetchError>>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MediaEvent {
    LoadedMetadata { duration: f64 },
    TimeUpdate { position: f64 },
    Ended,
}

/// A playable audio source for one song
pub trait MediaElement: Send + Sync {
    fn play(&self) -> BoxFuture<'_, Result<(), PlaybackError>>;
    fn pause(&self);
    fn seek(&self, position: f64);
    fn subscribe(&self) -> broadcast::Receiver<MediaEvent>;

    /// Start fetching metadata so the duration is known before the first play
    fn preload(&self) {}
}

pub trait MediaBackend: Send + Sync {
    fn open(&self, song: &Song) -> Arc<dyn MediaElement>;
}

/// The full set of collaborators a session needs
#[derive(Clone)]
pub struct Platform {
    pub model: Arc<dyn ExpressionModel>,
    pub camera: Arc<dyn Camera>,
    pub catalog: Arc<dyn Catalog>,
    pub media: Arc<dyn MediaBackend>,
}

/// Video sink a camera stream is bound to.
///
/// Owning a `VideoSurface` with an attached stream is owning the camera: dropping it pauses
/// output, stops every track and detaches the stream.
#[derive(Default)]
pub struct VideoSurface {
    stream: Option<Box<dyn VideoStream>>,
    info: Option<FrameInfo>,
    playing: bool,
}

impl VideoSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a stream to this sink. A stream that cannot be bound is stopped before the
    /// error is returned.
    pub fn attach(&mut self, mut stream: Box<dyn VideoStream>) -> Result<(), InitializationError> {
        if self.stream.is_some() {
            stream.pause();
            stream.stop_tracks();
            return Err(InitializationError::StreamBinding(
                "video sink already has a stream".to_string(),
            ));
        }
        self.stream = Some(stream);
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn info(&self) -> Option<FrameInfo> {
        self.info
    }

    pub async fn wait_for_metadata(&mut self) -> Result<FrameInfo, InitializationError> {
        if let Some(info) = self.info {
            return Ok(info);
        }
        let stream = self.stream.as_mut().ok_or_else(|| {
            InitializationError::StreamBinding("no stream attached".to_string())
        })?;
        let info = stream.wait_for_metadata().await?;
        self.info = Some(info);
        Ok(info)
    }

    pub fn autoplay(&mut self) -> Result<(), PlaybackError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| PlaybackError::Unavailable("no stream attached".to_string()))?;
        stream.start()?;
        self.playing = true;
        Ok(())
    }

    pub async fn capture(&mut self) -> Option<Frame> {
        self.stream.as_mut()?.capture().await
    }

    /// Pause, stop every track, detach. Returns false if nothing was attached.
    pub fn release(&mut self) -> bool {
        let Some(mut stream) = self.stream.take() else {
            return false;
        };
        stream.pause();
        stream.stop_tracks();
        self.playing = false;
        self.info = None;
        tracing::debug!("Camera stream released");
        true
    }
}

impl Drop for VideoSurface {
    fn drop(&mut self) {
        self.release();
    }
}
