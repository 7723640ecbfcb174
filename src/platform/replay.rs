//! Capture replay: a camera and expression model driven by recorded face captures
//!
//! A capture directory holds one JSON file per frame, each either
//! `{"expressions": {"happy": 0.8, ...}}` or `{"expressions": null}` when no face was found.
//! The camera cycles through the files in name order; the model decodes the frame it is
//! handed. Model assets are still fetched over HTTP so initialization exercises the same
//! failure paths as a live model.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;

use crate::error::{DetectionError, InitializationError, PlaybackError};
use crate::model::ExpressionScores;
use super::http::HttpModelAssets;
use super::{Camera, ExpressionModel, Frame, FrameInfo, VideoStream};

#[derive(Debug, Deserialize)]
struct Capture {
    expressions: Option<ExpressionScores>,
}

pub struct ReplayCamera {
    dir: PathBuf,
}

impl ReplayCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

async fn list_captures(dir: &Path) -> Result<Vec<PathBuf>, InitializationError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        InitializationError::PermissionDenied(format!("{}: {e}", dir.display()))
    })?;

    let mut frames = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| InitializationError::CameraUnavailable(e.to_string()))?
    {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

impl Camera for ReplayCamera {
    fn open(&self) -> BoxFuture<'_, Result<Box<dyn VideoStream>, InitializationError>> {
        async move {
            let frames = list_captures(&self.dir).await?;
            if frames.is_empty() {
                return Err(InitializationError::CameraUnavailable(format!(
                    "no captures in {}",
                    self.dir.display()
                )));
            }
            tracing::info!(dir = %self.dir.display(), frames = frames.len(), "Capture replay opened");
            Ok(Box::new(ReplayStream::new(frames)) as Box<dyn VideoStream>)
        }
        .boxed()
    }
}

pub struct ReplayStream {
    frames: Vec<PathBuf>,
    cursor: usize,
    live: bool,
    stopped: bool,
}

impl ReplayStream {
    fn new(frames: Vec<PathBuf>) -> Self {
        Self {
            frames,
            cursor: 0,
            live: false,
            stopped: false,
        }
    }
}

impl VideoStream for ReplayStream {
    fn wait_for_metadata(&mut self) -> BoxFuture<'_, Result<FrameInfo, InitializationError>> {
        let result = if self.stopped || self.frames.is_empty() {
            Err(InitializationError::NoMetadata)
        } else {
            Ok(FrameInfo {
                width: 640,
                height: 480,
            })
        };
        async move { result }.boxed()
    }

    fn start(&mut self) -> Result<(), PlaybackError> {
        if self.stopped {
            return Err(PlaybackError::Unavailable("stream stopped".to_string()));
        }
        self.live = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.live = false;
    }

    /// Reads the next capture. Frames can be grabbed while paused, like a video element
    /// that has its first frame decoded.
    fn capture(&mut self) -> BoxFuture<'_, Option<Frame>> {
        let next = (!self.stopped && !self.frames.is_empty()).then(|| {
            let path = self.frames[self.cursor % self.frames.len()].clone();
            self.cursor = self.cursor.wrapping_add(1);
            path
        });
        async move {
            let path = next?;
            match tokio::fs::read(&path).await {
                Ok(data) => Some(Frame { data }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Unable to read capture");
                    None
                }
            }
        }
        .boxed()
    }

    fn stop_tracks(&mut self) {
        self.live = false;
        self.stopped = true;
    }
}

/// Expression model that decodes replayed captures
pub struct ReplayExpressionModel {
    assets: HttpModelAssets,
}

impl ReplayExpressionModel {
    pub fn new(assets: HttpModelAssets) -> Self {
        Self { assets }
    }
}

/// Scores carried by a capture frame, `None` when no face was recorded
pub fn decode_capture(frame: &Frame) -> Result<Option<ExpressionScores>, DetectionError> {
    let capture: Capture = serde_json::from_slice(&frame.data)
        .map_err(|e| DetectionError::Inference(e.to_string()))?;
    Ok(capture.expressions)
}

impl ExpressionModel for ReplayExpressionModel {
    fn load_assets(&self) -> BoxFuture<'_, Result<(), InitializationError>> {
        async move { self.assets.load().await.map(|_| ()) }.boxed()
    }

    fn detect<'a>(
        &'a self,
        frame: &'a Frame,
    ) -> BoxFuture<'a, Result<Option<ExpressionScores>, DetectionError>> {
        async move { decode_capture(frame) }.boxed()
    }
}
