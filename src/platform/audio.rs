//! Audio output backed by rodio
//!
//! The output stream is not `Send`, so it lives on a dedicated thread for the lifetime of
//! `AudioOutput`; media elements only hold the stream handle. Without an output device the
//! backend still downloads and measures tracks, but every play fails with `Unavailable`.

use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tokio::sync::{broadcast, OnceCell};

use crate::error::PlaybackError;
use crate::model::Song;
use super::{MediaBackend, MediaElement, MediaEvent};

const TIME_UPDATE_INTERVAL: Duration = Duration::from_millis(250);
const EVENT_CAPACITY: usize = 32;

/// Keeps the output device open. Dropping it closes the device.
pub struct AudioOutput {
    shutdown: Option<std::sync::mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl AudioOutput {
    pub fn open() -> Result<(Self, OutputStreamHandle)> {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = std::sync::mpsc::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((_stream, handle)) => {
                    let _ = ready_tx.send(Ok(handle));
                    // Park until the owner goes away; the stream closes when this returns
                    let _ = shutdown_rx.recv();
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })
            .context("Unable to spawn audio thread")?;

        let handle = ready_rx
            .recv()
            .context("Audio thread exited during startup")?
            .map_err(|e| anyhow!("No audio output device: {e}"))?;

        tracing::info!("Audio output opened");
        Ok((
            Self {
                shutdown: Some(shutdown_tx),
                thread: Some(thread),
            },
            handle,
        ))
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        drop(self.shutdown.take());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Creates one `RodioMedia` per song
pub struct RodioBackend {
    client: reqwest::Client,
    handle: Option<OutputStreamHandle>,
}

impl RodioBackend {
    /// `handle` is `None` when no output device could be opened
    pub fn new(client: reqwest::Client, handle: Option<OutputStreamHandle>) -> Self {
        Self { client, handle }
    }

    fn element(&self, song: &Song) -> RodioMedia {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        RodioMedia {
            inner: Arc::new(Inner {
                url: song.audio_url.clone(),
                client: self.client.clone(),
                handle: self.handle.clone(),
                audio: OnceCell::new(),
                slot: Mutex::new(Slot::default()),
                events,
            }),
        }
    }
}

impl MediaBackend for RodioBackend {
    fn open(&self, song: &Song) -> Arc<dyn MediaElement> {
        Arc::new(self.element(song))
    }
}

#[derive(Default)]
struct Slot {
    sink: Option<Arc<Sink>>,
    duration: Option<f64>,
    pending_seek: Option<f64>,
    ticker: Option<tokio::task::JoinHandle<()>>,
    preload: Option<tokio::task::JoinHandle<()>>,
}

struct Inner {
    url: String,
    client: reqwest::Client,
    handle: Option<OutputStreamHandle>,
    audio: OnceCell<Arc<[u8]>>,
    slot: Mutex<Slot>,
    events: broadcast::Sender<MediaEvent>,
}

impl Inner {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: MediaEvent) {
        let _ = self.events.send(event);
    }

    async fn audio(&self) -> Result<Arc<[u8]>, PlaybackError> {
        self.audio
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .get(&self.url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| PlaybackError::Unavailable(e.to_string()))?;
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| PlaybackError::Unavailable(e.to_string()))?;
                tracing::debug!(url = %self.url, bytes = bytes.len(), "Audio downloaded");
                Ok::<_, PlaybackError>(Arc::from(bytes.as_ref()))
            })
            .await
            .cloned()
    }

    fn decode(audio: Arc<[u8]>) -> Result<Decoder<Cursor<Arc<[u8]>>>, PlaybackError> {
        Decoder::new(Cursor::new(audio)).map_err(|e| PlaybackError::Decode(e.to_string()))
    }

    /// Measure the track off the runtime, then record the duration once and announce it
    async fn load_duration(&self, audio: Arc<[u8]>) -> Result<(), PlaybackError> {
        if self.slot().duration.is_some() {
            return Ok(());
        }
        let duration = tokio::task::spawn_blocking(move || Self::decode(audio).map(duration_of))
            .await
            .map_err(|e| PlaybackError::Decode(e.to_string()))??;

        let mut slot = self.slot();
        if slot.duration.is_none() {
            slot.duration = Some(duration);
            drop(slot);
            tracing::debug!(url = %self.url, duration, "Track duration known");
            self.emit(MediaEvent::LoadedMetadata { duration });
        }
        Ok(())
    }

    async fn preload(&self) -> Result<(), PlaybackError> {
        let audio = self.audio().await?;
        self.load_duration(audio).await
    }
}

/// Length of a source in seconds. Formats without a length in their headers (plain MP3
/// streams, for one) are decoded to the end and measured by sample count.
fn duration_of<S: Source>(source: S) -> f64
where
    S::Item: rodio::Sample,
{
    if let Some(total) = source.total_duration() {
        return total.as_secs_f64();
    }
    let channels = f64::from(source.channels().max(1));
    let rate = f64::from(source.sample_rate().max(1));
    source.count() as f64 / (channels * rate)
}

/// Reports position while playing and detects end of track
async fn run_ticker(inner: Weak<Inner>) {
    let mut interval = tokio::time::interval(TIME_UPDATE_INTERVAL);
    loop {
        interval.tick().await;
        let Some(inner) = inner.upgrade() else { break };

        let mut slot = inner.slot();
        let Some(sink) = slot.sink.clone() else {
            slot.ticker = None;
            break;
        };
        if sink.empty() {
            slot.sink = None;
            slot.ticker = None;
            drop(slot);
            inner.emit(MediaEvent::Ended);
            break;
        }
        drop(slot);
        if !sink.is_paused() {
            inner.emit(MediaEvent::TimeUpdate {
                position: sink.get_pos().as_secs_f64(),
            });
        }
    }
}

pub struct RodioMedia {
    inner: Arc<Inner>,
}

impl MediaElement for RodioMedia {
    fn play(&self) -> BoxFuture<'_, Result<(), PlaybackError>> {
        async move {
            let inner = &self.inner;
            let handle = inner
                .handle
                .as_ref()
                .ok_or_else(|| PlaybackError::Unavailable("no audio output device".to_string()))?;
            let audio = inner.audio().await?;
            inner.load_duration(audio.clone()).await?;

            let mut slot = inner.slot();
            let sink = match slot.sink.clone() {
                Some(sink) => sink,
                None => {
                    let source = Inner::decode(audio)?;
                    let sink = Sink::try_new(handle)
                        .map_err(|e| PlaybackError::Unavailable(e.to_string()))?;
                    sink.pause();
                    sink.append(source);
                    if let Some(position) = slot.pending_seek.take() {
                        if let Err(e) = sink.try_seek(Duration::from_secs_f64(position.max(0.0))) {
                            tracing::warn!(error = %e, "Seek before start failed");
                        }
                    }
                    let sink = Arc::new(sink);
                    slot.sink = Some(sink.clone());
                    sink
                }
            };

            sink.play();
            if slot.ticker.is_none() {
                slot.ticker = Some(tokio::spawn(run_ticker(Arc::downgrade(inner))));
            }
            Ok(())
        }
        .boxed()
    }

    fn pause(&self) {
        if let Some(sink) = &self.inner.slot().sink {
            sink.pause();
        }
    }

    fn seek(&self, position: f64) {
        let mut slot = self.inner.slot();
        match &slot.sink {
            Some(sink) => {
                if let Err(e) = sink.try_seek(Duration::from_secs_f64(position.max(0.0))) {
                    tracing::warn!(error = %e, position, "Seek failed");
                    return;
                }
            }
            None => slot.pending_seek = Some(position),
        }
        drop(slot);
        self.inner.emit(MediaEvent::TimeUpdate { position });
    }

    fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.inner.events.subscribe()
    }

    fn preload(&self) {
        let mut slot = self.inner.slot();
        if slot.preload.is_some() || slot.duration.is_some() {
            return;
        }
        let inner = self.inner.clone();
        slot.preload = Some(tokio::spawn(async move {
            if let Err(e) = inner.preload().await {
                tracing::debug!(url = %inner.url, error = %e, "Metadata preload failed");
            }
        }));
    }
}

impl Drop for RodioMedia {
    fn drop(&mut self) {
        let mut slot = self.inner.slot();
        if let Some(sink) = slot.sink.take() {
            sink.stop();
        }
        if let Some(ticker) = slot.ticker.take() {
            ticker.abort();
        }
        // the preload task holds `inner`; aborting it drops the download
        if let Some(preload) = slot.preload.take() {
            preload.abort();
        }
    }
}
