//! Media element event listeners

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::model::Song;
use crate::platform::{MediaElement, MediaEvent};
use super::AppController;

/// A song's media element together with the task listening to it.
/// Dropping the deck unsubscribes.
pub(crate) struct Deck {
    media: Arc<dyn MediaElement>,
    listener: JoinHandle<()>,
}

impl Deck {
    pub(crate) fn media(&self) -> &Arc<dyn MediaElement> {
        &self.media
    }
}

impl Drop for Deck {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl AppController {
    /// One deck per song, subscribed and preloading metadata
    pub(crate) fn open_decks(&self, songs: &[Song]) -> HashMap<String, Deck> {
        songs
            .iter()
            .map(|song| {
                let media = self.platform.media.open(song);
                let listener = self.start_media_event_listener(song.id.clone(), media.subscribe());
                media.preload();
                (song.id.clone(), Deck { media, listener })
            })
            .collect()
    }

    fn start_media_event_listener(
        &self,
        song_id: String,
        mut events: broadcast::Receiver<MediaEvent>,
    ) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => controller.on_media_event(&song_id, event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::trace!(song_id = %song_id, skipped, "Media events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    pub(crate) async fn on_media_event(&self, song_id: &str, event: MediaEvent) {
        let mut model = self.model.lock().await;
        if !model.playback.contains(song_id) {
            return;
        }

        match event {
            MediaEvent::LoadedMetadata { duration } => {
                tracing::debug!(song_id, duration, "Media metadata loaded");
                model.playback.set_duration(song_id, duration);
            }
            MediaEvent::TimeUpdate { position } => {
                tracing::trace!(song_id, position, "Media time update");
                model.playback.set_position(song_id, position);
            }
            MediaEvent::Ended => {
                tracing::debug!(song_id, "Track ended");
                model.playback.end_of_track(song_id);
            }
        }
    }
}
