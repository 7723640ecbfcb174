//! Playback control: at most one song plays at a time

use std::sync::Arc;

use crate::model::{seek_ratio, Activation, TrackStatus};
use crate::platform::MediaElement;
use super::AppController;

impl AppController {
    async fn media_for(&self, song_id: &str) -> Option<Arc<dyn MediaElement>> {
        self.decks
            .lock()
            .await
            .get(song_id)
            .map(|deck| deck.media().clone())
    }

    /// Start `song_id`, pausing whatever was playing first
    pub async fn play(&self, song_id: &str) {
        let activation = self.model.lock().await.playback.activate(song_id);
        let displaced = match activation {
            Activation::Started { displaced } => displaced,
            Activation::AlreadyPlaying => return,
            Activation::UnknownSong => {
                tracing::debug!(song_id, "Play requested for a song not in the list");
                return;
            }
        };

        if let Some(previous) = displaced {
            if let Some(media) = self.media_for(&previous).await {
                tracing::debug!(song_id = %previous, "Pausing displaced song");
                media.pause();
            }
        }

        let Some(media) = self.media_for(song_id).await else {
            self.model.lock().await.playback.deactivate(song_id);
            return;
        };

        tracing::info!(song_id, "Starting playback");
        match media.play().await {
            Ok(()) => {
                // Another song may have been started while this one was loading
                let still_active = self.model.lock().await.playback.active() == Some(song_id);
                if !still_active {
                    media.pause();
                }
            }
            Err(e) => {
                tracing::warn!(song_id, error = %e, "Playback failed, reverting to paused");
                self.model.lock().await.playback.deactivate(song_id);
                media.pause();
            }
        }
    }

    pub async fn pause(&self, song_id: &str) {
        let was_active = self.model.lock().await.playback.deactivate(song_id);
        if !was_active {
            return;
        }
        if let Some(media) = self.media_for(song_id).await {
            tracing::info!(song_id, "Pausing playback");
            media.pause();
        }
    }

    pub async fn toggle_playback(&self, song_id: &str) {
        let status = self.model.lock().await.playback.status(song_id);
        match status {
            TrackStatus::Playing => self.pause(song_id).await,
            TrackStatus::Paused => self.play(song_id).await,
        }
    }

    /// Seek from a pointer press on a progress bar spanning
    /// `[element_left, element_left + element_width)`. Starts the song if it was paused.
    /// Ignored while the duration is unknown.
    pub async fn seek(&self, song_id: &str, pointer_x: f64, element_left: f64, element_width: f64) {
        let ratio = seek_ratio(pointer_x, element_left, element_width);
        let (target, paused) = {
            let mut model = self.model.lock().await;
            let Some(target) = model.playback.seek_target(song_id, ratio) else {
                tracing::debug!(song_id, "Seek ignored, duration unknown");
                return;
            };
            model.playback.set_position(song_id, target);
            (target, model.playback.status(song_id) == TrackStatus::Paused)
        };

        let Some(media) = self.media_for(song_id).await else {
            return;
        };
        tracing::debug!(song_id, target, "Seeking");
        media.seek(target);

        if paused {
            self.play(song_id).await;
        }
    }
}
