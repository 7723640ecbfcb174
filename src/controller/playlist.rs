//! Playlist fetching with request supersession

use futures::future::{abortable, Aborted};

use crate::error::FetchError;
use crate::model::{Completion, RequestToken, Song};
use super::AppController;

impl AppController {
    /// Fetch the playlist for the current mood, superseding any request in flight.
    ///
    /// Before the first successful detection there is nothing to fetch and the list is
    /// cleared instead.
    pub async fn refresh_playlist(&self) {
        let mut model = self.model.lock().await;
        if model.session.is_torn_down() {
            return;
        }
        if !model.session.has_detected() {
            model.playlist.reset();
            return;
        }

        let mood = model.session.mood();
        let request = model.playlist.issue(mood);
        let (fetch, handle) = abortable(self.platform.catalog.songs_by_mood(request.mood));
        if let Some(previous) = self.fetch_abort.lock().await.replace(handle) {
            previous.abort();
        }
        drop(model);

        tracing::info!(mood = %request.mood, token = request.token.value(), "Fetching playlist");
        let controller = self.clone();
        tokio::spawn(async move {
            let outcome = match fetch.await {
                Ok(result) => result,
                Err(Aborted) => Err(FetchError::Cancelled),
            };
            controller.apply_fetch(request.token, outcome).await;
        });
    }

    /// Apply a fetch result if `token` still identifies the latest request
    pub(crate) async fn apply_fetch(&self, token: RequestToken, outcome: Result<Vec<Song>, FetchError>) {
        let mut model = self.model.lock().await;
        let completion = model.playlist.complete(token, outcome);
        match &completion {
            Completion::Stale => {
                tracing::debug!(token = token.value(), "Discarding superseded playlist response");
                return;
            }
            Completion::Cancelled => {
                tracing::debug!(token = token.value(), "Playlist request cancelled");
                return;
            }
            Completion::Loaded { count } => {
                tracing::info!(token = token.value(), count, "Playlist loaded");
            }
            Completion::Failed => {
                tracing::warn!(
                    token = token.value(),
                    error = model.playlist.error().unwrap_or_default(),
                    "Playlist fetch failed"
                );
            }
        }

        let songs = model.playlist.songs().to_vec();
        let displaced = model.playback.load(&songs);
        model.clamp_selection();
        if matches!(completion, Completion::Loaded { count } if count > 0)
            && model.session.take_auto_scroll()
        {
            model.reveal_playlist();
        }

        // Swap decks before releasing the model so a later completion cannot interleave
        let mut decks = self.decks.lock().await;
        drop(model);
        let previous = std::mem::replace(&mut *decks, self.open_decks(&songs));
        if let Some(deck) = displaced.and_then(|id| previous.get(&id)) {
            deck.media().pause();
        }
    }
}
