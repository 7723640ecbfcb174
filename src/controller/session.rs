//! Session initialization and teardown

use crate::error::InitializationError;
use crate::platform::VideoSurface;
use super::AppController;

impl AppController {
    /// Load the face models, open the camera and bind it to the video surface.
    ///
    /// Runs at most once per controller. Any failure leaves the session in `Failed` with
    /// the error text as its message; a blocked autoplay is not a failure.
    pub async fn initialize(&self) {
        {
            let mut model = self.model.lock().await;
            if !model.session.begin_initialize() {
                tracing::debug!("Initialization already started, ignoring");
                return;
            }
        }
        tracing::info!("Initializing session");

        match self.acquire_surface().await {
            Ok(surface) => {
                let mut model = self.model.lock().await;
                if model.session.is_torn_down() {
                    tracing::info!("Session closed during initialization, releasing camera");
                    // surface drops here and stops the stream
                    return;
                }
                *self.surface.lock().await = Some(surface);
                model.session.mark_ready();
                tracing::info!("Session ready");
            }
            Err(e) => {
                tracing::error!(error = %e, "Session initialization failed");
                self.model.lock().await.session.mark_failed(e.to_string());
            }
        }
    }

    async fn acquire_surface(&self) -> Result<VideoSurface, InitializationError> {
        self.platform.model.load_assets().await?;
        tracing::debug!("Face models loaded");

        let stream = self.platform.camera.open().await?;
        let mut surface = VideoSurface::new();
        surface.attach(stream)?;

        let info = surface.wait_for_metadata().await?;
        tracing::debug!(width = info.width, height = info.height, "Camera metadata received");

        if let Err(e) = surface.autoplay() {
            tracing::debug!(error = %e, "Camera autoplay rejected, continuing");
        }
        Ok(surface)
    }

    /// Release every resource the session holds. Safe to call more than once and at any
    /// point during initialization.
    pub async fn shutdown(&self) {
        let displaced = {
            let mut model = self.model.lock().await;
            if !model.session.begin_teardown() {
                return;
            }
            model.playlist.abandon();
            model.playback.load(&[])
        };

        if let Some(handle) = self.fetch_abort.lock().await.take() {
            handle.abort();
        }

        let decks = std::mem::take(&mut *self.decks.lock().await);
        if let Some(deck) = displaced.and_then(|id| decks.get(&id)) {
            deck.media().pause();
        }
        drop(decks);

        if let Some(mut surface) = self.surface.lock().await.take() {
            surface.release();
        }
        tracing::info!("Session closed");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::sync::oneshot;

    use crate::controller::testing::{Harness, Setup};
    use crate::error::{DetectionError, InitializationError, PlaybackError};
    use crate::model::SessionState;

    #[tokio::test]
    async fn permission_denied_fails_with_message() {
        let mut setup = Setup::new();
        setup.camera.open_error = Some(InitializationError::PermissionDenied(
            "camera access refused".into(),
        ));
        let harness = setup.build();

        harness.controller.initialize().await;

        let model = harness.snapshot().await;
        assert!(matches!(model.session.state(), SessionState::Failed { .. }));
        assert!(!model.session.can_detect());
        assert_eq!(
            model.session.message(),
            Some("Camera permission denied: camera access refused")
        );
        assert_eq!(
            harness.controller.detect_mood().await,
            Err(DetectionError::NotReady)
        );
    }

    #[tokio::test]
    async fn model_failure_skips_camera() {
        let mut setup = Setup::new();
        setup.model.load_error = Some(InitializationError::ModelAssets("404".into()));
        let harness = setup.build();

        harness.controller.initialize().await;

        assert!(harness.journal.position("camera:open").is_none());
        let model = harness.snapshot().await;
        assert!(matches!(model.session.state(), SessionState::Failed { .. }));
    }

    #[tokio::test]
    async fn missing_metadata_releases_camera() {
        let mut setup = Setup::new();
        setup.camera.metadata_error = Some(InitializationError::NoMetadata);
        let harness = setup.build();

        harness.controller.initialize().await;

        assert_eq!(harness.journal.count("stream:stop"), 1);
        assert!(!harness.snapshot().await.session.is_ready());
    }

    #[tokio::test]
    async fn initialize_runs_once() {
        let harness = Harness::ready().await;
        harness.controller.initialize().await;

        assert_eq!(harness.journal.count("model:load"), 1);
        assert_eq!(harness.journal.count("camera:open"), 1);
    }

    #[tokio::test]
    async fn concurrent_initialize_opens_camera_once() {
        let setup = Setup::new();
        let (open_tx, open_rx) = oneshot::channel();
        *setup.camera.gate.lock().unwrap() = Some(open_rx);
        let harness = setup.build();

        let first = {
            let controller = harness.controller.clone();
            tokio::spawn(async move { controller.initialize().await })
        };
        harness
            .settle(|m| m.session.state() == &SessionState::Initializing)
            .await;

        // the second call arrives while the first is waiting on the camera
        harness.controller.initialize().await;
        open_tx.send(()).unwrap();
        first.await.unwrap();

        assert_eq!(harness.journal.count("model:load"), 1);
        assert_eq!(harness.journal.count("camera:open"), 1);
        assert_eq!(harness.journal.count("stream:stop"), 0);
        assert!(harness.snapshot().await.session.is_ready());
    }

    #[tokio::test]
    async fn blocked_autoplay_still_ready() {
        let mut setup = Setup::new();
        setup.camera.autoplay_error = Some(PlaybackError::AutoplayBlocked("no user gesture".into()));
        let harness = setup.build();

        harness.controller.initialize().await;

        let model = harness.snapshot().await;
        assert!(model.session.is_ready());
        assert!(model.session.can_detect());
        assert_eq!(model.session.message(), None);
    }

    #[tokio::test]
    async fn shutdown_releases_camera_once() {
        let harness = Harness::ready().await;

        harness.controller.shutdown().await;
        harness.controller.shutdown().await;

        assert_eq!(harness.journal.count("stream:pause"), 1);
        assert_eq!(harness.journal.count("stream:stop"), 1);
        assert!(!harness.snapshot().await.session.can_detect());
    }

    #[tokio::test]
    async fn shutdown_during_initialization_releases_late_stream() {
        let setup = Setup::new();
        let (open_tx, open_rx) = oneshot::channel();
        *setup.camera.gate.lock().unwrap() = Some(open_rx);
        let harness = setup.build();

        let init = {
            let controller = harness.controller.clone();
            tokio::spawn(async move { controller.initialize().await })
        };
        harness
            .settle(|m| m.session.state() == &SessionState::Initializing)
            .await;

        harness.controller.shutdown().await;
        open_tx.send(()).unwrap();
        init.await.unwrap();

        assert_eq!(harness.journal.count("camera:open"), 1);
        assert_eq!(harness.journal.count("stream:stop"), 1);
        let model = harness.snapshot().await;
        assert!(!model.session.is_ready());
        assert!(model.session.is_torn_down());
    }
}
