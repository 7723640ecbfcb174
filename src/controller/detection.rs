//! On-demand mood detection

use crate::error::DetectionError;
use crate::model::{DetectionOutcome, DetectionResult, Mood};
use super::AppController;

impl AppController {
    /// Run one detection against the current camera frame.
    ///
    /// Rejected with `NotReady` or `Busy` when the trigger is disabled; those leave the
    /// session untouched. Every other failure is recorded as the inline message. A new
    /// mood triggers a playlist refresh.
    pub async fn detect_mood(&self) -> Result<Mood, DetectionError> {
        self.model.lock().await.session.begin_detection()?;
        tracing::debug!("Detection started");

        let result = self.run_detection().await;

        let outcome = {
            let mut model = self.model.lock().await;
            model.session.finish_detection();
            if model.session.is_torn_down() {
                return result.map(|detection| detection.mood);
            }
            match &result {
                Ok(detection) => Some(model.session.record_detection(detection.mood)),
                Err(e) => {
                    if e.is_user_visible() {
                        model.session.record_detection_error(e);
                    }
                    None
                }
            }
        };

        match &result {
            Ok(detection) => {
                tracing::info!(mood = %detection.mood, scores = ?detection.scores, "Mood detected")
            }
            Err(e) => tracing::warn!(error = %e, "Detection failed"),
        }

        if let Some(DetectionOutcome::MoodChanged(_)) = outcome {
            self.refresh_playlist().await;
        }
        result.map(|detection| detection.mood)
    }

    async fn run_detection(&self) -> Result<DetectionResult, DetectionError> {
        let frame = {
            let mut surface = self.surface.lock().await;
            match surface.as_mut() {
                Some(surface) => surface.capture().await,
                None => None,
            }
        }
        .ok_or(DetectionError::NoFrame)?;

        let scores = self
            .platform
            .model
            .detect(&frame)
            .await?
            .ok_or(DetectionError::NoFace)?;
        Ok(DetectionResult::from(scores))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::sync::oneshot;

    use crate::controller::testing::{song, Harness};
    use crate::error::DetectionError;
    use crate::model::{ExpressionScores, Mood};

    #[tokio::test]
    async fn neutral_face_loads_neutral_playlist() {
        let harness = Harness::ready().await;
        let reply = harness.catalog.expect(Mood::Neutral);
        harness.model.queue(Ok(Some(
            ExpressionScores::new()
                .with(Mood::Neutral, 0.91)
                .with(Mood::Happy, 0.05)
                .with(Mood::Sad, 0.01),
        )));

        assert_eq!(harness.controller.detect_mood().await, Ok(Mood::Neutral));
        reply
            .send(Ok(vec![song("a", "neutral"), song("b", "neutral")]))
            .unwrap();
        harness.settle(|m| m.playlist.songs().len() == 2).await;

        let model = harness.snapshot().await;
        assert_eq!(model.session.mood(), Mood::Neutral);
        assert!(model.session.has_detected());
        assert_eq!(model.playlist.songs()[0].id, "a");
        assert_eq!(*harness.catalog.requests.lock().unwrap(), vec![Mood::Neutral]);
    }

    #[tokio::test]
    async fn no_face_keeps_previous_mood() {
        let harness = Harness::ready().await;
        harness
            .model
            .queue(Ok(Some(ExpressionScores::new().with(Mood::Happy, 0.8))));
        harness.controller.detect_mood().await.unwrap();

        harness.model.queue(Ok(None));
        assert_eq!(
            harness.controller.detect_mood().await,
            Err(DetectionError::NoFace)
        );

        let model = harness.snapshot().await;
        assert_eq!(model.session.mood(), Mood::Happy);
        assert_eq!(model.session.message(), Some("No face detected"));
        assert!(model.session.can_detect());
        assert_eq!(harness.catalog.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_mood_does_not_refetch() {
        let harness = Harness::ready().await;
        for _ in 0..2 {
            harness
                .model
                .queue(Ok(Some(ExpressionScores::new().with(Mood::Sad, 0.7))));
            harness.controller.detect_mood().await.unwrap();
        }
        assert_eq!(*harness.catalog.requests.lock().unwrap(), vec![Mood::Sad]);
    }

    #[tokio::test]
    async fn overlapping_trigger_is_rejected_quietly() {
        let harness = Harness::ready().await;
        let (release, gate) = oneshot::channel();
        *harness.model.gate.lock().unwrap() = Some(gate);
        harness
            .model
            .queue(Ok(Some(ExpressionScores::new().with(Mood::Angry, 0.6))));

        let first = {
            let controller = harness.controller.clone();
            tokio::spawn(async move { controller.detect_mood().await })
        };
        harness.settle(|m| m.session.is_detecting()).await;

        assert_eq!(
            harness.controller.detect_mood().await,
            Err(DetectionError::Busy)
        );
        assert_eq!(harness.snapshot().await.session.message(), None);

        release.send(()).unwrap();
        assert_eq!(first.await.unwrap(), Ok(Mood::Angry));
        assert!(!harness.snapshot().await.session.is_detecting());
    }

    #[tokio::test]
    async fn inference_failure_is_recoverable() {
        let harness = Harness::ready().await;
        harness
            .model
            .queue(Err(DetectionError::Inference("bad frame".into())));

        assert!(harness.controller.detect_mood().await.is_err());

        let model = harness.snapshot().await;
        assert!(model.session.can_detect());
        assert!(!model.session.has_detected());
        assert_eq!(model.session.message(), Some("Mood detection failed: bad frame"));
    }
}
