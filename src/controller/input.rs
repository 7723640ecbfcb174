//! Key and mouse event handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

use crate::model::ActivePanel;
use crate::view::ViewLayout;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let mut model = self.model.lock().await;

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                model.set_should_quit(true);
            }
            KeyCode::Tab | KeyCode::BackTab => {
                model.cycle_panel();
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                if !model.session.can_detect() {
                    return;
                }
                drop(model);
                let controller = self.clone();
                tokio::spawn(async move {
                    // Failures land in the session message
                    let _ = controller.detect_mood().await;
                });
            }
            KeyCode::Up if model.ui.active_panel == ActivePanel::Playlist => {
                model.move_selection_up();
            }
            KeyCode::Down if model.ui.active_panel == ActivePanel::Playlist => {
                model.move_selection_down();
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let Some(song_id) = model.selected_song_id() else {
                    return;
                };
                drop(model);
                let controller = self.clone();
                tokio::spawn(async move {
                    controller.toggle_playback(&song_id).await;
                });
            }
            _ => {}
        }
    }

    /// A left press on the progress bar seeks the selected song
    pub async fn handle_mouse_event(&self, mouse: MouseEvent, layout: ViewLayout) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let Some(area) = layout.seek_area else {
            return;
        };
        let inside = mouse.row >= area.y
            && mouse.row < area.y + area.height
            && mouse.column >= area.x
            && mouse.column < area.x + area.width;
        if !inside {
            return;
        }

        let Some(song_id) = self.model.lock().await.selected_song_id() else {
            return;
        };
        let controller = self.clone();
        tokio::spawn(async move {
            controller
                .seek(
                    &song_id,
                    f64::from(mouse.column),
                    f64::from(area.x),
                    f64::from(area.width),
                )
                .await;
        });
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, KeyModifiers};
    use ratatui::layout::Rect;

    use super::*;
    use crate::controller::testing::{song, Harness};
    use crate::model::{ExpressionScores, Mood};
    use crate::platform::MediaEvent;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[tokio::test]
    async fn detect_key_runs_a_detection() {
        let harness = Harness::ready().await;
        harness
            .model
            .queue(Ok(Some(ExpressionScores::new().with(Mood::Disgusted, 0.7))));

        harness.controller.handle_key_event(press(KeyCode::Char('d'))).await;
        harness.settle(|m| m.session.has_detected()).await;

        assert_eq!(harness.snapshot().await.session.mood(), Mood::Disgusted);
    }

    #[tokio::test]
    async fn enter_toggles_the_selected_song() {
        let harness = Harness::ready().await;
        harness
            .load_songs(vec![song("1", "happy"), song("2", "happy")])
            .await;

        harness.controller.handle_key_event(press(KeyCode::Tab)).await;
        harness.controller.handle_key_event(press(KeyCode::Down)).await;
        harness.controller.handle_key_event(press(KeyCode::Enter)).await;
        harness.settle(|m| m.playback.active() == Some("2")).await;

        harness.controller.handle_key_event(press(KeyCode::Char(' '))).await;
        harness.settle(|m| m.playback.active().is_none()).await;
    }

    #[tokio::test]
    async fn click_on_progress_bar_seeks() {
        let harness = Harness::ready().await;
        harness.load_songs(vec![song("1", "sad")]).await;
        harness
            .controller
            .on_media_event("1", MediaEvent::LoadedMetadata { duration: 200.0 })
            .await;
        let layout = ViewLayout {
            seek_area: Some(Rect::new(10, 20, 100, 1)),
        };

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 35,
            row: 20,
            modifiers: KeyModifiers::NONE,
        };
        harness.controller.handle_mouse_event(click, layout).await;
        harness.settle(|m| m.playback.active() == Some("1")).await;

        assert_eq!(harness.snapshot().await.playback.progress("1").position, 50.0);
    }

    #[tokio::test]
    async fn quit_keys_set_should_quit() {
        let harness = Harness::ready().await;
        harness.controller.handle_key_event(press(KeyCode::Esc)).await;
        assert!(harness.snapshot().await.should_quit());
    }
}
