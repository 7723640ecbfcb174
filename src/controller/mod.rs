//! Controller module - Session logic and event handling
//!
//! This module contains the session controller that drives the four asynchronous stages
//! and coordinates between the model, the platform and the view.
//! It is organized into submodules by responsibility:
//!
//! - `session`: Initialization (models + camera) and teardown
//! - `detection`: On-demand mood detection
//! - `playlist`: Race-safe playlist fetching
//! - `playback`: Exclusive playback, seeking
//! - `media_events`: Media element event listeners
//! - `input`: Key and mouse event handling

mod session;
mod detection;
mod playlist;
mod playback;
mod media_events;
mod input;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::AbortHandle;
use tokio::sync::Mutex;

use crate::model::AppModel;
use crate::platform::{Platform, VideoSurface};

pub(crate) use media_events::Deck;

/// Lock order: `model` may be held while taking `surface`, `fetch_abort` or `decks`,
/// never the other way round.
#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    platform: Platform,
    surface: Arc<Mutex<Option<VideoSurface>>>,
    fetch_abort: Arc<Mutex<Option<AbortHandle>>>,
    decks: Arc<Mutex<HashMap<String, Deck>>>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, platform: Platform) -> Self {
        Self {
            model,
            platform,
            surface: Arc::new(Mutex::new(None)),
            fetch_abort: Arc::new(Mutex::new(None)),
            decks: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
