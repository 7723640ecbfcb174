//! Command line and environment configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::Url;

use crate::model::Mood;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_MODEL_URL: &str = "https://justadudewhohacks.github.io/face-api.js/models";

/// Detect your mood from the camera and get a playlist to match
#[derive(Debug, Parser)]
#[command(name = "moodtune", version, about)]
pub struct Cli {
    /// Base URL of the song catalog service
    #[arg(long, env = "MOODTUNE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: Url,

    /// Base URL the face model weights are loaded from
    #[arg(long, env = "MOODTUNE_MODEL_URL", default_value = DEFAULT_MODEL_URL)]
    pub model_url: Url,

    /// Directory of recorded face captures replayed as the camera
    #[arg(long, env = "MOODTUNE_CAPTURES", default_value = "captures")]
    pub captures: PathBuf,

    /// Directory for the rotating log files
    #[arg(long, env = "MOODTUNE_LOG_DIR", default_value = ".logs")]
    pub log_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the catalog's songs for a mood as JSON
    Songs {
        #[arg(long)]
        mood: Mood,
    },
    /// Add a track to the catalog
    Upload {
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: String,
        #[arg(long)]
        mood: Mood,
        /// Audio file to upload
        #[arg(long)]
        audio: PathBuf,
    },
}
