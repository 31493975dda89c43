//! Application state management

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use studyai_core::{AppConfig, Result};
use studyai_pipeline::StudyPipeline;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Summarization and quiz pipeline
    pub pipeline: StudyPipeline,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig, pipeline: StudyPipeline) -> Self {
        Self {
            config,
            pipeline,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Build state with the production collaborators
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let pipeline = StudyPipeline::from_config(&config)?;
        Ok(Self::new(config, pipeline))
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
