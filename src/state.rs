use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::calculator::{Calculator, CalculatorInputs};
use crate::config::Config;
use crate::store::Store;
use crate::uploads::{ObjectUrlRegistry, PreviewSlot};

/// Uploaded image references plus the compose view's preview.
#[derive(Debug)]
pub struct Media {
    pub registry: ObjectUrlRegistry,
    pub preview: PreviewSlot,
}

/// Everything the process holds in memory. Built once in `main` and handed to
/// every handler; dropped on shutdown.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<Mutex<Store>>,
    pub media: Arc<Mutex<Media>>,
    pub calculator: Arc<Mutex<Calculator>>,
}

impl AppState {
    pub fn new(config: Config, now: DateTime<Utc>) -> Self {
        let store = if config.store.seed {
            Store::seeded(now)
        } else {
            Store::new()
        };
        let media = Media {
            registry: ObjectUrlRegistry::new(config.uploads.max_bytes),
            preview: PreviewSlot::default(),
        };
        let calculator = Calculator::new(CalculatorInputs::from_config(&config.calculator));

        Self {
            config,
            store: Arc::new(Mutex::new(store)),
            media: Arc::new(Mutex::new(media)),
            calculator: Arc::new(Mutex::new(calculator)),
        }
    }
}
