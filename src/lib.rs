//! PremiosPlatzi polls: questions with dated publication and vote tallies,
//! served as HTML pages plus a small JSON admin API.

pub mod admin;
pub mod config;
pub mod csrf;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod memory;
pub mod models;
pub mod poll;
pub mod routes;
pub mod templates;

use std::sync::Arc;

use tera::Tera;

use crate::config::Settings;
use crate::poll::PollStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PollStore>,
    pub templates: Arc<Tera>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(store: Arc<dyn PollStore>, settings: Settings) -> Result<Self, tera::Error> {
        Ok(Self {
            store,
            templates: Arc::new(templates::engine()?),
            settings: Arc::new(settings),
        })
    }
}
