pub mod actions;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod web;

use std::sync::Arc;

use tera::Tera;

use actions::Actions;
use config::{Backend, Settings};
use events::EventSink;
use model::{ChatFlow, CompletionsClient, FlowServerClient, QaFlow};

// App state structure
pub struct AppState {
    pub tera: Tera,
    pub actions: Actions,
}

/// Wires the configured AI backend into the actions.
pub fn build_actions(settings: &Settings, events: Arc<dyn EventSink>) -> Actions {
    let (qa, chat): (Arc<dyn QaFlow>, Arc<dyn ChatFlow>) = match settings.backend {
        Backend::FlowServer => {
            let client = Arc::new(FlowServerClient::new(&settings.flow_server));
            (client.clone(), client)
        }
        Backend::Completions => {
            let client = Arc::new(CompletionsClient::new(&settings.completions));
            (client.clone(), client)
        }
    };
    Actions::new(qa, chat, events, settings.contact_delay)
}
