use std::sync::Arc;

use agora_core::Forum;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub forum: Forum,
}

impl AppStateInner {
    pub fn new(forum: Forum) -> AppState {
        Arc::new(Self { forum })
    }
}
