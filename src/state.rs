use crate::service::contact_relay::ContactRelay;
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    contact_relay: Arc<ContactRelay>,
}

impl AppState {
    pub fn new(contact_relay: ContactRelay) -> Self {
        Self {
            contact_relay: Arc::new(contact_relay),
        }
    }
}

impl FromRef<AppState> for Arc<ContactRelay> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.contact_relay.clone()
    }
}
