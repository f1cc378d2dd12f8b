use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{MessagingService, SessionProvider};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub messaging: Arc<dyn MessagingService>,
    pub session: Arc<dyn SessionProvider>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        messaging: Arc<dyn MessagingService>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            config,
            messaging,
            session,
        }
    }
}
