use crate::{
    config::Config,
    services::{email::EmailService, face::FaceService},
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub email: EmailService,
    pub face: FaceService,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let config = Arc::new(config);
        let email = EmailService::new(Arc::clone(&config));
        let face = FaceService::new(db.clone(), Arc::clone(&config));
        Self {
            db,
            config,
            email,
            face,
        }
    }
}
