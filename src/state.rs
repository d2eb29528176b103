use std::sync::Arc;

use crate::{
    config::AppConfig,
    credentials::CredentialStore,
    db::{DbPool, OrmConn},
    notify::NotifyHandle,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: AppConfig,
    pub credentials: Arc<CredentialStore>,
    pub notify: NotifyHandle,
}
