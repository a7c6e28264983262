use std::sync::Arc;

use nestlist_db::Database;
use nestlist_gateway::dispatcher::Dispatcher;
use nestlist_notify::Notifier;

use crate::auth::AdminAuth;
use crate::payment::PaymentSettings;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub dispatcher: Dispatcher,
    pub notifier: Notifier,
    pub auth: AdminAuth,
    pub payments: PaymentSettings,
}
