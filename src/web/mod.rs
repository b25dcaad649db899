pub mod account;
pub mod admin;
pub mod error;
pub mod polls;

use crate::storage::PollStore;
use actix_web::web::Data;
use std::sync::Arc;

/// Shape in which the poll store is registered as app data.
pub type StoreData = Data<Arc<dyn PollStore>>;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    account::configure(conf);
    admin::configure(conf);
    polls::configure(conf);
}
