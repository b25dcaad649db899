pub mod actor;
pub mod app_config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod lifecycle;
pub mod middleware;
pub mod orm;
pub mod policy;
pub mod sanitize;
pub mod storage;
pub mod validation;
pub mod web;
