pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod mail;
pub mod notify;
pub mod payments;
pub mod reconcile;
