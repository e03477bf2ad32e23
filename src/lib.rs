pub mod asset;
pub mod comment;
pub mod company;
pub mod config;
pub mod creative;
pub mod error;
pub mod ledger;
pub mod repository;
pub mod service;
pub mod sled_store;
pub mod state;
pub mod telemetry;
pub mod timestamp;
pub mod utils;
