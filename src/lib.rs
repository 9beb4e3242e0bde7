// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Cardata: a personal vehicle-expense tracker.
//!
//! This crate signs a user in through Google and serves their cars,
//! fuel purchases and repairs from a relational store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::RecordStore;
use services::IdentityBroker;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn RecordStore>,
    pub identity_broker: IdentityBroker,
}
