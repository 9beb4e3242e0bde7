// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod fill_up;
pub mod identity;
pub mod repair;
pub mod station;
pub mod vehicle;

pub use fill_up::FuelPurchase;
pub use identity::Identity;
pub use repair::Repair;
pub use station::ServiceStation;
pub use vehicle::Vehicle;
