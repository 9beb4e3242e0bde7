// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod google;
pub mod identity;

pub use google::{GoogleEndpoints, GoogleProvider};
pub use identity::{
    AuthError, EstablishedSession, IdentityBroker, IdentityProvider, LoginAttempts,
    ProviderIdentity,
};
