//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services.
//!
//! Handlers here only extract the caller, hand the request DTO to a service and
//! translate the outcome into a status code. No business rule lives in this
//! layer.
//!
//! ## Supported Operations
//!
//! - **GET /api/profiles**: list profiles split into active and inactive
//! - **PUT /api/profiles**: create or update a profile
//! - **POST /api/profiles/:profile_id/activate**: switch the active profile
//! - **DELETE /api/profiles/:profile_id**: delete with cascade
//! - **POST /api/sync/health**: record a device sync health report
//! - **GET /api/sync/status**: ask whether a device needs to sync
//! - **POST /api/notifications/logs**: record a push delivery

pub mod rest;

pub use rest::*;
