// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod config;
pub mod errors;
pub mod api;
pub mod engine;
pub mod server;
pub mod events;
pub mod persistence;
pub mod recovery;
pub mod telemetry;
