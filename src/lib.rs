// Shared infrastructure
pub mod config;
pub mod error;
pub mod storage;
pub mod telemetry;

// Client state
pub mod auth;
pub mod session;

// Backend access
pub mod api;
pub mod realtime;
pub mod reserves;

// Portal flows
pub mod onboarding;

// Supporting modules
pub mod tasks;
