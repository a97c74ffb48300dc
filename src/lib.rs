// nodedeck - dashboard client for a distributed chunked storage cluster
// Library exports

// Core modules
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod files;
pub mod nodes;
pub mod session;
