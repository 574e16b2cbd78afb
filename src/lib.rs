//! Mindshift - Guided-Session Protocol Engine
//!
//! This crate implements the protocol state machine behind guided,
//! multi-step transformation sessions: per-modality step catalogs, the
//! transition/validation engine that drives them, and a budget-capped AI
//! assistance layer with a deterministic fallback.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod observability;
pub mod ports;
