//! # psra-core
//!
//! Core types, ID formatting, validation, and error types for PSRA dispatch.
//!
//! This crate provides the foundational types shared across all PSRA crates:
//! - Entity structs for incidents, volunteers, and support requests
//! - Status enums for the incident and support-request lifecycles
//! - Store key constants and ID formatting/parsing helpers
//! - Member number arithmetic (`YY * 10000 + sequence`)
//! - Input validation for the dispatcher and volunteer forms
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod keys;
pub mod member_number;
pub mod validation;
