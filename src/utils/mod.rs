//! Utils module - Shared utilities and helpers
//!
//! This module provides utility functions and helpers that are used across
//! multiple layers of the application architecture.

/// Multipart request bodies for publish and upload calls
pub mod form;

/// Logger installation and verbose output
pub mod logging;

/// Input validation and sanitization utilities
pub mod validation;
