//! Core library for nonfollowers
//!
//! This crate implements the **Functional Core** of the nonfollowers application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The nonfollowers project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`nonfollowers_core`** (this crate): Pure transformation functions with zero I/O
//! - **`nonfollowers`**: HTTP calls, session storage, and orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! # Module Organization
//!
//! - [`user`]: The platform-independent [`user::UserRecord`] and relation kinds
//! - [`pagination`]: Pages, cursors, and `Link` header parsing
//! - [`reconcile`]: Set difference between following and followers, threshold filter
//! - [`report`]: Output models and text rendering
//! - [`http`]: Error and rate limit message formatting
//! - [`github`]: GitHub REST API shapes and their mapping into user records
//! - [`instagram`]: Instagram private API shapes, device identity, and session state
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use nonfollowers_core::reconcile::{build_result, reconcile};
//! use nonfollowers_core::user::UserRecord;
//!
//! let following = vec![UserRecord::new("a"), UserRecord::new("b")];
//! let followers = vec![UserRecord::new("B")];
//!
//! let result = build_result(following, followers, None);
//!
//! assert_eq!(result.counts.non_followers, 1);
//! assert_eq!(result.users[0].username, "a");
//! ```

pub mod github;
pub mod http;
pub mod instagram;
pub mod pagination;
pub mod reconcile;
pub mod report;
pub mod user;
