// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for reviews, business settings, and the activity log.
//!
//! Layout follows a thin split: [`database`] owns the connection and
//! PRAGMAs, [`queries`] holds typed statement modules, and [`adapter`]
//! exposes the whole thing behind the `StorageAdapter` trait.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
