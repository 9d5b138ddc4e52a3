//! Domain layer containing business entities and logic.
//!
//! Defines entities, the record store contract, and the background delete
//! worker, independent of HTTP and storage details.
//!
//! # Architecture
//!
//! - [`entities`] - Records, lookups and allocation results
//! - [`repositories`] - Record store trait
//! - [`delete_request`] - Deletion request model
//! - [`delete_worker`] - Asynchronous soft-delete worker
//!
//! # Deletion Flow
//!
//! 1. HTTP handler receives the list of ids to delete
//! 2. [`delete_worker::DeleteQueue::submit`] enqueues a [`delete_request::DeleteRequest`]
//! 3. The handler answers `202 Accepted`
//! 4. [`delete_worker::run_delete_worker`] applies it via [`repositories::RecordRepository::soft_delete`]

pub mod delete_request;
pub mod delete_worker;
pub mod entities;
pub mod repositories;
