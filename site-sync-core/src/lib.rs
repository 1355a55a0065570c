#![doc = "site-sync-core: reconciliation logic for mirroring a static site into an object store."]

//! This crate holds everything that decides *what* a sync does: scanning the
//! local tree, resolving content types, diffing against the remote listing,
//! and applying uploads and deletions through an injected [`contract::ObjectStore`].
//! Concrete store clients and the command-line surface live in the `site-sync` crate.
//!
//! # Usage
//! Build a [`synchronise::Reconciler`] from a store handle and a
//! [`config::SyncConfig`], then call `synchronise` with a [`report::Reporter`].

pub mod config;
pub mod content_type;
pub mod contract;
pub mod report;
pub mod scan;
pub mod synchronise;
