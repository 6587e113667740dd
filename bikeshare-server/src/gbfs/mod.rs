//! GBFS feed client.
//!
//! A GBFS feed is a manifest (`gbfs.json`) listing, per language, the URLs
//! of its sub-documents. Each document carries its own `ttl`. This module
//! fetches the manifest and the two station documents the engine needs and
//! converts them to domain types.

mod client;
mod convert;
mod error;
mod feed;
#[cfg(test)]
pub mod mock;
mod types;

pub use client::{GbfsClient, GbfsClientConfig};
pub use error::FeedError;
pub use feed::{
    FeedClient, FeedDocument, InformationDocument, LanguageFeeds, Manifest, StatusDocument,
};
#[cfg(test)]
pub use mock::MockFeedClient;
