//! Bike share challenge server.
//!
//! Keeps a live cache of GBFS station data for each configured bike-share
//! deployment and answers "where should I ride from and to?" challenges and
//! area availability queries against it.

pub mod domain;
pub mod engine;
pub mod gbfs;
pub mod registry;
pub mod settings;
pub mod web;
