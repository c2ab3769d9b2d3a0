// src/integrations/mod.rs
//
// External Integrations Module

pub mod catalog;
pub mod tmdb;

pub use catalog::{CastMember, CatalogDetails, CatalogSearch, DetailPayload};
pub use tmdb::TmdbClient;
