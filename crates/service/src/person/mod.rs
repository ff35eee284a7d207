//! Person records: domain types, predicate parsing, repository seam and service.

pub mod domain;
pub mod predicate;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::PersonService;
