// Repository modules
pub mod aggregate_repository;

pub use aggregate_repository::AggregateRepository;
