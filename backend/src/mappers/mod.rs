//! # Transform Layer
//!
//! Pure conversions between the internal domain model, which is the single
//! source of truth, and the flat shapes served to API consumers.

pub mod profile_mapper;
pub mod schedule_mapper;

pub use profile_mapper::ProfileMapper;
pub use schedule_mapper::ScheduleMapper;
