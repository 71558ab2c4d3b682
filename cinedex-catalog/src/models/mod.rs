//! Canonical catalog models
//!
//! `Movie` is the aggregate root produced by validation, with related
//! entities embedded. `LinkedMovie` is the stored form of the same record,
//! with embedded entities replaced by `EntityRef` links.

pub mod entities;
pub mod movie;

pub use entities::{Actor, CastEntry, CastRef, Director, EntityRef, Poll};
pub use movie::{
    LinkedMovie, LinkedSocial, Language, MetaRecord, Movie, OpsData, Pictures, RatingStat,
    SocialRecord, SocialStats, Video, WatchProvider,
};
