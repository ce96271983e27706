pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod event;
pub mod geo;
pub mod parser;
pub mod stats;

pub use aggregate::{Aggregator, Limits, Snapshot, aggregate};
pub use classify::IpClass;
pub use config::SignalTrapConfig;
pub use error::TrapError;
pub use event::Event;
pub use geo::{GeoCache, GeoLocation, GeoLookup, NoGeo};
pub use parser::parse_line;
