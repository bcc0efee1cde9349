//! Radio abstraction: driver trait, modulation parameters, and the event
//! channel that decouples interrupt-context delivery from protocol work.

pub mod driver;
pub mod events;
pub mod mock;
pub mod params;

pub use driver::{Radio, RadioClock, RxStats, TxParams};
pub use events::{event_channel, RadioEvent};
pub use params::{Bandwidth, CodingRate, Datarate, SpreadingFactor};
