//! Representation and handling of hierarchical gate-level netlists

mod gate;
pub mod generators;
mod gnet;
mod signal;
pub mod stats;
mod subnet;
mod symbol;
mod topo;
mod view;

pub use gate::{Gate, Link};
pub use gnet::{GNet, GateIdMap, SubnetId};
pub use signal::{Event, GateId, Signal};
pub use subnet::Subnet;
pub use symbol::{CustomSymbols, GateSymbol};
pub use view::NetView;
