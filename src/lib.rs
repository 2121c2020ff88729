//! Logic equivalence checking of hierarchical gate-level netlists
//!
//! This crate compares two netlists and decides whether they compute the same function.
//! Small problems are decided by exhaustive simulation, larger ones by encoding a miter
//! to CNF and calling a SAT solver. Netlists split into subnets can be checked subnet by subnet,
//! and sequential netlists are handled through a binding of their flip-flops.
//!
//! # Usage
//!
//! ```bash
//! # Show available commands
//! # At the moment, only .bench files are supported
//! gatelec help
//! # Show statistics on a netlist
//! gatelec show mydesign.bench
//! # Check equivalence between two versions of a design
//! gatelec equiv mydesign.bench optimized.bench
//! # Build their miter
//! gatelec miter mydesign.bench optimized.bench -o miter.bench
//! ```
//!
//! # Datastructures
//!
//! [`network::GNet`] is a netlist of gates identified by [`network::GateId`].
//! Each gate has a [`network::GateSymbol`] and a list of input signals, and may belong to a subnet.
//! Sources (inputs, constants, flip-flops) and targets (outputs, flip-flops) form the interface
//! of the netlist, and subnets expose the same interface through [`network::NetView`].
//!
//! For example, here is a full adder circuit, checked against a copy of itself:
//! ```
//! # use gatelec::network::{GNet, GateIdMap};
//! # use gatelec::debugger::{Checker, Hints};
//! let mut net = GNet::new();
//! let i0 = net.add_in();
//! let i1 = net.add_in();
//! let i2 = net.add_in();
//! let carry = net.add_maj(&[i0, i1, i2]);
//! let out = net.add_xor(&[i0, i1, i2]);
//! net.add_out(carry);
//! net.add_out(out);
//! net.sort_topologically();
//!
//! let mut gmap = GateIdMap::default();
//! let copy = net.clone_with(&mut gmap);
//! let hints = Hints::from_map(&net, &copy, &gmap);
//! assert!(Checker::default().are_equal(&net, &copy, &hints));
//! ```

#![warn(missing_docs)]

pub mod debugger;
pub mod error;
pub mod io;
pub mod network;
pub mod sim;

pub use error::{Error, Result};
pub use network::{GNet, Gate, GateId, GateSymbol, Link, Signal};
