//! Logic equivalence checking of netlists

mod checker;
mod context;
mod encoder;
mod hints;
mod miter;
mod rnd_checker;
mod solver;
mod symexec;

use log::error;

use crate::network::{GNet, GateIdMap};

pub use checker::{Checker, CheckerConfig, Counterexample, Verdict};
pub use context::{lit, Context, GateConnect, NetGate, Version};
pub use encoder::Encoder;
pub use hints::{GateBinding, Hints, StateEncoding, SubnetBinding};
pub use miter::miter;
pub use rnd_checker::{Equivalence, RndChecker, RndConfig};
pub use solver::{SatOracle, SolverKind, VarisatOracle};
pub use symexec::SymbolicExecutor;

#[cfg(feature = "kissat")]
pub use solver::KissatOracle;

/// Available equivalence checking methods
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LecType {
    /// Simulation, SAT and hierarchical checking
    #[default]
    Default,
    /// Simulation of the miter with random patterns
    Rnd,
}

/// Common interface of the equivalence checkers
pub trait BaseChecker {
    /// Compare a netlist to its image through a gate mapping
    fn equivalence(&self, lhs: &GNet, rhs: &GNet, gmap: &GateIdMap) -> Equivalence;

    /// Returns whether the netlists are proven equivalent
    fn are_equal(&self, lhs: &GNet, rhs: &GNet, gmap: &GateIdMap) -> bool {
        self.equivalence(lhs, rhs, gmap) == Equivalence::Equal
    }
}

impl BaseChecker for Checker {
    fn equivalence(&self, lhs: &GNet, rhs: &GNet, gmap: &GateIdMap) -> Equivalence {
        match self.check(lhs, rhs, &Hints::from_map(lhs, rhs, gmap)) {
            Ok(Verdict::Equal) => Equivalence::Equal,
            Ok(Verdict::NotEqual(_)) => Equivalence::NotEqual,
            Err(e) => {
                error!("Equivalence check failed: {}", e);
                Equivalence::Unknown
            }
        }
    }
}

impl BaseChecker for RndChecker {
    fn equivalence(&self, lhs: &GNet, rhs: &GNet, gmap: &GateIdMap) -> Equivalence {
        match miter(lhs, rhs, &Hints::from_map(lhs, rhs, gmap)) {
            Ok(m) => self.check(&m),
            Err(_) => Equivalence::NotEqual,
        }
    }
}

/// Checker implementing a method, with its default settings
pub fn get_checker(lec: LecType) -> Box<dyn BaseChecker> {
    match lec {
        LecType::Default => Box::new(Checker::default()),
        LecType::Rnd => Box::new(RndChecker::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::generators::random::make_rand;
    use crate::network::GateSymbol;

    #[test]
    fn test_get_checker() {
        let net = make_rand(40, 0, 7);
        let mut gmap = GateIdMap::default();
        let copy = net.clone_with(&mut gmap);
        for lec in [LecType::Default, LecType::Rnd] {
            let checker = get_checker(lec);
            assert_eq!(checker.equivalence(&net, &copy, &gmap), Equivalence::Equal);
            assert!(checker.are_equal(&net, &copy, &gmap));
        }
    }

    #[test]
    fn test_get_checker_difference() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let x = net.add_and(&[a, b]);
        net.add_out(x);
        net.sort_topologically();
        let mut gmap = GateIdMap::default();
        let mut copy = net.clone_with(&mut gmap);
        let y = gmap[&x];
        let inputs = copy.gate(y).inputs().to_vec();
        copy.set_gate(y, GateSymbol::Or, inputs);
        copy.sort_topologically();
        for lec in [LecType::Default, LecType::Rnd] {
            let checker = get_checker(lec);
            assert_eq!(checker.equivalence(&net, &copy, &gmap), Equivalence::NotEqual);
            assert!(!checker.are_equal(&net, &copy, &gmap));
        }
    }
}
