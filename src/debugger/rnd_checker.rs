use log::{debug, warn};

use crate::network::{GNet, GateId};
use crate::sim::{exhaustive_patterns, random_patterns, SimpleSimulator};

/// Outcome of a simulation-based check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Equivalence {
    /// Proven equivalent
    Equal,
    /// A difference was found
    NotEqual,
    /// No difference was found, but not all patterns were tried
    Unknown,
}

/// Settings of the random checker
#[derive(Clone, Debug)]
pub struct RndConfig {
    /// Number of random 64-pattern words
    pub tries: usize,
    /// Up to this number of inputs, all patterns are simulated
    pub exhaustive_bound: usize,
    /// Seed of the pattern generator
    pub seed: u64,
}

impl Default for RndConfig {
    fn default() -> Self {
        RndConfig {
            tries: 64,
            exhaustive_bound: 20,
            seed: 1,
        }
    }
}

/// Simulation-based checker working on a combinatorial miter
#[derive(Clone, Debug, Default)]
pub struct RndChecker {
    config: RndConfig,
}

impl RndChecker {
    /// Create a checker with the given settings
    pub fn new(config: RndConfig) -> RndChecker {
        RndChecker { config }
    }

    /// Look for an input pattern setting the output of the miter
    pub fn check(&self, miter: &GNet) -> Equivalence {
        assert!(miter.is_comb(), "Random checking requires a combinatorial miter");
        assert_eq!(
            miter.nb_target_links(),
            1,
            "A miter must have exactly one output"
        );
        let mut inputs: Vec<GateId> = miter.source_links().iter().map(|l| l.source).collect();
        inputs.sort();
        inputs.dedup();
        let outputs: Vec<GateId> = miter.target_links().iter().map(|l| l.source).collect();
        let mut sim = SimpleSimulator::compile(miter.view(), &inputs, &outputs);

        let exhaustive = inputs.len() <= self.config.exhaustive_bound;
        let patterns = if exhaustive {
            exhaustive_patterns(inputs.len())
        } else {
            random_patterns(inputs.len(), self.config.tries, self.config.seed)
        };
        debug!(
            "Simulating {} words on a miter with {} inputs",
            patterns.len(),
            inputs.len()
        );
        for w in &patterns {
            if sim.run_once(w)[0] != 0 {
                warn!("Miter output set by simulation: the netlists differ");
                return Equivalence::NotEqual;
            }
        }
        if exhaustive {
            Equivalence::Equal
        } else {
            Equivalence::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::hints::Hints;
    use crate::debugger::miter::miter;
    use crate::network::generators::nary::{make_and, make_nor};
    use crate::network::generators::random::make_rand;
    use crate::network::{GateIdMap, Link};

    fn nary_miter(lhs: &(GNet, Vec<GateId>, GateId), rhs: &(GNet, Vec<GateId>, GateId)) -> GNet {
        let hints = Hints {
            source_binding: Some(
                lhs.1
                    .iter()
                    .zip(&rhs.1)
                    .map(|(a, b)| (Link::port(*a), Link::port(*b)))
                    .collect(),
            ),
            target_binding: Some([(Link::port(lhs.2), Link::port(rhs.2))].into_iter().collect()),
            ..Default::default()
        };
        miter(&lhs.0, &rhs.0, &hints).unwrap()
    }

    #[test]
    fn test_self() {
        let net = make_rand(50, 0, 3);
        let mut gmap = GateIdMap::default();
        let copy = net.clone_with(&mut gmap);
        let m = miter(&net, &copy, &Hints::from_map(&net, &copy, &gmap)).unwrap();
        assert_eq!(RndChecker::default().check(&m), Equivalence::Equal);
        let random = RndChecker::new(RndConfig {
            exhaustive_bound: 0,
            ..Default::default()
        });
        assert_eq!(random.check(&m), Equivalence::Unknown);
    }

    #[test]
    fn test_difference() {
        let m = nary_miter(&make_nor(6), &make_and(6));
        assert_eq!(RndChecker::default().check(&m), Equivalence::NotEqual);
        let random = RndChecker::new(RndConfig {
            exhaustive_bound: 0,
            ..Default::default()
        });
        assert_eq!(random.check(&m), Equivalence::NotEqual);
    }
}
