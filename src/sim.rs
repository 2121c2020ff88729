//! Simulation of a netlist. Multi-pattern simulation is available through [`SimpleSimulator`].

mod simple_sim;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::network::{GNet, GateId};

pub use simple_sim::SimpleSimulator;

/// Simple conversion to 64b format
fn bool_to_multi(values: &[Vec<bool>]) -> Vec<Vec<u64>> {
    values
        .iter()
        .map(|v| v.iter().map(|b| if *b { !0 } else { 0 }).collect())
        .collect()
}

/// Simple conversion from 64b format
fn multi_to_bool(values: &[Vec<u64>]) -> Vec<Vec<bool>> {
    values
        .iter()
        .map(|v| v.iter().map(|b| *b != 0).collect())
        .collect()
}

/// Simulate a netlist over multiple timesteps; return the output values
pub fn simulate(
    net: &GNet,
    inputs: &[GateId],
    outputs: &[GateId],
    input_values: &[Vec<bool>],
) -> Vec<Vec<bool>> {
    let mut sim = SimpleSimulator::compile(net.view(), inputs, outputs);
    multi_to_bool(&sim.run(&bool_to_multi(input_values)))
}

/// Simulate a combinatorial netlist; return the output values
pub fn simulate_comb(
    net: &GNet,
    inputs: &[GateId],
    outputs: &[GateId],
    input_values: &[bool],
) -> Vec<bool> {
    assert!(net.is_comb());
    let output = simulate(net, inputs, outputs, &[input_values.to_vec()]);
    output[0].clone()
}

/// Input words enumerating all 2^n patterns, 64 patterns per word
///
/// Returns one vector of input values per word. With fewer than 6 inputs,
/// the single word repeats the patterns.
pub fn exhaustive_patterns(nb_inputs: usize) -> Vec<Vec<u64>> {
    const BASE: [u64; 6] = [
        0xAAAA_AAAA_AAAA_AAAA,
        0xCCCC_CCCC_CCCC_CCCC,
        0xF0F0_F0F0_F0F0_F0F0,
        0xFF00_FF00_FF00_FF00,
        0xFFFF_0000_FFFF_0000,
        0xFFFF_FFFF_0000_0000,
    ];
    let nb_words = 1usize << nb_inputs.saturating_sub(6);
    (0..nb_words)
        .map(|w| {
            (0..nb_inputs)
                .map(|i| {
                    if i < 6 {
                        BASE[i]
                    } else if (w >> (i - 6)) & 1 != 0 {
                        !0
                    } else {
                        0
                    }
                })
                .collect()
        })
        .collect()
}

/// Random input words
pub fn random_patterns(nb_inputs: usize, nb_words: usize, seed: u64) -> Vec<Vec<u64>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..nb_words)
        .map(|_| (0..nb_inputs).map(|_| rng.gen()).collect())
        .collect()
}

/// Extract the value of one pattern from a word
pub fn pattern_bit(word: u64, pattern: usize) -> bool {
    (word >> pattern) & 1 != 0
}
