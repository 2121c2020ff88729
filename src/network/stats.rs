//! Compute gate statistics
//!
//! ```
//! # use gatelec::network::GNet;
//! # let net = GNet::new();
//! use gatelec::network::stats::stats;
//! let stats = stats(&net);
//!
//! // Check that there is no Xor gate
//! assert_eq!(stats.nb_xor, 0);
//!
//! // Show the statistics
//! println!("{}", stats);
//! ```

use std::fmt;

use crate::network::{GNet, GateSymbol};

/// Number of inputs, outputs and gates in a netlist
#[derive(Clone, Debug, Default)]
pub struct NetStats {
    /// Number of source links
    pub nb_inputs: usize,
    /// Number of target links
    pub nb_outputs: usize,
    /// Number of subnets
    pub nb_subnets: usize,
    /// Number of constants
    pub nb_constants: usize,
    /// Number of And, Or, Nand and Nor gates
    pub nb_and: usize,
    /// Arity of And and similar gates
    pub and_arity: Vec<usize>,
    /// Number of Xor and Xnor gates
    pub nb_xor: usize,
    /// Arity of Xor and similar gates
    pub xor_arity: Vec<usize>,
    /// Number of Maj
    pub nb_maj: usize,
    /// Number of buffers
    pub nb_buf: usize,
    /// Number of Not
    pub nb_not: usize,
    /// Number of latches
    pub nb_latch: usize,
    /// Number of flip-flops, including the ones with reset and set
    pub nb_dff: usize,
    /// Number of flip-flops with reset and set
    pub nb_dffrs: usize,
    /// Number of uninterpreted cells
    pub nb_custom: usize,
}

impl NetStats {
    /// Total number of logic gates, including triggered ones
    pub fn nb_gates(&self) -> usize {
        self.nb_and
            + self.nb_xor
            + self.nb_maj
            + self.nb_buf
            + self.nb_not
            + self.nb_latch
            + self.nb_dff
            + self.nb_custom
    }

    fn add_arity(v: &mut Vec<usize>, sz: usize) {
        if v.len() <= sz {
            v.resize(sz + 1, 0);
        }
        v[sz] += 1;
    }
}

impl fmt::Display for NetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats:")?;
        writeln!(f, "  Inputs: {}", self.nb_inputs)?;
        writeln!(f, "  Outputs: {}", self.nb_outputs)?;
        writeln!(f, "  Gates: {}", self.nb_gates())?;
        if self.nb_subnets != 0 {
            writeln!(f, "  Subnets: {}", self.nb_subnets)?;
        }
        if self.nb_constants != 0 {
            writeln!(f, "  Constants: {}", self.nb_constants)?;
        }
        if self.nb_latch != 0 {
            writeln!(f, "  Latch: {}", self.nb_latch)?;
        }
        if self.nb_dff != 0 {
            writeln!(f, "  Dff: {}", self.nb_dff)?;
            if self.nb_dffrs != 0 {
                writeln!(f, "      reset/set: {}", self.nb_dffrs)?;
            }
        }
        if self.nb_and != 0 {
            writeln!(f, "  And: {}", self.nb_and)?;
            for (i, nb) in self.and_arity.iter().enumerate() {
                if *nb != 0 {
                    writeln!(f, "      {}: {}", i, nb)?;
                }
            }
        }
        if self.nb_xor != 0 {
            writeln!(f, "  Xor: {}", self.nb_xor)?;
            for (i, nb) in self.xor_arity.iter().enumerate() {
                if *nb != 0 {
                    writeln!(f, "      {}: {}", i, nb)?;
                }
            }
        }
        if self.nb_maj != 0 {
            writeln!(f, "  Maj: {}", self.nb_maj)?;
        }
        if self.nb_not != 0 {
            writeln!(f, "  Not: {}", self.nb_not)?;
        }
        if self.nb_buf != 0 {
            writeln!(f, "  Buf: {}", self.nb_buf)?;
        }
        if self.nb_custom != 0 {
            writeln!(f, "  Custom: {}", self.nb_custom)?;
        }
        fmt::Result::Ok(())
    }
}

/// Compute the statistics of the netlist
pub fn stats(net: &GNet) -> NetStats {
    use GateSymbol::*;
    let mut ret = NetStats {
        nb_inputs: net.nb_source_links(),
        nb_outputs: net.nb_target_links(),
        nb_subnets: net.nb_subnets(),
        ..Default::default()
    };
    for id in net.gates() {
        let g = net.gate(*id);
        match g.func() {
            In | Out => (),
            Zero | One => ret.nb_constants += 1,
            Nop => {
                if g.arity() != 0 {
                    ret.nb_buf += 1;
                }
            }
            Not => ret.nb_not += 1,
            And | Or | Nand | Nor => {
                ret.nb_and += 1;
                NetStats::add_arity(&mut ret.and_arity, g.arity());
            }
            Xor | Xnor => {
                ret.nb_xor += 1;
                NetStats::add_arity(&mut ret.xor_arity, g.arity());
            }
            Maj => ret.nb_maj += 1,
            Latch => ret.nb_latch += 1,
            Dff => ret.nb_dff += 1,
            DffRs => {
                ret.nb_dff += 1;
                ret.nb_dffrs += 1;
            }
            Custom(_) => ret.nb_custom += 1,
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::generators::testcases::toggle_chain;

    #[test]
    fn test_stats() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let c = net.add_in();
        let x = net.add_and(&[a, b, c]);
        let y = net.add_xnor(&[x, a]);
        let z = net.add_maj(&[x, y, c]);
        net.add_out(z);
        let s = stats(&net);
        assert_eq!(s.nb_inputs, 3);
        assert_eq!(s.nb_outputs, 1);
        assert_eq!(s.nb_and, 1);
        assert_eq!(s.and_arity[3], 1);
        assert_eq!(s.nb_xor, 1);
        assert_eq!(s.nb_maj, 1);
        assert_eq!(s.nb_gates(), 3);
        assert!(format!("{}", s).contains("Maj: 1"));
    }

    #[test]
    fn test_stats_seq() {
        let s = stats(&toggle_chain(3));
        assert_eq!(s.nb_dff, 3);
        assert_eq!(s.nb_xor, 1);
        assert_eq!(s.nb_inputs, 2);
    }
}
