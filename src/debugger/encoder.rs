use rustsat::types::Lit;

use crate::debugger::context::{lit, Context, GateConnect, NetGate, Version};
use crate::debugger::SatOracle;
use crate::error::Result;
use crate::network::{Gate, GateId, GateSymbol, NetView, Signal};

/// Tseitin encoder of netlists into a CNF formula
///
/// Several netlists can be encoded in the same formula, each with its own
/// index. Gates are encoded at a version: triggered gates are left free at
/// version 0 and take their next state from the previous version otherwise.
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    context: Context,
}

impl Encoder {
    /// Create an encoder with an empty formula
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder whose gate variables follow a reconnection map
    pub fn with_connect(connect: GateConnect) -> Self {
        Encoder {
            context: Context::with_connect(connect),
        }
    }

    /// Formula built so far
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Formula built so far
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Variable holding the value of a gate at a version
    pub fn var(&mut self, net: usize, gate: GateId, version: Version) -> u32 {
        self.context.var(NetGate::new(net, gate), version)
    }

    /// Fresh auxiliary variable
    pub fn new_var(&mut self) -> u32 {
        self.context.new_var()
    }

    /// Add a clause
    pub fn add_clause(&mut self, clause: Vec<Lit>) {
        self.context.add_clause(clause);
    }

    /// Solve the formula built so far; returns whether it is satisfiable
    pub fn solve(&mut self, oracle: &dyn SatOracle) -> Result<bool> {
        self.context.solve(oracle)
    }

    /// Variable read through a signal: the state of a triggered gate is taken from the previous version
    fn var_get(&mut self, net: usize, view: NetView<'_>, s: Signal, version: Version) -> u32 {
        let d = s.node();
        let is_trigger = view.try_gate(d).map_or(false, |g| g.is_trigger());
        let v = if version > 0 && is_trigger {
            version - 1
        } else {
            version
        };
        self.var(net, d, v)
    }

    /// Encode all gates of a view, in topological order
    pub fn encode_net(&mut self, net: usize, view: NetView<'_>, version: Version) {
        for id in view.ordered_gates().iter() {
            self.encode_gate(net, view, view.gate(*id), version);
        }
    }

    /// Encode a single gate
    pub fn encode_gate(&mut self, net: usize, view: NetView<'_>, gate: &Gate, version: Version) {
        use GateSymbol::*;
        let y = self.var(net, gate.id(), version);
        let xs: Vec<u32> = gate
            .inputs()
            .iter()
            .map(|s| self.var_get(net, view, *s, version))
            .collect();
        match gate.func() {
            In => (),
            Nop | Out => {
                if let Some(x) = xs.first() {
                    self.encode_buf(y, *x, true);
                }
            }
            Not => self.encode_buf(y, xs[0], false),
            Zero => self.encode_fix(y, false),
            One => self.encode_fix(y, true),
            And => self.encode_and(y, &xs, true),
            Nand => self.encode_and(y, &xs, false),
            Or => self.encode_or(y, &xs, true),
            Nor => self.encode_or(y, &xs, false),
            Xor => self.encode_xor_chain(y, &xs, true),
            Xnor => self.encode_xor_chain(y, &xs, false),
            Maj => self.encode_maj(y, &xs),
            Latch => {
                if version > 0 {
                    let q = self.var(net, gate.id(), version - 1);
                    self.encode_mux(y, xs[1], xs[0], q);
                }
            }
            Dff => {
                if version > 0 {
                    self.encode_buf(y, xs[0], true);
                }
            }
            DffRs => {
                if version > 0 {
                    let t = self.new_var();
                    self.encode_or(t, &[xs[3], xs[0]], true);
                    let nrst = self.new_var();
                    self.encode_buf(nrst, xs[2], false);
                    self.encode_and(y, &[nrst, t], true);
                }
            }
            Custom(_) => panic!("Unsupported gate {:?} for encoding", gate),
        }
    }

    /// Force a variable to a constant
    pub fn encode_fix(&mut self, y: u32, value: bool) {
        self.add_clause(vec![lit(y, value)]);
    }

    /// y = x, or y = !x without sign
    pub fn encode_buf(&mut self, y: u32, x: u32, sign: bool) {
        // 2 clauses, 4 literals
        let x = lit(x, sign);
        self.add_clause(vec![lit(y, false), x]);
        self.add_clause(vec![lit(y, true), !x]);
    }

    /// y = And(xs), or its negation without sign
    pub fn encode_and(&mut self, y: u32, xs: &[u32], sign: bool) {
        // n+1 clauses, 3n+1 literals
        let n = lit(y, sign);
        let mut big = Vec::with_capacity(xs.len() + 1);
        for x in xs {
            self.add_clause(vec![!n, lit(*x, true)]);
            big.push(lit(*x, false));
        }
        big.push(n);
        self.add_clause(big);
    }

    /// y = Or(xs), or its negation without sign
    pub fn encode_or(&mut self, y: u32, xs: &[u32], sign: bool) {
        // n+1 clauses, 3n+1 literals
        let n = lit(y, sign);
        let mut big = Vec::with_capacity(xs.len() + 1);
        for x in xs {
            self.add_clause(vec![n, lit(*x, false)]);
            big.push(lit(*x, true));
        }
        big.push(!n);
        self.add_clause(big);
    }

    /// y = a ^ b, or its negation without sign
    pub fn encode_xor(&mut self, y: u32, a: u32, b: u32, sign: bool) {
        // 4 clauses, 12 literals
        let n = lit(y, sign);
        let a = lit(a, true);
        let b = lit(b, true);
        self.add_clause(vec![a, b, !n]);
        self.add_clause(vec![!a, !b, !n]);
        self.add_clause(vec![!a, b, n]);
        self.add_clause(vec![a, !b, n]);
    }

    /// y = Xor(xs), or its negation without sign, as a chain of 2-input Xors
    pub fn encode_xor_chain(&mut self, y: u32, xs: &[u32], sign: bool) {
        assert!(!xs.is_empty());
        if xs.len() == 1 {
            self.encode_buf(y, xs[0], sign);
            return;
        }
        let mut acc = xs[0];
        for x in &xs[1..xs.len() - 1] {
            let t = self.new_var();
            self.encode_xor(t, acc, *x, true);
            acc = t;
        }
        self.encode_xor(y, acc, xs[xs.len() - 1], sign);
    }

    /// y = s ? a : b
    pub fn encode_mux(&mut self, y: u32, s: u32, a: u32, b: u32) {
        // 4 clauses, 12 literals + 2 redundant clauses
        let n = lit(y, true);
        let (s, a, b) = (lit(s, true), lit(a, true), lit(b, true));
        self.add_clause(vec![!s, !a, n]);
        self.add_clause(vec![!s, a, !n]);
        self.add_clause(vec![s, !b, n]);
        self.add_clause(vec![s, b, !n]);
        self.add_clause(vec![a, b, !n]);
        self.add_clause(vec![!a, !b, n]);
    }

    /// y = Maj(xs) for an odd number of inputs
    pub fn encode_maj(&mut self, y: u32, xs: &[u32]) {
        assert!(xs.len() % 2 == 1);
        match xs.len() {
            1 => self.encode_buf(y, xs[0], true),
            3 => {
                // 6 clauses, 18 literals
                let n = lit(y, true);
                let (a, b, c) = (lit(xs[0], true), lit(xs[1], true), lit(xs[2], true));
                self.add_clause(vec![!a, !b, n]);
                self.add_clause(vec![!b, !c, n]);
                self.add_clause(vec![!a, !c, n]);
                self.add_clause(vec![a, b, !n]);
                self.add_clause(vec![b, c, !n]);
                self.add_clause(vec![a, c, !n]);
            }
            _ => self.encode_at_least(y, xs, (xs.len() + 1) / 2),
        }
    }

    /// y = at least k of xs, with a sequential counter
    fn encode_at_least(&mut self, y: u32, xs: &[u32], k: usize) {
        // counts[j] is true when at least j+1 of the inputs seen so far are
        let mut counts: Vec<Option<u32>> = vec![None; k];
        for x in xs {
            let mut next = counts.clone();
            for j in 0..k {
                let carry = if j == 0 {
                    *x
                } else {
                    match counts[j - 1] {
                        Some(c) => {
                            let t = self.new_var();
                            self.encode_and(t, &[c, *x], true);
                            t
                        }
                        None => continue,
                    }
                };
                next[j] = Some(match counts[j] {
                    Some(c) => {
                        let t = self.new_var();
                        self.encode_or(t, &[c, carry], true);
                        t
                    }
                    None => carry,
                });
            }
            counts = next;
        }
        match counts[k - 1] {
            Some(c) => self.encode_buf(y, c, true),
            None => self.encode_fix(y, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::SolverKind;
    use crate::network::generators::random::make_rand;
    use crate::network::GNet;
    use crate::sim::{exhaustive_patterns, pattern_bit, SimpleSimulator};

    /// Check that the encoding of a single-output netlist matches its simulation
    fn check_against_sim(net: &GNet, inputs: &[GateId], out: GateId) {
        let oracle = SolverKind::Varisat.oracle();
        let mut sim = SimpleSimulator::compile(net.view(), inputs, &[out]);
        for w in exhaustive_patterns(inputs.len()) {
            let res = sim.run_once(&w)[0];
            for p in 0..(1usize << inputs.len()).min(64) {
                let mut enc = Encoder::new();
                enc.encode_net(0, net.view(), 0);
                for (i, x) in inputs.iter().enumerate() {
                    let v = enc.var(0, *x, 0);
                    enc.encode_fix(v, pattern_bit(w[i], p));
                }
                let y = enc.var(0, out, 0);
                enc.encode_fix(y, pattern_bit(res, p));
                assert!(enc.solve(oracle.as_ref()).unwrap());
                let mut enc2 = enc.clone();
                enc2.encode_fix(y, !pattern_bit(res, p));
                assert!(!enc2.solve(oracle.as_ref()).unwrap());
            }
        }
    }

    #[test]
    fn test_gates() {
        use GateSymbol::*;
        for func in [And, Or, Xor, Nand, Nor, Xnor, Maj] {
            let mut net = GNet::new();
            let xs: Vec<GateId> = (0..5).map(|_| net.add_in()).collect();
            let y = net.add_nary(func, &xs);
            let o = net.add_out(y);
            net.sort_topologically();
            check_against_sim(&net, &xs, o);
        }
    }

    #[test]
    fn test_small_gates() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let c = net.add_in();
        let m = net.add_maj(&[a, b, c]);
        let x = net.add_xnor(&[m, c]);
        let n = net.add_not(x);
        let z = net.add_zero();
        let o = net.add_or(&[n, z]);
        let out = net.add_out(o);
        net.sort_topologically();
        check_against_sim(&net, &[a, b, c], out);
    }

    #[test]
    fn test_random() {
        let net = make_rand(30, 1, 4);
        let inputs: Vec<GateId> = net
            .gates()
            .iter()
            .copied()
            .filter(|g| net.gate(*g).is_source())
            .collect();
        let out = *net
            .gates()
            .iter()
            .find(|g| net.gate(**g).is_target())
            .unwrap();
        if inputs.len() <= 8 {
            check_against_sim(&net, &inputs, out);
        }
    }

    #[test]
    fn test_flip_flop_versions() {
        let mut net = GNet::new();
        let d = net.add_in();
        let clk = net.add_in();
        let q = net.add_dff(d, clk);
        let o = net.add_out(q);
        net.sort_topologically();
        let oracle = SolverKind::Varisat.oracle();

        // Free at version 0
        let mut enc = Encoder::new();
        enc.encode_net(0, net.view(), 0);
        let vd = enc.var(0, d, 0);
        let vo = enc.var(0, o, 0);
        enc.encode_fix(vd, true);
        enc.encode_fix(vo, false);
        assert!(enc.solve(oracle.as_ref()).unwrap());

        // Readers see the state computed at the previous version
        let mut enc = Encoder::new();
        enc.encode_net(0, net.view(), 1);
        enc.encode_net(0, net.view(), 2);
        let vd = enc.var(0, d, 1);
        let vo = enc.var(0, o, 2);
        enc.encode_fix(vd, true);
        enc.encode_fix(vo, false);
        assert!(!enc.solve(oracle.as_ref()).unwrap());
    }

    /// Netlist encoded at versions 0 to 2, with values forced on some gates
    fn is_sat(enc: &Encoder, fixed: &[(GateId, Version, bool)]) -> bool {
        let mut enc = enc.clone();
        for &(g, v, val) in fixed {
            let x = enc.var(0, g, v);
            enc.encode_fix(x, val);
        }
        enc.solve(SolverKind::Varisat.oracle().as_ref()).unwrap()
    }

    fn unrolled(net: &GNet) -> Encoder {
        let mut enc = Encoder::new();
        for v in 0..3 {
            enc.encode_net(0, net.view(), v);
        }
        enc
    }

    #[test]
    fn test_latch_versions() {
        let mut net = GNet::new();
        let d = net.add_in();
        let ena = net.add_in();
        let q = net.add_latch(d, ena);
        net.add_out(q);
        net.sort_topologically();
        let enc = unrolled(&net);

        for val in [false, true] {
            assert!(is_sat(&enc, &[(d, 0, !val), (ena, 0, true), (q, 0, val)]));
        }
        for t in 1..3 {
            for m in 0..8 {
                let (e, dv, prev) = (m & 1 != 0, m & 2 != 0, m & 4 != 0);
                let next = if e { dv } else { prev };
                let mut fixed = vec![(ena, t, e), (d, t, dv), (q, t - 1, prev)];
                fixed.push((q, t, next));
                assert!(is_sat(&enc, &fixed));
                fixed.pop();
                fixed.push((q, t, !next));
                assert!(!is_sat(&enc, &fixed));
            }
        }
    }

    #[test]
    fn test_dffrs_versions() {
        let mut net = GNet::new();
        let d = net.add_in();
        let clk = net.add_in();
        let rst = net.add_in();
        let set = net.add_in();
        let q = net.add_dffrs(d, clk, rst, set);
        net.add_out(q);
        net.sort_topologically();
        let enc = unrolled(&net);

        for val in [false, true] {
            assert!(is_sat(&enc, &[(rst, 0, true), (q, 0, val)]));
            assert!(is_sat(&enc, &[(set, 0, true), (q, 0, val)]));
        }
        for t in 1..3 {
            for m in 0..16 {
                let (dv, r, st, prev) = (m & 1 != 0, m & 2 != 0, m & 4 != 0, m & 8 != 0);
                let next = !r && (st || dv);
                let mut fixed = vec![(d, t, dv), (rst, t, r), (set, t, st), (q, t - 1, prev)];
                fixed.push((q, t, next));
                assert!(is_sat(&enc, &fixed));
                fixed.pop();
                fixed.push((q, t, !next));
                assert!(!is_sat(&enc, &fixed));
            }
        }
    }
}
