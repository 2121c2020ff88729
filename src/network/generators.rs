//! Netlist generators and templates

/// Single n-ary gates driven by primary inputs
pub mod nary {
    use crate::network::{GNet, GateId, GateSymbol};

    /// A single gate over n inputs, with optional inverters on the inputs
    ///
    /// Returns the netlist, its inputs and its output gate.
    pub fn make_nary(func: GateSymbol, len: usize, invert_inputs: bool) -> (GNet, Vec<GateId>, GateId) {
        assert!(len > 0);
        let mut ret = GNet::new();
        let inputs: Vec<GateId> = (0..len).map(|_| ret.add_in()).collect();
        let args: Vec<GateId> = if invert_inputs {
            inputs.iter().map(|x| ret.add_not(*x)).collect()
        } else {
            inputs.clone()
        };
        let x = ret.add_nary(func, &args);
        let out = ret.add_out(x);
        ret.sort_topologically();
        (ret, inputs, out)
    }

    /// Nor(x1, ..., xn)
    pub fn make_nor(len: usize) -> (GNet, Vec<GateId>, GateId) {
        make_nary(GateSymbol::Nor, len, false)
    }

    /// And(x1, ..., xn)
    pub fn make_and(len: usize) -> (GNet, Vec<GateId>, GateId) {
        make_nary(GateSymbol::And, len, false)
    }

    /// And(~x1, ..., ~xn), equivalent to Nor(x1, ..., xn)
    pub fn make_andn(len: usize) -> (GNet, Vec<GateId>, GateId) {
        make_nary(GateSymbol::And, len, true)
    }

    /// Or(~x1, ..., ~xn), equivalent to Nand(x1, ..., xn)
    pub fn make_orn(len: usize) -> (GNet, Vec<GateId>, GateId) {
        make_nary(GateSymbol::Or, len, true)
    }

    /// Nand(x1, ..., xn)
    pub fn make_nand(len: usize) -> (GNet, Vec<GateId>, GateId) {
        make_nary(GateSymbol::Nand, len, false)
    }

    /// Xor(x1, ..., xn)
    pub fn make_xor(len: usize) -> (GNet, Vec<GateId>, GateId) {
        make_nary(GateSymbol::Xor, len, false)
    }
}

/// Random netlists
pub mod random {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::network::{GNet, GateId, GateSymbol};

    const FUNCS: [GateSymbol; 8] = [
        GateSymbol::And,
        GateSymbol::Or,
        GateSymbol::Xor,
        GateSymbol::Nand,
        GateSymbol::Nor,
        GateSymbol::Xnor,
        GateSymbol::Not,
        GateSymbol::Maj,
    ];

    fn pick_inputs(rng: &mut SmallRng, pool: &[GateId], nb: usize) -> Vec<GateId> {
        (0..nb).map(|_| pool[rng.gen_range(0..pool.len())]).collect()
    }

    /// A random combinatorial netlist, split into subnets by creation order
    ///
    /// With zero subnets, the netlist is flat. Otherwise it is well-formed: the
    /// subnets are non-empty and cover all gates.
    pub fn make_rand(nb_gates: usize, nb_subnets: usize, seed: u64) -> GNet {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut ret = GNet::new();
        let nb_inputs = 4 + nb_gates / 16;
        let mut pool: Vec<GateId> = (0..nb_inputs).map(|_| ret.add_in()).collect();
        while ret.nb_gates() < nb_gates {
            let func = FUNCS[rng.gen_range(0..FUNCS.len())];
            let arity = match func {
                GateSymbol::Not => 1,
                GateSymbol::Maj => 3,
                _ => rng.gen_range(2..=4),
            };
            let args = pick_inputs(&mut rng, &pool, arity);
            let before = ret.nb_gates();
            let g = ret.add_nary(func, &args);
            if ret.nb_gates() > before {
                pool.push(g);
            }
        }
        let unused: Vec<GateId> = pool
            .iter()
            .filter(|g| ret.gate(**g).fanout() == 0)
            .copied()
            .collect();
        for g in unused {
            ret.add_out(g);
        }
        if nb_subnets > 0 {
            let order = ret.gates().to_vec();
            let sids: Vec<usize> = (0..nb_subnets).map(|_| ret.new_subnet()).collect();
            for (i, g) in order.iter().enumerate() {
                ret.move_gate(*g, Some(sids[i * nb_subnets / order.len()]));
            }
            ret.remove_empty_subnets();
        }
        ret
    }
}

/// Simple generators to test functionality
pub mod testcases {
    use crate::network::{GNet, GateId};

    /// A chain of flip-flops with a Xor with the input at the end
    pub fn toggle_chain(len: usize) -> GNet {
        assert!(len > 0);
        let mut ret = GNet::new();
        let input = ret.add_in();
        let clk = ret.add_in();
        let mut x = input;
        for _ in 0..len {
            x = ret.add_dff(x, clk);
        }
        x = ret.add_xor(&[x, input]);
        ret.add_out(x);
        ret.sort_topologically();
        ret
    }

    /// An expanding tree of flip-flops, used to test deduplication
    pub fn ff_tree(depth: usize, expansion: usize) -> GNet {
        let mut ret = GNet::new();
        let input = ret.add_in();
        let clk = ret.add_in();
        let mut stage: Vec<GateId> = vec![input];
        for _ in 0..depth {
            let mut next_stage = Vec::new();
            for s in stage {
                for _ in 0..expansion {
                    next_stage.push(ret.add_dff(s, clk));
                }
            }
            stage = next_stage;
        }
        for s in stage {
            ret.add_out(s);
        }
        ret
    }
}
