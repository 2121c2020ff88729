use std::path::PathBuf;

use itertools::Itertools;
use log::{debug, error, warn};

use crate::debugger::context::{lit, GateConnect, NetGate};
use crate::debugger::encoder::Encoder;
use crate::debugger::hints::{GateBinding, Hints, StateEncoding};
use crate::debugger::SolverKind;
use crate::error::Result;
use crate::network::{GNet, GateId, GateIdMap, Link, NetView};
use crate::sim::{exhaustive_patterns, pattern_bit, SimpleSimulator};

/// Thresholds and solver selection of the equivalence checker
#[derive(Clone, Debug)]
pub struct CheckerConfig {
    /// Above this total number of gates, netlists with a subnet binding are checked subnet by subnet
    pub flat_check_bound: usize,
    /// Up to this number of distinct input drivers, combinatorial checks use exhaustive simulation
    pub sim_check_bound: usize,
    /// SAT solver used for the other combinatorial checks
    pub solver: SolverKind,
    /// File receiving the formula of a failing SAT check
    pub dump_path: Option<PathBuf>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            flat_check_bound: 64 * 1024,
            sim_check_bound: 16,
            solver: SolverKind::default(),
            dump_path: None,
        }
    }
}

/// Values taken by both netlists when they disagree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Counterexample {
    /// Left and right value of each pair of bound input drivers, in binding order
    pub inputs: Vec<(bool, bool)>,
    /// Left and right value of each pair of bound output drivers, in binding order
    pub outputs: Vec<(bool, bool)>,
    /// Failing formula in DIMACS format, for SAT checks
    pub dimacs: Option<String>,
}

/// Result of an equivalence check
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The netlists are equivalent
    Equal,
    /// The netlists differ, with the counterexample found if any
    NotEqual(Option<Counterexample>),
}

impl Verdict {
    /// Returns whether the netlists are equivalent
    pub fn is_equal(&self) -> bool {
        matches!(self, Verdict::Equal)
    }

    /// Counterexample of a failed check
    pub fn counterexample(&self) -> Option<&Counterexample> {
        match self {
            Verdict::NotEqual(c) => c.as_ref(),
            Verdict::Equal => None,
        }
    }
}

/// Pairs of gates whose values are compared, given as left and right gates
type Pins = Vec<(NetGate, NetGate)>;

/// Distinct pairs of drivers of the bound links, in binding order
///
/// Several links of a binding may share a driver, when it has a fan-out.
fn driver_pairs(bind: &GateBinding) -> Vec<(GateId, GateId)> {
    bind.iter()
        .map(|(l, r)| (l.source, r.source))
        .unique()
        .collect()
}

fn pins(bind: &GateBinding, lhs: usize, rhs: usize) -> Pins {
    driver_pairs(bind)
        .into_iter()
        .map(|(l, r)| (NetGate::new(lhs, l), NetGate::new(rhs, r)))
        .collect()
}

fn format_values(values: &[(bool, bool)]) -> String {
    values
        .iter()
        .map(|(l, r)| format!("{}|{}", *l as u8, *r as u8))
        .join(", ")
}

/// Logic equivalence checker
///
/// Combinatorial netlists are compared by exhaustive simulation when they have
/// few inputs, and with a SAT solver otherwise. Sequential netlists require a
/// trigger binding, that cuts them at their triggers, or a state encoding.
/// Large hierarchical netlists can be compared subnet by subnet.
#[derive(Clone, Debug, Default)]
pub struct Checker {
    config: CheckerConfig,
}

impl Checker {
    /// Create a checker with the given configuration
    pub fn new(config: CheckerConfig) -> Checker {
        Checker { config }
    }

    /// Configuration of the checker
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Returns whether two netlists are equivalent under the bindings of the hints
    ///
    /// A solver failure is logged and reported as non-equivalence.
    pub fn are_equal(&self, lhs: &GNet, rhs: &GNet, hints: &Hints) -> bool {
        match self.check(lhs, rhs, hints) {
            Ok(v) => v.is_equal(),
            Err(e) => {
                error!("Equivalence check failed: {}", e);
                false
            }
        }
    }

    /// Returns whether a netlist is equivalent to its image through a gate mapping
    pub fn are_equal_map(&self, lhs: &GNet, rhs: &GNet, gmap: &GateIdMap) -> bool {
        self.are_equal(lhs, rhs, &Hints::from_map(lhs, rhs, gmap))
    }

    /// Check two netlists for equivalence under the bindings of the hints
    pub fn check(&self, lhs: &GNet, rhs: &GNet, hints: &Hints) -> Result<Verdict> {
        self.check_views(lhs.view(), rhs.view(), hints)
    }

    /// Returns whether the single output of a miter can never be one
    pub fn check_miter(&self, miter: &GNet) -> Result<bool> {
        assert_eq!(
            miter.nb_target_links(),
            1,
            "A miter must have exactly one output"
        );
        let Some(out) = miter.target_links().iter().map(|l| l.source).next() else {
            unreachable!()
        };
        let mut encoder = Encoder::new();
        encoder.encode_net(0, miter.view(), 0);
        let y = encoder.var(0, out, 0);
        encoder.add_clause(vec![lit(y, true)]);
        let oracle = self.config.solver.oracle();
        let sat = encoder.solve(oracle.as_ref())?;
        if sat {
            warn!("Miter output can be set: the netlists differ");
            self.dump(&encoder);
        }
        Ok(!sat)
    }

    fn check_views(&self, lhs: NetView<'_>, rhs: NetView<'_>, hints: &Hints) -> Result<Verdict> {
        let (Some(ibind), Some(obind)) = (&hints.source_binding, &hints.target_binding) else {
            panic!("Equivalence checking requires the source and target bindings");
        };
        assert_eq!(
            lhs.nb_source_links(),
            rhs.nb_source_links(),
            "Netlists must have the same number of sources"
        );
        assert!(lhs.nb_source_links() <= ibind.len(), "Unbound sources");
        assert!(rhs.nb_target_links() <= obind.len(), "Unbound targets");

        if hints.subnet_binding.is_some()
            && lhs.is_top()
            && lhs.nb_gates() + rhs.nb_gates() > self.config.flat_check_bound
        {
            return self.check_hier(lhs.net(), rhs.net(), hints);
        }

        assert_eq!(
            lhs.is_comb(),
            rhs.is_comb(),
            "Cannot compare a combinatorial netlist to a sequential one"
        );
        if lhs.is_comb() {
            return self.check_comb(lhs, rhs, ibind, obind);
        }
        if let Some(tbind) = &hints.trigger_binding {
            return self.check_seq_triggers(lhs, rhs, ibind, obind, tbind);
        }
        if let Some(enc) = &hints.state_encoding {
            return self.check_seq_encoded(lhs, rhs, ibind, obind, enc);
        }
        panic!("Unimplemented equivalence check for sequential netlists without trigger binding or state encoding");
    }

    /// Check corresponding subnets one by one
    fn check_hier(&self, lhs: &GNet, rhs: &GNet, hints: &Hints) -> Result<Verdict> {
        assert!(!lhs.is_flat() && !rhs.is_flat(), "Hierarchical check of flat netlists");
        assert_eq!(lhs.nb_subnets(), rhs.nb_subnets());
        let (Some(sbind), Some(ibind), Some(obind)) = (
            &hints.subnet_binding,
            &hints.source_binding,
            &hints.target_binding,
        ) else {
            unreachable!()
        };
        assert_eq!(lhs.nb_subnets(), sbind.len(), "Every subnet must be bound");
        let Some(inner) = &hints.inner_binding else {
            panic!("Hierarchical checking requires the inner binding");
        };
        debug!("Checking {} subnets separately", sbind.len());

        for (&ls, &rs) in sbind {
            let lsub = lhs.subnet_view(ls);
            let rsub = rhs.subnet_view(rs);
            let lookup = |l: &Link, top: &GateBinding| -> Link {
                match top.get(l).or_else(|| inner.get(l)) {
                    Some(r) => *r,
                    None => panic!("Boundary link {} of subnet {} is not bound", l, ls),
                }
            };
            let imap: GateBinding = lsub
                .source_links()
                .iter()
                .map(|l| (*l, lookup(l, ibind)))
                .collect();
            let omap: GateBinding = lsub
                .target_links()
                .iter()
                .map(|l| (*l, lookup(l, obind)))
                .collect();
            let tbind = hints.trigger_binding.as_ref().map(|t| {
                t.iter()
                    .filter(|(l, _)| lsub.contains(l.source))
                    .map(|(l, r)| (*l, *r))
                    .collect()
            });
            let sub_hints = Hints {
                source_binding: Some(imap),
                target_binding: Some(omap),
                trigger_binding: tbind,
                ..Default::default()
            };
            let verdict = self.check_views(lsub, rsub, &sub_hints)?;
            if !verdict.is_equal() {
                warn!("Subnets {} and {} differ", ls, rs);
                return Ok(verdict);
            }
        }
        Ok(Verdict::Equal)
    }

    fn check_comb(
        &self,
        lhs: NetView<'_>,
        rhs: NetView<'_>,
        ibind: &GateBinding,
        obind: &GateBinding,
    ) -> Result<Verdict> {
        if driver_pairs(ibind).len() <= self.config.sim_check_bound {
            Ok(self.check_by_simulation(lhs, rhs, ibind, obind))
        } else {
            self.check_by_sat(
                &[lhs, rhs],
                GateConnect::default(),
                &pins(ibind, 0, 1),
                &pins(obind, 0, 1),
            )
        }
    }

    /// Cut the bound triggers: their outputs become inputs and their inputs become outputs
    fn check_seq_triggers(
        &self,
        lhs: NetView<'_>,
        rhs: NetView<'_>,
        ibind: &GateBinding,
        obind: &GateBinding,
        tbind: &GateBinding,
    ) -> Result<Verdict> {
        let mut imap = ibind.clone();
        let mut omap = obind.clone();
        for (l, r) in tbind {
            let lt = lhs.gate(l.source);
            let rt = rhs.gate(r.source);
            assert_eq!(
                lt.func(),
                rt.func(),
                "Bound triggers {} and {} have different functions",
                lt.id(),
                rt.id()
            );
            assert_eq!(
                lt.arity(),
                rt.arity(),
                "Bound triggers {} and {} have different arities",
                lt.id(),
                rt.id()
            );
            imap.insert(Link::port(lt.id()), Link::port(rt.id()));
            for (a, b) in lt.inputs().iter().zip(rt.inputs()) {
                omap.insert(Link::port(a.node()), Link::port(b.node()));
            }
        }
        debug!("Cut {} triggers", tbind.len());
        self.check_comb(lhs, rhs, &imap, &omap)
    }

    /// Glue the netlists to the state encoder and decoder and check the whole
    fn check_seq_encoded(
        &self,
        lhs: NetView<'_>,
        rhs: NetView<'_>,
        ibind: &GateBinding,
        obind: &GateBinding,
        enc: &StateEncoding,
    ) -> Result<Verdict> {
        const LHS: usize = 0;
        const RHS: usize = 1;
        const ENC: usize = 2;
        const DEC: usize = 3;

        let mut connect = GateConnect::default();
        for (l, e) in &enc.lhs_tri_enc_in {
            let d = lhs.gate(l.source).input(0).node();
            connect.insert(NetGate::new(ENC, e.source), NetGate::new(LHS, d));
        }
        for (l, d) in &enc.lhs_tri_dec_out {
            connect.insert(NetGate::new(LHS, l.source), NetGate::new(DEC, d.source));
        }

        let mut outs = pins(obind, LHS, RHS);
        for (r, e) in &enc.rhs_tri_enc_out {
            let d = rhs.gate(r.source).input(0).node();
            outs.push((NetGate::new(ENC, e.source), NetGate::new(RHS, d)));
        }
        let mut ins = pins(ibind, LHS, RHS);
        for (r, d) in &enc.rhs_tri_dec_in {
            ins.push((NetGate::new(DEC, d.source), NetGate::new(RHS, r.source)));
        }
        debug!(
            "Checking through a state encoding of {} triggers",
            enc.rhs_tri_enc_out.len()
        );
        self.check_by_sat(
            &[lhs, rhs, enc.encoder.view(), enc.decoder.view()],
            connect,
            &ins,
            &outs,
        )
    }

    fn check_by_simulation(
        &self,
        lhs: NetView<'_>,
        rhs: NetView<'_>,
        ibind: &GateBinding,
        obind: &GateBinding,
    ) -> Verdict {
        let (lhs_in, rhs_in): (Vec<GateId>, Vec<GateId>) =
            driver_pairs(ibind).into_iter().unzip();
        let (lhs_out, rhs_out): (Vec<GateId>, Vec<GateId>) =
            driver_pairs(obind).into_iter().unzip();
        debug!(
            "Simulating all patterns of {} inputs on {} outputs",
            lhs_in.len(),
            lhs_out.len()
        );
        let mut lsim = SimpleSimulator::compile(lhs, &lhs_in, &lhs_out);
        let mut rsim = SimpleSimulator::compile(rhs, &rhs_in, &rhs_out);
        let nb_patterns = if lhs_in.len() >= 6 {
            64
        } else {
            1 << lhs_in.len()
        };
        for w in exhaustive_patterns(lhs_in.len()) {
            let lres = lsim.run_once(&w);
            let rres = rsim.run_once(&w);
            if lres == rres {
                continue;
            }
            let Some(p) = (0..nb_patterns)
                .find(|p| lres.iter().zip(&rres).any(|(a, b)| pattern_bit(a ^ b, *p)))
            else {
                continue;
            };
            let inputs: Vec<(bool, bool)> = w
                .iter()
                .map(|v| (pattern_bit(*v, p), pattern_bit(*v, p)))
                .collect();
            let outputs: Vec<(bool, bool)> = lres
                .iter()
                .zip(&rres)
                .map(|(a, b)| (pattern_bit(*a, p), pattern_bit(*b, p)))
                .collect();
            warn!("Netlists differ");
            warn!("Inputs: {}", format_values(&inputs));
            warn!("Outputs: {}", format_values(&outputs));
            return Verdict::NotEqual(Some(Counterexample {
                inputs,
                outputs,
                dimacs: None,
            }));
        }
        Verdict::Equal
    }

    fn check_by_sat(
        &self,
        nets: &[NetView<'_>],
        connect: GateConnect,
        ins: &[(NetGate, NetGate)],
        outs: &[(NetGate, NetGate)],
    ) -> Result<Verdict> {
        let mut encoder = Encoder::with_connect(connect);
        let mut in_vars = Vec::with_capacity(ins.len());
        for (l, r) in ins {
            let x = encoder.var(l.net, l.gate, 0);
            let y = encoder.var(r.net, r.gate, 0);
            encoder.encode_buf(y, x, true);
            in_vars.push((x, y));
        }
        for (i, net) in nets.iter().enumerate() {
            encoder.encode_net(i, *net, 0);
        }
        let mut out_vars = Vec::with_capacity(outs.len());
        let mut exists_diff = Vec::with_capacity(outs.len());
        for (l, r) in outs {
            let x1 = encoder.var(l.net, l.gate, 0);
            let x2 = encoder.var(r.net, r.gate, 0);
            let y = encoder.new_var();
            encoder.encode_xor(y, x1, x2, true);
            exists_diff.push(lit(y, true));
            out_vars.push((x1, x2));
        }
        encoder.add_clause(exists_diff);
        debug!(
            "Solving SAT problem with {} variables and {} clauses",
            encoder.context().nb_vars(),
            encoder.context().nb_clauses()
        );

        let oracle = self.config.solver.oracle();
        if !encoder.solve(oracle.as_ref())? {
            return Ok(Verdict::Equal);
        }
        let ctx = encoder.context();
        let values = |vars: &[(u32, u32)]| -> Vec<(bool, bool)> {
            vars.iter()
                .map(|(a, b)| (ctx.value(*a), ctx.value(*b)))
                .collect()
        };
        let inputs = values(&in_vars);
        let outputs = values(&out_vars);
        warn!("Netlists differ");
        warn!("Inputs: {}", format_values(&inputs));
        warn!("Outputs: {}", format_values(&outputs));
        self.dump(&encoder);
        Ok(Verdict::NotEqual(Some(Counterexample {
            inputs,
            outputs,
            dimacs: Some(ctx.dimacs()?),
        })))
    }

    /// Write the formula to the configured file, if any
    fn dump(&self, encoder: &Encoder) {
        let Some(path) = &self.config.dump_path else {
            return;
        };
        let res = std::fs::File::create(path).and_then(|f| {
            let mut w = std::io::BufWriter::new(f);
            encoder.context().write_dimacs(&mut w)
        });
        match res {
            Ok(()) => warn!("Failing formula written to {}", path.display()),
            Err(e) => error!("Unable to write {}: {}", path.display(), e),
        }
    }
}
