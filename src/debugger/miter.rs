//! Miter construction: a single netlist whose output is one iff two netlists differ

use log::error;

use crate::debugger::hints::{GateBinding, Hints};
use crate::error::{Error, Result};
use crate::network::{GNet, GateId, GateIdMap, GateSymbol, Link, Signal};

/// Check that two netlists can be combined into a miter with these bindings
fn check_miterable(lhs: &GNet, rhs: &GNet, hints: &Hints) -> Result<()> {
    if lhs.nb_source_links() != rhs.nb_source_links() {
        return Err(Error::MiterInputCount(
            lhs.nb_source_links(),
            rhs.nb_source_links(),
        ));
    }
    if lhs.nb_target_links() != rhs.nb_target_links() {
        return Err(Error::MiterOutputCount(
            lhs.nb_target_links(),
            rhs.nb_target_links(),
        ));
    }
    let empty = GateBinding::new();
    let ibind = hints.source_binding.as_ref().unwrap_or(&empty);
    let obind = hints.target_binding.as_ref().unwrap_or(&empty);
    let mut sources: Vec<&Link> = lhs.source_links().iter().collect();
    sources.sort();
    if let Some(l) = sources.into_iter().find(|l| !ibind.contains_key(l)) {
        return Err(Error::UnboundSource(*l));
    }
    let mut targets: Vec<&Link> = lhs.target_links().iter().collect();
    targets.sort();
    if let Some(l) = targets.into_iter().find(|l| !obind.contains_key(l)) {
        return Err(Error::UnboundTarget(*l));
    }
    Ok(())
}

/// Feed a source link of an imported netlist from a miter input
fn connect_source(miter: &mut GNet, map: &GateIdMap, link: &Link, x: GateId) {
    let t = map[&link.target];
    if link.is_port() {
        miter.set_gate(t, GateSymbol::Nop, vec![Signal::always(x)]);
    } else {
        let gate = miter.gate(t);
        let func = gate.func();
        let mut inputs = gate.inputs().to_vec();
        let i = link.input as usize;
        inputs[i] = inputs[i].with_node(x);
        miter.set_gate(t, func, inputs);
    }
}

/// Gate of the miter driving a target link of an imported netlist
fn output_driver(miter: &mut GNet, map: &GateIdMap, link: &Link) -> GateId {
    let g = map[&link.source];
    let gate = miter.gate(g);
    if gate.is_target() {
        let inputs = gate.inputs().to_vec();
        miter.set_gate(g, GateSymbol::Nop, inputs);
    }
    g
}

/// Build the miter of two netlists
///
/// Every pair of bound sources is fed by a common new input, and every pair of
/// bound targets is compared with a Xor. The single output is the Or of the
/// comparisons. The netlists must have the same number of sources and targets,
/// and all sources and targets of the left netlist must be bound.
pub fn miter(lhs: &GNet, rhs: &GNet, hints: &Hints) -> Result<GNet> {
    if let Err(e) = check_miterable(lhs, rhs, hints) {
        error!("Unable to build the miter: {}", e);
        return Err(e);
    }
    let empty = GateBinding::new();
    let ibind = hints.source_binding.as_ref().unwrap_or(&empty);
    let obind = hints.target_binding.as_ref().unwrap_or(&empty);

    let mut ret = GNet::new();
    let lmap = ret.add_net(lhs);
    let rmap = ret.add_net(rhs);
    ret.flatten();

    for (l, r) in ibind {
        let x = ret.add_in();
        connect_source(&mut ret, &lmap, l, x);
        connect_source(&mut ret, &rmap, r, x);
    }

    // Placeholders for external drivers that are now fed by miter inputs
    for (net, map) in [(lhs, &lmap), (rhs, &rmap)] {
        let mut unused: Vec<GateId> = map
            .iter()
            .filter(|(old, new)| !net.contains(**old) && ret.gate(**new).fanout() == 0)
            .map(|(_, new)| *new)
            .collect();
        unused.sort();
        for g in unused {
            ret.remove_gate(g);
        }
    }

    let mut diffs = Vec::with_capacity(obind.len());
    for (l, r) in obind {
        let a = output_driver(&mut ret, &lmap, l);
        let b = output_driver(&mut ret, &rmap, r);
        diffs.push(ret.add_xor(&[a, b]));
    }
    let y = if diffs.is_empty() {
        ret.add_zero()
    } else {
        ret.add_or(&diffs)
    };
    ret.add_out(y);
    ret.sort_topologically();
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::generators::nary::{make_andn, make_nor};
    use crate::sim::{exhaustive_patterns, SimpleSimulator};

    fn miter_io(net: &GNet) -> (Vec<GateId>, GateId) {
        let mut inputs: Vec<GateId> = net.source_links().iter().map(|l| l.source).collect();
        inputs.sort();
        let out = net
            .target_links()
            .iter()
            .next()
            .map(|l| l.source)
            .unwrap();
        (inputs, out)
    }

    #[test]
    fn test_self_miter() {
        let (net, _, _) = make_nor(4);
        let mut gmap = GateIdMap::default();
        let copy = net.clone_with(&mut gmap);
        let hints = Hints::from_map(&net, &copy, &gmap);
        let m = miter(&net, &copy, &hints).unwrap();
        assert_eq!(m.nb_target_links(), 1);
        assert_eq!(m.nb_source_links(), net.nb_source_links());
        assert!(m.is_sorted());
        m.check();

        let (inputs, out) = miter_io(&m);
        let mut sim = SimpleSimulator::compile(m.view(), &inputs, &[out]);
        for w in exhaustive_patterns(inputs.len()) {
            assert_eq!(sim.run_once(&w), vec![0]);
        }
    }

    #[test]
    fn test_miter_nor_andn() {
        let (nor, nor_in, nor_out) = make_nor(3);
        let (andn, andn_in, andn_out) = make_andn(3);
        let mut hints = Hints::default();
        hints.source_binding = Some(
            nor_in
                .iter()
                .zip(&andn_in)
                .map(|(a, b)| (Link::port(*a), Link::port(*b)))
                .collect(),
        );
        hints.target_binding = Some(
            [(Link::port(nor_out), Link::port(andn_out))]
                .into_iter()
                .collect(),
        );
        let m = miter(&nor, &andn, &hints).unwrap();
        let (inputs, out) = miter_io(&m);
        assert_eq!(inputs.len(), 3);
        let mut sim = SimpleSimulator::compile(m.view(), &inputs, &[out]);
        assert_eq!(sim.run_once(&[0xff, 0x0f, 0x33]), vec![0]);
    }

    #[test]
    fn test_miter_difference() {
        let mut lhs = GNet::new();
        let a = lhs.add_in();
        let b = lhs.add_in();
        let x = lhs.add_and(&[a, b]);
        let o = lhs.add_out(x);
        let mut rhs = GNet::new();
        let c = rhs.add_in();
        let d = rhs.add_in();
        let y = rhs.add_or(&[c, d]);
        let p = rhs.add_out(y);
        let mut hints = Hints::default();
        hints.source_binding = Some(
            [(Link::port(a), Link::port(c)), (Link::port(b), Link::port(d))]
                .into_iter()
                .collect(),
        );
        hints.target_binding = Some([(Link::port(o), Link::port(p))].into_iter().collect());
        let m = miter(&lhs, &rhs, &hints).unwrap();
        let (inputs, out) = miter_io(&m);
        let mut sim = SimpleSimulator::compile(m.view(), &inputs, &[out]);
        // Differ when exactly one input is set
        assert_eq!(sim.run_once(&[0b1100, 0b1010]), vec![0b0110]);
    }

    #[test]
    fn test_miter_errors() {
        let (nor3, _, _) = make_nor(3);
        let (nor4, _, _) = make_nor(4);
        let hints = Hints::default();
        assert!(matches!(
            miter(&nor3, &nor4, &hints),
            Err(Error::MiterInputCount(3, 4))
        ));
        assert!(matches!(
            miter(&nor3, &nor3, &hints),
            Err(Error::UnboundSource(_))
        ));
    }

    #[test]
    fn test_miter_external_driver() {
        // Netlists fed by drivers they do not contain
        let mut lhs = GNet::new();
        let x = lhs.add_not(GateId::new(100));
        let o = lhs.add_out(x);
        let mut rhs = GNet::new();
        let y = rhs.add_not(GateId::new(200));
        let p = rhs.add_out(y);
        let mut hints = Hints::default();
        hints.source_binding = Some(
            [(
                Link::new(GateId::new(100), x, 0),
                Link::new(GateId::new(200), y, 0),
            )]
            .into_iter()
            .collect(),
        );
        hints.target_binding = Some([(Link::port(o), Link::port(p))].into_iter().collect());
        let m = miter(&lhs, &rhs, &hints).unwrap();
        assert_eq!(m.nb_source_links(), 1);
        assert_eq!(m.nb_target_links(), 1);
    }
}
