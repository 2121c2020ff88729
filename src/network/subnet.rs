use fxhash::{FxHashMap, FxHashSet};

use crate::network::{Gate, GateId, Link};

/// A set of gates of a netlist, with its ordering and boundary
///
/// The top level of a [`GNet`](crate::network::GNet) and each of its subnets are
/// represented this way. The boundary is described by links:
/// * a source link enters the subnet, either from a gate outside of it or as
///   the port link of a source gate inside it;
/// * a target link leaves the subnet, either toward a gate outside of it or as
///   the port link of an output gate inside it.
#[derive(Clone, Debug, Default)]
pub struct Subnet {
    gates: Vec<GateId>,
    index: FxHashMap<GateId, usize>,
    source_links: FxHashSet<Link>,
    target_links: FxHashSet<Link>,
    constants: FxHashSet<GateId>,
    triggers: FxHashSet<GateId>,
    nb_connects: usize,
    sorted: bool,
}

impl Subnet {
    /// Gates, in topological order if the subnet is sorted
    pub fn gates(&self) -> &[GateId] {
        &self.gates
    }

    /// Number of gates
    pub fn nb_gates(&self) -> usize {
        self.gates.len()
    }

    /// Returns whether the subnet has no gate
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Returns whether the gate belongs to the subnet
    pub fn contains(&self, gate: GateId) -> bool {
        self.index.contains_key(&gate)
    }

    /// Links entering the subnet
    pub fn source_links(&self) -> &FxHashSet<Link> {
        &self.source_links
    }

    /// Links leaving the subnet
    pub fn target_links(&self) -> &FxHashSet<Link> {
        &self.target_links
    }

    /// Number of links entering the subnet
    pub fn nb_source_links(&self) -> usize {
        self.source_links.len()
    }

    /// Number of links leaving the subnet
    pub fn nb_target_links(&self) -> usize {
        self.target_links.len()
    }

    /// Returns whether the link enters the subnet
    pub fn has_source_link(&self, link: &Link) -> bool {
        self.source_links.contains(link)
    }

    /// Returns whether the link leaves the subnet
    pub fn has_target_link(&self, link: &Link) -> bool {
        self.target_links.contains(link)
    }

    /// Constant gates
    pub fn constants(&self) -> &FxHashSet<GateId> {
        &self.constants
    }

    /// Triggered gates (latches, flip-flops)
    pub fn triggers(&self) -> &FxHashSet<GateId> {
        &self.triggers
    }

    /// Total number of gate inputs
    pub fn nb_connects(&self) -> usize {
        self.nb_connects
    }

    /// Returns whether the gate order is topological
    pub fn is_sorted(&self) -> bool {
        self.sorted || self.gates.len() <= 1
    }

    /// Returns whether the subnet has no triggered gate
    pub fn is_comb(&self) -> bool {
        self.triggers.is_empty()
    }

    pub(crate) fn insert_gate(&mut self, gate: &Gate) {
        debug_assert!(!self.contains(gate.id()));
        self.index.insert(gate.id(), self.gates.len());
        self.gates.push(gate.id());
        self.classify(gate);
        self.sorted = self.gates.len() <= 1;
    }

    pub(crate) fn erase_gate(&mut self, gate: &Gate) {
        let pos = self
            .index
            .remove(&gate.id())
            .expect("Gate does not belong to the subnet");
        self.gates.swap_remove(pos);
        if pos < self.gates.len() {
            self.index.insert(self.gates[pos], pos);
        }
        self.unclassify(gate);
        self.sorted = self.gates.len() <= 1;
    }

    /// Account for the function and inputs of a member gate
    pub(crate) fn classify(&mut self, gate: &Gate) {
        if gate.is_value() {
            self.constants.insert(gate.id());
        }
        if gate.is_trigger() {
            self.triggers.insert(gate.id());
        }
        self.nb_connects += gate.arity();
    }

    pub(crate) fn unclassify(&mut self, gate: &Gate) {
        self.constants.remove(&gate.id());
        self.triggers.remove(&gate.id());
        self.nb_connects -= gate.arity();
    }

    pub(crate) fn mark_unsorted(&mut self) {
        self.sorted = self.gates.len() <= 1;
    }

    /// Update the boundary for the port link of a gate
    pub(crate) fn refresh_port(&mut self, id: GateId, gate: Option<&Gate>, member: bool) {
        let port = Link::port(id);
        self.source_links.remove(&port);
        self.target_links.remove(&port);
        if let (Some(g), true) = (gate, member) {
            if g.is_source() {
                self.source_links.insert(port);
            }
            if g.is_target() {
                self.target_links.insert(port);
            }
        }
    }

    /// Update the boundary for a link between two gates
    pub(crate) fn refresh_edge(&mut self, link: Link, exists: bool, src_in: bool, tgt_in: bool) {
        self.source_links.remove(&link);
        self.target_links.remove(&link);
        if !exists {
            return;
        }
        if tgt_in && !src_in {
            self.source_links.insert(link);
        }
        if src_in && !tgt_in {
            self.target_links.insert(link);
        }
    }

    /// Recompute the classification and boundary from scratch
    pub(crate) fn rebuild(
        &mut self,
        gates: &FxHashMap<GateId, Gate>,
        member: &dyn Fn(GateId) -> bool,
    ) {
        self.source_links.clear();
        self.target_links.clear();
        self.constants.clear();
        self.triggers.clear();
        self.nb_connects = 0;
        for id in self.gates.clone() {
            let gate = &gates[&id];
            self.classify(gate);
            self.refresh_port(id, Some(gate), true);
            for l in gate.input_links() {
                self.refresh_edge(l, true, member(l.source), true);
            }
            for l in gate.links() {
                self.refresh_edge(*l, true, true, member(l.target));
            }
        }
    }

    pub(crate) fn set_order(&mut self, order: Vec<GateId>) {
        assert_eq!(order.len(), self.gates.len());
        self.index = order.iter().enumerate().map(|(i, g)| (*g, i)).collect();
        self.gates = order;
        self.sorted = true;
    }

    pub(crate) fn clear(&mut self) {
        *self = Subnet::default();
    }
}
