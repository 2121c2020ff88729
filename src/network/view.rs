use std::borrow::Cow;

use fxhash::FxHashSet;

use crate::network::{topo, GNet, Gate, GateId, Link, Subnet};

/// Read-only view of a netlist or of one of its subnets
///
/// The view shares the gate table of the whole netlist, so that drivers
/// outside of a subnet can still be inspected.
#[derive(Clone, Copy)]
pub struct NetView<'a> {
    net: &'a GNet,
    part: &'a Subnet,
}

impl<'a> NetView<'a> {
    pub(crate) fn new(net: &'a GNet, part: &'a Subnet) -> Self {
        NetView { net, part }
    }

    /// Returns whether the view covers the whole netlist
    pub fn is_top(&self) -> bool {
        std::ptr::eq(self.part, self.net.top())
    }

    /// Netlist the view belongs to
    pub fn net(&self) -> &'a GNet {
        self.net
    }

    /// Gates of the view
    pub fn gates(&self) -> &'a [GateId] {
        self.part.gates()
    }

    /// Gates of the view in topological order, computed if the view is not sorted
    pub fn ordered_gates(&self) -> Cow<'a, [GateId]> {
        if self.part.is_sorted() {
            return Cow::Borrowed(self.part.gates());
        }
        let table = self.net.gate_table();
        match topo::comb_order(table, self.part.gates(), |g| self.part.contains(g)) {
            Some(order) => Cow::Owned(order),
            None => {
                panic!("Unable to find a valid topological sort: there must be a combinatorial loop")
            }
        }
    }

    /// Get a gate of the netlist, not necessarily in the view
    pub fn gate(&self, id: GateId) -> &'a Gate {
        self.net.gate(id)
    }

    /// Get a gate of the netlist if present
    pub fn try_gate(&self, id: GateId) -> Option<&'a Gate> {
        self.net.try_gate(id)
    }

    /// Returns whether the gate belongs to the view
    pub fn contains(&self, id: GateId) -> bool {
        self.part.contains(id)
    }

    /// Number of gates in the view
    pub fn nb_gates(&self) -> usize {
        self.part.nb_gates()
    }

    /// Links entering the view
    pub fn source_links(&self) -> &'a FxHashSet<Link> {
        self.part.source_links()
    }

    /// Links leaving the view
    pub fn target_links(&self) -> &'a FxHashSet<Link> {
        self.part.target_links()
    }

    /// Number of links entering the view
    pub fn nb_source_links(&self) -> usize {
        self.part.nb_source_links()
    }

    /// Number of links leaving the view
    pub fn nb_target_links(&self) -> usize {
        self.part.nb_target_links()
    }

    /// Returns whether the link enters the view
    pub fn has_source_link(&self, link: &Link) -> bool {
        self.part.has_source_link(link)
    }

    /// Returns whether the link leaves the view
    pub fn has_target_link(&self, link: &Link) -> bool {
        self.part.has_target_link(link)
    }

    /// Triggered gates of the view
    pub fn triggers(&self) -> &'a FxHashSet<GateId> {
        self.part.triggers()
    }

    /// Returns whether the view has no triggered gate
    pub fn is_comb(&self) -> bool {
        self.part.is_comb()
    }
}
