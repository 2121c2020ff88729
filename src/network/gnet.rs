use std::collections::BTreeSet;
use std::fmt;

use fxhash::{FxHashMap, FxHashSet};

use crate::network::{Gate, GateId, GateSymbol, Link, NetView, Signal, Subnet};

/// Index of a subnet in its netlist
pub type SubnetId = usize;

/// Correspondence between the gate identifiers of two netlists
pub type GateIdMap = FxHashMap<GateId, GateId>;

type StrashKey = (GateSymbol, Vec<Signal>);

/// Hierarchical gate-level netlist
///
/// Gates are stored by identifier. Each gate may belong to at most one subnet;
/// gates outside of any subnet are orphans. The netlist keeps the boundary
/// (source and target links) of the top level and of each subnet up to date
/// after every edit, and structurally hashes combinatorial gates so that
/// [`GNet::add_gate`] never creates a duplicate.
///
/// A gate input may reference a gate that is not in the netlist: the
/// corresponding link is then a source link.
#[derive(Clone, Default)]
pub struct GNet {
    gates: FxHashMap<GateId, Gate>,
    next_id: u32,
    top: Subnet,
    subnets: Vec<Subnet>,
    subnet_of: FxHashMap<GateId, SubnetId>,
    empty_subnets: BTreeSet<SubnetId>,
    nb_gates_in_subnets: usize,
    strash: FxHashMap<StrashKey, GateId>,
}

fn edge_exists(gates: &FxHashMap<GateId, Gate>, link: &Link) -> bool {
    if link.is_port() {
        return false;
    }
    gates
        .get(&link.target)
        .and_then(|t| t.inputs().get(link.input as usize))
        .map_or(false, |s| s.node() == link.source)
}

/// Sources and outputs are never shared
fn is_shared(func: GateSymbol, inputs: &[Signal]) -> bool {
    func != GateSymbol::Out && !(inputs.is_empty() && !func.is_constant())
}

impl GNet {
    /// Create a new empty netlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of gates
    pub fn nb_gates(&self) -> usize {
        self.gates.len()
    }

    /// Returns whether the netlist has no gate
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// All gates, in topological order if the netlist is sorted
    pub fn gates(&self) -> &[GateId] {
        self.top.gates()
    }

    /// Get the gate with this identifier
    pub fn gate(&self, id: GateId) -> &Gate {
        match self.gates.get(&id) {
            Some(g) => g,
            None => panic!("Gate {} is not in the netlist", id),
        }
    }

    /// Get the gate with this identifier, if present
    pub fn try_gate(&self, id: GateId) -> Option<&Gate> {
        self.gates.get(&id)
    }

    /// Returns whether the gate is in the netlist
    pub fn contains(&self, id: GateId) -> bool {
        self.gates.contains_key(&id)
    }

    /// Top-level partition, covering all gates
    pub fn top(&self) -> &Subnet {
        &self.top
    }

    /// Read-only view of the whole netlist
    pub fn view(&self) -> NetView<'_> {
        NetView::new(self, &self.top)
    }

    /// Read-only view of one subnet
    pub fn subnet_view(&self, sid: SubnetId) -> NetView<'_> {
        NetView::new(self, &self.subnets[sid])
    }

    /// Links entering the netlist
    pub fn source_links(&self) -> &FxHashSet<Link> {
        self.top.source_links()
    }

    /// Links leaving the netlist
    pub fn target_links(&self) -> &FxHashSet<Link> {
        self.top.target_links()
    }

    /// Number of links entering the netlist
    pub fn nb_source_links(&self) -> usize {
        self.top.nb_source_links()
    }

    /// Number of links leaving the netlist
    pub fn nb_target_links(&self) -> usize {
        self.top.nb_target_links()
    }

    /// Returns whether the link enters the netlist
    pub fn has_source_link(&self, link: &Link) -> bool {
        self.top.has_source_link(link)
    }

    /// Returns whether the link leaves the netlist
    pub fn has_target_link(&self, link: &Link) -> bool {
        self.top.has_target_link(link)
    }

    /// Constant gates
    pub fn constants(&self) -> &FxHashSet<GateId> {
        self.top.constants()
    }

    /// Triggered gates
    pub fn triggers(&self) -> &FxHashSet<GateId> {
        self.top.triggers()
    }

    /// Total number of gate inputs
    pub fn nb_connects(&self) -> usize {
        self.top.nb_connects()
    }

    /// Returns whether the gate order is topological
    pub fn is_sorted(&self) -> bool {
        self.top.is_sorted()
    }

    /// Returns whether the netlist is purely combinatorial
    pub fn is_comb(&self) -> bool {
        self.top.is_comb()
    }

    /// Number of subnets, including empty ones
    pub fn nb_subnets(&self) -> usize {
        self.subnets.len()
    }

    /// Get a subnet
    pub fn subnet(&self, sid: SubnetId) -> &Subnet {
        &self.subnets[sid]
    }

    /// Subnet a gate belongs to, if any
    pub fn subnet_of(&self, id: GateId) -> Option<SubnetId> {
        self.subnet_of.get(&id).copied()
    }

    /// Returns whether the netlist has no subnet
    pub fn is_flat(&self) -> bool {
        self.subnets.is_empty()
    }

    /// Returns whether some gate belongs to no subnet
    pub fn has_orphans(&self) -> bool {
        self.nb_gates_in_subnets < self.gates.len()
    }

    /// Returns whether some subnet has no gate
    pub fn has_empty_subnets(&self) -> bool {
        !self.empty_subnets.is_empty()
    }

    /// Returns whether the netlist is flat, or partitioned exactly by non-empty subnets
    pub fn is_well_formed(&self) -> bool {
        self.is_flat() || (!self.has_orphans() && !self.has_empty_subnets())
    }

    /// Create a placeholder gate, without function or inputs
    pub fn new_gate(&mut self) -> GateId {
        self.alloc(GateSymbol::Nop, Vec::new())
    }

    /// Add a gate, or return an existing gate computing the same function
    ///
    /// Outputs and sources are always created. For decomposable functions, if
    /// the base function already exists on the same inputs, a negation of it is
    /// returned instead.
    pub fn add_gate(&mut self, func: GateSymbol, inputs: Vec<Signal>) -> GateId {
        if is_shared(func, &inputs) {
            let key = (func, inputs);
            if let Some(id) = self.strash.get(&key) {
                return *id;
            }
            let (func, inputs) = key;
            if let Some(base) = func.function() {
                let base_key = (base, inputs);
                if let Some(&b) = self.strash.get(&base_key) {
                    return self.add_gate(GateSymbol::Not, vec![Signal::always(b)]);
                }
                return self.alloc(func, base_key.1);
            }
            return self.alloc(func, inputs);
        }
        self.alloc(func, inputs)
    }

    /// Add a primary input
    pub fn add_in(&mut self) -> GateId {
        self.add_gate(GateSymbol::In, Vec::new())
    }

    /// Add a primary output
    pub fn add_out(&mut self, x: GateId) -> GateId {
        self.add_gate(GateSymbol::Out, vec![Signal::always(x)])
    }

    /// Add a constant zero
    pub fn add_zero(&mut self) -> GateId {
        self.add_gate(GateSymbol::Zero, Vec::new())
    }

    /// Add a constant one
    pub fn add_one(&mut self) -> GateId {
        self.add_gate(GateSymbol::One, Vec::new())
    }

    /// Add a buffer
    pub fn add_nop(&mut self, x: GateId) -> GateId {
        self.add_gate(GateSymbol::Nop, vec![Signal::always(x)])
    }

    /// Add an inverter
    pub fn add_not(&mut self, x: GateId) -> GateId {
        self.add_gate(GateSymbol::Not, vec![Signal::always(x)])
    }

    /// Add a gate whose inputs are all plain data signals
    pub fn add_nary(&mut self, func: GateSymbol, xs: &[GateId]) -> GateId {
        let inputs = xs.iter().map(|x| Signal::always(*x)).collect();
        self.add_gate(func, inputs)
    }

    /// Add an And gate
    pub fn add_and(&mut self, xs: &[GateId]) -> GateId {
        self.add_nary(GateSymbol::And, xs)
    }

    /// Add an Or gate
    pub fn add_or(&mut self, xs: &[GateId]) -> GateId {
        self.add_nary(GateSymbol::Or, xs)
    }

    /// Add a Xor gate
    pub fn add_xor(&mut self, xs: &[GateId]) -> GateId {
        self.add_nary(GateSymbol::Xor, xs)
    }

    /// Add a Nand gate
    pub fn add_nand(&mut self, xs: &[GateId]) -> GateId {
        self.add_nary(GateSymbol::Nand, xs)
    }

    /// Add a Nor gate
    pub fn add_nor(&mut self, xs: &[GateId]) -> GateId {
        self.add_nary(GateSymbol::Nor, xs)
    }

    /// Add a Xnor gate
    pub fn add_xnor(&mut self, xs: &[GateId]) -> GateId {
        self.add_nary(GateSymbol::Xnor, xs)
    }

    /// Add a majority gate
    pub fn add_maj(&mut self, xs: &[GateId]) -> GateId {
        self.add_nary(GateSymbol::Maj, xs)
    }

    /// Add a latch, transparent while the enable is high
    pub fn add_latch(&mut self, d: GateId, ena: GateId) -> GateId {
        self.add_gate(
            GateSymbol::Latch,
            vec![Signal::always(d), Signal::level1(ena)],
        )
    }

    /// Add a rising-edge flip-flop
    pub fn add_dff(&mut self, d: GateId, clk: GateId) -> GateId {
        self.add_gate(GateSymbol::Dff, vec![Signal::always(d), Signal::posedge(clk)])
    }

    /// Add a rising-edge flip-flop with active-high reset and set
    pub fn add_dffrs(&mut self, d: GateId, clk: GateId, rst: GateId, set: GateId) -> GateId {
        self.add_gate(
            GateSymbol::DffRs,
            vec![
                Signal::always(d),
                Signal::posedge(clk),
                Signal::level1(rst),
                Signal::level1(set),
            ],
        )
    }

    /// Replace the function and inputs of an existing gate
    ///
    /// The gate keeps its identifier and fan-out; no deduplication happens.
    pub fn set_gate(&mut self, id: GateId, func: GateSymbol, inputs: Vec<Signal>) {
        assert!(self.contains(id), "Gate {} is not in the netlist", id);
        self.reserve_ids(&inputs);
        self.unregister(id);

        let old_links: Vec<Link> = self.gates[&id].input_links().collect();
        for l in &old_links {
            if let Some(d) = self.gates.get_mut(&l.source) {
                d.remove_link(*l);
            }
        }
        let sid = self.subnet_of(id);
        {
            let gate = &self.gates[&id];
            self.top.unclassify(gate);
            if let Some(s) = sid {
                self.subnets[s].unclassify(gate);
            }
        }
        if let Some(gate) = self.gates.get_mut(&id) {
            gate.set(func, inputs);
            assert!(gate.invariant(), "Invalid gate {:?}", gate);
        }
        self.connect_inputs(id);
        {
            let gate = &self.gates[&id];
            self.top.classify(gate);
            self.top.mark_unsorted();
            if let Some(s) = sid {
                self.subnets[s].classify(gate);
                self.subnets[s].mark_unsorted();
            }
        }
        self.refresh(id, &old_links, &[]);
        self.register(id);
    }

    /// Remove a gate; the gates it drives keep a dangling input, which becomes a source link
    pub fn remove_gate(&mut self, id: GateId) {
        assert!(self.contains(id), "Gate {} is not in the netlist", id);
        if self.nb_gates() == 1 {
            self.clear();
            return;
        }
        self.unregister(id);
        let Some(gate) = self.gates.remove(&id) else {
            return;
        };
        for l in gate.input_links() {
            if let Some(d) = self.gates.get_mut(&l.source) {
                d.remove_link(l);
            }
        }
        self.top.erase_gate(&gate);
        let old_sid = self.subnet_of.remove(&id);
        if let Some(s) = old_sid {
            self.subnets[s].erase_gate(&gate);
            self.nb_gates_in_subnets -= 1;
            if self.subnets[s].is_empty() {
                self.empty_subnets.insert(s);
            }
        }
        let mut extra: Vec<Link> = gate.input_links().collect();
        extra.extend_from_slice(gate.links());
        self.refresh(id, &extra, old_sid.as_slice());
    }

    /// Create a new empty subnet
    pub fn new_subnet(&mut self) -> SubnetId {
        self.subnets.push(Subnet::default());
        let sid = self.subnets.len() - 1;
        self.empty_subnets.insert(sid);
        sid
    }

    /// Move a gate to a subnet, or out of any subnet
    pub fn move_gate(&mut self, id: GateId, dst: Option<SubnetId>) {
        assert!(self.contains(id), "Gate {} is not in the netlist", id);
        if let Some(d) = dst {
            assert!(d < self.subnets.len(), "Subnet {} does not exist", d);
        }
        let src = self.subnet_of(id);
        if src == dst {
            return;
        }
        let gate = &self.gates[&id];
        if let Some(s) = src {
            self.subnets[s].erase_gate(gate);
            self.nb_gates_in_subnets -= 1;
            if self.subnets[s].is_empty() {
                self.empty_subnets.insert(s);
            }
        }
        match dst {
            Some(d) => {
                self.subnets[d].insert_gate(gate);
                self.nb_gates_in_subnets += 1;
                self.empty_subnets.remove(&d);
                self.subnet_of.insert(id, d);
            }
            None => {
                self.subnet_of.remove(&id);
            }
        }
        self.top.mark_unsorted();
        self.refresh(id, &[], src.as_slice());
    }

    /// Move all gates of the right subnet into the left one; the right one becomes empty
    pub fn merge_subnets(&mut self, lhs: SubnetId, rhs: SubnetId) {
        assert!(lhs != rhs, "Cannot merge subnet {} with itself", lhs);
        assert!(lhs < self.subnets.len() && rhs < self.subnets.len());
        let moved = std::mem::take(&mut self.subnets[rhs]);
        for &id in moved.gates() {
            self.subnet_of.insert(id, lhs);
            self.subnets[lhs].insert_gate(&self.gates[&id]);
        }
        if !self.subnets[lhs].is_empty() {
            self.empty_subnets.remove(&lhs);
        }
        self.empty_subnets.insert(rhs);
        self.rebuild_subnet(lhs);
        self.top.mark_unsorted();
    }

    /// Gather all orphan gates into a new subnet
    pub fn group_orphans(&mut self) -> SubnetId {
        assert!(
            !self.is_flat() && self.has_orphans(),
            "Orphans can only be grouped in a netlist with subnets"
        );
        let sid = self.new_subnet();
        let orphans: Vec<GateId> = self
            .top
            .gates()
            .iter()
            .filter(|g| !self.subnet_of.contains_key(g))
            .copied()
            .collect();
        for id in orphans {
            self.subnet_of.insert(id, sid);
            self.subnets[sid].insert_gate(&self.gates[&id]);
            self.nb_gates_in_subnets += 1;
        }
        self.empty_subnets.remove(&sid);
        self.rebuild_subnet(sid);
        self.top.mark_unsorted();
        sid
    }

    /// Drop all subnets
    pub fn flatten(&mut self) {
        self.subnets.clear();
        self.subnet_of.clear();
        self.empty_subnets.clear();
        self.nb_gates_in_subnets = 0;
    }

    /// Drop empty subnets and renumber the others, keeping their relative order
    pub fn remove_empty_subnets(&mut self) {
        let mut remap = vec![None; self.subnets.len()];
        let mut kept = Vec::new();
        for (i, s) in std::mem::take(&mut self.subnets).into_iter().enumerate() {
            if !s.is_empty() {
                remap[i] = Some(kept.len());
                kept.push(s);
            }
        }
        self.subnets = kept;
        for sid in self.subnet_of.values_mut() {
            if let Some(n) = remap[*sid] {
                *sid = n;
            }
        }
        self.empty_subnets.clear();
    }

    /// Import all gates and subnets of another netlist with fresh identifiers
    ///
    /// Drivers that are not part of the other netlist are imported as new
    /// placeholder sources. Returns the mapping from the other netlist's
    /// identifiers to the new ones.
    pub fn add_net(&mut self, other: &GNet) -> GateIdMap {
        let mut map = GateIdMap::default();
        for &id in other.gates() {
            let n = self.new_gate();
            map.insert(id, n);
        }
        for &id in other.gates() {
            let gate = other.gate(id);
            let inputs = gate
                .inputs()
                .iter()
                .map(|s| {
                    let d = match map.get(&s.node()) {
                        Some(d) => *d,
                        None => {
                            let d = self.new_gate();
                            map.insert(s.node(), d);
                            d
                        }
                    };
                    s.with_node(d)
                })
                .collect();
            self.set_gate(map[&id], gate.func(), inputs);
        }
        self.import_subnets(other, &map);
        map
    }

    fn import_subnets(&mut self, other: &GNet, map: &GateIdMap) {
        for sid in 0..other.nb_subnets() {
            let new_sid = self.new_subnet();
            for id in other.subnet(sid).gates() {
                self.move_gate(map[id], Some(new_sid));
            }
        }
    }

    /// Build an independent copy, filling the mapping from old to new identifiers
    ///
    /// Drivers that are not part of the netlist keep their identifiers in the copy,
    /// so that each of their links is still a separate source link. They are
    /// not part of the mapping. The copy is sorted topologically, which requires
    /// a well-formed netlist.
    pub fn clone_with(&self, map: &mut GateIdMap) -> GNet {
        assert!(
            self.is_well_formed(),
            "Cannot copy a netlist with orphans or empty subnets"
        );
        let mut net = GNet::new();
        let external: Vec<Signal> = self
            .source_links()
            .iter()
            .filter(|l| !self.contains(l.source))
            .map(|l| Signal::always(l.source))
            .collect();
        net.reserve_ids(&external);

        map.clear();
        for &id in self.gates() {
            map.insert(id, net.new_gate());
        }
        for &id in self.gates() {
            let gate = self.gate(id);
            let inputs = gate
                .inputs()
                .iter()
                .map(|s| s.with_node(map.get(&s.node()).copied().unwrap_or(s.node())))
                .collect();
            net.set_gate(map[&id], gate.func(), inputs);
        }
        net.import_subnets(self, map);
        net.sort_topologically();
        net
    }

    /// Remove all gates and subnets
    pub fn clear(&mut self) {
        self.gates.clear();
        self.top.clear();
        self.flatten();
        self.strash.clear();
    }

    /// Check consistency of the datastructure
    pub fn check(&self) {
        assert_eq!(self.top.nb_gates(), self.gates.len());
        for (id, gate) in &self.gates {
            assert_eq!(gate.id(), *id);
            assert!(self.top.contains(*id));
            assert!(gate.invariant(), "Invalid gate {:?}", gate);
            for l in gate.input_links() {
                if let Some(d) = self.gates.get(&l.source) {
                    assert!(d.links().contains(&l), "Missing fan-out link {}", l);
                }
            }
            for l in gate.links() {
                assert!(edge_exists(&self.gates, l), "Stale fan-out link {}", l);
            }
        }
        let mut top = self.top.clone();
        top.rebuild(&self.gates, &|g: GateId| self.gates.contains_key(&g));
        assert_eq!(top.source_links(), self.top.source_links());
        assert_eq!(top.target_links(), self.top.target_links());
        assert_eq!(top.nb_connects(), self.top.nb_connects());
        let mut in_subnets = 0;
        for (sid, subnet) in self.subnets.iter().enumerate() {
            in_subnets += subnet.nb_gates();
            assert_eq!(subnet.is_empty(), self.empty_subnets.contains(&sid));
            let mut s = subnet.clone();
            s.rebuild(&self.gates, &|g: GateId| self.subnet_of.get(&g) == Some(&sid));
            assert_eq!(s.source_links(), subnet.source_links());
            assert_eq!(s.target_links(), subnet.target_links());
            for g in subnet.gates() {
                assert_eq!(self.subnet_of(*g), Some(sid));
            }
        }
        assert_eq!(in_subnets, self.nb_gates_in_subnets);
    }

    pub(crate) fn set_orders(&mut self, top: Vec<GateId>, subnets: Vec<Vec<GateId>>) {
        self.top.set_order(top);
        for (s, order) in self.subnets.iter_mut().zip(subnets) {
            s.set_order(order);
        }
    }

    pub(crate) fn gate_table(&self) -> &FxHashMap<GateId, Gate> {
        &self.gates
    }

    /// Create a gate without deduplication
    fn alloc(&mut self, func: GateSymbol, inputs: Vec<Signal>) -> GateId {
        self.reserve_ids(&inputs);
        let id = GateId::new(self.next_id);
        self.next_id += 1;
        let gate = Gate::new(id, func, inputs);
        assert!(gate.invariant(), "Invalid gate {:?}", gate);
        self.top.insert_gate(&gate);
        self.gates.insert(id, gate);
        self.connect_inputs(id);
        self.refresh(id, &[], &[]);
        self.register(id);
        id
    }

    /// Identifiers used as drivers are never allocated to a new gate
    fn reserve_ids(&mut self, inputs: &[Signal]) {
        for s in inputs {
            if s.node().ind() >= self.next_id {
                self.next_id = s.node().ind() + 1;
            }
        }
    }

    /// Record the fan-out links of the inputs of a gate
    fn connect_inputs(&mut self, id: GateId) {
        let links: Vec<Link> = self.gates[&id].input_links().collect();
        for l in links {
            if let Some(d) = self.gates.get_mut(&l.source) {
                assert!(
                    !d.is_target(),
                    "Output gate {} cannot drive other gates",
                    l.source
                );
                d.add_link(l);
            }
        }
    }

    fn register(&mut self, id: GateId) {
        let gate = &self.gates[&id];
        if is_shared(gate.func(), gate.inputs()) {
            self.strash
                .entry((gate.func(), gate.inputs().to_vec()))
                .or_insert(id);
        }
    }

    fn unregister(&mut self, id: GateId) {
        let gate = &self.gates[&id];
        let key = (gate.func(), gate.inputs().to_vec());
        if self.strash.get(&key) == Some(&id) {
            self.strash.remove(&key);
        }
    }

    /// Update the boundaries touched by an edit of a gate
    ///
    /// The links considered are the current links of the gate, plus the ones
    /// given explicitly (links that were removed or left dangling).
    fn refresh(&mut self, id: GateId, extra: &[Link], extra_subnets: &[SubnetId]) {
        let mut links = extra.to_vec();
        if let Some(g) = self.gates.get(&id) {
            links.extend(g.input_links());
            links.extend_from_slice(g.links());
        }
        let mut sids = extra_subnets.to_vec();
        sids.extend(self.subnet_of(id));
        for l in &links {
            sids.extend(self.subnet_of(l.source));
            sids.extend(self.subnet_of(l.target));
        }
        sids.sort_unstable();
        sids.dedup();

        let GNet {
            gates,
            top,
            subnets,
            subnet_of,
            ..
        } = self;
        top.refresh_port(id, gates.get(&id), gates.contains_key(&id));
        for l in &links {
            top.refresh_edge(
                *l,
                edge_exists(gates, l),
                gates.contains_key(&l.source),
                gates.contains_key(&l.target),
            );
        }
        for sid in sids {
            let member = |g: GateId| subnet_of.get(&g) == Some(&sid);
            let subnet = &mut subnets[sid];
            subnet.refresh_port(id, gates.get(&id), member(id));
            for l in &links {
                subnet.refresh_edge(
                    *l,
                    edge_exists(gates, l),
                    member(l.source),
                    member(l.target),
                );
            }
        }
    }

    fn rebuild_subnet(&mut self, sid: SubnetId) {
        let GNet {
            gates,
            subnets,
            subnet_of,
            ..
        } = self;
        subnets[sid].rebuild(gates, &|g: GateId| subnet_of.get(&g) == Some(&sid));
    }
}

impl fmt::Display for GNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "GNet: {} gates, {} sources, {} targets, {} subnets",
            self.nb_gates(),
            self.nb_source_links(),
            self.nb_target_links(),
            self.nb_subnets()
        )?;
        for id in self.gates() {
            let gate = self.gate(*id);
            match self.subnet_of(*id) {
                Some(s) => writeln!(f, "  [{}] {:?}", s, gate)?,
                None => writeln!(f, "  {:?}", gate)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for GNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let x = net.add_and(&[a, b]);
        let o = net.add_out(x);
        net.check();
        assert_eq!(net.nb_gates(), 4);
        assert_eq!(net.nb_source_links(), 2);
        assert_eq!(net.nb_target_links(), 1);
        assert!(net.has_source_link(&Link::port(a)));
        assert!(net.has_target_link(&Link::port(o)));
        assert_eq!(net.nb_connects(), 3);
        assert!(net.is_comb());
        assert_eq!(net.gate(a).fanout(), 1);
    }

    #[test]
    fn test_dedup() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let x1 = net.add_and(&[a, b]);
        let x2 = net.add_and(&[a, b]);
        assert_eq!(x1, x2);
        // Sources and outputs are never shared
        assert_ne!(net.add_in(), net.add_in());
        let o1 = net.add_out(x1);
        let o2 = net.add_out(x1);
        assert_ne!(o1, o2);
        net.check();
    }

    #[test]
    fn test_dedup_decomposed() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let x = net.add_and(&[a, b]);
        let y = net.add_nand(&[a, b]);
        assert_eq!(net.gate(y).func(), GateSymbol::Not);
        assert_eq!(net.gate(y).input(0).node(), x);
        assert_eq!(net.add_nand(&[a, b]), y);
        assert_eq!(net.add_not(x), y);
        net.check();
    }

    #[test]
    fn test_set_gate() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let x = net.add_and(&[a, b]);
        let o = net.add_out(x);
        net.set_gate(x, GateSymbol::Or, vec![Signal::always(b)]);
        net.check();
        assert_eq!(net.gate(a).fanout(), 0);
        assert_eq!(net.gate(b).fanout(), 1);
        assert_eq!(net.gate(o).input(0).node(), x);
        // Turn a source into a buffer
        net.set_gate(a, GateSymbol::Nop, vec![Signal::always(b)]);
        assert_eq!(net.nb_source_links(), 1);
        net.check();
    }

    #[test]
    #[should_panic]
    fn test_output_fanout() {
        let mut net = GNet::new();
        let a = net.add_in();
        let o = net.add_out(a);
        net.add_not(o);
    }

    #[test]
    fn test_remove() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let x = net.add_xor(&[a, b]);
        net.add_out(x);
        net.remove_gate(a);
        net.check();
        // The dangling input of x is now a source link
        assert!(net.has_source_link(&Link::new(a, x, 0)));
        assert_eq!(net.nb_source_links(), 2);
    }

    #[test]
    fn test_remove_last() {
        let mut net = GNet::new();
        let a = net.add_in();
        net.remove_gate(a);
        assert!(net.is_empty());
        assert_eq!(net.nb_source_links(), 0);
        assert_eq!(net.nb_target_links(), 0);
        assert!(net.constants().is_empty());
        assert!(net.triggers().is_empty());
        let b = net.add_in();
        assert_ne!(a, b);
        assert!(net.is_well_formed());
        assert_eq!(net.nb_source_links(), 1);
        net.check();
    }

    #[test]
    fn test_clear() {
        let mut net = crate::network::generators::random::make_rand(50, 3, 2);
        net.clear();
        assert!(net.is_empty());
        assert!(net.is_flat());
        assert_eq!(net.nb_source_links(), 0);
        assert_eq!(net.nb_target_links(), 0);
        assert!(net.constants().is_empty());
        assert!(net.triggers().is_empty());
        let a = net.add_in();
        net.add_out(a);
        assert!(net.is_well_formed());
        net.check();
    }

    #[test]
    fn test_external_driver() {
        let mut net = GNet::new();
        let ext = GateId::new(10);
        let a = net.add_in();
        let x = net.add_and(&[a, ext]);
        net.add_out(x);
        assert!(net.has_source_link(&Link::new(ext, x, 1)));
        // New identifiers never collide with external drivers
        let y = net.add_in();
        assert!(y.ind() > ext.ind());
        net.check();
    }

    #[test]
    fn test_subnets() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let x = net.add_and(&[a, b]);
        let o = net.add_out(x);
        let s0 = net.new_subnet();
        assert!(net.has_empty_subnets());
        net.move_gate(a, Some(s0));
        net.move_gate(b, Some(s0));
        assert!(!net.has_empty_subnets());
        assert!(net.has_orphans());
        assert!(!net.is_well_formed());
        let s1 = net.group_orphans();
        assert!(net.is_well_formed());
        net.check();

        // Links crossing subnets
        assert!(net.subnet(s0).has_target_link(&Link::new(a, x, 0)));
        assert!(net.subnet(s1).has_source_link(&Link::new(b, x, 1)));
        assert!(net.subnet(s1).has_target_link(&Link::port(o)));
        assert!(net.subnet(s0).has_source_link(&Link::port(a)));

        net.merge_subnets(s0, s1);
        assert!(net.has_empty_subnets());
        assert_eq!(net.subnet(s0).nb_gates(), 4);
        assert_eq!(net.subnet(s0).nb_source_links(), 2);
        net.check();
        net.remove_empty_subnets();
        assert_eq!(net.nb_subnets(), 1);
        assert!(net.is_well_formed());
        net.check();
        net.flatten();
        assert!(net.is_flat());
        net.check();
    }

    #[test]
    fn test_remove_in_subnet() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let x = net.add_or(&[a, b]);
        net.add_out(x);
        let s = net.new_subnet();
        net.move_gate(a, Some(s));
        net.group_orphans();
        net.remove_gate(a);
        assert!(net.has_empty_subnets());
        net.check();
        net.remove_empty_subnets();
        assert!(net.is_well_formed());
        net.check();
    }

    #[test]
    fn test_clone() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let c = net.add_in();
        let x = net.add_maj(&[a, b, c]);
        let y = net.add_dff(x, a);
        net.add_out(y);
        let s = net.new_subnet();
        for g in net.gates().to_vec() {
            net.move_gate(g, Some(s));
        }
        let mut map = GateIdMap::default();
        let copy = net.clone_with(&mut map);
        copy.check();
        assert_eq!(copy.nb_gates(), net.nb_gates());
        assert_eq!(copy.nb_subnets(), 1);
        assert!(copy.is_sorted());
        assert_eq!(copy.gate(map[&x]).func(), GateSymbol::Maj);
        assert_eq!(copy.gate(map[&y]).input(1), Signal::posedge(map[&a]));
        assert_eq!(copy.triggers().len(), 1);
    }

    #[test]
    fn test_clone_external_driver() {
        let mut net = GNet::new();
        let ext = GateId::new(10);
        let x = net.add_not(ext);
        let y = net.add_xor(&[ext, x]);
        net.add_out(y);
        assert_eq!(net.nb_source_links(), 2);

        let mut map = GateIdMap::default();
        let copy = net.clone_with(&mut map);
        copy.check();
        assert!(!map.contains_key(&ext));
        assert!(!copy.contains(ext));
        assert_eq!(copy.nb_source_links(), 2);
        assert!(copy.has_source_link(&Link::new(ext, map[&x], 0)));
        assert!(copy.has_source_link(&Link::new(ext, map[&y], 0)));
        assert!(map.values().all(|g| g.ind() > ext.ind()));
    }

    #[test]
    #[should_panic]
    fn test_clone_orphans() {
        let mut net = GNet::new();
        let a = net.add_in();
        net.add_out(a);
        let s = net.new_subnet();
        net.move_gate(a, Some(s));
        let mut map = GateIdMap::default();
        net.clone_with(&mut map);
    }
}
