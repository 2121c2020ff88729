//! Topological ordering and combinatorial reachability

use std::collections::VecDeque;

use fxhash::{FxHashMap, FxHashSet};

use crate::network::{GNet, Gate, GateId};

/// Order gates so that each combinatorial gate comes after its drivers
///
/// Only drivers that are members are taken into account, and inputs of
/// triggered gates are not dependencies. Returns None on a combinatorial loop.
pub(crate) fn comb_order(
    gates: &FxHashMap<GateId, Gate>,
    members: &[GateId],
    member: impl Fn(GateId) -> bool,
) -> Option<Vec<GateId>> {
    let mut count_deps: FxHashMap<GateId, usize> = FxHashMap::default();
    for &id in members {
        let g = &gates[&id];
        let nb = if g.is_trigger() {
            0
        } else {
            g.inputs().iter().filter(|s| member(s.node())).count()
        };
        count_deps.insert(id, nb);
    }

    // Start with gates with no dependencies, keeping the current order where possible
    let mut to_visit: VecDeque<GateId> = members
        .iter()
        .filter(|id| count_deps[id] == 0)
        .copied()
        .collect();
    let mut order = Vec::with_capacity(members.len());
    while let Some(id) = to_visit.pop_front() {
        order.push(id);
        for l in gates[&id].links() {
            if gates[&l.target].is_trigger() {
                continue;
            }
            if let Some(nb) = count_deps.get_mut(&l.target) {
                *nb -= 1;
                if *nb == 0 {
                    to_visit.push_back(l.target);
                }
            }
        }
    }
    if order.len() == members.len() {
        Some(order)
    } else {
        None
    }
}

impl GNet {
    /// Sort the gates topologically, subnet by subnet if the netlist has subnets
    ///
    /// Does nothing if the netlist is already sorted. With subnets, the subnets are
    /// ordered by their dependencies and the gates of each subnet are kept
    /// together; if the subnets depend on each other cyclically, the order of
    /// the whole netlist is computed without grouping.
    pub fn sort_topologically(&mut self) {
        assert!(
            self.is_well_formed(),
            "Only well-formed netlists can be sorted"
        );
        if self.is_sorted() {
            return;
        }
        let gates = self.gate_table();
        let flat = || match comb_order(gates, self.gates(), |g| gates.contains_key(&g)) {
            Some(order) => order,
            None => {
                panic!("Unable to find a valid topological sort: there must be a combinatorial loop")
            }
        };
        if self.is_flat() {
            let order = flat();
            self.set_orders(order, Vec::new());
            return;
        }

        let nb_subnets = self.nb_subnets();
        let mut subnet_orders = Vec::with_capacity(nb_subnets);
        for sid in 0..nb_subnets {
            let order = comb_order(gates, self.subnet(sid).gates(), |g| {
                self.subnet_of(g) == Some(sid)
            });
            match order {
                Some(o) => subnet_orders.push(o),
                None => panic!(
                    "Unable to find a valid topological sort of subnet {}: there must be a combinatorial loop",
                    sid
                ),
            }
        }

        // Dependencies between subnets
        let mut edges: FxHashSet<(usize, usize)> = FxHashSet::default();
        for sid in 0..nb_subnets {
            for &id in self.subnet(sid).gates() {
                for l in gates[&id].links() {
                    if gates[&l.target].is_trigger() {
                        continue;
                    }
                    if let Some(t) = self.subnet_of(l.target) {
                        if t != sid {
                            edges.insert((sid, t));
                        }
                    }
                }
            }
        }
        let mut count_deps = vec![0usize; nb_subnets];
        let mut succs = vec![Vec::new(); nb_subnets];
        let mut sorted_edges: Vec<(usize, usize)> = edges.into_iter().collect();
        sorted_edges.sort_unstable();
        for (s, t) in sorted_edges {
            count_deps[t] += 1;
            succs[s].push(t);
        }
        let mut to_visit: VecDeque<usize> = (0..nb_subnets).filter(|s| count_deps[*s] == 0).collect();
        let mut subnet_order = Vec::with_capacity(nb_subnets);
        while let Some(s) = to_visit.pop_front() {
            subnet_order.push(s);
            for &t in &succs[s] {
                count_deps[t] -= 1;
                if count_deps[t] == 0 {
                    to_visit.push_back(t);
                }
            }
        }

        let order = if subnet_order.len() == nb_subnets {
            subnet_order
                .iter()
                .flat_map(|s| subnet_orders[*s].iter().copied())
                .collect()
        } else {
            flat()
        };
        self.set_orders(order, subnet_orders);
    }

    /// Returns whether a combinatorial path leads from a gate to one of the given gates
    ///
    /// Paths do not go through triggered gates, and a triggered gate has no
    /// combinatorial flow at all.
    pub fn has_comb_flow(&self, id: GateId, inputs: &[GateId]) -> bool {
        if inputs.is_empty() || self.gate(id).is_trigger() {
            return false;
        }
        let targets: FxHashSet<GateId> = inputs.iter().copied().collect();
        if targets.contains(&id) {
            return true;
        }
        let mut visited = FxHashSet::default();
        let mut to_visit = vec![id];
        visited.insert(id);
        while let Some(g) = to_visit.pop() {
            for l in self.gate(g).links() {
                if targets.contains(&l.target) {
                    return true;
                }
                if !self.gate(l.target).is_trigger() && visited.insert(l.target) {
                    to_visit.push(l.target);
                }
            }
        }
        false
    }
}
