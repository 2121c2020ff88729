use std::collections::BTreeMap;

use crate::network::{GNet, GateIdMap, Link, SubnetId};

/// Correspondence between links of the left netlist and links of the right netlist
pub type GateBinding = BTreeMap<Link, Link>;

/// Correspondence between subnets of the left netlist and subnets of the right netlist
pub type SubnetBinding = BTreeMap<SubnetId, SubnetId>;

/// Relation between the states of two sequential netlists
///
/// The encoder netlist computes the right state from the left one; the decoder
/// computes the left state from the right one. Triggers are given by their
/// port link.
#[derive(Clone, Debug, Default)]
pub struct StateEncoding {
    /// Computes the right state from the left state
    pub encoder: GNet,
    /// Computes the left state from the right state
    pub decoder: GNet,
    /// Left trigger to the encoder input fed by its next state
    pub lhs_tri_enc_in: GateBinding,
    /// Left trigger to the decoder output giving its current state
    pub lhs_tri_dec_out: GateBinding,
    /// Right trigger to the encoder output giving its next state
    pub rhs_tri_enc_out: GateBinding,
    /// Right trigger to the decoder input fed by its current state
    pub rhs_tri_dec_in: GateBinding,
}

/// Correspondences between two netlists, used by the equivalence checker
#[derive(Clone, Debug, Default)]
pub struct Hints {
    /// Source links of the left netlist to source links of the right one
    pub source_binding: Option<GateBinding>,
    /// Target links of the left netlist to target links of the right one
    pub target_binding: Option<GateBinding>,
    /// Port links of left triggers to port links of right triggers
    pub trigger_binding: Option<GateBinding>,
    /// State encoding for netlists whose triggers do not match one to one
    pub state_encoding: Option<StateEncoding>,
    /// Corresponding subnets, for hierarchical checking
    pub subnet_binding: Option<SubnetBinding>,
    /// Links between subnets of the left netlist to links of the right one
    pub inner_binding: Option<GateBinding>,
}

impl Hints {
    /// Derive the source, target and trigger bindings from a gate correspondence
    ///
    /// The correspondence is typically the one obtained when copying a netlist
    /// with [`GNet::clone_with`]. Subnet boundaries are bound as well when both
    /// netlists have the same subnets.
    pub fn from_map(lhs: &GNet, rhs: &GNet, gmap: &GateIdMap) -> Hints {
        let map_gate = |g| match gmap.get(&g) {
            Some(r) => *r,
            None => panic!("Gate {} has no counterpart", g),
        };
        let map_link = |l: &Link| -> Link {
            if l.is_port() {
                return Link::port(map_gate(l.source));
            }
            let d = gmap.get(&l.source).copied().unwrap_or(l.source);
            let t = map_gate(l.target);
            if rhs.has_source_link(&Link::port(d)) || rhs.has_target_link(&Link::port(d)) {
                Link::port(d)
            } else {
                Link::new(d, t, l.input)
            }
        };

        let source_binding = lhs.source_links().iter().map(|l| (*l, map_link(l))).collect();
        let target_binding = lhs.target_links().iter().map(|l| (*l, map_link(l))).collect();
        let trigger_binding = lhs
            .triggers()
            .iter()
            .map(|t| (Link::port(*t), Link::port(map_gate(*t))))
            .collect();

        let mut hints = Hints {
            source_binding: Some(source_binding),
            target_binding: Some(target_binding),
            trigger_binding: Some(trigger_binding),
            ..Default::default()
        };
        if lhs.nb_subnets() > 0 && lhs.nb_subnets() == rhs.nb_subnets() {
            let mut subnets = SubnetBinding::new();
            let mut inner = GateBinding::new();
            for sid in 0..lhs.nb_subnets() {
                let Some(&g) = lhs.subnet(sid).gates().first() else {
                    continue;
                };
                let Some(rsid) = rhs.subnet_of(map_gate(g)) else {
                    continue;
                };
                subnets.insert(sid, rsid);
                let sub = lhs.subnet(sid);
                for l in sub.source_links().iter().chain(sub.target_links()) {
                    if l.is_port() {
                        continue;
                    }
                    let r = Link::new(
                        gmap.get(&l.source).copied().unwrap_or(l.source),
                        map_gate(l.target),
                        l.input,
                    );
                    inner.insert(*l, r);
                }
            }
            hints.subnet_binding = Some(subnets);
            hints.inner_binding = Some(inner);
        }
        hints
    }
}
