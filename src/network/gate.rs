use std::fmt;

use crate::network::{GateId, GateSymbol, Signal};

/// Directed connection from a driver to one input of a gate
///
/// A port link (`source == target`, input index [`Link::PORT`]) stands for the
/// external side of a primary input or output gate.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Link {
    /// Driving gate
    pub source: GateId,
    /// Receiving gate
    pub target: GateId,
    /// Input index in the receiving gate
    pub input: u32,
}

impl Link {
    /// Input index used by port links
    pub const PORT: u32 = u32::MAX;

    /// Create a link between two gates
    pub fn new(source: GateId, target: GateId, input: u32) -> Link {
        Link {
            source,
            target,
            input,
        }
    }

    /// Port link of a gate
    pub fn port(gate: GateId) -> Link {
        Link::new(gate, gate, Link::PORT)
    }

    /// Returns whether this is a port link
    pub fn is_port(&self) -> bool {
        self.input == Link::PORT
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_port() {
            write!(f, "port({})", self.source)
        } else {
            write!(f, "{}->{}[{}]", self.source, self.target, self.input)
        }
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A gate in a netlist: a function, its input signals and its fan-out links
#[derive(Clone, PartialEq, Eq)]
pub struct Gate {
    id: GateId,
    func: GateSymbol,
    inputs: Vec<Signal>,
    links: Vec<Link>,
}

impl Gate {
    pub(crate) fn new(id: GateId, func: GateSymbol, inputs: Vec<Signal>) -> Gate {
        Gate {
            id,
            func,
            inputs,
            links: Vec::new(),
        }
    }

    /// Identifier of the gate
    pub fn id(&self) -> GateId {
        self.id
    }

    /// Function of the gate
    pub fn func(&self) -> GateSymbol {
        self.func
    }

    /// Input signals
    pub fn inputs(&self) -> &[Signal] {
        &self.inputs
    }

    /// Input signal at index i
    pub fn input(&self, i: usize) -> Signal {
        self.inputs[i]
    }

    /// Number of inputs
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Fan-out links, one per use of this gate as an input
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of fan-out links
    pub fn fanout(&self) -> usize {
        self.links.len()
    }

    /// Links from each input driver to this gate
    pub fn input_links(&self) -> impl Iterator<Item = Link> + '_ {
        self.inputs
            .iter()
            .enumerate()
            .map(move |(i, s)| Link::new(s.node(), self.id, i as u32))
    }

    /// Returns whether the gate is a primary input: no inputs, and not a constant
    ///
    /// Unconnected placeholders count as sources.
    pub fn is_source(&self) -> bool {
        self.inputs.is_empty() && !self.func.is_constant()
    }

    /// Returns whether the gate is a primary output
    pub fn is_target(&self) -> bool {
        self.func == GateSymbol::Out
    }

    /// Returns whether the gate is a constant
    pub fn is_value(&self) -> bool {
        self.func.is_constant()
    }

    /// Returns whether the gate is triggered: some input is not sampled at any time
    pub fn is_trigger(&self) -> bool {
        self.inputs.iter().any(|s| !s.is_always())
    }

    /// Returns whether the gate is combinatorial
    pub fn is_comb(&self) -> bool {
        !self.is_source() && !self.is_trigger()
    }

    /// Check the structural constraints of the gate
    pub fn invariant(&self) -> bool {
        if !self.func.accepts_arity(self.arity()) {
            return false;
        }
        if self.is_target() && !self.links.is_empty() {
            return false;
        }
        true
    }

    pub(crate) fn set(&mut self, func: GateSymbol, inputs: Vec<Signal>) {
        self.func = func;
        self.inputs = inputs;
    }

    pub(crate) fn add_link(&mut self, link: Link) {
        debug_assert_eq!(link.source, self.id);
        self.links.push(link);
    }

    pub(crate) fn remove_link(&mut self, link: Link) {
        if let Some(pos) = self.links.iter().position(|l| *l == link) {
            self.links.swap_remove(pos);
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <= {}(", self.id, self.func)?;
        for (i, s) in self.inputs.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{{{}}}[fo={}]", self, self.links.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(i: u32) -> GateId {
        GateId::new(i)
    }

    #[test]
    fn test_predicates() {
        let input = Gate::new(g(0), GateSymbol::In, Vec::new());
        assert!(input.is_source());
        assert!(!input.is_comb());
        assert!(!input.is_trigger());

        let one = Gate::new(g(1), GateSymbol::One, Vec::new());
        assert!(one.is_value());
        assert!(!one.is_source());
        assert!(one.is_comb());

        let and = Gate::new(
            g(2),
            GateSymbol::And,
            vec![Signal::always(g(0)), Signal::always(g(1))],
        );
        assert!(and.is_comb());

        let dff = Gate::new(
            g(3),
            GateSymbol::Dff,
            vec![Signal::always(g(2)), Signal::posedge(g(0))],
        );
        assert!(dff.is_trigger());
        assert!(!dff.is_comb());

        let out = Gate::new(g(4), GateSymbol::Out, vec![Signal::always(g(3))]);
        assert!(out.is_target());
        assert!(out.invariant());
    }

    #[test]
    fn test_invariant() {
        let bad_in = Gate::new(g(0), GateSymbol::In, vec![Signal::always(g(1))]);
        assert!(!bad_in.invariant());
        let bad_dff = Gate::new(g(0), GateSymbol::Dff, vec![Signal::always(g(1))]);
        assert!(!bad_dff.invariant());
        let mut out = Gate::new(g(0), GateSymbol::Out, vec![Signal::always(g(1))]);
        out.add_link(Link::new(g(0), g(2), 0));
        assert!(!out.invariant());
    }

    #[test]
    fn test_links() {
        assert!(Link::port(g(5)).is_port());
        assert!(!Link::new(g(5), g(6), 0).is_port());
        let gate = Gate::new(
            g(2),
            GateSymbol::Xor,
            vec![Signal::always(g(0)), Signal::always(g(1))],
        );
        let links: Vec<Link> = gate.input_links().collect();
        assert_eq!(links, vec![Link::new(g(0), g(2), 0), Link::new(g(1), g(2), 1)]);
        assert_eq!(format!("{}", gate), "g2 <= XOR(g0, g1)");
    }
}
