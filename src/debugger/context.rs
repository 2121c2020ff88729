use std::io::{self, Write};

use fxhash::FxHashMap;
use rustsat::types::Lit;

use crate::debugger::SatOracle;
use crate::error::Result;
use crate::network::GateId;

/// Time step of a gate value in an unrolled encoding
pub type Version = u16;

/// A gate of one of the netlists taking part in a query
///
/// Gate identifiers are only unique within a netlist, so every gate is tagged
/// with the index of its netlist in the query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetGate {
    /// Index of the netlist in the query
    pub net: usize,
    /// Gate in this netlist
    pub gate: GateId,
}

impl NetGate {
    /// Tag a gate with its netlist index
    pub fn new(net: usize, gate: GateId) -> NetGate {
        NetGate { net, gate }
    }
}

/// Reconnection map: a gate of the key uses the variables of the gate of the value
pub type GateConnect = FxHashMap<NetGate, NetGate>;

/// Positive or negative literal of a variable
pub fn lit(var: u32, positive: bool) -> Lit {
    Lit::new(var, !positive)
}

/// CNF formula under construction, with its variable allocation
///
/// Gate variables are interned by gate and version, after applying the
/// reconnection map. Auxiliary variables are allocated separately and never
/// shared.
#[derive(Clone, Debug, Default)]
pub struct Context {
    vars: FxHashMap<(NetGate, Version), u32>,
    nb_vars: u32,
    connect: GateConnect,
    clauses: Vec<Vec<Lit>>,
    model: Option<Vec<bool>>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty context with a reconnection map
    pub fn with_connect(connect: GateConnect) -> Self {
        Context {
            connect,
            ..Default::default()
        }
    }

    /// Gate whose variables are used for this gate
    pub fn connected(&self, g: NetGate) -> NetGate {
        self.connect.get(&g).copied().unwrap_or(g)
    }

    /// Variable of a gate at a version, allocated on first use
    pub fn var(&mut self, g: NetGate, version: Version) -> u32 {
        let key = (self.connected(g), version);
        if let Some(v) = self.vars.get(&key) {
            return *v;
        }
        let v = self.new_var();
        self.vars.insert(key, v);
        v
    }

    /// Fresh auxiliary variable
    pub fn new_var(&mut self) -> u32 {
        self.nb_vars += 1;
        self.nb_vars - 1
    }

    /// Number of variables
    pub fn nb_vars(&self) -> u32 {
        self.nb_vars
    }

    /// Number of clauses
    pub fn nb_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// All clauses
    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// Add a clause
    pub fn add_clause(&mut self, clause: Vec<Lit>) {
        self.clauses.push(clause);
    }

    /// Run the oracle on the formula; returns whether it is satisfiable
    pub fn solve(&mut self, oracle: &dyn SatOracle) -> Result<bool> {
        self.model = oracle.solve(self.nb_vars, &self.clauses)?;
        Ok(self.model.is_some())
    }

    /// Value of a variable in the last model found
    pub fn value(&self, var: u32) -> bool {
        match &self.model {
            Some(m) => m[var as usize],
            None => panic!("No model available: the formula was not solved or is unsatisfiable"),
        }
    }

    /// Write the formula in DIMACS format
    pub fn write_dimacs<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "p cnf {} {}", self.nb_vars, self.clauses.len())?;
        for c in &self.clauses {
            for l in c {
                write!(w, "{} ", l.to_ipasir())?;
            }
            writeln!(w, "0")?;
        }
        Ok(())
    }

    /// The formula in DIMACS format
    pub fn dimacs(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_dimacs(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning() {
        let mut ctx = Context::new();
        let a = NetGate::new(0, GateId::new(3));
        let b = NetGate::new(1, GateId::new(3));
        let va = ctx.var(a, 0);
        assert_eq!(ctx.var(a, 0), va);
        assert_ne!(ctx.var(b, 0), va);
        assert_ne!(ctx.var(a, 1), va);
        let aux = ctx.new_var();
        assert_eq!(ctx.nb_vars(), 4);
        assert_eq!(aux, 3);
    }

    #[test]
    fn test_connect() {
        let a = NetGate::new(0, GateId::new(1));
        let b = NetGate::new(2, GateId::new(5));
        let mut connect = GateConnect::default();
        connect.insert(b, a);
        let mut ctx = Context::with_connect(connect);
        assert_eq!(ctx.var(a, 0), ctx.var(b, 0));
        assert_ne!(ctx.var(a, 1), ctx.var(a, 0));
    }

    #[test]
    fn test_dimacs() {
        let mut ctx = Context::new();
        let x = ctx.new_var();
        let y = ctx.new_var();
        ctx.add_clause(vec![lit(x, true), lit(y, false)]);
        ctx.add_clause(vec![lit(y, true)]);
        assert_eq!(ctx.dimacs().unwrap(), "p cnf 2 2\n1 -2 0\n2 0\n");
        let mut buf = Vec::new();
        ctx.write_dimacs(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), ctx.dimacs().unwrap());
    }
}
