use crate::debugger::context::{Context, Version};
use crate::debugger::encoder::Encoder;
use crate::network::GNet;

/// Symbolic executor: unrolls a netlist over clock cycles in a single formula
///
/// Cycles start at 1, so that the state of the triggers before the first
/// cycle is left free.
#[derive(Clone, Debug)]
pub struct SymbolicExecutor {
    cycle: Version,
    encoder: Encoder,
}

impl Default for SymbolicExecutor {
    fn default() -> Self {
        SymbolicExecutor {
            cycle: 1,
            encoder: Encoder::new(),
        }
    }
}

impl SymbolicExecutor {
    /// Create an executor at the first cycle
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode the netlist at the current cycle
    pub fn exec(&mut self, net: &GNet) {
        self.encoder.encode_net(0, net.view(), self.cycle);
    }

    /// Encode the netlist over several cycles, starting at the current one
    pub fn exec_cycles(&mut self, net: &GNet, cycles: usize) {
        for _ in 0..cycles {
            self.exec(net);
            self.tick();
        }
    }

    /// Move to the next cycle
    pub fn tick(&mut self) {
        self.cycle += 1;
    }

    /// Current cycle
    pub fn cycle(&self) -> Version {
        self.cycle
    }

    /// Formula built so far
    pub fn context(&self) -> &Context {
        self.encoder.context()
    }

    /// Encoder holding the formula, to add constraints and solve
    pub fn encoder(&mut self) -> &mut Encoder {
        &mut self.encoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::SolverKind;
    use crate::network::generators::testcases::toggle_chain;
    use crate::network::GateId;

    fn io(net: &GNet) -> (GateId, GateId) {
        let input = *net
            .gates()
            .iter()
            .find(|g| net.gate(**g).is_source() && net.gate(**g).fanout() == 2)
            .unwrap();
        let out = *net
            .gates()
            .iter()
            .find(|g| net.gate(**g).is_target())
            .unwrap();
        (input, out)
    }

    #[test]
    fn test_cycles() {
        let net = toggle_chain(1);
        let (input, out) = io(&net);
        let mut exec = SymbolicExecutor::new();
        assert_eq!(exec.cycle(), 1);
        exec.exec_cycles(&net, 2);
        assert_eq!(exec.cycle(), 3);
        assert!(exec.context().nb_clauses() > 0);

        // The output at the second cycle is the input of the first cycle xor the current input
        let oracle = SolverKind::Varisat.oracle();
        let enc = exec.encoder();
        let i1 = enc.var(0, input, 1);
        let i2 = enc.var(0, input, 2);
        let o2 = enc.var(0, out, 2);
        enc.encode_fix(i1, true);
        enc.encode_fix(i2, false);
        let mut sat = enc.clone();
        sat.encode_fix(o2, true);
        assert!(sat.solve(oracle.as_ref()).unwrap());
        enc.encode_fix(o2, false);
        assert!(!enc.solve(oracle.as_ref()).unwrap());
    }

    #[test]
    fn test_first_cycle_free() {
        let net = toggle_chain(1);
        let (input, out) = io(&net);
        let mut exec = SymbolicExecutor::new();
        exec.exec(&net);
        let oracle = SolverKind::Varisat.oracle();
        let enc = exec.encoder();
        let i1 = enc.var(0, input, 1);
        let o1 = enc.var(0, out, 1);
        enc.encode_fix(i1, true);
        for value in [false, true] {
            let mut e = enc.clone();
            e.encode_fix(o1, value);
            assert!(e.solve(oracle.as_ref()).unwrap());
        }
    }
}
