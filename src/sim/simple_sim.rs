use fxhash::{FxHashMap, FxHashSet};

use crate::network::{GateId, GateSymbol, NetView};

/// One gate evaluation: function, result slot and argument slots
#[derive(Clone, Debug)]
struct Instr {
    func: GateSymbol,
    out: usize,
    args: Vec<usize>,
}

/// Bit-parallel simulator over a netlist view, simulating 64 patterns at once
///
/// The view is compiled once into a flat program over value slots. Input pins
/// are written directly into their slot and are never evaluated, which allows
/// cutting a netlist at any gate, flip-flops included.
///
/// Triggered gates hold a state, initially zero. Each step evaluates the
/// combinatorial logic from the current state, and the state is updated at the
/// start of the next step: one step is one active clock edge.
pub struct SimpleSimulator {
    program: Vec<Instr>,
    triggers: Vec<Instr>,
    input_slots: Vec<usize>,
    output_slots: Vec<usize>,
    values: Vec<u64>,
}

fn maj(a: u64, b: u64, c: u64) -> u64 {
    (b & c) | (a & (b | c))
}

fn mux(s: u64, a: u64, b: u64) -> u64 {
    (s & a) | (!s & b)
}

/// Value slot of a gate, allocated on first use
fn slot(slots: &mut FxHashMap<GateId, usize>, g: GateId) -> usize {
    let nb = slots.len();
    *slots.entry(g).or_insert(nb)
}

fn majn(v: &[u64]) -> u64 {
    let mut ret = 0u64;
    for bit in 0..64 {
        let cnt = v.iter().filter(|w| (*w >> bit) & 1 != 0).count();
        if 2 * cnt > v.len() {
            ret |= 1 << bit;
        }
    }
    ret
}

impl SimpleSimulator {
    /// Compile a view, with the gates whose values are given and the gates whose values are read
    ///
    /// Input pins may be gates of the view or drivers outside of it.
    pub fn compile(view: NetView<'_>, inputs: &[GateId], outputs: &[GateId]) -> SimpleSimulator {
        let mut slots: FxHashMap<GateId, usize> = FxHashMap::default();
        let order = view.ordered_gates();
        let pins: FxHashSet<GateId> = inputs.iter().copied().collect();
        let input_slots: Vec<usize> = inputs.iter().map(|g| slot(&mut slots, *g)).collect();

        let mut program = Vec::new();
        let mut triggers = Vec::new();
        for &id in order.iter() {
            let out = slot(&mut slots, id);
            if pins.contains(&id) {
                continue;
            }
            let gate = view.gate(id);
            if gate.is_source() {
                continue;
            }
            if let GateSymbol::Custom(_) = gate.func() {
                panic!("Unsupported gate {:?} for simulation", gate);
            }
            let args = gate
                .inputs()
                .iter()
                .map(|s| slot(&mut slots, s.node()))
                .collect();
            let instr = Instr {
                func: gate.func(),
                out,
                args,
            };
            if gate.is_trigger() {
                triggers.push(instr);
            } else {
                program.push(instr);
            }
        }
        let output_slots = outputs
            .iter()
            .map(|g| match slots.get(g) {
                Some(s) => *s,
                None => panic!("Output {} is not part of the simulated netlist", g),
            })
            .collect();
        SimpleSimulator {
            program,
            triggers,
            input_slots,
            output_slots,
            values: vec![0; slots.len()],
        }
    }

    /// Number of input pins
    pub fn nb_inputs(&self) -> usize {
        self.input_slots.len()
    }

    /// Number of output pins
    pub fn nb_outputs(&self) -> usize {
        self.output_slots.len()
    }

    /// Simulate multiple steps from the zero state; return the output values of each step
    pub fn run(&mut self, input_values: &[Vec<u64>]) -> Vec<Vec<u64>> {
        self.reset();
        let mut ret = Vec::new();
        for (i, v) in input_values.iter().enumerate() {
            if i != 0 {
                self.run_triggers();
            }
            self.copy_inputs(v);
            self.run_comb();
            ret.push(self.output_values());
        }
        ret
    }

    /// Simulate a single step from the zero state
    pub fn run_once(&mut self, input_values: &[u64]) -> Vec<u64> {
        self.reset();
        self.copy_inputs(input_values);
        self.run_comb();
        self.output_values()
    }

    /// Reset all values and states to zero
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0);
    }

    fn copy_inputs(&mut self, inputs: &[u64]) {
        assert_eq!(inputs.len(), self.input_slots.len());
        for (s, v) in self.input_slots.iter().zip(inputs) {
            self.values[*s] = *v;
        }
    }

    fn run_comb(&mut self) {
        for i in 0..self.program.len() {
            let val = self.eval(&self.program[i]);
            self.values[self.program[i].out] = val;
        }
    }

    fn run_triggers(&mut self) {
        let next: Vec<u64> = self.triggers.iter().map(|t| self.eval(t)).collect();
        for (t, v) in self.triggers.iter().zip(next) {
            self.values[t.out] = v;
        }
    }

    fn arg(&self, instr: &Instr, i: usize) -> u64 {
        self.values[instr.args[i]]
    }

    fn eval(&self, instr: &Instr) -> u64 {
        use GateSymbol::*;
        let args = instr.args.iter().map(|a| self.values[*a]);
        match instr.func {
            Zero => 0,
            One => !0,
            Nop | Out => self.arg(instr, 0),
            Not => !self.arg(instr, 0),
            And => args.fold(!0, |a, b| a & b),
            Or => args.fold(0, |a, b| a | b),
            Xor => args.fold(0, |a, b| a ^ b),
            Nand => !args.fold(!0, |a, b| a & b),
            Nor => !args.fold(0, |a, b| a | b),
            Xnor => !args.fold(0, |a, b| a ^ b),
            Maj => {
                if instr.args.len() == 3 {
                    maj(self.arg(instr, 0), self.arg(instr, 1), self.arg(instr, 2))
                } else {
                    majn(&args.collect::<Vec<_>>())
                }
            }
            Latch => mux(self.arg(instr, 1), self.arg(instr, 0), self.values[instr.out]),
            Dff => self.arg(instr, 0),
            DffRs => !self.arg(instr, 2) & (self.arg(instr, 3) | self.arg(instr, 0)),
            In | Custom(_) => unreachable!(),
        }
    }

    fn output_values(&self) -> Vec<u64> {
        self.output_slots.iter().map(|s| self.values[*s]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::generators::testcases::toggle_chain;
    use crate::network::GNet;

    #[test]
    fn test_comb() {
        let mut net = GNet::new();
        let a = net.add_in();
        let b = net.add_in();
        let c = net.add_in();
        let x = net.add_maj(&[a, b, c]);
        let y = net.add_xnor(&[a, b]);
        let z = net.add_nor(&[x, c]);
        net.sort_topologically();
        let mut sim = SimpleSimulator::compile(net.view(), &[a, b, c], &[x, y, z]);
        let res = sim.run_once(&[0b1100, 0b1010, 0b0110]);
        assert_eq!(res[0] & 0xf, 0b1110);
        assert_eq!(res[1] & 0xf, 0b1001);
        assert_eq!(res[2] & 0xf, 0b0001);
    }

    #[test]
    fn test_majn() {
        assert_eq!(majn(&[0b11100, 0b11010, 0b10001, 0b10000, 0b00111]), 0b10000);
    }

    #[test]
    fn test_toggle_chain() {
        let net = toggle_chain(2);
        let inputs: Vec<GateId> = net
            .gates()
            .iter()
            .copied()
            .filter(|g| net.gate(*g).is_source())
            .collect();
        let out = *net
            .gates()
            .iter()
            .find(|g| net.gate(**g).is_target())
            .unwrap();
        let mut sim = SimpleSimulator::compile(net.view(), &inputs, &[out]);
        // Output is input xor the input two steps before
        let res = sim.run(&[vec![!0, 0], vec![0, 0], vec![0, 0], vec![0, 0]]);
        assert_eq!(res, vec![vec![!0], vec![0], vec![!0], vec![0]]);
    }

    #[test]
    fn test_cut_trigger() {
        let mut net = GNet::new();
        let clk = net.add_in();
        let d = net.add_in();
        let q = net.add_dff(d, clk);
        let y = net.add_not(q);
        net.add_out(y);
        net.sort_topologically();
        let mut sim = SimpleSimulator::compile(net.view(), &[q], &[y]);
        assert_eq!(sim.run_once(&[0xff]), vec![!0xff]);
    }

    #[test]
    fn test_latch_and_reset() {
        let mut net = GNet::new();
        let clk = net.add_in();
        let d = net.add_in();
        let ena = net.add_in();
        let rst = net.add_in();
        let set = net.add_in();
        let l = net.add_latch(d, ena);
        let r = net.add_dffrs(d, clk, rst, set);
        net.sort_topologically();
        let mut sim = SimpleSimulator::compile(net.view(), &[clk, d, ena, rst, set], &[l, r]);
        let step0 = vec![0, 0b0011, 0b0101, 0b0000, 0b0000];
        let step1 = vec![0, 0, 0b0100, 0b1000, 0b1100];
        let res = sim.run(&[step0, step1.clone(), step1]);
        // Latch: transparent where enabled, else keeps its value
        assert_eq!(res[1][0] & 0xf, 0b0001);
        assert_eq!(res[2][0] & 0xf, 0b0001);
        // Flip-flop: reset dominates set
        assert_eq!(res[1][1] & 0xf, 0b0011);
        assert_eq!(res[2][1] & 0xf, 0b0100);
    }
}
