//! IO for .bench (ISCAS) files

use std::io::{BufRead, BufReader, Read, Write};

use fxhash::FxHashMap;
use itertools::Itertools;

use crate::error::{Error, Result};
use crate::network::{CustomSymbols, Event, GNet, GateId, GateSymbol, Signal};

/// A netlist read from a file, with the names of its ports and flip-flops
#[derive(Clone, Debug, Default)]
pub struct BenchNet {
    /// The netlist
    pub net: GNet,
    /// Input gates by name, in file order
    pub inputs: Vec<(String, GateId)>,
    /// Output gates by name, in file order
    pub outputs: Vec<(String, GateId)>,
    /// Flip-flops by name, in file order
    pub triggers: Vec<(String, GateId)>,
    /// Gate types unknown to the format
    pub symbols: CustomSymbols,
}

/// Gate driving a name, creating the ABC-style constants on demand
fn lookup(net: &mut GNet, names: &FxHashMap<String, GateId>, name: &str) -> Result<GateId> {
    if let Some(g) = names.get(name) {
        return Ok(*g);
    }
    match name {
        "vdd" => Ok(net.add_one()),
        "gnd" => Ok(net.add_zero()),
        _ => Err(Error::Parse(format!(
            "gate input {} is not generated anywhere",
            name
        ))),
    }
}

fn define(names: &mut FxHashMap<String, GateId>, name: &str, g: GateId) -> Result<()> {
    if names.insert(name.to_owned(), g).is_some() {
        Err(Error::Parse(format!("{} is defined twice", name)))
    } else {
        Ok(())
    }
}

fn check_arity(statement: &[String], nb_deps: usize) -> Result<()> {
    let ok = match statement[1].to_uppercase().as_str() {
        "DFF" | "BUF" | "BUFF" | "NOT" => nb_deps == 1,
        "VDD" | "GND" | "VSS" => nb_deps == 0,
        "AND" | "NAND" | "OR" | "NOR" | "XOR" | "XNOR" => nb_deps >= 1,
        "MAJ" => nb_deps % 2 == 1,
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::Parse(format!(
            "{} has {} inputs, which is invalid for {}",
            statement[0], nb_deps, statement[1]
        )))
    }
}

fn net_from_statements(
    statements: &[Vec<String>],
    inputs: &[String],
    outputs: &[String],
) -> Result<BenchNet> {
    let mut ret = BenchNet::default();
    let mut names: FxHashMap<String, GateId> = FxHashMap::default();

    for name in inputs {
        let g = ret.net.add_in();
        define(&mut names, name, g)?;
        ret.inputs.push((name.clone(), g));
    }
    // Placeholders first, so that statements may refer to later ones
    for s in statements {
        let g = ret.net.new_gate();
        define(&mut names, &s[0], g)?;
    }

    for s in statements {
        let id = names[&s[0]];
        let deps = s[2..]
            .iter()
            .map(|n| lookup(&mut ret.net, &names, n))
            .collect::<Result<Vec<GateId>>>()?;
        check_arity(s, deps.len())?;
        let data: Vec<Signal> = deps.iter().map(|d| Signal::always(*d)).collect();
        let (func, inputs) = match s[1].to_uppercase().as_str() {
            "DFF" => {
                // Synchronous design: every flip-flop shares a single clock
                let clk = ret.net.add_one();
                ret.triggers.push((s[0].clone(), id));
                (GateSymbol::Dff, vec![data[0], Signal::posedge(clk)])
            }
            "BUF" | "BUFF" => (GateSymbol::Nop, data),
            "NOT" => (GateSymbol::Not, data),
            "VDD" => (GateSymbol::One, data),
            "GND" | "VSS" => (GateSymbol::Zero, data),
            "AND" => (GateSymbol::And, data),
            "NAND" => (GateSymbol::Nand, data),
            "OR" => (GateSymbol::Or, data),
            "NOR" => (GateSymbol::Nor, data),
            "XOR" => (GateSymbol::Xor, data),
            "XNOR" => (GateSymbol::Xnor, data),
            "MAJ" => (GateSymbol::Maj, data),
            _ => (ret.symbols.create(&s[1]), data),
        };
        ret.net.set_gate(id, func, inputs);
    }

    for o in outputs {
        let d = lookup(&mut ret.net, &names, o)?;
        let g = ret.net.add_out(d);
        ret.outputs.push((o.clone(), g));
    }
    ret.net.sort_topologically();
    Ok(ret)
}

/// Read a netlist in .bench format, as used by the ISCAS benchmarks
///
/// These files describe the design with simple statements like:
/// ```text
///     # This is a comment
///     INPUT(i0)
///     INPUT(i1)
///     x0 = AND(i0, i1)
///     x1 = NAND(x0, i1)
///     x2 = OR(x0, i0)
///     x3 = NOR(i0, x1)
///     x4 = XOR(x3, x2)
///     x5 = BUF(x4)
///     x6 = NOT(x5)
///     x7 = gnd
///     x8 = vdd
///     x9 = DFF(x6)
///     OUTPUT(x0)
/// ```
///
/// Flip-flops are clocked by a constant: every step of the netlist is a clock
/// cycle. Unknown gate types are kept as custom symbols.
pub fn read_bench<R: Read>(r: R) -> Result<BenchNet> {
    let mut statements = Vec::new();
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for l in BufReader::new(r).lines() {
        let s = l?;
        let t = s.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        if !t.contains('=') {
            let parts: Vec<_> = t
                .split(&['(', ')'])
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect();
            if parts.len() != 2 {
                return Err(Error::Parse(format!("invalid statement {}", t)));
            }
            if ["INPUT", "PINPUT"].contains(&parts[0]) {
                inputs.push(parts[1].to_string());
            } else if ["OUTPUT", "POUTPUT"].contains(&parts[0]) {
                outputs.push(parts[1].to_string());
            } else {
                return Err(Error::Parse(format!("unknown keyword {}", parts[0])));
            }
        } else {
            let parts: Vec<String> = t
                .split(&['=', '(', ',', ')'])
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect();
            if parts.len() < 2 {
                return Err(Error::Parse(format!("invalid statement {}", t)));
            }
            statements.push(parts);
        }
    }
    net_from_statements(&statements, &inputs, &outputs)
}

/// Write a netlist in .bench format, as used by the ISCAS benchmarks
///
/// Gates are named after their identifiers. Drivers outside of the netlist
/// become inputs. Only flip-flops clocked by a constant one can be written;
/// latches and flip-flops with set/reset cannot.
pub fn write_bench<W: Write>(w: &mut W, net: &GNet, symbols: &CustomSymbols) -> Result<()> {
    use GateSymbol::*;
    writeln!(w, "# .bench (ISCAS) file")?;
    writeln!(w, "# Generated by gatelec")?;
    let sources: Vec<GateId> = net
        .source_links()
        .iter()
        .map(|l| l.source)
        .sorted()
        .dedup()
        .collect();
    for s in &sources {
        writeln!(w, "INPUT({})", s)?;
    }
    writeln!(w)?;
    let outputs: Vec<GateId> = net
        .target_links()
        .iter()
        .map(|l| l.source)
        .sorted()
        .dedup()
        .collect();
    for o in &outputs {
        writeln!(w, "OUTPUT({})", o)?;
    }
    writeln!(w)?;

    for &id in net.view().ordered_gates().iter() {
        let g = net.gate(id);
        if g.is_source() {
            continue;
        }
        let rep = g.inputs().iter().map(|s| s.node()).join(", ");
        match g.func() {
            Zero => writeln!(w, "{} = gnd", id)?,
            One => writeln!(w, "{} = vdd", id)?,
            Out | Nop => writeln!(w, "{} = BUF({})", id, rep)?,
            Not | And | Or | Xor | Nand | Nor | Xnor | Maj => {
                writeln!(w, "{} = {}({})", id, g.func().name(), rep)?
            }
            Dff => {
                let clk = g.input(1);
                let synchronous = clk.event() == Event::Posedge
                    && net.try_gate(clk.node()).map_or(false, |c| c.func() == One);
                if !synchronous {
                    return Err(Error::Unsupported(format!(
                        "flip-flop {} with a clock signal",
                        id
                    )));
                }
                writeln!(w, "{} = DFF({})", id, g.input(0).node())?;
            }
            Latch | DffRs => return Err(Error::Unsupported(format!("gate {}", g))),
            Custom(_) => writeln!(w, "{} = {}({})", id, symbols.name(g.func()), rep)?,
            In => unreachable!(),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::{Checker, GateBinding, Hints};
    use crate::network::Link;

    const EXAMPLE: &str = "# .bench (ISCAS) file
INPUT(a)
INPUT(b)

OUTPUT(y)
OUTPUT(z)

q = DFF(x)
x = NAND(a, q)
y = XOR(  x, b )
z   =  MAJ(a, b, q)
w = gnd
v = vdd
n = NOT(w)
";

    #[test]
    fn test_read() {
        let bench = read_bench(EXAMPLE.as_bytes()).unwrap();
        assert_eq!(bench.inputs.len(), 2);
        assert_eq!(bench.outputs.len(), 2);
        assert_eq!(bench.triggers.len(), 1);
        assert_eq!(bench.inputs[1].0, "b");
        let net = &bench.net;
        assert_eq!(net.nb_source_links(), 2);
        assert_eq!(net.nb_target_links(), 2);
        assert_eq!(net.triggers().len(), 1);
        assert!(net.is_sorted());
        net.check();
        let q = bench.triggers[0].1;
        assert_eq!(net.gate(q).func(), GateSymbol::Dff);
        assert_eq!(net.gate(q).input(1).event(), Event::Posedge);
    }

    #[test]
    fn test_custom() {
        let text = "INPUT(a)\nINPUT(b)\nOUTPUT(u)\nu = FOO(a, b)\nt = FOO(b)\n";
        let bench = read_bench(text.as_bytes()).unwrap();
        assert_eq!(bench.symbols.len(), 1);
        let u = bench.net.gate(bench.outputs[0].1).input(0).node();
        assert_eq!(bench.symbols.name(bench.net.gate(u).func()), "FOO");
        let mut buf = Vec::new();
        write_bench(&mut buf, &bench.net, &bench.symbols).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("FOO("));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            read_bench("INPUT(a)\nOUTPUT(c)\n".as_bytes()),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            read_bench("INPUT(a)\nINPUT(a)\n".as_bytes()),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            read_bench("WIRE(a)\n".as_bytes()),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            read_bench("INPUT(a)\nx = NOT(a, a)\n".as_bytes()),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_unsupported() {
        let mut net = GNet::new();
        let d = net.add_in();
        let ena = net.add_in();
        let l = net.add_latch(d, ena);
        net.add_out(l);
        let mut buf = Vec::new();
        assert!(matches!(
            write_bench(&mut buf, &net, &CustomSymbols::new()),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_write_read() {
        let bench = read_bench(EXAMPLE.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_bench(&mut buf, &bench.net, &bench.symbols).unwrap();
        let reread = read_bench(buf.as_slice()).unwrap();
        assert_eq!(reread.inputs.len(), 2);
        assert_eq!(reread.outputs.len(), 2);
        assert_eq!(reread.triggers.len(), 1);

        // Written names are the original identifiers
        let orig = |name: &str| GateId::new(name[1..].parse().unwrap());
        let bind = |named: &[(String, GateId)]| -> GateBinding {
            named
                .iter()
                .map(|(n, g)| (Link::port(orig(n)), Link::port(*g)))
                .collect()
        };
        let hints = Hints {
            source_binding: Some(bind(&reread.inputs)),
            target_binding: Some(bind(&reread.outputs)),
            trigger_binding: Some(bind(&reread.triggers)),
            ..Default::default()
        };
        assert!(Checker::default().are_equal(&bench.net, &reread.net, &hints));
    }
}
