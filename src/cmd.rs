//! Command line interface

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fxhash::FxHashMap;
use log::error;

use gatelec::debugger::{
    miter, Checker, CheckerConfig, Equivalence, GateBinding, Hints, LecType, RndChecker,
    SolverKind, Verdict,
};
use gatelec::io::{read_network_file, write_network_file, BenchNet};
use gatelec::network::stats::stats;
use gatelec::network::{GateId, Link};

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Show statistics about a netlist
    ///
    /// Will print statistics on the number of inputs, outputs and gates in the netlist.
    #[clap()]
    Show(ShowArgs),

    /// Check equivalence between two netlists
    ///
    /// Inputs, outputs and flip-flops are matched by name. The command will fail
    /// if the two netlists are not equivalent, and will output the values of the
    /// inputs and outputs for the failing pattern.
    #[clap(alias = "equiv")]
    CheckEquivalence(EquivArgs),

    /// Build the miter of two netlists
    ///
    /// The miter has the inputs of both netlists, matched by name, and a single output
    /// that is set when their outputs differ.
    #[clap()]
    Miter(MiterArgs),
}

/// Read a netlist or exit
fn read_or_exit(path: &PathBuf) -> BenchNet {
    match read_network_file(path) {
        Ok(n) => n,
        Err(e) => {
            error!("Unable to read {}: {}", path.display(), e);
            std::process::exit(2);
        }
    }
}

/// Match two lists of named gates by name
fn bind_by_name(
    what: &str,
    lhs: &[(String, GateId)],
    rhs: &[(String, GateId)],
) -> Result<GateBinding, String> {
    if lhs.len() != rhs.len() {
        return Err(format!(
            "Different number of {}: {} vs {}",
            what,
            lhs.len(),
            rhs.len()
        ));
    }
    let by_name: FxHashMap<&str, GateId> = rhs.iter().map(|(n, g)| (n.as_str(), *g)).collect();
    let mut ret = GateBinding::new();
    for (n, g) in lhs {
        match by_name.get(n.as_str()) {
            Some(r) => {
                ret.insert(Link::port(*g), Link::port(*r));
            }
            None => return Err(format!("{} {} has no counterpart", what, n)),
        }
    }
    Ok(ret)
}

/// Bindings of the ports and flip-flops of two netlists, by name
fn hints_by_name(a: &BenchNet, b: &BenchNet) -> Result<Hints, String> {
    Ok(Hints {
        source_binding: Some(bind_by_name("inputs", &a.inputs, &b.inputs)?),
        target_binding: Some(bind_by_name("outputs", &a.outputs, &b.outputs)?),
        trigger_binding: Some(bind_by_name("flip-flops", &a.triggers, &b.triggers)?),
        ..Default::default()
    })
}

/// Names of the compared gates, in binding order
fn link_names(named: &FxHashMap<GateId, &str>, links: &BTreeSet<Link>) -> Vec<String> {
    links
        .iter()
        .map(|l| {
            named
                .get(&l.source)
                .map_or_else(|| l.source.to_string(), |n| n.to_string())
        })
        .collect()
}

/// Command arguments for equivalence checking
#[derive(Args)]
pub struct EquivArgs {
    /// First netlist to compare
    file1: PathBuf,
    /// Second netlist to compare
    file2: PathBuf,

    /// Checking method
    #[arg(long, value_enum, default_value_t = LecType::Default)]
    checker: LecType,

    /// SAT solver
    #[arg(long, value_enum, default_value_t = SolverKind::Varisat)]
    solver: SolverKind,

    /// Maximum number of inputs for exhaustive simulation
    #[arg(long, default_value_t = 16)]
    sim_bound: usize,

    /// Minimum number of gates for subnet by subnet checking
    #[arg(long, default_value_t = 64 * 1024)]
    flat_bound: usize,

    /// Write the formula of a failing check to this file
    #[arg(long)]
    dump: Option<PathBuf>,
}

impl EquivArgs {
    pub fn run(&self) {
        let a = read_or_exit(&self.file1);
        let b = read_or_exit(&self.file2);
        let hints = match hints_by_name(&a, &b) {
            Ok(h) => h,
            Err(msg) => {
                println!("{}. Netlists are not equivalent", msg);
                std::process::exit(1);
            }
        };
        let equal = match self.checker {
            LecType::Default => self.run_default(&a, &b, &hints),
            LecType::Rnd => self.run_rnd(&a, &b, &hints),
        };
        if equal {
            println!("Netlists are equivalent");
            std::process::exit(0);
        }
        std::process::exit(1);
    }

    fn run_default(&self, a: &BenchNet, b: &BenchNet, hints: &Hints) -> bool {
        let checker = Checker::new(CheckerConfig {
            flat_check_bound: self.flat_bound,
            sim_check_bound: self.sim_bound,
            solver: self.solver,
            dump_path: self.dump.clone(),
        });
        match checker.check(&a.net, &b.net, hints) {
            Ok(Verdict::Equal) => true,
            Ok(Verdict::NotEqual(cex)) => {
                println!("Netlists are not equivalent");
                let Some(cex) = cex else {
                    return false;
                };
                let (Some(ibind), Some(obind)) = (&hints.source_binding, &hints.target_binding)
                else {
                    return false;
                };
                // Cut flip-flops are compared as extra inputs and outputs
                let mut ilinks: BTreeSet<Link> = ibind.keys().copied().collect();
                let mut olinks: BTreeSet<Link> = obind.keys().copied().collect();
                if !a.net.is_comb() {
                    for (_, t) in &a.triggers {
                        ilinks.insert(Link::port(*t));
                        for s in a.net.gate(*t).inputs() {
                            olinks.insert(Link::port(s.node()));
                        }
                    }
                }
                let named: FxHashMap<GateId, &str> = a
                    .inputs
                    .iter()
                    .chain(&a.outputs)
                    .chain(&a.triggers)
                    .map(|(n, g)| (*g, n.as_str()))
                    .collect();
                println!("Inputs:");
                for (n, (l, r)) in link_names(&named, &ilinks).iter().zip(&cex.inputs) {
                    println!("  {}: {}|{}", n, *l as u8, *r as u8);
                }
                println!("Outputs:");
                for (n, (l, r)) in link_names(&named, &olinks).iter().zip(&cex.outputs) {
                    println!("  {}: {}|{}", n, *l as u8, *r as u8);
                }
                false
            }
            Err(e) => {
                error!("Equivalence check failed: {}", e);
                false
            }
        }
    }

    fn run_rnd(&self, a: &BenchNet, b: &BenchNet, hints: &Hints) -> bool {
        if !a.net.is_comb() || !b.net.is_comb() {
            println!("Random checking is only available for combinatorial netlists");
            return false;
        }
        let m = match miter(&a.net, &b.net, hints) {
            Ok(m) => m,
            Err(e) => {
                println!("{}. Netlists are not equivalent", e);
                return false;
            }
        };
        match RndChecker::default().check(&m) {
            Equivalence::Equal => true,
            Equivalence::NotEqual => {
                println!("Netlists are not equivalent");
                false
            }
            Equivalence::Unknown => {
                println!("No difference found by random simulation, but equivalence is not proven");
                false
            }
        }
    }
}

/// Command arguments for miter construction
#[derive(Args)]
pub struct MiterArgs {
    /// First netlist
    file1: PathBuf,
    /// Second netlist
    file2: PathBuf,

    /// Output file for the miter
    #[arg(short = 'o', long)]
    output: PathBuf,
}

impl MiterArgs {
    pub fn run(&self) {
        let a = read_or_exit(&self.file1);
        let b = read_or_exit(&self.file2);
        let hints = match hints_by_name(&a, &b) {
            Ok(h) => h,
            Err(msg) => {
                error!("{}", msg);
                std::process::exit(1);
            }
        };
        let m = match miter(&a.net, &b.net, &hints) {
            Ok(m) => m,
            Err(_) => std::process::exit(1),
        };
        if let Err(e) = write_network_file(&self.output, &m, &a.symbols) {
            error!("Unable to write {}: {}", self.output.display(), e);
            std::process::exit(2);
        }
    }
}

/// Command arguments for statistics
#[derive(Args)]
pub struct ShowArgs {
    /// Netlist to show
    file: PathBuf,
}

impl ShowArgs {
    pub fn run(&self) {
        let bench = read_or_exit(&self.file);
        println!("Netlist stats:\n{}\n\n", stats(&bench.net));
    }
}
