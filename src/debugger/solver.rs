use rustsat::types::Lit;

use crate::error::{Error, Result};

/// A SAT solver, run on a complete formula
pub trait SatOracle {
    /// Solve the formula; returns the value of every variable if satisfiable
    fn solve(&self, nb_vars: u32, clauses: &[Vec<Lit>]) -> Result<Option<Vec<bool>>>;
}

/// Available SAT solvers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SolverKind {
    /// Varisat, pure Rust
    #[default]
    Varisat,
    /// Kissat, through its C bindings
    #[cfg(feature = "kissat")]
    Kissat,
}

impl SolverKind {
    /// Instantiate the solver
    pub fn oracle(self) -> Box<dyn SatOracle> {
        match self {
            SolverKind::Varisat => Box::new(VarisatOracle),
            #[cfg(feature = "kissat")]
            SolverKind::Kissat => Box::new(KissatOracle),
        }
    }
}

/// Oracle based on Varisat
#[derive(Clone, Copy, Debug, Default)]
pub struct VarisatOracle;

impl SatOracle for VarisatOracle {
    fn solve(&self, nb_vars: u32, clauses: &[Vec<Lit>]) -> Result<Option<Vec<bool>>> {
        use varisat::ExtendFormula;

        let mut solver = varisat::Solver::new();
        for c in clauses {
            let lits: Vec<varisat::Lit> = c
                .iter()
                .map(|l| varisat::Lit::from_dimacs(l.to_ipasir() as isize))
                .collect();
            solver.add_clause(&lits);
        }
        match solver.solve() {
            Ok(true) => {
                let mut values = vec![false; nb_vars as usize];
                for l in solver.model().unwrap_or_default() {
                    let i = l.var().index();
                    if i < values.len() {
                        values[i] = l.is_positive();
                    }
                }
                Ok(Some(values))
            }
            Ok(false) => Ok(None),
            Err(e) => Err(Error::Oracle(format!("{:?}", e))),
        }
    }
}

/// Oracle based on Kissat
#[cfg(feature = "kissat")]
#[derive(Clone, Copy, Debug, Default)]
pub struct KissatOracle;

#[cfg(feature = "kissat")]
impl SatOracle for KissatOracle {
    fn solve(&self, nb_vars: u32, clauses: &[Vec<Lit>]) -> Result<Option<Vec<bool>>> {
        use rustsat::solvers::{Solve, SolverResult};
        use rustsat::types::{Clause, TernaryVal};

        let mut solver = rustsat_kissat::Kissat::default();
        for c in clauses {
            let clause: Clause = c.iter().copied().collect();
            solver
                .add_clause(clause)
                .map_err(|e| Error::Oracle(e.to_string()))?;
        }
        match solver.solve().map_err(|e| Error::Oracle(e.to_string()))? {
            SolverResult::Sat => {
                let mut values = Vec::with_capacity(nb_vars as usize);
                for v in 0..nb_vars {
                    let val = solver
                        .lit_val(Lit::new(v, false))
                        .map_err(|e| Error::Oracle(e.to_string()))?;
                    values.push(val == TernaryVal::True);
                }
                Ok(Some(values))
            }
            SolverResult::Unsat => Ok(None),
            SolverResult::Interrupted => Err(Error::Oracle("interrupted".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varisat() {
        let a = Lit::new(0, false);
        let b = Lit::new(1, false);
        let oracle = SolverKind::Varisat.oracle();
        let sat = oracle
            .solve(2, &[vec![a, b], vec![!a], vec![!a, b]])
            .unwrap();
        assert_eq!(sat, Some(vec![false, true]));
        let unsat = oracle.solve(2, &[vec![a], vec![!a, b], vec![!b]]).unwrap();
        assert_eq!(unsat, None);
    }

    #[test]
    fn test_empty() {
        assert_eq!(VarisatOracle.solve(0, &[]).unwrap(), Some(Vec::new()));
    }
}
