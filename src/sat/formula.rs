//! Formula representation: clauses, implications and cardinality bounds

use itertools::Itertools;
use std::collections::HashMap;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    pub fn unit(literal: i32) -> Self {
        Self { literals: vec![literal] }
    }

    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self { literals: vec![lit1, lit2] }
    }

    /// `premises[0] ∧ premises[1] ∧ … ⟹ conclusions[0] ∨ …` as a clause
    pub fn implication(premises: &[i32], conclusions: &[i32]) -> Self {
        let literals = premises.iter()
            .map(|&lit| -lit)
            .chain(conclusions.iter().copied())
            .collect();
        Self { literals }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    pub fn is_satisfied_by(&self, assignment: &HashMap<i32, bool>) -> bool {
        self.literals.iter().any(|&lit| literal_value(assignment, lit))
    }
}

/// Value of a literal under an assignment; unassigned variables read as false
pub fn literal_value(assignment: &HashMap<i32, bool>, literal: i32) -> bool {
    let value = assignment.get(&literal.abs()).copied().unwrap_or(false);
    if literal > 0 { value } else { !value }
}

/// One constraint of the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Clause(Clause),
    /// Conjunction of `premises` implies the disjunction of `conclusions`
    Implies { premises: Vec<i32>, conclusions: Vec<i32> },
    /// At most `bound` of `literals` are true
    AtMost { literals: Vec<i32>, bound: usize },
}

impl Constraint {
    pub fn unit(literal: i32) -> Self {
        Constraint::Clause(Clause::unit(literal))
    }

    pub fn clause(literals: Vec<i32>) -> Self {
        Constraint::Clause(Clause::new(literals))
    }

    pub fn implies(premises: &[i32], conclusions: &[i32]) -> Self {
        Constraint::Implies {
            premises: premises.to_vec(),
            conclusions: conclusions.to_vec(),
        }
    }

    /// `a` and `b` are not both true
    pub fn exclude(a: i32, b: i32) -> Self {
        Constraint::Clause(Clause::binary(-a, -b))
    }

    pub fn at_most(literals: Vec<i32>, bound: usize) -> Self {
        Constraint::AtMost { literals, bound }
    }

    /// `∧ premises ⟹ ∨_k (∧ alternatives[k])`, distributed into plain
    /// implications (one per way of picking a literal from every alternative).
    pub fn implies_any(premises: &[i32], alternatives: &[Vec<i32>]) -> Vec<Constraint> {
        if alternatives.iter().any(|alternative| alternative.is_empty()) {
            // an empty conjunction is true, so the implication always holds
            return Vec::new();
        }
        if alternatives.is_empty() {
            return vec![Constraint::implies(premises, &[])];
        }

        alternatives.iter()
            .map(|alternative| alternative.iter().copied())
            .multi_cartesian_product()
            .map(|choice| Constraint::implies(premises, &choice))
            .collect()
    }

    pub fn is_satisfied_by(&self, assignment: &HashMap<i32, bool>) -> bool {
        match self {
            Constraint::Clause(clause) => clause.is_satisfied_by(assignment),
            Constraint::Implies { premises, conclusions } => {
                !premises.iter().all(|&lit| literal_value(assignment, lit))
                    || conclusions.iter().any(|&lit| literal_value(assignment, lit))
            }
            Constraint::AtMost { literals, bound } => {
                literals.iter().filter(|&&lit| literal_value(assignment, lit)).count() <= *bound
            }
        }
    }
}

/// Append-only collection of constraints over `variable_count` model variables
#[derive(Debug, Clone, Default)]
pub struct Formula {
    constraints: Vec<Constraint>,
    variable_count: usize,
}

impl Formula {
    pub fn new(variable_count: usize) -> Self {
        Self {
            constraints: Vec::new(),
            variable_count,
        }
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn extend<I: IntoIterator<Item = Constraint>>(&mut self, constraints: I) {
        self.constraints.extend(constraints);
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Number of model variables (ids `1..=variable_count`); the solver may add more
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn set_variable_count(&mut self, variable_count: usize) {
        self.variable_count = variable_count;
    }

    /// Check every constraint against a (model-variable) assignment
    pub fn is_satisfied_by(&self, assignment: &HashMap<i32, bool>) -> bool {
        self.constraints.iter().all(|constraint| constraint.is_satisfied_by(assignment))
    }

    pub fn statistics(&self) -> FormulaStatistics {
        let mut stats = FormulaStatistics {
            variable_count: self.variable_count,
            ..FormulaStatistics::default()
        };

        for constraint in &self.constraints {
            match constraint {
                Constraint::Clause(_) => stats.clauses += 1,
                Constraint::Implies { .. } => stats.implications += 1,
                Constraint::AtMost { .. } => stats.cardinality_bounds += 1,
            }
        }

        stats
    }
}

/// Statistics about a formula before CNF compilation
#[derive(Debug, Clone, Default)]
pub struct FormulaStatistics {
    pub variable_count: usize,
    pub clauses: usize,
    pub implications: usize,
    pub cardinality_bounds: usize,
}

impl std::fmt::Display for FormulaStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Formula Statistics:")?;
        writeln!(f, "  Variables: {}", self.variable_count)?;
        writeln!(f, "  Clauses: {}", self.clauses)?;
        writeln!(f, "  Implications: {}", self.implications)?;
        writeln!(f, "  Cardinality bounds: {}", self.cardinality_bounds)?;
        Ok(())
    }
}
