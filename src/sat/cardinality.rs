//! CNF encodings of "at most k" cardinality bounds

use super::formula::Clause;
use itertools::Itertools;

/// Above this many literals the sequential counter replaces the naive encoding
const NAIVE_LIMIT: usize = 10;

/// Hands out auxiliary variables above the model's own variables
#[derive(Debug, Clone)]
pub struct AuxiliaryAllocator {
    next: i32,
    first: i32,
}

impl AuxiliaryAllocator {
    /// Start allocating right after `variable_count` model variables
    pub fn after(variable_count: usize) -> Self {
        let first = variable_count as i32 + 1;
        Self { next: first, first }
    }

    pub fn fresh(&mut self) -> i32 {
        let var = self.next;
        self.next += 1;
        var
    }

    pub fn allocated(&self) -> usize {
        (self.next - self.first) as usize
    }

    pub fn is_auxiliary(&self, var: i32) -> bool {
        var >= self.first
    }
}

/// Encode "at most `bound` of `literals` are true"
pub fn encode_at_most(literals: &[i32], bound: usize, aux: &mut AuxiliaryAllocator) -> Vec<Clause> {
    if bound >= literals.len() {
        return Vec::new();
    }
    if bound == 0 {
        return literals.iter().map(|&lit| Clause::unit(-lit)).collect();
    }

    if literals.len() <= NAIVE_LIMIT {
        // every (bound + 1)-subset has a false member
        literals.iter()
            .copied()
            .combinations(bound + 1)
            .map(|subset| Clause::new(subset.into_iter().map(|lit| -lit).collect()))
            .collect()
    } else {
        encode_sequential_counter(literals, bound, aux)
    }
}

/// Sinz sequential counter: `s[i][j]` holds when at least `j + 1` of
/// `literals[0..=i]` are true.
fn encode_sequential_counter(literals: &[i32], bound: usize, aux: &mut AuxiliaryAllocator) -> Vec<Clause> {
    let n = literals.len();
    let k = bound;

    let counters: Vec<Vec<i32>> = (0..n - 1)
        .map(|_| (0..k).map(|_| aux.fresh()).collect())
        .collect();

    let mut clauses = Vec::with_capacity(2 * n * k + n);

    clauses.push(Clause::binary(-literals[0], counters[0][0]));
    for j in 1..k {
        clauses.push(Clause::unit(-counters[0][j]));
    }

    for i in 1..n - 1 {
        let x = literals[i];
        let prev = &counters[i - 1];
        let curr = &counters[i];

        clauses.push(Clause::binary(-x, curr[0]));
        clauses.push(Clause::binary(-prev[0], curr[0]));
        for j in 1..k {
            clauses.push(Clause::new(vec![-x, -prev[j - 1], curr[j]]));
            clauses.push(Clause::binary(-prev[j], curr[j]));
        }
        // overflow
        clauses.push(Clause::binary(-x, -prev[k - 1]));
    }

    clauses.push(Clause::binary(-literals[n - 1], -counters[n - 2][k - 1]));

    clauses
}
