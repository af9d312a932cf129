//! Crate `clause` provides the atom table, `Literal`, and `Clause` objects
//! (§3 "Clause": "A multiset of literals. A literal is an atom ... with a
//! polarity"), generalizing `splr::clause::Clause` from purely Boolean CNF
//! literals to the four atom kinds §3 names: bound constraints, equality
//! atoms, CC equalities, and uninterpreted predicate applications.
use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;

use crate::affine::AffineTerm;
use crate::types::{int2lit, DecisionLevel, Lit, LiteralEncoding, TermId, VarId, VarIdEncoding};

/// What a DPLL-visible atom actually asserts. Every atom is normalized by
/// the term compiler (§4.6) to one of these shapes before it ever reaches
/// the clause/assignment layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtomKind {
    /// `affine <= 0`, strict iff `strict` (the canonical post-`:leqToLeq0`
    /// shape of every arithmetic comparison, §4.6).
    BoundLe0 { affine_key: String, strict: bool },
    /// A binary equality atom `(= lhs rhs)`, after chain-expansion (§4.6
    /// "`=` chainable over ≥3 arguments expands to ... pairwise
    /// equalities").
    Equality { lhs: TermId, rhs: TermId },
    /// A proxy for a Boolean-uninterpreted-predicate application or a
    /// Tseitin-introduced connective, carrying the underlying term so the
    /// tautology/rewrite checkers (§4.5) can pattern-match its shape.
    Predicate { term: TermId },
}

impl fmt::Display for AtomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomKind::BoundLe0 { affine_key, strict } => {
                write!(f, "({} {} 0)", affine_key, if *strict { "<" } else { "<=" })
            }
            AtomKind::Equality { lhs, rhs } => write!(f, "(= t{} t{})", lhs, rhs),
            AtomKind::Predicate { term } => write!(f, "t{}", term),
        }
    }
}

/// One DPLL-visible proxy atom, registered lazily during clausification and
/// pinned to the assertion-stack level it was created at (§3 "Lifecycles").
#[derive(Clone, Debug)]
pub struct Atom {
    pub kind: AtomKind,
    /// The affine form backing a `BoundLe0` atom, kept alongside the
    /// canonical string key so Farkas combination (§4.1, §4.5 `:LA`) does
    /// not need to re-parse it.
    pub affine: Option<AffineTerm>,
    pub created_at_level: DecisionLevel,
}

/// Registry mapping atom content to a stable [`VarId`], the Boolean-proxy
/// analogue of [`crate::term::TermTable`]; mirrors how `splr` allocates one
/// `VarId` per clausal variable.
#[derive(Default)]
pub struct AtomTable {
    atoms: Vec<Atom>,
    by_key: HashMap<String, VarId>,
}

impl AtomTable {
    pub fn new() -> Self {
        AtomTable::default()
    }

    fn key_of(kind: &AtomKind) -> String {
        match kind {
            AtomKind::BoundLe0 { affine_key, strict } => {
                format!("le0:{}:{}", affine_key, strict)
            }
            AtomKind::Equality { lhs, rhs } => {
                let (a, b) = if lhs <= rhs { (lhs, rhs) } else { (rhs, lhs) };
                format!("eq:{}:{}", a, b)
            }
            AtomKind::Predicate { term } => format!("pred:{}", term),
        }
    }

    /// Register (or find) the atom, returning the positive literal for it.
    /// Idempotent by content, the way `TermTable::intern` is idempotent by
    /// structure — re-asserting the same bound never allocates a second
    /// proxy variable.
    pub fn intern(&mut self, kind: AtomKind, affine: Option<AffineTerm>, level: DecisionLevel) -> Lit {
        let key = Self::key_of(&kind);
        if let Some(vi) = self.by_key.get(&key) {
            return (*vi).pos_lit();
        }
        let vi = self.atoms.len();
        self.by_key.insert(key, vi);
        self.atoms.push(Atom { kind, affine, created_at_level: level });
        vi.pos_lit()
    }

    pub fn atom(&self, vi: VarId) -> &Atom {
        &self.atoms[vi]
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Every registered atom paired with the `VarId` it lives at, mirroring
    /// [`ClauseDb::iter`]. Used by the model-repair pass (§4.1 "mutate") to
    /// seed a congruence closure from the currently-true `Equality` atoms.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Atom)> {
        self.atoms.iter().enumerate()
    }

    /// Discard atoms created at a level deeper than `level`, per §3
    /// "Lifecycles": "`pop` deletes atoms and variables created at higher
    /// levels". Invalidating the tail of a monotone `Vec` is O(1) amortized
    /// and needs no separate freelist, unlike `splr`'s clause-id reuse.
    pub fn truncate_to_level(&mut self, level: DecisionLevel) {
        while let Some(last) = self.atoms.last() {
            if last.created_at_level > level {
                let removed = self.atoms.pop().unwrap();
                self.by_key.remove(&Self::key_of(&removed.kind));
            } else {
                break;
            }
        }
    }
}

/// A clause: a [`smallvec`]-backed bag of literals (§3 "Clause", grounded on
/// `plaans-aries`'s reasoner using `SmallVec` for clause storage, since
/// almost every clause this engine produces — Tseitin definitions, LA and
/// CC lemmas — is short).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Clause {
    pub literals: SmallVec<[Lit; 4]>,
}

impl Clause {
    pub fn new(literals: impl IntoIterator<Item = Lit>) -> Self {
        Clause { literals: literals.into_iter().collect() }
    }

    pub fn empty() -> Self {
        Clause::new(std::iter::empty())
    }

    pub fn unit(l: Lit) -> Self {
        Clause::new([l])
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn contains(&self, l: Lit) -> bool {
        self.literals.contains(&l)
    }

    /// Multiset-without-duplicates equality used by `@clause` (§4.5): "the
    /// first argument's disjunct multiset equals the second's and has no
    /// duplicates".
    pub fn has_duplicates(&self) -> bool {
        let mut seen: Vec<Lit> = self.literals.to_vec();
        seen.sort_unstable();
        seen.windows(2).any(|w| w[0] == w[1])
    }

    pub fn same_literal_set(&self, other: &Clause) -> bool {
        let mut a: Vec<Lit> = self.literals.to_vec();
        let mut b: Vec<Lit> = other.literals.to_vec();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(or")?;
        for l in &self.literals {
            write!(f, " {}{}", if l.positive() { "" } else { "¬" }, l.vi())?;
        }
        write!(f, ")")
    }
}

pub fn lit_of_int(x: i32) -> Lit {
    int2lit(x)
}

/// The clause database the DPLL loop propagates over (§4.3). Unlike
/// `splr::cdb::ClauseDB`, which indexes clauses behind watch-literal lists
/// for sublinear propagation, this is a flat arena scanned on every
/// propagation step — the engine's weight is meant to sit in the LA theory
/// and the proof framework, not in CNF-propagation throughput, so the
/// simpler representation is kept deliberately rather than ported from
/// `splr`'s watch-list machinery.
#[derive(Default)]
pub struct ClauseDb {
    clauses: Vec<Clause>,
}

impl ClauseDb {
    pub fn new() -> Self {
        ClauseDb::default()
    }

    pub fn add(&mut self, clause: Clause) -> crate::types::ClauseId {
        let id = self.clauses.len();
        self.clauses.push(clause);
        id
    }

    pub fn get(&self, id: crate::types::ClauseId) -> &Clause {
        &self.clauses[id]
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (crate::types::ClauseId, &Clause)> {
        self.clauses.iter().enumerate()
    }

    /// Discard clauses added at a level deeper than `level` (lemmas and
    /// Tseitin definitions created while a scope was open, per §3
    /// "Lifecycles").
    pub fn truncate(&mut self, len: usize) {
        self.clauses.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_the_same_bound_twice_reuses_the_atom() {
        let mut atoms = AtomTable::new();
        let kind = AtomKind::BoundLe0 { affine_key: "x".into(), strict: false };
        let l1 = atoms.intern(kind.clone(), None, 0);
        let l2 = atoms.intern(kind, None, 0);
        assert_eq!(l1, l2);
        assert_eq!(atoms.len(), 1);
    }

    #[test]
    fn equality_atom_key_is_order_independent() {
        let mut atoms = AtomTable::new();
        let l1 = atoms.intern(AtomKind::Equality { lhs: 1, rhs: 2 }, None, 0);
        let l2 = atoms.intern(AtomKind::Equality { lhs: 2, rhs: 1 }, None, 0);
        assert_eq!(l1, l2);
    }

    #[test]
    fn truncate_to_level_drops_only_deeper_atoms() {
        let mut atoms = AtomTable::new();
        atoms.intern(AtomKind::Predicate { term: 1 }, None, 0);
        atoms.intern(AtomKind::Predicate { term: 2 }, None, 1);
        atoms.truncate_to_level(0);
        assert_eq!(atoms.len(), 1);
    }

    #[test]
    fn clause_duplicate_detection() {
        let c = Clause::new([0u32, 0u32]);
        assert!(c.has_duplicates());
    }

    #[test]
    fn same_literal_set_ignores_order() {
        let a = Clause::new([0u32, 2u32, 4u32]);
        let b = Clause::new([4u32, 0u32, 2u32]);
        assert!(a.same_literal_set(&b));
    }
}
