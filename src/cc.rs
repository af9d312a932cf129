//! Crate `cc` provides the minimal congruence-closure support §4.7 scopes
//! in: a union-find over term ids plus a per-symbol signature table, used
//! only to *check* the `:CC`/`:read-over-weakeq`/`:weakeq-ext` proof-checker
//! lemma kinds (§4.5) against the literals a lemma's clause actually
//! contains — not a full incremental decision procedure, which is a
//! collaborator's concern (§4.7).
use std::collections::HashMap;

use crate::term::{Symbol, TermTable};
use crate::types::TermId;

/// Union-find over term ids with path compression and union-by-rank,
/// grounded on the same "arena + index handles, no pointer graph" idiom
/// [`crate::la::reason`] uses for bound-reason chains.
pub struct UnionFind {
    parent: Vec<TermId>,
    rank: Vec<u32>,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        UnionFind { parent: (0..len).collect(), rank: vec![0; len] }
    }

    fn grow_to(&mut self, len: usize) {
        while self.parent.len() < len {
            let id = self.parent.len();
            self.parent.push(id);
            self.rank.push(0);
        }
    }

    pub fn find(&mut self, x: TermId) -> TermId {
        self.grow_to(x + 1);
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    pub fn union(&mut self, a: TermId, b: TermId) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.rank[ra] < self.rank[rb] {
            self.parent[ra] = rb;
        } else if self.rank[ra] > self.rank[rb] {
            self.parent[rb] = ra;
        } else {
            self.parent[rb] = ra;
            self.rank[ra] += 1;
        }
    }

    pub fn equiv(&mut self, a: TermId, b: TermId) -> bool {
        self.find(a) == self.find(b)
    }
}

/// Signature-table-based congruence closure: merging `a` and `b` also
/// merges any pair of function applications whose argument lists become
/// representative-wise identical (§4.7 "a per-function-symbol signature
/// table keyed by argument representatives for congruence detection").
pub struct CongruenceClosure<'a> {
    terms: &'a TermTable,
    uf: UnionFind,
    /// `(symbol, [repr of each arg]) -> one representative application`,
    /// rebuilt lazily as merges happen.
    signatures: HashMap<(Symbol, Vec<TermId>), TermId>,
}

impl<'a> CongruenceClosure<'a> {
    pub fn new(terms: &'a TermTable) -> Self {
        CongruenceClosure { terms, uf: UnionFind::new(terms.len()), signatures: HashMap::new() }
    }

    fn signature_of(&mut self, t: TermId) -> (Symbol, Vec<TermId>) {
        let node = self.terms.node(t);
        let args = node.args.iter().map(|&a| self.uf.find(a)).collect();
        (node.symbol.clone(), args)
    }

    /// Merge `a` and `b`'s classes, then propagate any congruences this
    /// merge newly exposes.
    pub fn merge(&mut self, a: TermId, b: TermId) {
        self.uf.union(a, b);
        self.reseat_signatures();
    }

    fn reseat_signatures(&mut self) {
        // Recomputing from scratch keeps this simple and correct; the
        // checker only ever validates short proof paths, never drives
        // incremental search, so this is not a hot loop.
        self.signatures.clear();
        let mut pending: Vec<(TermId, TermId)> = Vec::new();
        for t in 0..self.terms.len() {
            if self.terms.args(t).is_empty() {
                continue;
            }
            let sig = self.signature_of(t);
            if let Some(&existing) = self.signatures.get(&sig) {
                if self.uf.find(existing) != self.uf.find(t) {
                    pending.push((existing, t));
                }
            } else {
                self.signatures.insert(sig, t);
            }
        }
        for (x, y) in pending {
            self.uf.union(x, y);
        }
    }

    pub fn equiv(&mut self, a: TermId, b: TermId) -> bool {
        self.uf.equiv(a, b)
    }

    /// `true` iff `f(a...)` and `f(b...)` are forced equal purely by
    /// argument-wise equivalence, the congruence-step test `:CC` path edges
    /// (§4.5) rely on.
    pub fn congruent(&mut self, f: TermId, g: TermId) -> bool {
        let nf = self.terms.node(f);
        let ng = self.terms.node(g);
        if nf.symbol != ng.symbol || nf.args.len() != ng.args.len() {
            return false;
        }
        nf.args.clone().iter().zip(ng.args.clone().iter()).all(|(&x, &y)| self.uf.equiv(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Symbol;

    #[test]
    fn union_find_path_compresses_and_merges_classes() {
        let mut uf = UnionFind::new(4);
        uf.union(0, 1);
        uf.union(1, 2);
        assert!(uf.equiv(0, 2));
        assert!(!uf.equiv(0, 3));
    }

    #[test]
    fn merging_arguments_propagates_congruence() {
        let mut t = TermTable::new();
        let a = t.mk_const(Symbol::BoolVar(0));
        let b = t.mk_const(Symbol::BoolVar(1));
        let f = Symbol::Uninterpreted("f".into());
        let fa = t.mk(f.clone(), vec![a]);
        let fb = t.mk(f, vec![b]);
        let mut cc = CongruenceClosure::new(&t);
        assert!(!cc.equiv(fa, fb));
        cc.merge(a, b);
        assert!(cc.equiv(fa, fb));
    }

    #[test]
    fn congruent_requires_matching_symbol_and_arity() {
        let mut t = TermTable::new();
        let a = t.mk_const(Symbol::BoolVar(0));
        let f = Symbol::Uninterpreted("f".into());
        let g = Symbol::Uninterpreted("g".into());
        let fa = t.mk(f, vec![a]);
        let ga = t.mk(g, vec![a]);
        let mut cc = CongruenceClosure::new(&t);
        assert!(!cc.congruent(fa, ga));
    }
}
