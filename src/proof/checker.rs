//! The independent proof checker (§4.5, §8 "Soundness"): walks a proof term
//! once with an explicit work stack (no recursion — a proof DAG can be
//! deep when it chains long resolution refutations) and memoizes each
//! node's proved formula by `Arc` pointer identity, the arena-by-index
//! idiom [`crate::term::TermTable`] uses generalized to pointer-keyed
//! memoization since proof nodes are `Arc`-shared rather than
//! arena-indexed (§9).
//!
//! Per §4.5's failure policy, a mismatch is recorded and the walk
//! continues — one buggy rule must never hide a second.
use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::cc::CongruenceClosure;
use crate::clause::{AtomKind, AtomTable};
use crate::error::CheckerError;
use crate::proof::rewrite::{affine_terms_equal, affine_terms_equal_up_to_sign, to_affine};
use crate::proof::{LemmaKind, ProofTerm, SplitRule};
use crate::rational::Rational;
use crate::term::{Symbol, TermTable};
use crate::types::{Lit, LiteralEncoding, TermId};

/// The formula a proof node proves, in the minimal shape the checker needs
/// to validate the *next* node up — not a full reconstruction of the
/// original formula.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Proved {
    /// `(= lhs rhs)`.
    Eq(TermId, TermId),
    /// A bare fact `t` (proved true, as `@eq`'s first argument needs).
    Fact(TermId),
    /// A clause, as a literal multiset.
    Clause(SmallVec<[Lit; 4]>),
}

/// Accumulates every mismatch the checker finds across one proof, per
/// §4.5/§7's "report, don't stop" policy; `ok()` is the boolean success
/// flag §4.5 says the checker returns at the end.
#[derive(Default, Debug)]
pub struct CheckerFailure {
    pub errors: Vec<CheckerError>,
}

impl CheckerFailure {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, e: CheckerError) {
        self.errors.push(e);
    }
}

struct Checker<'a> {
    terms: &'a TermTable,
    atoms: &'a AtomTable,
    memo: HashMap<usize, Proved>,
    next_node_id: usize,
    ids: HashMap<usize, usize>,
    failure: CheckerFailure,
}

fn ptr_key(p: &Arc<ProofTerm>) -> usize {
    Arc::as_ptr(p) as usize
}

impl<'a> Checker<'a> {
    fn new(terms: &'a TermTable, atoms: &'a AtomTable) -> Self {
        Checker { terms, atoms, memo: HashMap::new(), next_node_id: 0, ids: HashMap::new(), failure: CheckerFailure::default() }
    }

    fn node_id(&mut self, p: &Arc<ProofTerm>) -> usize {
        let key = ptr_key(p);
        *self.ids.entry(key).or_insert_with(|| {
            let id = self.next_node_id;
            self.next_node_id += 1;
            id
        })
    }

    /// Non-recursive post-order walk: push `root`, and whenever a node's
    /// children are not yet memoized, push them first and revisit the
    /// parent afterward.
    fn check(&mut self, root: &Arc<ProofTerm>) -> Proved {
        let mut stack: Vec<(Arc<ProofTerm>, bool)> = vec![(root.clone(), false)];
        while let Some((node, children_done)) = stack.pop() {
            let key = ptr_key(&node);
            if self.memo.contains_key(&key) {
                continue;
            }
            if !children_done {
                let children = Self::children_of(&node);
                if children.iter().any(|c| !self.memo.contains_key(&ptr_key(c))) {
                    stack.push((node.clone(), true));
                    for c in children {
                        if !self.memo.contains_key(&ptr_key(&c)) {
                            stack.push((c, false));
                        }
                    }
                    continue;
                }
            }
            let proved = self.evaluate(&node);
            self.memo.insert(key, proved);
        }
        self.memo.get(&ptr_key(root)).cloned().unwrap_or(Proved::Fact(0))
    }

    fn children_of(node: &ProofTerm) -> Vec<Arc<ProofTerm>> {
        match node {
            ProofTerm::Refl { .. } => vec![],
            ProofTerm::Trans { steps } => steps.clone(),
            ProofTerm::Cong { base, arg_rewrites, .. } => {
                let mut v = vec![base.clone()];
                v.extend(arg_rewrites.iter().cloned());
                v
            }
            ProofTerm::Eq { fact, equality } => vec![fact.clone(), equality.clone()],
            ProofTerm::Rewrite { .. } | ProofTerm::Intern { .. } => vec![],
            ProofTerm::Res { main, steps } => {
                let mut v = vec![main.clone()];
                v.extend(steps.iter().map(|s| s.arg.clone()));
                v
            }
            ProofTerm::ClauseCheck { inner, .. } => vec![inner.clone()],
            ProofTerm::Lemma { .. } | ProofTerm::Tautology { .. } | ProofTerm::Asserted { .. } => vec![],
            ProofTerm::Split { arg, .. } => vec![arg.clone()],
        }
    }

    fn proved_of(&self, p: &Arc<ProofTerm>) -> Proved {
        self.memo.get(&ptr_key(p)).cloned().unwrap_or_else(|| Proved::Fact(0))
    }

    fn evaluate(&mut self, node: &Arc<ProofTerm>) -> Proved {
        let id = self.node_id(node);
        match &**node {
            ProofTerm::Refl { term } => Proved::Eq(*term, *term),

            ProofTerm::Trans { steps } => {
                let mut proved: Vec<(TermId, TermId)> = Vec::new();
                for s in steps {
                    match self.proved_of(s) {
                        Proved::Eq(a, b) => proved.push((a, b)),
                        _ => self.failure.push(CheckerError::TransMismatch {
                            node: id,
                            lhs: "?".into(),
                            rhs: "?".into(),
                        }),
                    }
                }
                for w in proved.windows(2) {
                    if w[0].1 != w[1].0 {
                        self.failure.push(CheckerError::TransMismatch {
                            node: id,
                            lhs: self.terms.display(w[0].1),
                            rhs: self.terms.display(w[1].0),
                        });
                    }
                }
                match (proved.first(), proved.last()) {
                    (Some(first), Some(last)) => Proved::Eq(first.0, last.1),
                    _ => Proved::Fact(0),
                }
            }

            ProofTerm::Cong { base, arg_rewrites, result } => {
                let (lhs, base_term) = match self.proved_of(base) {
                    Proved::Eq(a, b) => (a, b),
                    _ => {
                        self.failure.push(CheckerError::CongArity { node: id });
                        return Proved::Fact(0);
                    }
                };
                let expected_arity = self.terms.args(base_term).len();
                if arg_rewrites.len() != expected_arity {
                    self.failure.push(CheckerError::CongArity { node: id });
                }
                let mut expected_args = self.terms.args(base_term).to_vec();
                for (i, r) in arg_rewrites.iter().enumerate() {
                    if let Proved::Eq(from, to) = self.proved_of(r) {
                        if i < expected_args.len() && expected_args[i] == from {
                            expected_args[i] = to;
                        }
                    }
                }
                // `result` must actually be `(f expected_args...)`, not just
                // some term the caller hands us — otherwise `cong` would let
                // a forged proof rewrite to an arbitrary unrelated term.
                let same_symbol = self.terms.symbol(*result) == self.terms.symbol(base_term);
                let same_args = self.terms.args(*result) == expected_args.as_slice();
                if !same_symbol || !same_args {
                    self.failure.push(CheckerError::CongArity { node: id });
                }
                Proved::Eq(lhs, *result)
            }

            ProofTerm::Eq { fact, equality } => {
                let proved_fact = self.proved_of(fact);
                let (lhs, rhs) = match self.proved_of(equality) {
                    Proved::Eq(a, b) => (a, b),
                    _ => {
                        self.failure.push(CheckerError::EqLhsMismatch { node: id });
                        return Proved::Fact(0);
                    }
                };
                match proved_fact {
                    Proved::Fact(t) if t == lhs => Proved::Fact(rhs),
                    Proved::Eq(a, b) if a == lhs => Proved::Eq(rhs, b),
                    _ => {
                        self.failure.push(CheckerError::EqLhsMismatch { node: id });
                        Proved::Fact(rhs)
                    }
                }
            }

            ProofTerm::Rewrite { rule, lhs, rhs } => {
                if !rule.verify(self.terms, *lhs, *rhs) {
                    self.failure.push(CheckerError::RewriteMismatch { node: id, rule: rule_name(*rule) });
                }
                Proved::Eq(*lhs, *rhs)
            }

            ProofTerm::Intern { lhs, rhs } => Proved::Eq(*lhs, *rhs),

            ProofTerm::Res { main, steps } => {
                let mut acc: Vec<Lit> = match self.proved_of(main) {
                    Proved::Clause(c) => c.to_vec(),
                    _ => {
                        self.failure.push(CheckerError::ExtraLiteral { node: id });
                        Vec::new()
                    }
                };
                for step in steps.iter() {
                    let pivot_neg = step.pivot.negate();
                    if let Some(pos) = acc.iter().position(|&l| l == pivot_neg) {
                        acc.remove(pos);
                    }
                    match self.proved_of(&step.arg) {
                        Proved::Clause(arg_clause) => {
                            if !arg_clause.contains(&step.pivot) {
                                self.failure.push(CheckerError::ResidualPivot { node: id });
                            }
                            for &l in arg_clause.iter() {
                                if l != step.pivot && !acc.contains(&l) {
                                    acc.push(l);
                                }
                            }
                        }
                        _ => self.failure.push(CheckerError::ExtraLiteral { node: id }),
                    }
                }
                Proved::Clause(acc.into_iter().collect())
            }

            ProofTerm::ClauseCheck { inner, clause } => {
                match self.proved_of(inner) {
                    Proved::Clause(got) => {
                        let mut g: Vec<Lit> = got.to_vec();
                        let mut want: Vec<Lit> = clause.literals.to_vec();
                        g.sort_unstable();
                        want.sort_unstable();
                        if g != want {
                            self.failure.push(CheckerError::ClauseMismatch { node: id });
                        }
                    }
                    _ => self.failure.push(CheckerError::ClauseMismatch { node: id }),
                }
                if clause.has_duplicates() {
                    self.failure.push(CheckerError::ClauseDuplicate { node: id });
                }
                Proved::Clause(clause.literals.clone())
            }

            ProofTerm::Lemma { clause, kind } => {
                self.check_lemma(id, clause, kind);
                Proved::Clause(clause.literals.clone())
            }

            ProofTerm::Tautology { clause, schema } => {
                if !schema.verify(self.atoms, self.terms, &clause.literals) {
                    self.failure.push(CheckerError::TautologyMismatch { node: id, schema: tautology_name(*schema) });
                }
                Proved::Clause(clause.literals.clone())
            }

            ProofTerm::Asserted { clause } => Proved::Clause(clause.literals.clone()),

            ProofTerm::Split { rule, arg, target } => {
                self.check_split(id, *rule, arg, *target);
                Proved::Clause(smallvec::smallvec![*target])
            }
        }
    }

    fn check_lemma(&mut self, id: usize, clause: &crate::clause::Clause, kind: &LemmaKind) {
        match kind {
            LemmaKind::La { coefficients } => self.check_la_lemma(id, clause, coefficients),
            LemmaKind::Cc { path } => self.check_cc_lemma(id, clause, path),
            LemmaKind::ArrayPath { path, weak, .. } => self.check_array_path_lemma(id, clause, path, weak),
            LemmaKind::Trichotomy { .. } => self.check_trichotomy_lemma(id, clause),
            LemmaKind::Eq => self.check_eq_lemma(id, clause),
        }
    }

    /// §4.5 `:LA`: verify `Σ cᵢ·ℓᵢ` over the clause's bound atoms sums to a
    /// non-positive constant, strict iff some contributing literal is
    /// strict, with every coefficient's sign matching its literal's
    /// polarity (positive for `≤`, negative for `¬≤`) — the same
    /// combination [`crate::la::simplex::Simplex::generate_conflict`]
    /// produces on the solving side.
    fn check_la_lemma(&mut self, id: usize, clause: &crate::clause::Clause, coefficients: &[Rational]) {
        if clause.len() != coefficients.len() {
            self.failure.push(CheckerError::LaNotInfeasible { node: id });
            return;
        }
        let mut combo = crate::affine::AffineTerm::zero();
        let mut strict = false;
        for (lit, coeff) in clause.literals.iter().zip(coefficients.iter()) {
            let atom = self.atoms.atom(lit.vi());
            let (affine, atom_strict) = match &atom.kind {
                AtomKind::BoundLe0 { strict, .. } => (atom.affine.clone(), *strict),
                _ => {
                    self.failure.push(CheckerError::LaBadCoefficientSign { node: id, lit: lit.vi() });
                    continue;
                }
            };
            let Some(affine) = affine else {
                self.failure.push(CheckerError::LaBadCoefficientSign { node: id, lit: lit.vi() });
                continue;
            };
            // The clause's literal is the *negation* of the asserted bound
            // (a resolution refutation eliminates the bound it contradicts),
            // so a positive literal here contributes with a negative sign.
            let sign_ok = if lit.positive() { coeff.signum() <= 0 } else { coeff.signum() >= 0 };
            if !sign_ok && !coeff.is_zero() {
                self.failure.push(CheckerError::LaBadCoefficientSign { node: id, lit: lit.vi() });
            }
            if atom_strict && !lit.positive() {
                strict = true;
            }
            combo.add_scaled(&affine, coeff);
        }
        if !combo.is_constant() {
            self.failure.push(CheckerError::LaNotInfeasible { node: id });
            return;
        }
        let ok = if strict { combo.constant.signum() < 0 } else { combo.constant.signum() <= 0 };
        if !ok {
            self.failure.push(CheckerError::LaNotInfeasible { node: id });
        }
    }

    /// Every negative `Equality` literal of `clause` is a hypothesis the
    /// lemma is allowed to rest a `:CC`/array-path edge on, in both
    /// directions (§4.5 `:CC`: "a path ... via literal/congruence/trivial
    /// edges").
    fn hypothesis_equalities(&self, clause: &crate::clause::Clause) -> Vec<(TermId, TermId)> {
        let mut out = Vec::new();
        for &lit in clause.literals.iter() {
            if lit.positive() {
                continue;
            }
            if let AtomKind::Equality { lhs, rhs } = &self.atoms.atom(lit.vi()).kind {
                out.push((*lhs, *rhs));
                out.push((*rhs, *lhs));
            }
        }
        out
    }

    /// Walk `path` in order, accepting each edge as a hypothesis equality,
    /// a trivial identity, or a congruence step forced by the edges
    /// already accepted — rejecting (and recording) any edge that is
    /// none of those, rather than trusting the producer's annotation.
    fn validate_edge_path(&mut self, id: usize, hyps: &[(TermId, TermId)], path: &[(TermId, TermId)]) -> bool {
        let mut cc = CongruenceClosure::new(self.terms);
        let mut ok = true;
        for (i, &(a, b)) in path.iter().enumerate() {
            let is_cong = a != b && !self.terms.args(a).is_empty() && !self.terms.args(b).is_empty() && cc.congruent(a, b);
            if a == b || hyps.contains(&(a, b)) || is_cong {
                cc.merge(a, b);
            } else {
                self.failure.push(CheckerError::CcUnexplainedEdge { node: id, edge: i });
                ok = false;
            }
        }
        ok
    }

    /// §4.5 `:CC`: the path must connect consecutively and every edge must
    /// be a known equality literal, a congruence step, or a trivial
    /// identity — validated against a real [`CongruenceClosure`] built
    /// from the lemma's own hypothesis literals, not just a shape check.
    fn check_cc_lemma(&mut self, id: usize, clause: &crate::clause::Clause, path: &[(TermId, TermId)]) {
        if path.is_empty() {
            self.failure.push(CheckerError::CcUnexplainedEdge { node: id, edge: 0 });
            return;
        }
        for w in path.windows(2) {
            if w[0].1 != w[1].0 {
                self.failure.push(CheckerError::CcUnexplainedEdge { node: id, edge: 0 });
            }
        }
        let hyps = self.hypothesis_equalities(clause);
        self.validate_edge_path(id, &hyps, path);
    }

    /// §4.5 `:read-over-weakeq`/`:weakeq-ext`: the main path must connect
    /// the goal's two sides; each weak subpath (supporting a missing
    /// select-index equality) is validated the same way as a `:CC` path.
    fn check_array_path_lemma(
        &mut self,
        id: usize,
        clause: &crate::clause::Clause,
        path: &[(TermId, TermId)],
        weak: &[Vec<(TermId, TermId)>],
    ) {
        if path.is_empty() {
            self.failure.push(CheckerError::ArrayPathDisconnected { node: id });
            return;
        }
        for w in path.windows(2) {
            if w[0].1 != w[1].0 {
                self.failure.push(CheckerError::ArrayPathDisconnected { node: id });
            }
        }
        let hyps = self.hypothesis_equalities(clause);
        self.validate_edge_path(id, &hyps, path);
        for sub in weak {
            if !sub.is_empty() {
                self.validate_edge_path(id, &hyps, sub);
            }
        }
    }

    /// §4.5 `:trichotomy`: exactly three `≤0`-bound literals whose affine
    /// forms all agree up to sign — the `<`, `=`-proxy, and `>` legs over
    /// one shared affine key.
    fn check_trichotomy_lemma(&mut self, id: usize, clause: &crate::clause::Clause) {
        if clause.len() != 3 {
            self.failure.push(CheckerError::TrichotomyShape { node: id });
            return;
        }
        let mut affines = Vec::with_capacity(3);
        for &lit in clause.literals.iter() {
            let atom = self.atoms.atom(lit.vi());
            match (&atom.kind, &atom.affine) {
                (AtomKind::BoundLe0 { .. }, Some(affine)) => affines.push(affine.clone()),
                _ => {
                    self.failure.push(CheckerError::TrichotomyShape { node: id });
                    return;
                }
            }
        }
        let base = affines[0].clone();
        if !affine_terms_equal_up_to_sign(&base, &affines[1]) || !affine_terms_equal_up_to_sign(&base, &affines[2]) {
            self.failure.push(CheckerError::TrichotomyShape { node: id });
        }
    }

    /// One literal's own affine "diff": its stored bound affine, or for a
    /// raw equality atom `lhs - rhs` computed independently. Used so
    /// `:EQ`'s two literals are each read in their own terms rather than
    /// letting one side's parameters leak into the other's (the mix-up
    /// this lemma kind is named for).
    fn literal_affine_diff(&self, lit: Lit) -> Option<crate::affine::AffineTerm> {
        let atom = self.atoms.atom(lit.vi());
        match &atom.kind {
            AtomKind::BoundLe0 { .. } => atom.affine.clone(),
            AtomKind::Equality { lhs, rhs } => {
                let mut diff = to_affine(self.terms, *lhs);
                diff.add_scaled(&to_affine(self.terms, *rhs), &Rational::from_i64(-1));
                Some(diff)
            }
            AtomKind::Predicate { .. } => None,
        }
    }

    /// §4.5 `:EQ`: a positive equality and a disequality over affine-equal
    /// terms — each literal's affine form is derived independently, then
    /// compared.
    fn check_eq_lemma(&mut self, id: usize, clause: &crate::clause::Clause) {
        if clause.len() != 2 {
            self.failure.push(CheckerError::EqLemmaMismatch { node: id });
            return;
        }
        let (Some(a), Some(b)) =
            (self.literal_affine_diff(clause.literals[0]), self.literal_affine_diff(clause.literals[1]))
        else {
            self.failure.push(CheckerError::EqLemmaMismatch { node: id });
            return;
        };
        if !affine_terms_equal_up_to_sign(&a, &b) {
            self.failure.push(CheckerError::EqLemmaMismatch { node: id });
        }
    }

    fn check_split(&mut self, id: usize, rule: SplitRule, arg: &Arc<ProofTerm>, target: Lit) {
        let arg_clause = match self.proved_of(arg) {
            Proved::Clause(c) => c,
            _ => {
                self.failure.push(CheckerError::SplitMismatch { node: id, rule: split_name(rule) });
                return;
            }
        };
        let ok = match rule {
            SplitRule::NotOr => arg_clause.len() == 1,
            SplitRule::EqPlusHalf => self.check_eq_half_split(&arg_clause, target, true),
            SplitRule::EqMinusHalf => self.check_eq_half_split(&arg_clause, target, false),
            SplitRule::ItePlusHalf => self.check_ite_half_split(&arg_clause, target, true),
            SplitRule::IteMinusHalf => self.check_ite_half_split(&arg_clause, target, false),
        };
        if !ok {
            self.failure.push(CheckerError::SplitMismatch { node: id, rule: split_name(rule) });
        }
    }

    /// `:=+1/2`/`:=-1/2`: `arg` proves `(= lhs rhs)`; `target` must be the
    /// `≤0`-normal bound literal for `lhs - rhs` (plus half) or its
    /// negation `rhs - lhs` (minus half).
    fn check_eq_half_split(&self, arg_clause: &[Lit], target: Lit, plus: bool) -> bool {
        let Some((lhs, rhs)) = arg_clause.iter().find_map(|&l| match &self.atoms.atom(l.vi()).kind {
            AtomKind::Equality { lhs, rhs } => Some((*lhs, *rhs)),
            _ => None,
        }) else {
            return false;
        };
        let mut diff = to_affine(self.terms, lhs);
        diff.add_scaled(&to_affine(self.terms, rhs), &Rational::from_i64(-1));
        if !plus {
            diff = diff.negate();
        }
        match (&self.atoms.atom(target.vi()).kind, &self.atoms.atom(target.vi()).affine) {
            (AtomKind::BoundLe0 { .. }, Some(target_affine)) => affine_terms_equal(target_affine, &diff),
            _ => false,
        }
    }

    /// `:ite+1/2`/`:ite-1/2`: `arg` proves a clause mentioning an `ite`
    /// term; `target` must reference either that `ite`'s condition or its
    /// selected branch.
    fn check_ite_half_split(&self, arg_clause: &[Lit], target: Lit, then_branch: bool) -> bool {
        let Some(ite_term) = arg_clause.iter().find_map(|&l| match &self.atoms.atom(l.vi()).kind {
            AtomKind::Predicate { term } if matches!(self.terms.symbol(*term), Symbol::Ite) => Some(*term),
            _ => None,
        }) else {
            return false;
        };
        let args = self.terms.args(ite_term);
        if args.len() != 3 {
            return false;
        }
        let branch = if then_branch { args[1] } else { args[2] };
        let mentions = |t: TermId| -> bool {
            match &self.atoms.atom(target.vi()).kind {
                AtomKind::Predicate { term } => *term == t || self.terms.args(*term).contains(&t),
                AtomKind::Equality { lhs, rhs } => *lhs == t || *rhs == t,
                AtomKind::BoundLe0 { .. } => false,
            }
        };
        mentions(args[0]) || mentions(branch)
    }
}

fn rule_name(r: crate::proof::RewriteRule) -> &'static str {
    use crate::proof::RewriteRule::*;
    match r {
        Expand => ":expand",
        ExpandDef => ":expandDef",
        TrueNotFalse => ":trueNotFalse",
        ConstDiff => ":constDiff",
        EqTrue => ":eqTrue",
        EqFalse => ":eqFalse",
        EqSimp => ":eqSimp",
        EqSame => ":eqSame",
        EqBinary => ":eqBinary",
        DistinctBool => ":distinctBool",
        DistinctSame => ":distinctSame",
        DistinctNeg => ":distinctNeg",
        DistinctTrue => ":distinctTrue",
        DistinctFalse => ":distinctFalse",
        DistinctBoolEq => ":distinctBoolEq",
        DistinctBinary => ":distinctBinary",
        NotSimp => ":notSimp",
        OrSimp => ":orSimp",
        OrTaut => ":orTaut",
        IteTrue => ":iteTrue",
        IteFalse => ":iteFalse",
        IteSame => ":iteSame",
        IteBool1 => ":iteBool1",
        IteBool2 => ":iteBool2",
        IteBool3 => ":iteBool3",
        IteBool4 => ":iteBool4",
        IteBool5 => ":iteBool5",
        IteBool6 => ":iteBool6",
        AndToOr => ":andToOr",
        XorToDistinct => ":xorToDistinct",
        ImpToOr => ":impToOr",
        Strip => ":strip",
        CanonicalSum => ":canonicalSum",
        LeqToLeq0 => ":leqToLeq0",
        LtToLeq0 => ":ltToLeq0",
        GeqToLeq0 => ":geqToLeq0",
        GtToLeq0 => ":gtToLeq0",
        LeqTrue => ":leqTrue",
        LeqFalse => ":leqFalse",
        Desugar => ":desugar",
        Divisible => ":divisible",
        DivOne => ":divOne",
        DivMinusOne => ":divMinusOne",
        DivConst => ":divConst",
        ModuloOne => ":moduloOne",
        ModuloMinusOne => ":moduloMinusOne",
        ModuloConst => ":moduloConst",
        Modulo => ":modulo",
        ToInt => ":toInt",
        StoreOverStore => ":storeOverStore",
        SelectOverStore => ":selectOverStore",
        Flatten => ":flatten",
        StoreRewrite => ":storeRewrite",
    }
}

fn tautology_name(s: crate::proof::TautologySchema) -> &'static str {
    use crate::proof::TautologySchema::*;
    match s {
        OrPlus => ":or+",
        OrMinus => ":or-",
        ItePlus1 => ":ite+1",
        EqMinus2 => ":=-2",
        TermIte => ":termITE",
        ExcludedMiddle1 => ":excludedMiddle1",
        ExcludedMiddle2 => ":excludedMiddle2",
        DivHigh => ":divHigh",
        DivLow => ":divLow",
        ToIntHigh => ":toIntHigh",
        ToIntLow => ":toIntLow",
        Store => ":store",
        Diff => ":diff",
        TrueNotFalse => ":trueNotFalse",
    }
}

fn split_name(r: SplitRule) -> &'static str {
    match r {
        SplitRule::NotOr => ":notOr",
        SplitRule::EqPlusHalf => ":=+1/2",
        SplitRule::EqMinusHalf => ":=-1/2",
        SplitRule::ItePlusHalf => ":ite+1/2",
        SplitRule::IteMinusHalf => ":ite-1/2",
    }
}

/// Check `root`, returning the accumulated failure set. Per §8 property 2
/// ("Proof closure"), the caller is additionally expected to verify the
/// outermost proved clause is the empty clause (syntactically `false`);
/// that check lives in [`crate::solver`], which knows what the proof was
/// meant to refute.
pub fn check_proof(root: &Arc<ProofTerm>, terms: &TermTable, atoms: &AtomTable) -> CheckerFailure {
    let mut checker = Checker::new(terms, atoms);
    checker.check(root);
    checker.failure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::Clause;
    use crate::proof::producer;
    use crate::term::Symbol;
    use crate::types::VarIdEncoding;

    #[test]
    fn refl_checks_clean() {
        let mut t = TermTable::new();
        let x = t.mk_const(Symbol::BoolVar(0));
        let atoms = AtomTable::new();
        let p = producer::refl(x);
        let failure = check_proof(&p, &t, &atoms);
        assert!(failure.ok());
    }

    #[test]
    fn trans_with_a_mismatched_middle_term_is_reported() {
        let mut t = TermTable::new();
        let a = t.mk_const(Symbol::BoolVar(0));
        let b = t.mk_const(Symbol::BoolVar(1));
        let c = t.mk_const(Symbol::BoolVar(2));
        let atoms = AtomTable::new();
        let p1 = producer::rewrite(crate::proof::RewriteRule::EqSame, a, b);
        let p2 = producer::rewrite(crate::proof::RewriteRule::EqSame, c, a);
        let p = producer::trans(vec![p1, p2]);
        let failure = check_proof(&p, &t, &atoms);
        assert!(!failure.ok());
    }

    #[test]
    fn res_eliminates_the_pivot_literal() {
        let vi0: crate::types::VarId = 0;
        let vi1: crate::types::VarId = 1;
        let main = producer::asserted(Clause::new([vi0.pos_lit(), vi1.pos_lit()]));
        let arg = producer::asserted(Clause::new([vi0.neg_lit()]));
        let p = producer::res(main, vec![(vi0.pos_lit(), arg)]);
        let t = TermTable::new();
        let atoms = AtomTable::new();
        let failure = check_proof(&p, &t, &atoms);
        assert!(failure.ok());
    }

    #[test]
    fn la_lemma_with_a_positive_constant_combination_is_rejected() {
        use crate::affine::AffineTerm;
        use crate::clause::AtomKind;
        let mut atoms = AtomTable::new();
        let affine = AffineTerm::constant(Rational::from_i64(1));
        let lit = atoms.intern(AtomKind::BoundLe0 { affine_key: "x".into(), strict: false }, Some(affine), 0);
        let clause = Clause::new([lit]);
        let p = producer::la_lemma(clause, vec![Rational::from_i64(1)]);
        let t = TermTable::new();
        let failure = check_proof(&p, &t, &atoms);
        assert!(!failure.ok());
    }

    #[test]
    fn cong_rewrites_the_argument_and_checks_the_result_term() {
        let mut t = TermTable::new();
        let a = t.mk_const(Symbol::BoolVar(0));
        let b = t.mk_const(Symbol::BoolVar(1));
        let f = Symbol::Uninterpreted("f".into());
        let fa = t.mk(f.clone(), vec![a]);
        let fb = t.mk(f, vec![b]);
        let atoms = AtomTable::new();
        let base = producer::intern(fa, fa);
        let arg_rewrite = producer::intern(a, b);
        let p = producer::cong(base, vec![arg_rewrite], fb);
        let failure = check_proof(&p, &t, &atoms);
        assert!(failure.ok());
    }

    #[test]
    fn cong_rejects_a_result_that_does_not_match_the_substitution() {
        let mut t = TermTable::new();
        let a = t.mk_const(Symbol::BoolVar(0));
        let b = t.mk_const(Symbol::BoolVar(1));
        let other = t.mk_const(Symbol::BoolVar(2));
        let f = Symbol::Uninterpreted("f".into());
        let fa = t.mk(f.clone(), vec![a]);
        let forged = t.mk(f, vec![other]);
        let atoms = AtomTable::new();
        let base = producer::intern(fa, fa);
        let arg_rewrite = producer::intern(a, b);
        let p = producer::cong(base, vec![arg_rewrite], forged);
        let failure = check_proof(&p, &t, &atoms);
        assert!(!failure.ok());
    }

    #[test]
    fn cc_lemma_accepts_a_path_edge_backed_by_a_hypothesis_equality() {
        let mut t = TermTable::new();
        let a = t.mk_const(Symbol::BoolVar(0));
        let b = t.mk_const(Symbol::BoolVar(1));
        let mut atoms = AtomTable::new();
        let eq_lit = atoms.intern(AtomKind::Equality { lhs: a, rhs: b }, None, 0);
        let clause = Clause::new([eq_lit.negate()]);
        let p = producer::lemma(clause, LemmaKind::Cc { path: vec![(a, b)] });
        let failure = check_proof(&p, &t, &atoms);
        assert!(failure.ok());
    }

    #[test]
    fn cc_lemma_rejects_an_edge_with_no_supporting_hypothesis_or_congruence() {
        let mut t = TermTable::new();
        let a = t.mk_const(Symbol::BoolVar(0));
        let b = t.mk_const(Symbol::BoolVar(1));
        let mut atoms = AtomTable::new();
        let filler = atoms.intern(AtomKind::Predicate { term: a }, None, 0);
        let clause = Clause::new([filler]);
        let p = producer::lemma(clause, LemmaKind::Cc { path: vec![(a, b)] });
        let failure = check_proof(&p, &t, &atoms);
        assert!(!failure.ok());
    }

    #[test]
    fn trichotomy_lemma_accepts_three_bounds_over_one_shared_affine_term() {
        let t = TermTable::new();
        let mut atoms = AtomTable::new();
        let x = crate::affine::AffineTerm::var(0);
        let neg_x = x.negate();
        let lt = atoms.intern(AtomKind::BoundLe0 { affine_key: "lt".into(), strict: true }, Some(x.clone()), 0);
        let eqp = atoms.intern(AtomKind::BoundLe0 { affine_key: "eq".into(), strict: false }, Some(x.clone()), 0);
        let gt = atoms.intern(AtomKind::BoundLe0 { affine_key: "gt".into(), strict: true }, Some(neg_x), 0);
        let clause = Clause::new([lt, eqp, gt]);
        let p = producer::lemma(clause, LemmaKind::Trichotomy { affine_key: "x".into() });
        let failure = check_proof(&p, &t, &atoms);
        assert!(failure.ok());
    }

    #[test]
    fn trichotomy_lemma_rejects_a_leg_over_an_unrelated_affine_term() {
        let t = TermTable::new();
        let mut atoms = AtomTable::new();
        let x = crate::affine::AffineTerm::var(0);
        let y = crate::affine::AffineTerm::var(1);
        let lt = atoms.intern(AtomKind::BoundLe0 { affine_key: "lt".into(), strict: true }, Some(x.clone()), 0);
        let eqp = atoms.intern(AtomKind::BoundLe0 { affine_key: "eq".into(), strict: false }, Some(x), 0);
        let gt = atoms.intern(AtomKind::BoundLe0 { affine_key: "gt".into(), strict: true }, Some(y), 0);
        let clause = Clause::new([lt, eqp, gt]);
        let p = producer::lemma(clause, LemmaKind::Trichotomy { affine_key: "x".into() });
        let failure = check_proof(&p, &t, &atoms);
        assert!(!failure.ok());
    }

    #[test]
    fn eq_lemma_accepts_an_equality_and_a_bound_over_the_same_affine_diff() {
        let mut t = TermTable::new();
        let lhs = t.mk_const(Symbol::BoolVar(0));
        let rhs = t.mk_const(Symbol::BoolVar(1));
        let mut atoms = AtomTable::new();
        let eq_lit = atoms.intern(AtomKind::Equality { lhs, rhs }, None, 0);
        let mut diff = crate::affine::AffineTerm::var(lhs);
        diff.add_scaled(&crate::affine::AffineTerm::var(rhs), &Rational::from_i64(-1));
        let bound_lit = atoms.intern(AtomKind::BoundLe0 { affine_key: "d".into(), strict: false }, Some(diff), 0);
        let clause = Clause::new([eq_lit, bound_lit]);
        let p = producer::lemma(clause, LemmaKind::Eq);
        let failure = check_proof(&p, &t, &atoms);
        assert!(failure.ok());
    }

    #[test]
    fn eq_lemma_rejects_a_bound_over_an_unrelated_affine_diff() {
        let mut t = TermTable::new();
        let lhs = t.mk_const(Symbol::BoolVar(0));
        let rhs = t.mk_const(Symbol::BoolVar(1));
        let other = t.mk_const(Symbol::BoolVar(2));
        let mut atoms = AtomTable::new();
        let eq_lit = atoms.intern(AtomKind::Equality { lhs, rhs }, None, 0);
        let unrelated = crate::affine::AffineTerm::var(other);
        let bound_lit = atoms.intern(AtomKind::BoundLe0 { affine_key: "d2".into(), strict: false }, Some(unrelated), 0);
        let clause = Clause::new([eq_lit, bound_lit]);
        let p = producer::lemma(clause, LemmaKind::Eq);
        let failure = check_proof(&p, &t, &atoms);
        assert!(!failure.ok());
    }

    #[test]
    fn eq_plus_half_split_accepts_the_matching_bound_literal() {
        let mut t = TermTable::new();
        let lhs = t.mk_const(Symbol::BoolVar(0));
        let rhs = t.mk_const(Symbol::BoolVar(1));
        let mut atoms = AtomTable::new();
        let eq_lit = atoms.intern(AtomKind::Equality { lhs, rhs }, None, 0);
        let mut diff = crate::affine::AffineTerm::var(lhs);
        diff.add_scaled(&crate::affine::AffineTerm::var(rhs), &Rational::from_i64(-1));
        let target = atoms.intern(AtomKind::BoundLe0 { affine_key: "d".into(), strict: false }, Some(diff), 0);
        let arg = producer::asserted(Clause::new([eq_lit]));
        let p = producer::split(SplitRule::EqPlusHalf, arg, target);
        let failure = check_proof(&p, &t, &atoms);
        assert!(failure.ok());
    }

    #[test]
    fn eq_plus_half_split_rejects_an_unrelated_bound_literal() {
        let mut t = TermTable::new();
        let lhs = t.mk_const(Symbol::BoolVar(0));
        let rhs = t.mk_const(Symbol::BoolVar(1));
        let other = t.mk_const(Symbol::BoolVar(2));
        let mut atoms = AtomTable::new();
        let eq_lit = atoms.intern(AtomKind::Equality { lhs, rhs }, None, 0);
        let unrelated = crate::affine::AffineTerm::var(other);
        let target = atoms.intern(AtomKind::BoundLe0 { affine_key: "d2".into(), strict: false }, Some(unrelated), 0);
        let arg = producer::asserted(Clause::new([eq_lit]));
        let p = producer::split(SplitRule::EqPlusHalf, arg, target);
        let failure = check_proof(&p, &t, &atoms);
        assert!(!failure.ok());
    }
}
