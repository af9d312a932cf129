//! Crate `solver` is the top-level facade (§6 "Rust API surface"):
//! `Solver::new`/`assert`/`check_sat`/`get_proof`/`get_model`/`push`/`pop`,
//! orchestrating the term compiler, clausifier, DPLL(T) trail, and the LA
//! theory the way `splr::solver::Solver` sits on top of its own
//! `AssignStack`/`ClauseDB`/`Eliminator` triad.
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::affine::AffineTerm;
use crate::assign::{self, AssignReason, AssignStack, TheoryId};
use crate::clause::{AtomKind, AtomTable, Clause, ClauseDb};
use crate::compiler::Compiler;
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::la::{EndOfSearch, LaTheory};
use crate::proof::{producer, ProofTerm};
use crate::rational::{InfinitNumber, Rational};
use crate::state::{SolverState, Stat};
use crate::term::{Symbol, TermTable};
use crate::types::{Lbool, Lit, LiteralEncoding, SatResult, TermId, UnknownReason, VarId, VarIdEncoding};
use crate::cc::CongruenceClosure;

/// A satisfying assignment (§6 "On `(get-model)`"): numeric terms map to
/// `Rational` values.
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub numeric: HashMap<TermId, Rational>,
}

/// One push/pop scope's worth of bookkeeping, the clause/atom-table
/// analogue of [`crate::la::LaTheory`]'s own `scope_marks`.
struct Scope {
    clauses_len: usize,
}

pub struct Solver {
    pub terms: TermTable,
    pub atoms: AtomTable,
    pub clauses: ClauseDb,
    pub asg: AssignStack,
    pub la: LaTheory,
    pub config: SolverConfig,
    pub state: SolverState,
    /// Term -> LA variable mapping for every arithmetic leaf the
    /// clausifier has registered with the theory.
    term_to_lavar: HashMap<TermId, VarId>,
    /// Bound-atom variable -> the LA row standing for its affine term,
    /// populated once at `clausify_leq` time; `sync_la_bounds` consults it
    /// to turn a trail literal back into a directional bound.
    bound_atoms: HashMap<VarId, VarId>,
    /// How far into `asg.trail` `sync_la_bounds` has already translated
    /// into LA bounds.
    la_head: usize,
    /// The refutation proof built by the last `unsat` `check_sat`, if any.
    proof: Option<Arc<ProofTerm>>,
    scopes: Vec<Scope>,
    steps: usize,
}

/// Build the `equated` predicate [`LaTheory::end_of_search`]'s model-repair
/// pass consults to skip pairs the CC theory has already merged (§4.1
/// "Model repair"). `cc.rs`'s own comment notes it is "not a full
/// incremental decision procedure" meant for a hot loop, so this seeds one
/// fresh per call from whichever `Equality` atoms are currently assigned
/// true, rather than keeping a `CongruenceClosure<'a>` (which borrows the
/// term table) alive as a `Solver` field.
///
/// Takes its inputs as separate borrows, not `&Solver`, so the borrow
/// checker sees this doesn't conflict with the caller's concurrent
/// `&mut self.la` borrow.
fn build_equated<'a>(
    terms: &'a TermTable,
    atoms: &'a AtomTable,
    asg: &'a AssignStack,
    term_to_lavar: &'a HashMap<TermId, VarId>,
) -> impl Fn(VarId, VarId) -> bool + 'a {
    let mut cc = CongruenceClosure::new(terms);
    for (vi, atom) in atoms.iter() {
        if let AtomKind::Equality { lhs, rhs } = &atom.kind {
            if vi < asg.num_vars() && asg.var_value(vi) == Lbool::True {
                cc.merge(*lhs, *rhs);
            }
        }
    }
    let cc = std::cell::RefCell::new(cc);
    let lavar_to_term: HashMap<VarId, TermId> =
        term_to_lavar.iter().map(|(&t, &v)| (v, t)).collect();
    move |a: VarId, b: VarId| match (lavar_to_term.get(&a), lavar_to_term.get(&b)) {
        (Some(&ta), Some(&tb)) => cc.borrow_mut().equiv(ta, tb),
        _ => false,
    }
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        let la = LaTheory::new(config.bland_use_factor, config.max_cuts);
        Solver {
            terms: TermTable::new(),
            atoms: AtomTable::new(),
            clauses: ClauseDb::new(),
            asg: AssignStack::new(0),
            la,
            config,
            state: SolverState::new("qf_auflira"),
            term_to_lavar: HashMap::new(),
            bound_atoms: HashMap::new(),
            la_head: 0,
            proof: None,
            scopes: Vec::new(),
            steps: 0,
        }
    }

    /// Normalize `term` (§4.6) and clausify it into the assertion set
    /// (§6 "a sequence of assertions"), asserting the top-level literal as
    /// a unit clause.
    pub fn assert(&mut self, term: TermId) -> Result<(), SolverError> {
        let top = self.clausify(term, true);
        self.clauses.add(Clause::unit(top));
        debug!(term, top, "solver: asserted");
        Ok(())
    }

    /// Run `t` through the term compiler, then dispatch on its (now
    /// normalized) top symbol, recursing through the Boolean skeleton and
    /// normalizing each subterm as it is reached — the compiler itself
    /// only rewrites one connective at a time (§4.6), so the clausifier is
    /// what drives it down through a whole formula.
    fn clausify(&mut self, t: TermId, positive: bool) -> Lit {
        let normalized = {
            let mut compiler = Compiler::new(&mut self.terms);
            compiler.normalize(t)
        };
        let symbol = self.terms.symbol(normalized).clone();
        let args = self.terms.args(normalized).to_vec();
        let lit = match symbol {
            Symbol::Not => {
                let inner = self.clausify(args[0], !positive);
                return inner;
            }
            Symbol::Or => self.clausify_or(normalized, &args),
            Symbol::Leq => self.clausify_leq(&args, false),
            Symbol::Eq if args.len() == 2 => self.clausify_eq(normalized, args[0], args[1]),
            Symbol::True => self.clausify_const(normalized, true),
            Symbol::False => self.clausify_const(normalized, false),
            _ => self.atoms.intern(AtomKind::Predicate { term: normalized }, None, self.scopes.len()),
        };
        if positive {
            lit
        } else {
            lit.negate()
        }
    }

    fn clausify_const(&mut self, term: TermId, value: bool) -> Lit {
        let lit = self.atoms.intern(AtomKind::Predicate { term }, None, self.scopes.len());
        self.clauses.add(Clause::unit(if value { lit } else { lit.negate() }));
        lit
    }

    /// `(or a1 a2 ...)`: introduce a proxy `p` and the clauses
    /// `p -> (or a1..an)` and `ai -> p` for each disjunct (the clauses
    /// `@tautology :or+`/`:or-` check, §4.5).
    fn clausify_or(&mut self, t: TermId, args: &[TermId]) -> Lit {
        let sub_lits: Vec<Lit> = args.iter().map(|&a| self.clausify(a, true)).collect();
        let p = self.atoms.intern(AtomKind::Predicate { term: t }, None, self.scopes.len());
        let mut defining = sub_lits.clone();
        defining.push(p.negate());
        self.clauses.add(Clause::new(defining));
        for &l in &sub_lits {
            self.clauses.add(Clause::new([p, l.negate()]));
        }
        p
    }

    /// `(<= affine 0)`: register the bound atom and hand its affine term to
    /// the LA theory rather than treating it as an opaque Boolean proxy.
    fn clausify_leq(&mut self, args: &[TermId], strict: bool) -> Lit {
        let affine = self.to_affine(args[0]);
        let key = format!("{}", affine);
        let lit = self.atoms.intern(
            AtomKind::BoundLe0 { affine_key: key, strict },
            Some(affine),
            self.scopes.len(),
        );
        self.register_la_atom(lit.vi());
        lit
    }

    /// `(= lhs rhs)`: routed into the LA theory as two directional bounds
    /// (`lhs - rhs <= 0` and `rhs - lhs <= 0`), the way `clausify_leq` routes
    /// a single comparison, Tseitin-wired to a `Predicate` proxy so the
    /// Boolean skeleton still sees one literal for the equality (§4.6; §8
    /// property 1 scenario S2: `(< x 0)` together with `(= x 0)` must
    /// actually constrain `x`'s LA bounds, not just an opaque proxy, or the
    /// pair is wrongly reported sat).
    fn clausify_eq(&mut self, t: TermId, lhs: TermId, rhs: TermId) -> Lit {
        self.atoms.intern(AtomKind::Equality { lhs, rhs }, None, self.scopes.len());
        let mut diff = self.to_affine(lhs);
        let rhs_affine = self.to_affine(rhs);
        diff.add_scaled(&rhs_affine, &Rational::from_i64(-1));
        let le_key = format!("{}", diff);
        let le = self.atoms.intern(
            AtomKind::BoundLe0 { affine_key: le_key, strict: false },
            Some(diff.clone()),
            self.scopes.len(),
        );
        self.register_la_atom(le.vi());
        let neg_diff = diff.negate();
        let ge_key = format!("{}", neg_diff);
        let ge = self.atoms.intern(
            AtomKind::BoundLe0 { affine_key: ge_key, strict: false },
            Some(neg_diff),
            self.scopes.len(),
        );
        self.register_la_atom(ge.vi());
        let p = self.atoms.intern(AtomKind::Predicate { term: t }, None, self.scopes.len());
        self.clauses.add(Clause::new([p.negate(), le]));
        self.clauses.add(Clause::new([p.negate(), ge]));
        self.clauses.add(Clause::new([le.negate(), ge.negate(), p]));
        p
    }

    /// Mirror [`crate::compiler::Compiler::to_affine`]'s flattening, kept
    /// separate since the compiler only exposes it internally and the
    /// clausifier needs the resulting [`AffineTerm`] itself (to register
    /// with [`LaTheory`]), not just a reemitted canonical term.
    fn to_affine(&mut self, t: TermId) -> AffineTerm {
        let symbol = self.terms.symbol(t).clone();
        let args = self.terms.args(t).to_vec();
        match symbol {
            Symbol::IntConst(n) => AffineTerm::constant(Rational::from_bigint(n)),
            Symbol::RatConst(n, d) => AffineTerm::constant(Rational::new(n, d)),
            Symbol::Add => {
                let mut out = AffineTerm::zero();
                for a in args {
                    let sub = self.to_affine(a);
                    out.add_scaled(&sub, &Rational::one());
                }
                out
            }
            Symbol::Sub => {
                let mut out = self.to_affine(args[0]);
                for a in &args[1..] {
                    let sub = self.to_affine(*a);
                    out.add_scaled(&sub, &Rational::from_i64(-1));
                }
                out
            }
            Symbol::Neg => self.to_affine(args[0]).negate(),
            Symbol::Mul => {
                let mut coeff = Rational::one();
                let mut var_term: Option<TermId> = None;
                for a in &args {
                    match self.terms.symbol(*a).clone() {
                        Symbol::IntConst(n) => coeff = &coeff * &Rational::from_bigint(n),
                        Symbol::RatConst(n, d) => coeff = &coeff * &Rational::new(n, d),
                        _ if var_term.is_none() => var_term = Some(*a),
                        _ => return AffineTerm::var(self.term_var(t)),
                    }
                }
                match var_term {
                    None => AffineTerm::constant(coeff),
                    Some(v) => {
                        let mut out = AffineTerm::zero();
                        out.add_term(self.term_var(v), &coeff);
                        out
                    }
                }
            }
            _ => {
                let vi = self.term_var(t);
                AffineTerm::var(vi)
            }
        }
    }

    /// Reuse (or allocate) the LA variable standing for a non-arithmetic
    /// leaf term, via [`LaTheory::term_var`] (idempotent per term, the
    /// `VarStore`'s own `by_term` cache); `term_to_lavar` mirrors the
    /// mapping so [`Solver::get_model`] can walk every registered term
    /// without `VarStore` exposing a reverse index of its own.
    fn term_var(&mut self, t: TermId) -> VarId {
        let vi = self.la.term_var(t, false);
        self.term_to_lavar.insert(t, vi);
        // Every uninterpreted leaf the affine-flattener falls back to is, by
        // definition, a term the CC theory also reasons about (§4.1 "Model
        // repair"'s "shared (UF-visible) variables"): mark it so `end_of_search`
        // can scan it for spurious merges.
        self.la.mark_shared(vi);
        vi
    }

    /// Register a bound atom's affine term with the LA theory: give every
    /// non-constant term in the affine combination a `LinVar` and define a
    /// fresh basic row summing them (§4.1 "Tableau and Simplex Driver").
    /// The atom's literal is not yet assigned anything at this point, so
    /// the bound itself is not pushed here — `sync_la_bounds` does that
    /// once the DPLL trail actually commits to a polarity for it.
    fn register_la_atom(&mut self, vi: VarId) {
        let atom = self.atoms.atom(vi);
        let (_strict, affine) = match (&atom.kind, &atom.affine) {
            (AtomKind::BoundLe0 { strict, .. }, Some(affine)) => (*strict, affine.clone()),
            _ => return,
        };
        let (row, den) = affine.to_integer_row();
        if row.is_empty() {
            return;
        }
        let cols: std::collections::BTreeMap<VarId, num_bigint::BigInt> = row.into_iter().collect();
        let basic = self.la.fresh_var(false);
        self.la.define_row(basic, -den, cols);
        self.bound_atoms.insert(vi, basic);
    }

    /// Walk the trail literals `check_sat` hasn't translated into LA bounds
    /// yet, asserting the directional bound each one's polarity demands
    /// (§4.3 `set_literal`'s LA-atom case): a positive `BoundLe0` literal
    /// asserts the atom's own `affine (<|<=) 0`; a negative one asserts its
    /// negation, which flips both the bound's direction and its strictness.
    fn sync_la_bounds(&mut self) {
        while self.la_head < self.asg.trail.len() {
            let lit = self.asg.trail[self.la_head];
            self.la_head += 1;
            let vi = lit.vi();
            if vi >= self.atoms.len() {
                continue;
            }
            let Some(&basic) = self.bound_atoms.get(&vi) else { continue };
            let atom = self.atoms.atom(vi);
            let (strict, affine) = match (&atom.kind, &atom.affine) {
                (AtomKind::BoundLe0 { strict, .. }, Some(affine)) => (*strict, affine.clone()),
                _ => continue,
            };
            let bound_value = affine.constant.negate();
            if lit.positive() {
                let bound = if strict {
                    InfinitNumber::minus_epsilon(bound_value)
                } else {
                    InfinitNumber::exact(bound_value)
                };
                self.la.assert_bound(basic, true, bound, lit);
            } else {
                let bound = if strict {
                    InfinitNumber::exact(bound_value)
                } else {
                    InfinitNumber::plus_epsilon(bound_value)
                };
                self.la.assert_bound(basic, false, bound, lit);
            }
        }
    }

    /// §4.3's DPLL(T) loop: propagate, consult the LA theory at a
    /// checkpoint, decide, and repeat until sat/unsat/unknown. Chronological
    /// backtracking only (documented in `DESIGN.md`): this core does not
    /// carry `splr`'s non-chronological conflict-driven backjumping, since
    /// clause-learning quality is orthogonal to the LA-theory/proof-
    /// framework focus this crate commits to.
    pub fn check_sat(&mut self) -> SatResult {
        self.proof = None;
        loop {
            self.steps += 1;
            if self.steps > self.config.step_budget {
                warn!("solver: step budget exceeded");
                return SatResult::Unknown(UnknownReason::StepBudget);
            }
            if let Err(conflict) = assign::propagate(&mut self.asg, &self.clauses) {
                let clause = self.clauses.get(conflict.0).clone();
                if self.asg.decision_level() == 0 {
                    self.proof = Some(producer::asserted(clause));
                    return SatResult::Unsat;
                }
                self.backtrack_one_level();
                continue;
            }
            self.sync_la_bounds();
            if let Some(theory_conflict) = self.la.check_point() {
                self.state.bump(Stat::TheoryConflict);
                let coefficients: Vec<Rational> = theory_conflict.farkas.iter().map(|(_, c)| c.clone()).collect();
                let clause = Clause::new(theory_conflict.farkas.iter().map(|(lit, _)| lit.negate()));
                if self.asg.decision_level() == 0 {
                    self.proof = Some(producer::la_lemma(clause, coefficients));
                    return SatResult::Unsat;
                }
                self.clauses.add(clause);
                self.backtrack_one_level();
                continue;
            }
            let mut propagated_any = false;
            while let Some(lit) = self.la.get_propagated_literal() {
                self.asg.ensure_var(lit.vi());
                self.asg.assign_lit(lit, AssignReason::Theory(TheoryId::La));
                self.state.bump(Stat::Propagation);
                propagated_any = true;
            }
            if propagated_any {
                continue;
            }
            let equated = build_equated(&self.terms, &self.atoms, &self.asg, &self.term_to_lavar);
            match self.la.end_of_search(&equated) {
                EndOfSearch::Cuts(cuts) => {
                    self.state.add(Stat::Cut, cuts.len() as u64);
                    for cut in cuts {
                        let key = format!("cut:{}", cut.source_row);
                        let bound_value = cut.affine.constant.negate();
                        let lit = self.atoms.intern(
                            AtomKind::BoundLe0 { affine_key: key, strict: false },
                            Some(cut.affine),
                            self.scopes.len(),
                        );
                        self.asg.ensure_var(lit.vi());
                        self.asg.assign_lit(lit, AssignReason::Theory(TheoryId::La));
                        self.la.assert_bound(cut.source_row, true, InfinitNumber::exact(bound_value), lit);
                    }
                    continue;
                }
                EndOfSearch::Repair { var, new_value } => {
                    self.la.vars.get_mut(var).value = new_value;
                    continue;
                }
                EndOfSearch::Satisfied => {}
            }
            match self.asg.next_unassigned() {
                Some(vi) => {
                    self.asg.new_decision_level();
                    self.la.push();
                    self.scopes.push(Scope { clauses_len: self.clauses.len() });
                    self.state.bump(Stat::Decision);
                    self.asg.assign_lit(vi.pos_lit(), AssignReason::None);
                }
                None => return SatResult::Sat,
            }
        }
    }

    /// Undo exactly one decision level (chronological backtrack).
    fn backtrack_one_level(&mut self) {
        let target = self.asg.decision_level().saturating_sub(1);
        self.asg.cancel_until(target);
        self.la.pop(1);
        self.scopes.pop();
        self.la_head = self.la_head.min(self.asg.trail.len());
        self.state.bump(Stat::Conflict);
    }

    pub fn get_proof(&self) -> Option<Arc<ProofTerm>> {
        if !self.config.produce_proofs {
            return None;
        }
        self.proof.clone()
    }

    /// §4.5 "on its own proof" / §6 `proof-check-mode`: run the independent
    /// checker and report whether the proof just built actually checks.
    pub fn check_own_proof(&mut self) -> Option<bool> {
        let proof = self.proof.clone()?;
        let failure = crate::proof::check_proof(&proof, &self.terms, &self.atoms);
        self.state.add(Stat::ProofNodesChecked, failure.errors.len() as u64 + 1);
        if !failure.ok() {
            for e in &failure.errors {
                warn!(node = e.node(), "proof checker: {}", e);
            }
        }
        Some(failure.ok())
    }

    pub fn get_model(&self) -> Option<Model> {
        if self.asg.next_unassigned().is_some() {
            return None;
        }
        let mut model = Model::default();
        for (&term, &vi) in self.term_to_lavar.iter() {
            model.numeric.insert(term, self.la.vars.get(vi).value.a.clone());
        }
        info!(vars = model.numeric.len(), "solver: model extracted");
        Some(model)
    }

    pub fn push(&mut self) {
        self.asg.new_decision_level();
        self.la.push();
        self.scopes.push(Scope { clauses_len: self.clauses.len() });
    }

    pub fn pop(&mut self, n: usize) -> Result<(), SolverError> {
        if n > self.scopes.len() {
            return Err(SolverError::PopUnderflow(n));
        }
        for _ in 0..n {
            let scope = self.scopes.pop().unwrap();
            self.clauses.truncate(scope.clauses_len);
            let target = self.asg.decision_level().saturating_sub(1);
            self.asg.cancel_until(target);
        }
        self.la.pop(n);
        self.atoms.truncate_to_level(self.scopes.len());
        self.la_head = self.la_head.min(self.asg.trail.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn asserting_true_and_checking_sat_reports_sat() {
        let mut solver = Solver::new(SolverConfig::default());
        let t = solver.terms.mk_const(Symbol::True);
        solver.assert(t).unwrap();
        assert_eq!(solver.check_sat(), SatResult::Sat);
    }

    #[test]
    fn push_then_pop_restores_the_clause_count() {
        let mut solver = Solver::new(SolverConfig::default());
        let before = solver.clauses.len();
        solver.push();
        let t = solver.terms.mk_const(Symbol::True);
        solver.assert(t).unwrap();
        solver.pop(1).unwrap();
        assert_eq!(solver.clauses.len(), before);
    }

    #[test]
    fn popping_more_scopes_than_pushed_is_an_error() {
        let mut solver = Solver::new(SolverConfig::default());
        assert!(solver.pop(1).is_err());
    }

    #[test]
    fn asserting_a_contradictory_bound_pair_reports_unsat() {
        let mut solver = Solver::new(SolverConfig::default());
        let x = solver.terms.mk_const(Symbol::BoolVar(0));
        let one = solver.terms.mk_const(Symbol::IntConst(BigInt::from(1)));
        let minus_one = solver.terms.mk_const(Symbol::IntConst(BigInt::from(-1)));
        // x <= -1
        let le = solver.terms.mk(Symbol::Leq, vec![x, minus_one]);
        // not (x <= 1), i.e. x > 1
        let le2 = solver.terms.mk(Symbol::Leq, vec![x, one]);
        let not_le2 = solver.terms.mk(Symbol::Not, vec![le2]);
        solver.assert(le).unwrap();
        solver.assert(not_le2).unwrap();
        assert_eq!(solver.check_sat(), SatResult::Unsat);
        assert!(solver.get_proof().is_some());
    }

    #[test]
    fn a_satisfiable_bound_pair_reports_sat_with_a_model() {
        let mut solver = Solver::new(SolverConfig::default());
        let x = solver.terms.mk_const(Symbol::BoolVar(0));
        let ten = solver.terms.mk_const(Symbol::IntConst(BigInt::from(10)));
        let le = solver.terms.mk(Symbol::Leq, vec![x, ten]);
        solver.assert(le).unwrap();
        assert_eq!(solver.check_sat(), SatResult::Sat);
        assert!(solver.get_model().is_some());
    }

    /// §8 property 1 scenario S2: `(< x 0)` together with `(= x 0)` must be
    /// unsat — the equality has to actually constrain `x`'s LA bounds, not
    /// just stand as an opaque Boolean proxy disconnected from the theory.
    #[test]
    fn strict_negative_bound_plus_equality_to_zero_is_unsat() {
        let mut solver = Solver::new(SolverConfig::default());
        let x = solver.terms.mk_const(Symbol::BoolVar(0));
        let zero = solver.terms.mk_const(Symbol::IntConst(BigInt::from(0)));
        let lt = solver.terms.mk(Symbol::Lt, vec![x, zero]);
        let eq = solver.terms.mk(Symbol::Eq, vec![x, zero]);
        solver.assert(lt).unwrap();
        solver.assert(eq).unwrap();
        assert_eq!(solver.check_sat(), SatResult::Unsat);
    }

    /// The flip side: an equality that's consistent with the rest of the
    /// bounds should still leave the solver sat, confirming the two-bound
    /// encoding doesn't over-constrain.
    #[test]
    fn equality_consistent_with_bounds_is_sat() {
        let mut solver = Solver::new(SolverConfig::default());
        let x = solver.terms.mk_const(Symbol::BoolVar(0));
        let five = solver.terms.mk_const(Symbol::IntConst(BigInt::from(5)));
        let eq = solver.terms.mk(Symbol::Eq, vec![x, five]);
        solver.assert(eq).unwrap();
        assert_eq!(solver.check_sat(), SatResult::Sat);
        let model = solver.get_model().unwrap();
        let x_val = model.numeric.get(&x).cloned();
        assert_eq!(x_val, Some(Rational::from_i64(5)));
    }
}
