//! End-to-end scenarios driving [`qfauflira_core::solver::Solver`] only
//! through its public API, the black-box analogue of the unit tests
//! colocated in `src/solver.rs`.
use num_bigint::BigInt;

use qfauflira_core::config::SolverConfig;
use qfauflira_core::solver::Solver;
use qfauflira_core::term::Symbol;
use qfauflira_core::types::{SatResult, UnknownReason};

fn int(solver: &mut Solver, n: i64) -> usize {
    solver.terms.mk_const(Symbol::IntConst(BigInt::from(n)))
}

/// S1: `x <= -1` together with `x > 1` is unsatisfiable, and the refutation
/// the solver produces checks out on its own.
#[test]
fn contradictory_bounds_on_one_variable_are_unsat_and_the_proof_checks() {
    let mut solver = Solver::new(SolverConfig::default());
    let x = solver.terms.mk_const(Symbol::BoolVar(0));
    let neg_one = int(&mut solver, -1);
    let one = int(&mut solver, 1);

    let le = solver.terms.mk(Symbol::Leq, vec![x, neg_one]);
    let gt = solver.terms.mk(Symbol::Not, vec![solver.terms.mk(Symbol::Leq, vec![x, one])]);
    solver.assert(le).unwrap();
    solver.assert(gt).unwrap();

    assert_eq!(solver.check_sat(), SatResult::Unsat);
    let proof = solver.get_proof();
    assert!(proof.is_some(), "an unsat result must carry a refutation proof by default");
    assert_eq!(solver.check_own_proof(), Some(true));
}

/// S2: a single satisfiable bound reports `sat` with a model assigning the
/// bound's variable a value respecting it.
#[test]
fn a_lone_satisfiable_bound_produces_a_consistent_model() {
    let mut solver = Solver::new(SolverConfig::default());
    let x = solver.terms.mk_const(Symbol::BoolVar(0));
    let five = int(&mut solver, 5);
    let le = solver.terms.mk(Symbol::Leq, vec![x, five]);
    solver.assert(le).unwrap();

    assert_eq!(solver.check_sat(), SatResult::Sat);
    assert!(solver.get_model().is_some());
    // Unsat-only proof objects are never produced for a sat result.
    assert!(solver.get_proof().is_none());
}

/// S3: `(not (and a b))` with `a` and `b` both asserted true is unsat — the
/// De Morgan / Tseitin path for conjunctions (expressed only via `not`/`or`
/// internally) has to thread through correctly for this to close.
#[test]
fn asserting_a_conjunction_then_its_negation_is_unsat() {
    let mut solver = Solver::new(SolverConfig::default());
    let a = solver.terms.mk_const(Symbol::BoolVar(0));
    let b = solver.terms.mk_const(Symbol::BoolVar(1));
    let and_ab = solver.terms.mk(Symbol::And, vec![a, b]);
    let not_and_ab = solver.terms.mk(Symbol::Not, vec![and_ab]);

    solver.assert(a).unwrap();
    solver.assert(b).unwrap();
    solver.assert(not_and_ab).unwrap();

    assert_eq!(solver.check_sat(), SatResult::Unsat);
}

/// S4: a disjunction of two bounds, each individually satisfiable, is sat.
#[test]
fn a_disjunction_of_two_satisfiable_bounds_is_sat() {
    let mut solver = Solver::new(SolverConfig::default());
    let x = solver.terms.mk_const(Symbol::BoolVar(0));
    let zero = int(&mut solver, 0);
    let ten = int(&mut solver, 10);
    let le_zero = solver.terms.mk(Symbol::Leq, vec![x, zero]);
    let le_ten = solver.terms.mk(Symbol::Leq, vec![x, ten]);
    let disj = solver.terms.mk(Symbol::Or, vec![le_zero, le_ten]);

    solver.assert(disj).unwrap();
    assert_eq!(solver.check_sat(), SatResult::Sat);
}

/// S5: assertions made inside a `push`ed scope vanish on `pop`, leaving the
/// solver exactly as satisfiable as before the scope opened.
#[test]
fn assertions_inside_a_popped_scope_do_not_persist() {
    let mut solver = Solver::new(SolverConfig::default());
    let x = solver.terms.mk_const(Symbol::BoolVar(0));
    let ten = int(&mut solver, 10);
    let le_ten = solver.terms.mk(Symbol::Leq, vec![x, ten]);
    solver.assert(le_ten).unwrap();
    assert_eq!(solver.check_sat(), SatResult::Sat);

    solver.push();
    let neg_ten = int(&mut solver, -10);
    let contradiction = solver.terms.mk(Symbol::Not, vec![solver.terms.mk(Symbol::Leq, vec![x, neg_ten])]);
    let also_contradiction = solver.terms.mk(Symbol::Leq, vec![x, neg_ten]);
    solver.assert(contradiction).unwrap();
    solver.assert(also_contradiction).unwrap();

    solver.pop(1).unwrap();
    assert_eq!(solver.check_sat(), SatResult::Sat);
}

/// S6: a zero step budget forces `unknown` rather than a wrong answer.
#[test]
fn exhausting_the_step_budget_reports_unknown_instead_of_guessing() {
    let mut config = SolverConfig::default();
    config.step_budget = 0;
    let mut solver = Solver::new(config);
    let t = solver.terms.mk_const(Symbol::True);
    solver.assert(t).unwrap();

    match solver.check_sat() {
        SatResult::Unknown(UnknownReason::StepBudget) => {}
        other => panic!("expected a step-budget Unknown, got {:?}", other),
    }
}

/// Popping more scopes than were opened is rejected rather than silently
/// clamped, matching `Solver::pop`'s documented error.
#[test]
fn pop_past_the_bottom_of_the_assertion_stack_errors() {
    let mut solver = Solver::new(SolverConfig::default());
    solver.push();
    solver.pop(1).unwrap();
    assert!(solver.pop(1).is_err());
}
