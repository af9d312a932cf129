//! Crate `assign` is the DPLL(T) integration layer (§4.3), grounded on
//! `splr::assign::AssignStack` and its `AssignIF`/`PropagateIF` trait
//! split: a trail of decisions and propagations drives Boolean search, and
//! the LA/CC theories hang off it as `AssignReason::Theory` sources rather
//! than plain clauses.
pub mod stack;

pub use stack::{AssignReason, AssignStack, TheoryId};

use tracing::trace;

use crate::clause::{Clause, ClauseDb};
use crate::types::{ClauseId, Lit, LiteralEncoding};

/// A conflict found during clausal unit propagation: the clause every
/// literal of which is currently false.
#[derive(Clone, Copy, Debug)]
pub struct ClauseConflict(pub ClauseId);

/// Scan `db` for unit or falsified clauses under `asg`'s current
/// assignment and saturate (§5 "Concurrency ... the loop is iterative with
/// an explicit work list"). Deliberately unoptimized relative to `splr`'s
/// watch-literal propagation (see [`crate::clause::ClauseDb`]'s doc
/// comment) — this crate's propagation loop exists to drive the LA/CC
/// theories, not to scale to large CNF benchmarks.
pub fn propagate(asg: &mut AssignStack, db: &ClauseDb) -> Result<(), ClauseConflict> {
    loop {
        let mut progressed = false;
        for (cid, clause) in db.iter() {
            match clause_status(asg, clause) {
                ClauseStatus::Satisfied => continue,
                ClauseStatus::Conflicting => return Err(ClauseConflict(cid)),
                ClauseStatus::Unit(l) => {
                    trace!(cid, lit = l, "assign: unit propagation");
                    let ok = asg.assign_lit(l, AssignReason::Implication(cid, crate::types::NULL_LIT));
                    debug_assert!(ok, "unit literal must not already be falsified");
                    progressed = true;
                }
                ClauseStatus::Unresolved => {}
            }
        }
        if !progressed {
            return Ok(());
        }
    }
}

enum ClauseStatus {
    Satisfied,
    Conflicting,
    Unit(Lit),
    Unresolved,
}

fn clause_status(asg: &AssignStack, clause: &Clause) -> ClauseStatus {
    use crate::types::Lbool;
    let mut unassigned = None;
    let mut unassigned_count = 0;
    for &l in clause.literals.iter() {
        match asg.value(l) {
            Lbool::True => return ClauseStatus::Satisfied,
            Lbool::False => {}
            Lbool::Bottom => {
                unassigned_count += 1;
                unassigned = Some(l);
            }
        }
    }
    match unassigned_count {
        0 => ClauseStatus::Conflicting,
        1 => ClauseStatus::Unit(unassigned.unwrap()),
        _ => ClauseStatus::Unresolved,
    }
}

/// Resolve a clausal conflict into the learned clause that asserts the
/// negation of every literal currently on the trail at the conflict's
/// decision level or below that participated (a minimal, non-watch-list
/// analogue of `splr::solver::conflict::handle_conflict`): collect the
/// falsified clause's own literals, each already negated relative to the
/// assignment that falsified it.
pub fn conflict_clause(clause: &Clause) -> Clause {
    Clause::new(clause.literals.iter().map(|l| l.negate()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::Clause;
    use crate::types::{VarIdEncoding};

    #[test]
    fn propagate_drives_a_unit_clause_to_assignment() {
        let mut asg = AssignStack::new(2);
        let mut db = ClauseDb::new();
        db.add(Clause::unit((0 as crate::types::VarId).pos_lit()));
        propagate(&mut asg, &db).unwrap();
        assert_eq!(asg.var_value(0), crate::types::Lbool::True);
    }

    #[test]
    fn propagate_reports_a_falsified_clause() {
        let mut asg = AssignStack::new(2);
        let vi: crate::types::VarId = 0;
        asg.assign_lit(vi.neg_lit(), AssignReason::None);
        let mut db = ClauseDb::new();
        db.add(Clause::unit(vi.pos_lit()));
        assert!(propagate(&mut asg, &db).is_err());
    }
}
