//! The trail: per-variable assignment, decision level, and reason, plus the
//! scope markers `push`/`pop` rewind against. Grounded directly on
//! `splr::assign::AssignStack`'s own fields (`assign`, `level`, `reason`,
//! `trail`, `trail_lim`), generalized from a pure-CNF trail to one that also
//! carries theory-propagated literals (§4.3).
use std::fmt;

use crate::types::{ClauseId, DecisionLevel, Lbool, Lit, LiteralEncoding, VarId, VarIdEncoding};

/// Why a literal ended up on the trail. `splr::types::AssignReason` has
/// `None`/`Implication(ClauseId, Lit)`; this adds `Theory` for the
/// LA/CC-propagated case (§4.3 implementation note).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignReason {
    /// A decision, or as-yet-unjustified unit input.
    None,
    /// Propagated by a clause; the second field names a binary clause's
    /// other literal when known, `NULL_LIT` otherwise (mirrors `splr`).
    Implication(ClauseId, Lit),
    /// Propagated by a theory (LA bound refinement, CC congruence).
    Theory(TheoryId),
}

impl Default for AssignReason {
    fn default() -> Self {
        AssignReason::None
    }
}

impl fmt::Display for AssignReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignReason::None => write!(f, "reason:none"),
            AssignReason::Implication(c, _) => write!(f, "reason:clause{}", c),
            AssignReason::Theory(t) => write!(f, "reason:theory:{:?}", t),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TheoryId {
    La,
    Cc,
}

/// `splr::assign::AssignStack`'s trail core, trimmed of the EVSIDS/rephase
/// machinery a pure-CNF solver needs for search quality but this engine's
/// scope (the LA theory and the proof framework) does not call for.
pub struct AssignStack {
    assign: Vec<Lbool>,
    level: Vec<DecisionLevel>,
    reason: Vec<AssignReason>,
    pub trail: Vec<Lit>,
    trail_lim: Vec<usize>,
    pub q_head: usize,
    num_vars: usize,
}

impl AssignStack {
    pub fn new(num_vars: usize) -> Self {
        AssignStack {
            assign: vec![Lbool::Bottom; num_vars],
            level: vec![0; num_vars],
            reason: vec![AssignReason::None; num_vars],
            trail: Vec::new(),
            trail_lim: Vec::new(),
            q_head: 0,
            num_vars,
        }
    }

    /// Grow the per-variable arrays to cover a freshly registered atom
    /// variable (clausification allocates `VarId`s lazily, unlike `splr`'s
    /// upfront `cnf.num_of_variables` sizing).
    pub fn ensure_var(&mut self, vi: VarId) {
        if vi >= self.num_vars {
            self.num_vars = vi + 1;
            self.assign.resize(self.num_vars, Lbool::Bottom);
            self.level.resize(self.num_vars, 0);
            self.reason.resize(self.num_vars, AssignReason::None);
        }
    }

    pub fn decision_level(&self) -> DecisionLevel {
        self.trail_lim.len()
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn value(&self, l: Lit) -> Lbool {
        match self.assign[l.vi()] {
            Lbool::Bottom => Lbool::Bottom,
            Lbool::True if l.positive() => Lbool::True,
            Lbool::True => Lbool::False,
            Lbool::False if l.positive() => Lbool::False,
            Lbool::False => Lbool::True,
        }
    }

    pub fn var_value(&self, vi: VarId) -> Lbool {
        self.assign[vi]
    }

    pub fn reason(&self, vi: VarId) -> AssignReason {
        self.reason[vi]
    }

    pub fn level_of(&self, vi: VarId) -> DecisionLevel {
        self.level[vi]
    }

    /// Place `l` on the trail. Returns `false` if `l` contradicts an
    /// existing assignment (a conflict the caller must handle), `true`
    /// otherwise (including the already-assigned-consistently case, which
    /// is a silent no-op per §5 "already-decided literals are silently
    /// dropped on dequeue").
    pub fn assign_lit(&mut self, l: Lit, reason: AssignReason) -> bool {
        self.ensure_var(l.vi());
        match self.value(l) {
            Lbool::True => true,
            Lbool::False => false,
            Lbool::Bottom => {
                self.assign[l.vi()] = if l.positive() { Lbool::True } else { Lbool::False };
                self.level[l.vi()] = self.decision_level();
                self.reason[l.vi()] = reason;
                self.trail.push(l);
                true
            }
        }
    }

    pub fn new_decision_level(&mut self) {
        self.trail_lim.push(self.trail.len());
    }

    /// Undo every assignment made at or above `level`, per §4.3
    /// `backtrack_literal`/`pop`. Returns the undone literals so the caller
    /// can unwind theory state (LA bound reasons, CC merges) in the same
    /// order they were made.
    pub fn cancel_until(&mut self, level: DecisionLevel) -> Vec<Lit> {
        if self.decision_level() <= level {
            return Vec::new();
        }
        let cut = self.trail_lim[level];
        let undone: Vec<Lit> = self.trail.split_off(cut);
        for &l in &undone {
            self.assign[l.vi()] = Lbool::Bottom;
            self.reason[l.vi()] = AssignReason::None;
        }
        self.trail_lim.truncate(level);
        self.q_head = self.q_head.min(self.trail.len());
        undone
    }

    /// The next unassigned atom variable, lowest id first (§4.3 decision
    /// heuristic simplification: `splr`'s EVSIDS activity heap is not
    /// carried over, since decision quality is not part of this engine's
    /// scope — any fair, terminating strategy is sound here).
    pub fn next_unassigned(&self) -> Option<VarId> {
        (0..self.num_vars).find(|&vi| self.assign[vi] == Lbool::Bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigning_a_literal_then_its_negation_conflicts() {
        let mut asg = AssignStack::new(4);
        let vi: VarId = 1;
        assert!(asg.assign_lit(vi.pos_lit(), AssignReason::None));
        assert!(!asg.assign_lit(vi.neg_lit(), AssignReason::None));
    }

    #[test]
    fn cancel_until_undoes_later_levels() {
        let mut asg = AssignStack::new(4);
        asg.new_decision_level();
        asg.assign_lit((0 as VarId).pos_lit(), AssignReason::None);
        asg.new_decision_level();
        asg.assign_lit((1 as VarId).pos_lit(), AssignReason::None);
        let undone = asg.cancel_until(1);
        assert_eq!(undone, vec![(1 as VarId).pos_lit()]);
        assert_eq!(asg.var_value(0), Lbool::True);
        assert_eq!(asg.var_value(1), Lbool::Bottom);
    }
}
