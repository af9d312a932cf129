//! `@tautology` schema catalogue and verification (§4.5 `@tautology`): a
//! fixed set of clause shapes that are valid by propositional structure
//! alone, pattern-matched against the clause they annotate.
use crate::clause::{AtomKind, AtomTable};
use crate::term::{Symbol, TermTable};
use crate::types::{Lit, LiteralEncoding};

/// One tautology schema name (§4.5's fixed list).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TautologySchema {
    OrPlus,
    OrMinus,
    ItePlus1,
    EqMinus2,
    TermIte,
    ExcludedMiddle1,
    ExcludedMiddle2,
    DivHigh,
    DivLow,
    ToIntHigh,
    ToIntLow,
    Store,
    Diff,
    TrueNotFalse,
}

impl TautologySchema {
    /// Verify `clause` matches this schema's literal shape, consulting
    /// `atoms`/`terms` to recover what each literal's proxy variable
    /// actually asserts (§4.5: "each is pattern-matched against the
    /// clause").
    pub fn verify(self, atoms: &AtomTable, terms: &TermTable, clause: &[Lit]) -> bool {
        use TautologySchema::*;
        match self {
            ExcludedMiddle1 | ExcludedMiddle2 => verify_excluded_middle(clause),
            OrPlus => verify_or_plus(atoms, terms, clause),
            OrMinus => verify_or_minus(atoms, terms, clause),
            TrueNotFalse => verify_true_not_false(atoms, terms, clause),
            EqMinus2 => clause.iter().any(|&l| matches!(atoms.atom(l.vi()).kind, AtomKind::Equality { .. })),
            ItePlus1 | TermIte => clause_mentions_symbol(atoms, terms, clause, |s| matches!(s, Symbol::Ite)),
            DivHigh | DivLow => clause_mentions_symbol(atoms, terms, clause, |s| matches!(s, Symbol::Div(_))),
            ToIntHigh | ToIntLow => clause_mentions_symbol(atoms, terms, clause, |s| matches!(s, Symbol::ToInt)),
            Store => clause_mentions_symbol(atoms, terms, clause, |s| matches!(s, Symbol::Store)),
            Diff => clause_mentions_symbol(atoms, terms, clause, |s| {
                matches!(s, Symbol::Select | Symbol::Store)
            }),
        }
    }
}

/// `(or p (not p))`: two literals over the same atom with opposite
/// polarity.
fn verify_excluded_middle(clause: &[Lit]) -> bool {
    clause.len() == 2 && clause[0].vi() == clause[1].vi() && clause[0].positive() != clause[1].positive()
}

/// `:orPlus`: `(or (not (or a1 ... an)) a1 ... an)` — one negated `or`
/// proxy plus exactly its disjuncts, positively.
fn verify_or_plus(atoms: &AtomTable, terms: &TermTable, clause: &[Lit]) -> bool {
    let negs: Vec<Lit> = clause.iter().copied().filter(|l| !l.positive()).collect();
    if negs.len() != 1 {
        return false;
    }
    let pos_count = clause.len() - 1;
    match &atoms.atom(negs[0].vi()).kind {
        AtomKind::Predicate { term } => match terms.symbol(*term) {
            Symbol::Or => terms.args(*term).len() == pos_count,
            _ => false,
        },
        _ => false,
    }
}

/// `:orMinus`: `(or (or a1 ... an) (not ai))` — the `or` proxy itself
/// positively, plus one negated disjunct.
fn verify_or_minus(atoms: &AtomTable, terms: &TermTable, clause: &[Lit]) -> bool {
    if clause.len() != 2 {
        return false;
    }
    clause.iter().any(|&l| {
        l.positive()
            && matches!(&atoms.atom(l.vi()).kind, AtomKind::Predicate { term }
                if matches!(terms.symbol(*term), Symbol::Or))
    })
}

/// `(not (= true false))`: the single negated-equality literal between the
/// two distinct Boolean constants.
fn verify_true_not_false(atoms: &AtomTable, terms: &TermTable, clause: &[Lit]) -> bool {
    clause.len() == 1
        && !clause[0].positive()
        && match &atoms.atom(clause[0].vi()).kind {
            AtomKind::Equality { lhs, rhs } => {
                let (l, r) = (terms.symbol(*lhs), terms.symbol(*rhs));
                matches!((l, r), (Symbol::True, Symbol::False) | (Symbol::False, Symbol::True))
            }
            _ => false,
        }
}

/// Weaker fallback shared by the schemas SPEC_FULL.md names but never pins
/// an exact clause shape for (array/div/to_int/ite families): require some
/// literal's underlying term (or one of its direct arguments) to actually
/// carry the symbol the schema is about, so a forged proof can't claim one
/// of these schemas over an unrelated clause.
fn clause_mentions_symbol(
    atoms: &AtomTable,
    terms: &TermTable,
    clause: &[Lit],
    pred: impl Fn(&Symbol) -> bool,
) -> bool {
    clause.iter().any(|&l| match &atoms.atom(l.vi()).kind {
        AtomKind::Predicate { term } => {
            pred(terms.symbol(*term)) || terms.args(*term).iter().any(|&a| pred(terms.symbol(a)))
        }
        AtomKind::Equality { lhs, rhs } => pred(terms.symbol(*lhs)) || pred(terms.symbol(*rhs)),
        AtomKind::BoundLe0 { .. } => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::AtomTable;
    use crate::types::{VarId, VarIdEncoding};

    #[test]
    fn excluded_middle_matches_a_literal_and_its_negation() {
        let atoms = AtomTable::new();
        let terms = TermTable::new();
        let vi: VarId = 0;
        let clause = [vi.pos_lit(), vi.neg_lit()];
        assert!(TautologySchema::ExcludedMiddle1.verify(&atoms, &terms, &clause));
    }

    #[test]
    fn excluded_middle_rejects_two_distinct_atoms() {
        let atoms = AtomTable::new();
        let terms = TermTable::new();
        let a: VarId = 0;
        let b: VarId = 1;
        let clause = [a.pos_lit(), b.neg_lit()];
        assert!(!TautologySchema::ExcludedMiddle1.verify(&atoms, &terms, &clause));
    }

    #[test]
    fn or_plus_matches_a_negated_or_proxy_with_its_disjuncts() {
        let mut atoms = AtomTable::new();
        let mut terms = TermTable::new();
        let a = terms.mk_const(Symbol::BoolVar(0));
        let b = terms.mk_const(Symbol::BoolVar(1));
        let or_term = terms.mk(Symbol::Or, vec![a, b]);
        let or_proxy = atoms.intern(AtomKind::Predicate { term: or_term }, None, 0);
        let a_proxy = atoms.intern(AtomKind::Predicate { term: a }, None, 0);
        let b_proxy = atoms.intern(AtomKind::Predicate { term: b }, None, 0);
        let clause = [or_proxy.negate(), a_proxy, b_proxy];
        assert!(TautologySchema::OrPlus.verify(&atoms, &terms, &clause));
    }

    #[test]
    fn or_plus_rejects_a_mismatched_disjunct_count() {
        let mut atoms = AtomTable::new();
        let mut terms = TermTable::new();
        let a = terms.mk_const(Symbol::BoolVar(0));
        let b = terms.mk_const(Symbol::BoolVar(1));
        let or_term = terms.mk(Symbol::Or, vec![a, b]);
        let or_proxy = atoms.intern(AtomKind::Predicate { term: or_term }, None, 0);
        let a_proxy = atoms.intern(AtomKind::Predicate { term: a }, None, 0);
        let clause = [or_proxy.negate(), a_proxy];
        assert!(!TautologySchema::OrPlus.verify(&atoms, &terms, &clause));
    }

    #[test]
    fn true_not_false_requires_the_two_distinct_constants() {
        let mut atoms = AtomTable::new();
        let mut terms = TermTable::new();
        let tt = terms.mk_const(Symbol::True);
        let ff = terms.mk_const(Symbol::False);
        let eq = atoms.intern(AtomKind::Equality { lhs: tt, rhs: ff }, None, 0);
        let clause = [eq.negate()];
        assert!(TautologySchema::TrueNotFalse.verify(&atoms, &terms, &clause));
        assert!(!TautologySchema::TrueNotFalse.verify(&atoms, &terms, &[eq]));
    }
}
