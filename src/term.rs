//! Crate `term` provides the hash-consed first-order term DAG (§3 "Theory
//! term DAG", §9 "Polymorphic proof-term dispatch": "The term DAG itself is
//! best represented as an ... arena-index with identity equality").
//!
//! Grounded on `splr`'s own preference for `Vec`-backed, index-addressed
//! databases (`ClauseDB`, `VarDB`) over pointer graphs: terms live in one
//! arena (`TermTable`), are looked up by content through a hash map, and
//! are referred to everywhere else by their `TermId`, so identity
//! comparison is just integer equality.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;

use crate::types::{TermId, VarId};

/// A function/predicate/connective symbol. Interpreted arithmetic and array
/// operators are distinguished from uninterpreted function symbols so the
/// compiler (§4.6) and the CC theory (§4.7) can tell at a glance which
/// congruence rule governs a given application.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// An uninterpreted function or predicate symbol.
    Uninterpreted(Arc<str>),
    True,
    False,
    Not,
    Or,
    And,
    Xor,
    Imp,
    Ite,
    Eq,
    Distinct,
    Leq,
    Lt,
    Geq,
    Gt,
    Add,
    Sub,
    Neg,
    Mul,
    /// Division/modulo by the carried constant divisor (§4.6 "div and mod
    /// with constant divisor").
    Div(BigInt),
    Mod(BigInt),
    ToInt,
    Select,
    Store,
    /// A distinguished constant introduced exactly once per (dividend,
    /// kind) pair for division-by-zero terms, per §4.6's last bullet:
    /// `@/0(x)`, `@div0(x)`, `@mod0(x)`.
    DivByZeroConst(DivZeroKind, TermId),
    IntConst(BigInt),
    RatConst(BigInt, BigInt),
    BoolVar(VarId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DivZeroKind {
    RealDiv,
    IntDiv,
    IntMod,
}

/// One node of the DAG: a symbol applied to already-interned children.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TermNode {
    pub symbol: Symbol,
    pub args: Vec<TermId>,
}

/// The hash-consing arena. All terms a solver session ever builds live
/// here for its lifetime; `push`/`pop` never removes nodes (terms, unlike
/// `LinVar`s and atoms, are immutable and harmless to keep around — only
/// their *use* as atoms is scope-bound, per §3 "Lifecycles").
#[derive(Default)]
pub struct TermTable {
    nodes: Vec<TermNode>,
    index: HashMap<TermNode, TermId>,
}

impl TermTable {
    pub fn new() -> Self {
        TermTable::default()
    }

    /// Hash-cons `node`, returning the existing id if an identical node was
    /// already interned (§3: "identity comparison suffices for equality").
    pub fn intern(&mut self, node: TermNode) -> TermId {
        if let Some(id) = self.index.get(&node) {
            return *id;
        }
        let id = self.nodes.len();
        self.index.insert(node.clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn mk(&mut self, symbol: Symbol, args: Vec<TermId>) -> TermId {
        self.intern(TermNode { symbol, args })
    }

    pub fn mk_const(&mut self, symbol: Symbol) -> TermId {
        self.mk(symbol, Vec::new())
    }

    pub fn node(&self, id: TermId) -> &TermNode {
        &self.nodes[id]
    }

    pub fn symbol(&self, id: TermId) -> &Symbol {
        &self.nodes[id].symbol
    }

    pub fn args(&self, id: TermId) -> &[TermId] {
        &self.nodes[id].args
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// A fresh div-by-zero marker for `dividend`, built once per
    /// `(kind, dividend)` pair because `intern` hash-conses it (§4.6).
    pub fn div_zero_const(&mut self, kind: DivZeroKind, dividend: TermId) -> TermId {
        self.mk_const(Symbol::DivByZeroConst(kind, dividend))
    }

    pub fn display(&self, id: TermId) -> String {
        let node = &self.nodes[id];
        if node.args.is_empty() {
            format!("{:?}", node.symbol)
        } else {
            let args: Vec<String> = node.args.iter().map(|a| self.display(*a)).collect();
            format!("({:?} {})", node.symbol, args.join(" "))
        }
    }
}

impl fmt::Debug for TermTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermTable").field("len", &self.nodes.len()).finish()
    }
}
