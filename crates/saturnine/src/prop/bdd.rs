//! Reduced ordered binary decision diagrams over split names
//!
//! Nodes are hash-consed triples `(var, low, high)` in an arena; the two
//! terminals `FALSE` and `TRUE` occupy the first slots. Variables are
//! allocated monotonically and ordered by id from the root; the meaning
//! of each variable is owned by the splitter. Binary operations are
//! memoised by `(op, lhs, rhs)`; the memo table is cleared when it grows
//! past a threshold to bound memory.

use log::trace;
use std::collections::HashMap;
use std::fmt;

/// Handle to a BDD node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The constant false node.
    pub const FALSE: NodeId = NodeId(0);
    /// The constant true node.
    pub const TRUE: NodeId = NodeId(1);

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Node {
    var: u32,
    low: NodeId,
    high: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    And,
    Or,
}

/// Terminals sort after every real variable.
const TERMINAL_VAR: u32 = u32::MAX;

/// Memo entries are dropped wholesale past this size.
const OP_CACHE_LIMIT: usize = 1 << 20;

/// Reduced ordered BDD with hash-consed nodes.
pub struct Bdd {
    nodes: Vec<Node>,
    dedup: HashMap<Node, NodeId>,
    op_cache: HashMap<(Op, NodeId, NodeId), NodeId>,
    neg_cache: HashMap<NodeId, NodeId>,
    next_var: u32,
}

impl Default for Bdd {
    fn default() -> Self {
        Self::new()
    }
}

impl Bdd {
    pub fn new() -> Self {
        let terminal = |_| Node {
            var: TERMINAL_VAR,
            low: NodeId::FALSE,
            high: NodeId::FALSE,
        };
        Bdd {
            nodes: vec![terminal(0), terminal(1)],
            dedup: HashMap::new(),
            op_cache: HashMap::new(),
            neg_cache: HashMap::new(),
            next_var: 0,
        }
    }

    /// Allocate a fresh Boolean variable.
    pub fn new_var(&mut self) -> u32 {
        let var = self.next_var;
        self.next_var += 1;
        var
    }

    pub fn var_count(&self) -> u32 {
        self.next_var
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_true(&self, n: NodeId) -> bool {
        n == NodeId::TRUE
    }

    pub fn is_false(&self, n: NodeId) -> bool {
        n == NodeId::FALSE
    }

    fn var(&self, n: NodeId) -> u32 {
        self.nodes[n.0 as usize].var
    }

    fn low(&self, n: NodeId) -> NodeId {
        self.nodes[n.0 as usize].low
    }

    fn high(&self, n: NodeId) -> NodeId {
        self.nodes[n.0 as usize].high
    }

    /// Hash-consed node constructor; collapses redundant tests.
    fn mk(&mut self, var: u32, low: NodeId, high: NodeId) -> NodeId {
        debug_assert!(var < self.next_var, "unallocated BDD variable");
        if low == high {
            return low;
        }
        let node = Node { var, low, high };
        if let Some(&id) = self.dedup.get(&node) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.dedup.insert(node, id);
        trace!("bdd: new node {} = ({}, {}, {})", id.0, var, low.0, high.0);
        id
    }

    /// Node testing a single variable: `var` if polarity, `!var` otherwise.
    pub fn atomic(&mut self, var: u32, polarity: bool) -> NodeId {
        if polarity {
            self.mk(var, NodeId::FALSE, NodeId::TRUE)
        } else {
            self.mk(var, NodeId::TRUE, NodeId::FALSE)
        }
    }

    pub fn conjunction(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.apply(Op::And, a, b)
    }

    pub fn disjunction(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.apply(Op::Or, a, b)
    }

    pub fn implication(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let not_a = self.negation(a);
        self.apply(Op::Or, not_a, b)
    }

    pub fn negation(&mut self, a: NodeId) -> NodeId {
        match a {
            NodeId::FALSE => NodeId::TRUE,
            NodeId::TRUE => NodeId::FALSE,
            _ => {
                if let Some(&cached) = self.neg_cache.get(&a) {
                    return cached;
                }
                let (var, low, high) = (self.var(a), self.low(a), self.high(a));
                let nl = self.negation(low);
                let nh = self.negation(high);
                let result = self.mk(var, nl, nh);
                self.neg_cache.insert(a, result);
                self.neg_cache.insert(result, a);
                result
            }
        }
    }

    fn apply(&mut self, op: Op, a: NodeId, b: NodeId) -> NodeId {
        // Terminal cases
        match op {
            Op::And => {
                if a == NodeId::FALSE || b == NodeId::FALSE {
                    return NodeId::FALSE;
                }
                if a == NodeId::TRUE {
                    return b;
                }
                if b == NodeId::TRUE || a == b {
                    return a;
                }
            }
            Op::Or => {
                if a == NodeId::TRUE || b == NodeId::TRUE {
                    return NodeId::TRUE;
                }
                if a == NodeId::FALSE {
                    return b;
                }
                if b == NodeId::FALSE || a == b {
                    return a;
                }
            }
        }

        // Both operations are commutative; normalise the cache key
        let key = if a <= b { (op, a, b) } else { (op, b, a) };
        if let Some(&cached) = self.op_cache.get(&key) {
            return cached;
        }

        let (va, vb) = (self.var(a), self.var(b));
        let var = va.min(vb);
        let (a_low, a_high) = if va == var {
            (self.low(a), self.high(a))
        } else {
            (a, a)
        };
        let (b_low, b_high) = if vb == var {
            (self.low(b), self.high(b))
        } else {
            (b, b)
        };

        let low = self.apply(op, a_low, b_low);
        let high = self.apply(op, a_high, b_high);
        let result = self.mk(var, low, high);

        if self.op_cache.len() >= OP_CACHE_LIMIT {
            self.op_cache.clear();
        }
        self.op_cache.insert(key, result);
        result
    }

    /// Render a node as a formula over split names, for diagnostics.
    pub fn to_string(&self, n: NodeId) -> String {
        match n {
            NodeId::FALSE => "$false".to_string(),
            NodeId::TRUE => "$true".to_string(),
            _ => {
                let (var, low, high) = (self.var(n), self.low(n), self.high(n));
                format!("ite({}, {}, {})", var, self.to_string(high), self.to_string(low))
            }
        }
    }
}

impl fmt::Debug for Bdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bdd")
            .field("nodes", &self.nodes.len())
            .field("vars", &self.next_var)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminals() {
        let bdd = Bdd::new();
        assert!(bdd.is_false(NodeId::FALSE));
        assert!(bdd.is_true(NodeId::TRUE));
        assert!(!bdd.is_true(NodeId::FALSE));
    }

    #[test]
    fn test_atomic_shared() {
        let mut bdd = Bdd::new();
        let v = bdd.new_var();
        let a1 = bdd.atomic(v, true);
        let a2 = bdd.atomic(v, true);
        assert_eq!(a1, a2);
        let n = bdd.atomic(v, false);
        assert_ne!(a1, n);
    }

    #[test]
    fn test_idempotence() {
        let mut bdd = Bdd::new();
        let v = bdd.new_var();
        let x = bdd.atomic(v, true);
        assert_eq!(bdd.conjunction(x, x), x);
        assert_eq!(bdd.disjunction(x, x), x);
    }

    #[test]
    fn test_excluded_middle() {
        let mut bdd = Bdd::new();
        let v = bdd.new_var();
        let x = bdd.atomic(v, true);
        let nx = bdd.negation(x);
        assert_eq!(bdd.disjunction(x, nx), NodeId::TRUE);
        assert_eq!(bdd.conjunction(x, nx), NodeId::FALSE);
    }

    #[test]
    fn test_double_negation() {
        let mut bdd = Bdd::new();
        let v1 = bdd.new_var();
        let v2 = bdd.new_var();
        let x = bdd.atomic(v1, true);
        let y = bdd.atomic(v2, false);
        let f = bdd.disjunction(x, y);
        let nn = {
            let n = bdd.negation(f);
            bdd.negation(n)
        };
        assert_eq!(nn, f);
    }

    #[test]
    fn test_atomic_negation_flips_polarity() {
        let mut bdd = Bdd::new();
        let v = bdd.new_var();
        let pos = bdd.atomic(v, true);
        let neg = bdd.atomic(v, false);
        assert_eq!(bdd.negation(pos), neg);
    }

    #[test]
    fn test_implication() {
        let mut bdd = Bdd::new();
        let v = bdd.new_var();
        let x = bdd.atomic(v, true);
        assert_eq!(bdd.implication(x, x), NodeId::TRUE);
        assert_eq!(bdd.implication(NodeId::TRUE, x), x);
        assert_eq!(bdd.implication(x, NodeId::FALSE), bdd.negation(x));
    }

    #[test]
    fn test_ordering_independence() {
        // (x ∧ y) built in either operand order is the same node
        let mut bdd = Bdd::new();
        let v1 = bdd.new_var();
        let v2 = bdd.new_var();
        let x = bdd.atomic(v1, true);
        let y = bdd.atomic(v2, true);
        let xy = bdd.conjunction(x, y);
        let yx = bdd.conjunction(y, x);
        assert_eq!(xy, yx);
    }

    #[test]
    fn test_distribution() {
        // x ∨ (y ∧ z) == (x ∨ y) ∧ (x ∨ z)
        let mut bdd = Bdd::new();
        let vx = bdd.new_var();
        let vy = bdd.new_var();
        let vz = bdd.new_var();
        let x = bdd.atomic(vx, true);
        let y = bdd.atomic(vy, true);
        let z = bdd.atomic(vz, true);
        let yz = bdd.conjunction(y, z);
        let lhs = bdd.disjunction(x, yz);
        let xy = bdd.disjunction(x, y);
        let xz = bdd.disjunction(x, z);
        let rhs = bdd.conjunction(xy, xz);
        assert_eq!(lhs, rhs);
    }
}
