//! Clause splitting with propositional naming
//!
//! Literals of a clause are partitioned into variable-connected
//! components (union-find over shared variables). Each component other
//! than one designated *master* is abstracted by a fresh Boolean *split
//! name*: the component clause is guarded by the negative name atom and
//! the master's propositional part picks up the positive one.
//! Propositional (arity-0) unit components are named through a per-
//! predicate table so every occurrence of the same propositional atom
//! reuses its name. Components are deduplicated through a variant
//! index; re-encountering a known component merges propositional parts
//! by conjunction, and a merge that drives an empty clause's guard to
//! ⊥ surfaces the refutation.

use crate::fol::{Clause, Interner, LiteralId, PredicateId, TermStore};
use crate::index::VariantIndex;
use crate::inference::{InferenceStore, Rule, UnitId};
use crate::prop::{Bdd, NodeId};
use crate::stats::Statistics;
use crate::util::IntUnionFind;
use log::debug;
use std::collections::HashMap;
use std::collections::HashSet;

/// Outcome of routing one clause through the splitter.
#[derive(Debug, Default)]
pub struct SplitResult {
    /// Freshly created clauses to enter processing
    pub new_clauses: Vec<usize>,
    /// Existing clauses whose propositional part tightened
    pub modified: Vec<usize>,
}

/// The splitter's persistent naming state.
#[derive(Default)]
pub struct Splitter {
    variant_index: VariantIndex,
    /// Component clause -> its split name
    clause_names: HashMap<usize, u32>,
    /// Arity-0 predicate -> its split name
    prop_pred_names: HashMap<PredicateId, u32>,
    /// Naming premise clauses per (predicate, polarity)
    prop_pred_premises: HashMap<(PredicateId, bool), usize>,
}

/// Everything the splitter mutates, borrowed from the prover.
pub struct SplitContext<'a> {
    pub clauses: &'a mut Vec<Clause>,
    pub store: &'a mut TermStore,
    pub interner: &'a Interner,
    pub bdd: &'a mut Bdd,
    pub inferences: &'a mut InferenceStore,
    pub stats: &'a mut Statistics,
}

impl Splitter {
    pub fn new() -> Self {
        Splitter::default()
    }

    /// The split name of a component clause, if it has one.
    pub fn name_of(&self, clause: usize) -> Option<u32> {
        self.clause_names.get(&clause).copied()
    }

    /// Route a clause through splitting. The input clause is consumed:
    /// its obligations continue as the returned new/modified clauses.
    pub fn split(&mut self, clause_idx: usize, ctx: &mut SplitContext) -> SplitResult {
        let literals = ctx.clauses[clause_idx].literals.clone();
        if literals.len() <= 1 {
            return self.handle_no_split(clause_idx, ctx);
        }

        // Union literals sharing a variable. The master occurrence of a
        // variable is the lowest literal index containing it.
        let mut var_masters: HashMap<u32, usize> = HashMap::new();
        let mut components = IntUnionFind::new(literals.len());
        for (i, &lit) in literals.iter().enumerate() {
            let mut vars = HashSet::new();
            for &arg in ctx.store.lit(lit).args {
                ctx.store.collect_vars(arg, &mut vars);
            }
            for var in vars {
                let master = *var_masters.entry(var).or_insert(i);
                if master != i {
                    components.union(master, i);
                }
            }
        }
        let groups = components.components();
        if groups.len() == 1 {
            return self.handle_no_split(clause_idx, ctx);
        }

        ctx.stats.split_clauses += 1;
        ctx.stats.split_components += groups.len() as u64;
        debug!(
            "splitting clause {} into {} components",
            clause_idx,
            groups.len()
        );

        let mut result = SplitResult::default();
        let mut master_premises: Vec<usize> = vec![clause_idx];
        let mut used_names: Vec<u32> = Vec::new();
        let mut new_master_prop = ctx.clauses[clause_idx].prop;

        // Propositional unit components are folded into the guard first
        let mut remaining: Vec<Vec<LiteralId>> = Vec::new();
        for group in &groups {
            let lits: Vec<LiteralId> = group.iter().map(|&i| literals[i]).collect();
            if lits.len() == 1 && self.is_propositional(ctx.store, lits[0]) {
                let lit = lits[0];
                let polarity = ctx.store.lit(lit).polarity;
                let (name, premise) = self.prop_pred_name(lit, ctx);
                let atom = ctx.bdd.atomic(name, polarity);
                new_master_prop = ctx.bdd.disjunction(new_master_prop, atom);
                master_premises.push(premise);
                used_names.push(name);
            } else {
                remaining.push(lits);
            }
        }
        if ctx.bdd.is_true(new_master_prop) {
            ctx.stats.discarded_vacuous += 1;
            return result;
        }

        // Non-propositional components pass through the variant index
        let mut master_comp: Option<usize> = None;
        let mut new_components: Vec<usize> = Vec::new();
        let mut unnamed_components: Vec<usize> = Vec::new();
        let remaining_len = remaining.len();
        for (pos, lits) in remaining.into_iter().enumerate() {
            let last = pos + 1 == remaining_len;
            match self
                .variant_index
                .retrieve_variant(ctx.store, ctx.clauses, &lits)
            {
                Some(comp) => {
                    if let Some(&name) = self.clause_names.get(&comp) {
                        if last
                            && master_comp.is_none()
                            && new_components.is_empty()
                            && unnamed_components.is_empty()
                        {
                            // Every other component was named; reuse
                            // this one as the master
                            master_comp = Some(comp);
                        } else {
                            let atom = ctx.bdd.atomic(name, true);
                            new_master_prop = ctx.bdd.disjunction(new_master_prop, atom);
                            if ctx.bdd.is_true(new_master_prop) {
                                // The guard became vacuous; the clause
                                // carries no obligation
                                ctx.stats.discarded_vacuous += 1;
                                return result;
                            }
                            master_premises.push(comp);
                            used_names.push(name);
                        }
                    } else {
                        unnamed_components.push(comp);
                    }
                }
                None => {
                    let comp = self.intern_component(lits, clause_idx, ctx);
                    new_components.push(comp);
                }
            }
        }

        // Designate the master component
        let (master, master_is_new) = if let Some(comp) = master_comp {
            (comp, false)
        } else if let Some(comp) = new_components.pop() {
            (comp, true)
        } else if let Some(comp) = unnamed_components.pop() {
            (comp, false)
        } else {
            // Only propositional components: the obligation continues
            // as an empty clause under the accumulated guard
            match self
                .variant_index
                .retrieve_variant(ctx.store, ctx.clauses, &[])
            {
                Some(comp) => (comp, false),
                None => (self.intern_component(Vec::new(), clause_idx, ctx), true),
            }
        };

        // Name every remaining component and fold the names into the
        // master's guard. The same component can appear several times
        // when a clause contains variant sub-clauses; one name covers
        // all occurrences.
        for comp in new_components.iter().chain(unnamed_components.iter()) {
            let comp = *comp;
            if comp == master || self.clause_names.contains_key(&comp) {
                continue;
            }
            let name = ctx.bdd.new_var();
            self.clause_names.insert(comp, name);
            let old_prop = ctx.clauses[comp].prop;
            let neg_atom = ctx.bdd.atomic(name, false);
            let new_prop = ctx.bdd.conjunction(old_prop, neg_atom);
            if new_prop != old_prop {
                ctx.clauses[comp].prop = new_prop;
                ctx.clauses[comp].splits.insert(name);
                ctx.inferences
                    .record_prop_alteration(comp, old_prop, new_prop, Rule::ClauseNaming);
            }
            let pos_atom = ctx.bdd.atomic(name, true);
            new_master_prop = ctx.bdd.disjunction(new_master_prop, pos_atom);
            master_premises.push(comp);
            used_names.push(name);
        }

        debug_assert!(!ctx.bdd.is_true(new_master_prop));

        let old_prop = ctx.clauses[master].prop;
        let merged = ctx.bdd.conjunction(old_prop, new_master_prop);
        ctx.clauses[master].prop = merged;
        for name in used_names {
            ctx.clauses[master].splits.insert(name);
        }
        ctx.inferences
            .record_splitting(master, master_premises, old_prop, merged);

        if master_is_new {
            result.new_clauses.push(master);
        } else if merged != old_prop {
            result.modified.push(master);
        }
        result.new_clauses.extend(new_components);
        result.modified.extend(unnamed_components);
        result.modified.retain(|m| !result.new_clauses.contains(m));
        result.new_clauses.dedup();
        result.modified.dedup();
        result
    }

    /// Single-component path: propositional units are rewritten into a
    /// guarded empty clause, everything else goes through the variant
    /// index (insert new / merge guards with the known variant).
    fn handle_no_split(&mut self, clause_idx: usize, ctx: &mut SplitContext) -> SplitResult {
        let mut result = SplitResult::default();
        let literals = ctx.clauses[clause_idx].literals.clone();

        let routed = if literals.len() == 1 && self.is_propositional(ctx.store, literals[0]) {
            let lit = literals[0];
            let polarity = ctx.store.lit(lit).polarity;
            let (name, premise) = self.prop_pred_name(lit, ctx);
            let prop = {
                let atom = ctx.bdd.atomic(name, polarity);
                ctx.bdd.disjunction(ctx.clauses[clause_idx].prop, atom)
            };
            if ctx.bdd.is_true(prop) {
                ctx.stats.discarded_vacuous += 1;
                return result;
            }
            let replacement = self.fresh_clause(Vec::new(), clause_idx, prop, ctx);
            ctx.clauses[replacement].splits.insert(name);
            ctx.inferences.record(
                UnitId::Clause(replacement),
                Rule::Splitting,
                vec![UnitId::Clause(clause_idx), UnitId::Clause(premise)],
            );
            ctx.stats.prop_unit_names += 1;
            replacement
        } else {
            clause_idx
        };

        let lits = ctx.clauses[routed].literals.clone();
        match self
            .variant_index
            .retrieve_variant(ctx.store, ctx.clauses, &lits)
        {
            None => {
                ctx.stats.unique_components += 1;
                self.variant_index
                    .insert(ctx.store, routed, &ctx.clauses[routed]);
                result.new_clauses.push(routed);
            }
            Some(comp) if comp == routed => {
                // Already indexed (a component re-entering processing)
                result.new_clauses.push(routed);
            }
            Some(comp) => {
                // Merge guards: both clauses carry the same obligation
                let old_comp_prop = ctx.clauses[comp].prop;
                let routed_prop = ctx.clauses[routed].prop;
                let merged = ctx.bdd.conjunction(old_comp_prop, routed_prop);
                if merged == old_comp_prop {
                    return result;
                }
                ctx.stats.variant_merges += 1;
                ctx.clauses[comp].prop = merged;
                let extra: Vec<u32> = ctx.clauses[routed].splits.iter().copied().collect();
                for s in extra {
                    ctx.clauses[comp].splits.insert(s);
                }
                ctx.inferences
                    .record_merge(comp, routed, old_comp_prop, merged);
                if ctx.clauses[comp].is_empty() && ctx.bdd.is_false(merged) {
                    // The merged empty clause became unconditional: the
                    // refutation continues as a fresh clause
                    let refutation =
                        self.fresh_clause(Vec::new(), routed, NodeId::FALSE, ctx);
                    ctx.inferences.record(
                        UnitId::Clause(refutation),
                        Rule::Splitting,
                        vec![UnitId::Clause(routed), UnitId::Clause(comp)],
                    );
                    result.new_clauses.push(refutation);
                } else {
                    result.modified.push(comp);
                }
            }
        }
        result
    }

    fn is_propositional(&self, store: &TermStore, lit: LiteralId) -> bool {
        store.lit(lit).args.is_empty()
    }

    /// Get or allocate the split name of an arity-0 predicate along
    /// with the naming premise clause for the literal's polarity.
    fn prop_pred_name(&mut self, lit: LiteralId, ctx: &mut SplitContext) -> (u32, usize) {
        let l = ctx.store.lit(lit);
        let (predicate, polarity) = (l.predicate, l.polarity);
        let name = match self.prop_pred_names.get(&predicate) {
            Some(&n) => n,
            None => {
                let n = ctx.bdd.new_var();
                self.prop_pred_names.insert(predicate, n);
                n
            }
        };
        let premise = match self.prop_pred_premises.get(&(predicate, polarity)) {
            Some(&p) => p,
            None => {
                // Premise clause {lit} guarded by the opposite name atom
                let prop = ctx.bdd.atomic(name, !polarity);
                let idx = ctx.clauses.len();
                let mut clause = Clause::new(vec![lit], ctx.store);
                clause.id = Some(idx);
                clause.prop = prop;
                clause.splits.insert(name);
                ctx.clauses.push(clause);
                ctx.inferences
                    .record(UnitId::Clause(idx), Rule::ClauseNaming, vec![]);
                self.prop_pred_premises.insert((predicate, polarity), idx);
                idx
            }
        };
        (name, premise)
    }

    /// Intern a brand-new component clause with a vacuous guard.
    fn intern_component(
        &mut self,
        lits: Vec<LiteralId>,
        parent: usize,
        ctx: &mut SplitContext,
    ) -> usize {
        ctx.stats.unique_components += 1;
        let comp = self.fresh_clause(lits, parent, NodeId::TRUE, ctx);
        ctx.inferences
            .record(UnitId::Clause(comp), Rule::TautologyIntroduction, vec![]);
        self.variant_index
            .insert(ctx.store, comp, &ctx.clauses[comp]);
        comp
    }

    fn fresh_clause(
        &mut self,
        literals: Vec<LiteralId>,
        parent: usize,
        prop: NodeId,
        ctx: &mut SplitContext,
    ) -> usize {
        let idx = ctx.clauses.len();
        let mut clause = Clause::new(literals, ctx.store);
        clause.id = Some(idx);
        clause.input_type = ctx.clauses[parent].input_type;
        clause.age = ctx.clauses[parent].age;
        clause.prop = prop;
        ctx.clauses.push(clause);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::{InputType, KboConfig, TermId, TermOrdering};

    struct TestHarness {
        clauses: Vec<Clause>,
        store: TermStore,
        interner: Interner,
        bdd: Bdd,
        inferences: InferenceStore,
        stats: Statistics,
        splitter: Splitter,
    }

    impl TestHarness {
        fn new() -> Self {
            TestHarness {
                clauses: Vec::new(),
                store: TermStore::new(),
                interner: Interner::new(),
                bdd: Bdd::new(),
                inferences: InferenceStore::new(),
                stats: Statistics::new(),
                splitter: Splitter::new(),
            }
        }

        fn add_clause(&mut self, literals: Vec<LiteralId>) -> usize {
            let idx = self.clauses.len();
            let mut clause = Clause::new(literals, &self.store);
            clause.id = Some(idx);
            clause.input_type = InputType::Axiom;
            self.clauses.push(clause);
            self.inferences
                .record(UnitId::Clause(idx), Rule::Input, vec![]);
            idx
        }

        fn split(&mut self, idx: usize) -> SplitResult {
            let mut ctx = SplitContext {
                clauses: &mut self.clauses,
                store: &mut self.store,
                interner: &self.interner,
                bdd: &mut self.bdd,
                inferences: &mut self.inferences,
                stats: &mut self.stats,
            };
            self.splitter.split(idx, &mut ctx)
        }

        fn var(&mut self, n: u32) -> TermId {
            self.store.var(n)
        }
    }

    #[test]
    fn test_two_component_split() {
        let mut h = TestHarness::new();
        let p = h.interner.intern_predicate("p", 1);
        let q = h.interner.intern_predicate("q", 1);
        let x = h.var(0);
        let y = h.var(1);
        let px = h.store.literal(&h.interner, p, true, vec![x]);
        let qy = h.store.literal(&h.interner, q, true, vec![y]);

        // {p(X), q(Y)} splits into two components
        let c = h.add_clause(vec![px, qy]);
        let result = h.split(c);

        assert_eq!(h.stats.split_clauses, 1);
        assert_eq!(h.stats.split_components, 2);
        // One master + one named component, both new
        assert_eq!(result.new_clauses.len(), 2);
        assert!(result.modified.is_empty());

        // The named component carries a negative name guard; the master
        // carries the positive atom
        let named = result.new_clauses[1];
        let master = result.new_clauses[0];
        assert!(h.splitter.name_of(named).is_some() || h.splitter.name_of(master).is_some());
        let guarded = if h.splitter.name_of(named).is_some() {
            named
        } else {
            master
        };
        assert_ne!(h.clauses[guarded].prop, NodeId::TRUE);
        assert!(!h.clauses[guarded].splits.is_empty());
    }

    #[test]
    fn test_shared_variable_blocks_split() {
        let mut h = TestHarness::new();
        let p = h.interner.intern_predicate("p", 1);
        let q = h.interner.intern_predicate("q", 1);
        let x = h.var(0);
        let px = h.store.literal(&h.interner, p, true, vec![x]);
        let qx = h.store.literal(&h.interner, q, true, vec![x]);

        // {p(X), q(X)} is one component: no split
        let c = h.add_clause(vec![px, qx]);
        let result = h.split(c);
        assert_eq!(h.stats.split_clauses, 0);
        assert_eq!(result.new_clauses, vec![c]);
    }

    #[test]
    fn test_prop_unit_naming() {
        let mut h = TestHarness::new();
        let p = h.interner.intern_predicate("p", 0);
        let lp = h.store.literal(&h.interner, p, true, vec![]);

        let c = h.add_clause(vec![lp]);
        let result = h.split(c);

        // The unit is rewritten into a guarded empty clause
        assert_eq!(result.new_clauses.len(), 1);
        let replacement = result.new_clauses[0];
        assert!(h.clauses[replacement].is_empty());
        assert_ne!(h.clauses[replacement].prop, NodeId::FALSE);
        assert_eq!(h.stats.prop_unit_names, 1);
    }

    #[test]
    fn test_complementary_prop_units_refute() {
        let mut h = TestHarness::new();
        let p = h.interner.intern_predicate("p", 0);
        let pos = h.store.literal(&h.interner, p, true, vec![]);
        let neg = h.store.literal(&h.interner, p, false, vec![]);

        let c1 = h.add_clause(vec![pos]);
        let r1 = h.split(c1);
        assert_eq!(r1.new_clauses.len(), 1);

        let c2 = h.add_clause(vec![neg]);
        let r2 = h.split(c2);

        // Both rewritten empty clauses are variants; merging their
        // guards (n ∧ ¬n) yields the unconditional empty clause
        let all: Vec<usize> = r2.new_clauses.iter().chain(r2.modified.iter()).copied().collect();
        let refuted = all
            .iter()
            .any(|&idx| h.clauses[idx].is_empty() && h.bdd.is_false(h.clauses[idx].prop));
        assert!(refuted, "expected an unconditional empty clause");
    }

    #[test]
    fn test_variant_component_reused() {
        let mut h = TestHarness::new();
        let p = h.interner.intern_predicate("p", 1);
        let q = h.interner.intern_predicate("q", 1);
        let r = h.interner.intern_predicate("r", 1);
        let x = h.var(0);
        let y = h.var(1);
        let z = h.var(2);

        // First split creates and names component q(Y)
        let px = h.store.literal(&h.interner, p, true, vec![x]);
        let qy = h.store.literal(&h.interner, q, true, vec![y]);
        let c1 = h.add_clause(vec![px, qy]);
        h.split(c1);
        let named_before = h.splitter.clause_names.len();

        // Second split reuses the q-component variant q(Z)
        let rz = h.store.literal(&h.interner, r, true, vec![x]);
        let qz = h.store.literal(&h.interner, q, true, vec![z]);
        let c2 = h.add_clause(vec![rz, qz]);
        h.split(c2);

        assert_eq!(h.stats.split_clauses, 2);
        // q's component was found in the variant index, not re-created
        assert!(h.splitter.clause_names.len() >= named_before);
        let q_components: Vec<usize> = h
            .clauses
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                c.literals.len() == 1 && h.store.lit(c.literals[0]).predicate == q
            })
            .map(|(i, _)| i)
            .collect();
        assert_eq!(q_components.len(), 1, "q component must be unique");
    }
}
