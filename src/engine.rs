//! # Propagation-based local search
//!
//! The engine owns a DAG of bit-vector operator nodes over input leaves,
//! each carrying a current assignment and a ternary domain. Starting from
//! the current (arbitrary) assignment, it repeatedly picks an unsatisfied
//! root constraint, propagates the desired target value down one path of
//! the DAG by inverting operators, lands on an input, and re-evaluates the
//! cone of influence of that input. The search is incomplete: it reports
//! satisfiability when all roots hold, unsatisfiability only for a root
//! that is constant false, and gives up when a propagation or update
//! budget is exhausted.

use crate::bitvec::BitVector;
use crate::bounds::{Bounds, NormalizedRanges};
use crate::node::{BVOperator, Node, NodeId};
use crate::propagate;
use crate::rng::Rng;
use crate::ternary::TernaryBitVector;
use log::{log_enabled, trace, Level};
use petgraph::graph::Graph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;

pub type Assignment = Vec<BitVector>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Solution {
    Sat,
    Unsat,
    Unknown,
}

#[derive(Debug, Error, Clone)]
pub enum SolverError {
    #[error("no satisfying assignment found within the given budgets")]
    BudgetExhausted,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Statistics {
    pub nprops: u64,
    pub nupdates: u64,
    pub nmoves: u64,
    pub nprops_inv: u64,
    pub nprops_cons: u64,
    pub nconf: u64,
}

struct SelectedMove {
    nprops: u64,
    input: Option<(NodeId, BitVector)>,
}

pub struct LocalSearch {
    graph: Graph<Node, u32>,
    /// Current assignment per node ("ab" for assignment bits).
    ab: Vec<BitVector>,
    /// Ternary domain per node ("at" for assignment trits).
    at: Vec<TernaryBitVector>,
    /// Per-node inequality bounds, refreshed during each move.
    bounds: Vec<Bounds>,
    roots: Vec<NodeId>,
    roots_unsat: BTreeSet<usize>,
    /// Inequality nodes under registered roots, with their polarity
    /// (false for roots of the form not(a < b)).
    roots_ineq: HashMap<usize, bool>,
    rng: Rng,
    stats: Statistics,
    max_nprops: u64,
    max_nupdates: u64,
    ineq_bounds: bool,
    opt_concat_sext: bool,
    prob_pick_inv_value: u32,
    prob_pick_ess_input: u32,
    use_path_sel_essential: bool,
}

impl Default for LocalSearch {
    fn default() -> Self {
        Self::new(1234)
    }
}

impl LocalSearch {
    pub fn new(seed: u32) -> Self {
        Self {
            graph: Graph::new(),
            ab: Vec::new(),
            at: Vec::new(),
            bounds: Vec::new(),
            roots: Vec::new(),
            roots_unsat: BTreeSet::new(),
            roots_ineq: HashMap::new(),
            rng: Rng::new(seed),
            stats: Statistics::default(),
            max_nprops: 0,
            max_nupdates: 0,
            ineq_bounds: false,
            opt_concat_sext: false,
            prob_pick_inv_value: 990,
            prob_pick_ess_input: 990,
            use_path_sel_essential: true,
        }
    }

    // --- configuration -----------------------------------------------------

    /// Maximum number of propagation steps, 0 for unlimited.
    pub fn set_max_nprops(&mut self, max: u64) {
        self.max_nprops = max;
    }

    /// Maximum number of cone updates, 0 for unlimited.
    pub fn set_max_nupdates(&mut self, max: u64) {
        self.max_nupdates = max;
    }

    /// Enable mining bounds from satisfied top-level inequalities.
    pub fn set_ineq_bounds(&mut self, value: bool) {
        self.ineq_bounds = value;
    }

    /// Enable the inverse value shortcut for inequalities over
    /// concatenations and sign extensions.
    pub fn set_opt_concat_sext(&mut self, value: bool) {
        self.opt_concat_sext = value;
    }

    pub fn set_prob_pick_inv_value(&mut self, permille: u32) {
        assert!(permille <= 1000);
        self.prob_pick_inv_value = permille;
    }

    pub fn set_prob_pick_ess_input(&mut self, permille: u32) {
        assert!(permille <= 1000);
        self.prob_pick_ess_input = permille;
    }

    pub fn set_use_path_sel_essential(&mut self, value: bool) {
        self.use_path_sel_essential = value;
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    // --- construction ------------------------------------------------------

    /// A fresh input leaf with a zero assignment and an unconstrained domain.
    pub fn mk_input(&mut self, size: u32) -> NodeId {
        self.mk_input_with(BitVector::zero(size), TernaryBitVector::unconstrained(size))
    }

    /// An input leaf with a given assignment and domain.
    pub fn mk_input_with(&mut self, assignment: BitVector, domain: TernaryBitVector) -> NodeId {
        assert_eq!(assignment.width(), domain.width(), "assignment and domain widths differ");
        assert!(domain.mcb(&assignment), "assignment conflicts with the domain");
        let size = assignment.width();
        let id = self.graph.add_node(Node::Input { size });
        self.ab.push(assignment);
        self.at.push(domain);
        self.bounds.push(Bounds::default());
        trace!("new input: x{} := {} with domain {}", id.index(), assignment, domain);
        id
    }

    /// A constant, modelled as an input with a fixed domain.
    pub fn mk_const(&mut self, value: BitVector) -> NodeId {
        self.mk_input_with(value, TernaryBitVector::from(value))
    }

    /// An operator node over previously created children.
    pub fn mk_op(&mut self, op: BVOperator, size: u32, children: &[NodeId]) -> NodeId {
        self.mk_op_impl(op, size, TernaryBitVector::unconstrained(size), children)
    }

    /// An operator node with a constant-bit domain.
    pub fn mk_op_with(&mut self, op: BVOperator, domain: TernaryBitVector, children: &[NodeId]) -> NodeId {
        self.mk_op_impl(op, domain.width(), domain, children)
    }

    fn mk_op_impl(
        &mut self,
        op: BVOperator,
        size: u32,
        mut domain: TernaryBitVector,
        children: &[NodeId],
    ) -> NodeId {
        let sizes: Vec<u32> = children.iter().map(|c| self.node(*c).size()).collect();
        assert_eq!(op.result_size(&sizes), size, "node size does not match the operator");

        let values: Vec<BitVector> = children.iter().map(|c| self.ab[c.index()]).collect();
        let assignment = op.evaluate(&values);

        // a node over constants only is itself a constant
        if children.iter().all(|c| self.at[c.index()].is_fixed()) {
            domain.fix(&assignment);
        }

        let id = self.graph.add_node(Node::Operator { op, size });
        for (pos, child) in children.iter().enumerate() {
            assert!(child.index() < id.index(), "children must be created before their parents");
            self.graph.add_edge(*child, id, pos as u32);
        }
        self.ab.push(assignment);
        self.at.push(domain);
        self.bounds.push(Bounds::default());

        trace!(
            "new operator: x{} := {} over {:?} evaluates to {}",
            id.index(),
            op,
            children.iter().map(|c| c.index()).collect::<Vec<_>>(),
            assignment
        );

        id
    }

    // --- leaf mutation -----------------------------------------------------

    /// Overwrite the assignment of an input leaf and re-evaluate its cone.
    pub fn set_assignment(&mut self, id: NodeId, assignment: BitVector) {
        assert!(self.node(id).is_input(), "only inputs can be assigned");
        assert_eq!(assignment.width(), self.node(id).size(), "assignment width differs");
        assert!(
            self.at[id.index()].mcb(&assignment),
            "assignment conflicts with the domain"
        );
        self.update_cone(id, &assignment);
    }

    /// Fix one domain bit of an input leaf; the assignment is projected
    /// onto the narrowed domain and the cone is re-evaluated.
    pub fn fix_bit(&mut self, id: NodeId, i: u32, value: bool) {
        assert!(self.node(id).is_input(), "only input domains can be narrowed");
        self.at[id.index()].fix_bit(i, value);
        let projected = self.at[id.index()].force_mcb(&self.ab[id.index()]);
        self.update_cone(id, &projected);
    }

    // --- roots -------------------------------------------------------------

    /// Register a width-1 node without parents as a root constraint.
    pub fn register_root(&mut self, id: NodeId) {
        assert_eq!(self.node(id).size(), 1, "roots must have width 1");
        assert!(self.parents(id).is_empty(), "roots can not have parents");

        self.roots.push(id);

        match self.node(id).op() {
            Some(op) if op.is_inequality() => {
                self.roots_ineq.insert(id.index(), true);
            }
            Some(BVOperator::Not) => {
                let child = self.children(id)[0];
                if self.node(child).op().map_or(false, |op| op.is_inequality()) {
                    self.roots_ineq.insert(child.index(), false);
                }
            }
            _ => {}
        }

        self.update_unsat_roots(id);
    }

    pub fn all_roots_sat(&self) -> bool {
        self.roots_unsat.is_empty()
    }

    pub fn num_unsat_roots(&self) -> usize {
        self.roots_unsat.len()
    }

    // --- queries -----------------------------------------------------------

    pub fn get_assignment(&self, id: NodeId) -> BitVector {
        self.ab[id.index()]
    }

    pub fn get_domain(&self, id: NodeId) -> TernaryBitVector {
        self.at[id.index()]
    }

    pub fn get_arity(&self, id: NodeId) -> u32 {
        self.node(id).op().map_or(0, |op| op.arity())
    }

    pub fn get_child(&self, id: NodeId, pos: u32) -> NodeId {
        self.children(id)[pos as usize]
    }

    // --- progress ----------------------------------------------------------

    /// Perform one move: pick an unsatisfied root, propagate the target
    /// down to an input and update its cone of influence.
    pub fn step(&mut self) -> Solution {
        if self.roots_unsat.is_empty() {
            return Solution::Sat;
        }

        trace!("move {}: {} unsatisfied roots", self.stats.nmoves + 1, self.roots_unsat.len());

        let (input, value) = loop {
            if self.max_nprops > 0 && self.stats.nprops >= self.max_nprops {
                return Solution::Unknown;
            }
            if self.max_nupdates > 0 && self.stats.nupdates >= self.max_nupdates {
                return Solution::Unknown;
            }

            let pick = self.rng.pick_index(self.roots_unsat.len());
            let root = NodeId::new(*self.roots_unsat.iter().nth(pick).expect("set is non-empty"));

            if self.at[root.index()].is_fixed() && self.at[root.index()].lo().is_false() {
                return Solution::Unsat;
            }

            trace!("select constraint: x{}", root.index());

            let selected = self.select_move(root, BitVector::one(1));
            // a conflict without any propagation still consumes budget, so
            // that a graph conflicting at every root can not loop forever
            self.stats.nprops += selected.nprops.max(u64::from(selected.input.is_none()));

            if let Some(m) = selected.input {
                break m;
            }
        };

        trace!(
            "move: x{} ({}) <- {}",
            input.index(),
            self.ab[input.index()],
            value
        );

        self.stats.nmoves += 1;
        self.stats.nupdates += self.update_cone(input, &value);

        if self.roots_unsat.is_empty() {
            Solution::Sat
        } else {
            Solution::Unknown
        }
    }

    /// Run moves until a verdict is reached: `Ok(Some(_))` with the full
    /// assignment on satisfiability, `Ok(None)` on unsatisfiability, and an
    /// error once a budget is exhausted. With both budgets unlimited this
    /// only returns once a verdict is found.
    pub fn solve(&mut self) -> Result<Option<Assignment>, SolverError> {
        time_debug!("local search finished", {
            loop {
                match self.step() {
                    Solution::Sat => return Ok(Some(self.ab.clone())),
                    Solution::Unsat => return Ok(None),
                    Solution::Unknown => {
                        let props_out =
                            self.max_nprops > 0 && self.stats.nprops >= self.max_nprops;
                        let updates_out =
                            self.max_nupdates > 0 && self.stats.nupdates >= self.max_nupdates;
                        if props_out || updates_out {
                            return Err(SolverError::BudgetExhausted);
                        }
                    }
                }
            }
        })
    }

    // --- private helpers ---------------------------------------------------

    fn node(&self, id: NodeId) -> &Node {
        &self.graph[id]
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut edges: Vec<(u32, NodeId)> = self
            .graph
            .edges_directed(id, Direction::Incoming)
            .map(|e| (*e.weight(), e.source()))
            .collect();
        edges.sort_by_key(|(pos, _)| *pos);
        edges.into_iter().map(|(_, c)| c).collect()
    }

    fn parents(&self, id: NodeId) -> Vec<NodeId> {
        self.graph
            .edges_directed(id, Direction::Outgoing)
            .map(|e| e.target())
            .collect()
    }

    fn is_const(&self, id: NodeId) -> bool {
        self.at[id.index()].is_fixed()
    }

    fn is_registered_root(&self, id: NodeId) -> bool {
        self.roots.contains(&id)
    }

    fn child_values(&self, id: NodeId) -> Vec<BitVector> {
        self.children(id).iter().map(|c| self.ab[c.index()]).collect()
    }

    fn evaluate(&mut self, id: NodeId) {
        if let Some(op) = self.node(id).op() {
            let values = self.child_values(id);
            self.ab[id.index()] = op.evaluate(&values);
        }
    }

    fn update_unsat_roots(&mut self, root: NodeId) {
        if !self.is_registered_root(root) {
            return;
        }
        if self.ab[root.index()].is_true() {
            self.roots_unsat.remove(&root.index());
        } else {
            self.roots_unsat.insert(root.index());
        }
    }

    /// Re-evaluate all ancestors of `id` after assigning `value` to it.
    /// Ancestors are evaluated in ascending id order, which is a valid
    /// topological order because children are always created first.
    fn update_cone(&mut self, id: NodeId, value: &BitVector) -> u64 {
        if self.ab[id.index()] == *value {
            return 0;
        }

        self.ab[id.index()] = *value;
        let mut nupdates = 1;

        let mut to_visit = self.parents(id);
        let mut visited = HashSet::new();
        let mut cone = Vec::new();
        while let Some(cur) = to_visit.pop() {
            if !visited.insert(cur.index()) {
                continue;
            }
            cone.push(cur.index());
            to_visit.extend(self.parents(cur));
        }
        cone.sort_unstable();

        self.update_unsat_roots(id);

        for index in cone {
            let node = NodeId::new(index);
            self.evaluate(node);
            nupdates += 1;
            trace!("update cone: x{} <- {}", index, self.ab[index]);
            self.update_unsat_roots(node);
        }

        nupdates
    }

    /// Propagate the target value from a root down to an input, selecting
    /// the path and the inverse/consistent values along the way. Returns
    /// no input on a conflict.
    fn select_move(&mut self, root: NodeId, t_root: BitVector) -> SelectedMove {
        let mut nprops = 0;
        let mut cur = root;
        let mut t = t_root;

        loop {
            if self.get_arity(cur) == 0 {
                trace!("propagate: landed on x{} with target {}", cur.index(), t);
                return SelectedMove {
                    nprops,
                    input: Some((cur, t)),
                };
            }

            let children = self.children(cur);
            if self.is_const(cur) || children.iter().all(|c| self.is_const(*c)) {
                break;
            }

            // refresh bounds of the children from satisfied top-level
            // inequalities before choosing among them
            if self.ineq_bounds {
                self.compute_bounds(cur);
            }

            let pos_x = match self.select_path(cur, &t) {
                Some(pos) => pos,
                None => break,
            };

            if log_enabled!(Level::Trace) {
                trace!(
                    "propagate: x{} ({}) target {} via operand {}",
                    cur.index(),
                    self.node(cur).op().expect("operator node"),
                    t,
                    pos_x
                );
            }

            let (value, used_inverse) = if self.rng.pick_with_prob(self.prob_pick_inv_value) {
                match self.inverse_value(cur, &t, pos_x, false) {
                    Some(v) => (Some(v), true),
                    None => (self.consistent_value(cur, &t, pos_x), false),
                }
            } else {
                (self.consistent_value(cur, &t, pos_x), false)
            };

            match value {
                Some(v) => {
                    if used_inverse {
                        self.stats.nprops_inv += 1;
                    } else {
                        self.stats.nprops_cons += 1;
                    }
                    t = v;
                }
                None => break,
            }

            cur = children[pos_x as usize];
            nprops += 1;
        }

        trace!("propagate: conflict at x{}", cur.index());
        self.stats.nconf += 1;
        SelectedMove { nprops, input: None }
    }

    /// Candidate operand positions for propagation: non-constant children,
    /// and for an if-then-else only the condition and the branch selected
    /// by the current condition value.
    fn select_path_non_const(&self, id: NodeId) -> Vec<u32> {
        let children = self.children(id);
        let is_ite = matches!(self.node(id).op(), Some(BVOperator::Ite));
        let cond_is_true = is_ite && self.ab[children[0].index()].is_true();

        children
            .iter()
            .enumerate()
            .filter(|(pos, child)| {
                if self.is_const(**child) {
                    return false;
                }
                if is_ite && ((*pos == 1 && !cond_is_true) || (*pos == 2 && cond_is_true)) {
                    return false;
                }
                true
            })
            .map(|(pos, _)| pos as u32)
            .collect()
    }

    fn select_path(&mut self, id: NodeId, t: &BitVector) -> Option<u32> {
        let candidates = self.select_path_non_const(id);
        if candidates.is_empty() {
            return None;
        }
        if candidates.len() == 1 {
            return Some(candidates[0]);
        }

        if self.use_path_sel_essential && self.rng.pick_with_prob(self.prob_pick_ess_input) {
            let essential: Vec<u32> = candidates
                .iter()
                .copied()
                .filter(|pos| self.is_essential(id, t, *pos))
                .collect();
            if !essential.is_empty() {
                return Some(self.rng.pick_from_slice(&essential));
            }
        }

        Some(self.rng.pick_from_slice(&candidates))
    }

    /// An operand is essential if no other operand can be inverted towards
    /// the target. Bounds are not consulted here; inverting through a bound
    /// derived from another inequality could cycle between the two.
    fn is_essential(&mut self, id: NodeId, t: &BitVector, pos: u32) -> bool {
        let arity = self.get_arity(id);
        if arity == 1 {
            return false;
        }
        (0..arity)
            .filter(|other| *other != pos)
            .all(|other| self.inverse_value(id, t, other, true).is_none())
    }

    fn inverse_value(
        &mut self,
        id: NodeId,
        t: &BitVector,
        pos_x: u32,
        is_essential_check: bool,
    ) -> Option<BitVector> {
        let op = self.node(id).op().expect("operator node");
        let children = self.children(id);
        let x = children[pos_x as usize];
        let x_dom = self.at[x.index()];
        let values = self.child_values(id);

        let bounds = if op.is_inequality() && self.ineq_bounds && !is_essential_check {
            let stored = &self.bounds[x.index()];
            if stored.is_unset() {
                None
            } else {
                Some(stored.normalize(x_dom.width()))
            }
        } else {
            None
        };

        if op.is_inequality() && self.opt_concat_sext && !is_essential_check && !x_dom.is_fixed() {
            let s = values[1 - pos_x as usize];
            if let Some(ranges) =
                propagate::ineq_ranges(op, &s, t.is_true(), pos_x, bounds.as_ref())
            {
                if let Some(v) = self.inverse_value_concat_sext(x, &ranges) {
                    return Some(v);
                }
            }
        }

        propagate::inverse_value(&mut self.rng, op, &x_dom, &values, t, pos_x, bounds.as_ref())
    }

    fn consistent_value(&mut self, id: NodeId, t: &BitVector, pos_x: u32) -> Option<BitVector> {
        let op = self.node(id).op().expect("operator node");
        let x_dom = self.at[self.children(id)[pos_x as usize].index()];
        let values = self.child_values(id);
        propagate::consistent_value(&mut self.rng, op, &x_dom, &values, t, pos_x)
    }

    // --- inequality bounds -------------------------------------------------

    /// Derive bounds for the children of `id` from all registered
    /// inequalities that are satisfied under the current assignment.
    fn compute_bounds(&mut self, id: NodeId) {
        let children = self.children(id);
        for child in &children {
            self.bounds[child.index()].reset();
        }
        for child in children {
            for parent in self.parents(child) {
                let polarity = match self.roots_ineq.get(&parent.index()) {
                    Some(p) => *p,
                    None => continue,
                };
                let lt_holds = self.ab[parent.index()].is_true();
                // only currently satisfied roots contribute bounds
                if lt_holds != polarity {
                    continue;
                }
                let operands = self.children(parent);
                for (pos, operand) in operands.iter().enumerate() {
                    if *operand == child {
                        self.update_bounds_aux(parent, pos as u32, lt_holds);
                    }
                }
            }
        }
    }

    /// Derive the bound on one child of a satisfied inequality: `a < b`
    /// implies `a <= b - 1` and `b >= a + 1`, while `a >= b` (a satisfied
    /// negated inequality) implies `a >= b` and `b <= a`.
    fn update_bounds_aux(&mut self, ineq: NodeId, pos: u32, lt_holds: bool) {
        let operands = self.children(ineq);
        let (a, b) = (operands[0], operands[1]);
        let (value_a, value_b) = (self.ab[a.index()], self.ab[b.index()]);
        let w = value_a.width();

        let signed = matches!(self.node(ineq).op(), Some(BVOperator::Slt));
        let (min_value, max_value) = if signed {
            (BitVector::min_signed(w), BitVector::max_signed(w))
        } else {
            (BitVector::zero(w), BitVector::ones(w))
        };

        if lt_holds {
            if pos == 0 {
                self.bounds[a.index()].update(&min_value, &value_b, false, true, signed);
            } else {
                self.bounds[b.index()].update(&value_a, &max_value, true, false, signed);
            }
        } else if pos == 0 {
            self.bounds[a.index()].update(&value_b, &max_value, false, false, signed);
        } else {
            self.bounds[b.index()].update(&min_value, &value_a, false, false, signed);
        }
    }

    // --- inequality shortcut over concat/sext operands ---------------------

    /// Try to satisfy an inequality whose unknown operand is itself a
    /// concatenation or sign extension by changing only one sub-slice of
    /// that operand. Falls back to the generic inverse on failure.
    fn inverse_value_concat_sext(
        &mut self,
        x: NodeId,
        ranges: &NormalizedRanges,
    ) -> Option<BitVector> {
        let x_dom = self.at[x.index()];
        let x_val = self.ab[x.index()];
        let w = x_dom.width();

        match self.node(x).op() {
            Some(BVOperator::Concat) => {
                let children = self.children(x);
                let w1 = self.node(children[1]).size();
                let order = if self.rng.flip() { [0, 1] } else { [1, 0] };

                for which in order {
                    if which == 1 {
                        // keep the high slice, adjust the low slice
                        let slice_dom = match self.at[children[1].index()]
                            .intersect(&x_dom.extract(w1 - 1, 0))
                        {
                            Some(d) => d,
                            None => continue,
                        };
                        let high = x_val.extract(w - 1, w1);
                        let window_lo = high.concat(&BitVector::zero(w1));
                        let window_hi = high.concat(&BitVector::ones(w1));
                        let mut slice_ranges = Vec::new();
                        for (a, b) in ranges.intervals() {
                            let a = if a.ult(&window_lo) { window_lo } else { a };
                            let b = if window_hi.ult(&b) { window_hi } else { b };
                            if a.ulte(&b) {
                                slice_ranges.push((a.extract(w1 - 1, 0), b.extract(w1 - 1, 0)));
                            }
                        }
                        if let Some(low) = slice_dom.sample_in_ranges(&mut self.rng, &slice_ranges)
                        {
                            return Some(high.concat(&low));
                        }
                    } else {
                        // keep the low slice, adjust the high slice
                        let w0 = w - w1;
                        let slice_dom = match self.at[children[0].index()]
                            .intersect(&x_dom.extract(w - 1, w1))
                        {
                            Some(d) => d,
                            None => continue,
                        };
                        let low = x_val.extract(w1 - 1, 0);
                        let max_slice = if w0 == 64 { u64::MAX } else { (1u64 << w0) - 1 };
                        let mut slice_ranges = Vec::new();
                        for (a, b) in ranges.intervals() {
                            let mut c_lo = a.value() >> w1;
                            if (c_lo << w1) | low.value() < a.value() {
                                c_lo += 1;
                            }
                            let mut c_hi = b.value() >> w1;
                            if (c_hi << w1) | low.value() > b.value() {
                                if c_hi == 0 {
                                    continue;
                                }
                                c_hi -= 1;
                            }
                            if c_lo > c_hi || c_lo > max_slice {
                                continue;
                            }
                            slice_ranges.push((BitVector::new(c_lo, w0), BitVector::new(c_hi, w0)));
                        }
                        if let Some(high) = slice_dom.sample_in_ranges(&mut self.rng, &slice_ranges)
                        {
                            return Some(high.concat(&low));
                        }
                    }
                }
                None
            }
            Some(BVOperator::Sext { n }) if n > 0 => {
                let children = self.children(x);
                let w0 = w - n;
                let slice_dom = self.at[children[0].index()].intersect(&x_dom.extract(w0 - 1, 0))?;

                // the image of a sign extension covers the low part of the
                // non-negative half and the high part of the negative half
                let positive_hi = BitVector::max_signed(w0).zext(n);
                let negative_lo = BitVector::min_signed(w0).sext(n);
                let mut slice_ranges = Vec::new();
                for (a, b) in ranges.intervals() {
                    if a.ulte(&positive_hi) {
                        let hi = if b.ult(&positive_hi) { b } else { positive_hi };
                        if a.ulte(&hi) {
                            slice_ranges.push((a.extract(w0 - 1, 0), hi.extract(w0 - 1, 0)));
                        }
                    }
                    if negative_lo.ulte(&b) {
                        let lo = if negative_lo.ult(&a) { a } else { negative_lo };
                        if lo.ulte(&b) {
                            slice_ranges.push((lo.extract(w0 - 1, 0), b.extract(w0 - 1, 0)));
                        }
                    }
                }
                slice_dom
                    .sample_in_ranges(&mut self.rng, &slice_ranges)
                    .map(|slice| slice.sext(n))
            }
            _ => None,
        }
    }
}
