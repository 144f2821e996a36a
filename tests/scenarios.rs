//! End-to-end scenarios for the local-search engine.

use kelpie::bitvec::BitVector;
use kelpie::engine::{LocalSearch, Solution, SolverError};
use kelpie::node::BVOperator::*;
use kelpie::ternary::TernaryBitVector;
use std::collections::HashSet;

fn bv(value: u64, width: u32) -> BitVector {
    BitVector::new(value, width)
}

#[test]
fn addition_equality_is_satisfied() {
    // x + y = 42 over 8 bits
    let mut ls = LocalSearch::new(1);
    let x = ls.mk_input(8);
    let y = ls.mk_input(8);
    let sum = ls.mk_op(Add, 8, &[x, y]);
    let c = ls.mk_const(bv(42, 8));
    let root = ls.mk_op(Eq, 1, &[sum, c]);
    ls.register_root(root);
    ls.set_max_nprops(200);

    let assignment = ls.solve().expect("within budget").expect("satisfiable");
    assert_eq!(
        assignment[x.index()] + assignment[y.index()],
        bv(42, 8),
        "model must satisfy x + y = 42 modulo 256"
    );
    assert!(ls.all_roots_sat());
}

#[test]
fn domain_restricted_equality_finds_the_only_model() {
    // x of width 4 with domain 1xx0, root x = 1100
    let mut ls = LocalSearch::new(1);
    let x = ls.mk_input_with(bv(0b1000, 4), TernaryBitVector::lit("1xx0"));
    let c = ls.mk_const(bv(0b1100, 4));
    let root = ls.mk_op(Eq, 1, &[x, c]);
    ls.register_root(root);
    ls.set_max_nprops(1000);

    let assignment = ls.solve().expect("within budget").expect("satisfiable");
    assert_eq!(assignment[x.index()], bv(0b1100, 4));
}

#[test]
fn fixed_false_root_is_unsatisfiable_on_the_first_move() {
    // x fixed to 1111, root x = 0000
    let mut ls = LocalSearch::new(1);
    let x = ls.mk_input_with(bv(0b1111, 4), TernaryBitVector::from(bv(0b1111, 4)));
    let zero = ls.mk_const(bv(0, 4));
    let root = ls.mk_op(Eq, 1, &[x, zero]);
    ls.register_root(root);

    assert_eq!(ls.step(), Solution::Unsat);
    assert_eq!(ls.solve().expect("no budget needed"), None);
}

#[test]
fn contradictory_inequalities_stay_unknown() {
    // a < b and b < a has no model, but local search can not prove that
    let mut ls = LocalSearch::new(1);
    let a = ls.mk_input(8);
    let b = ls.mk_input(8);
    let lt = ls.mk_op(Ult, 1, &[a, b]);
    let gt = ls.mk_op(Ult, 1, &[b, a]);
    ls.register_root(lt);
    ls.register_root(gt);
    ls.set_max_nprops(5000);
    ls.set_max_nupdates(5000);

    assert!(matches!(ls.solve(), Err(SolverError::BudgetExhausted)));
}

#[test]
fn odd_multiplier_is_inverted_exactly() {
    // x * 3 = 9 over 8 bits has the unique solution x = 3
    let mut ls = LocalSearch::new(1);
    let x = ls.mk_input(8);
    let three = ls.mk_const(bv(3, 8));
    let product = ls.mk_op(Mul, 8, &[x, three]);
    let nine = ls.mk_const(bv(9, 8));
    let root = ls.mk_op(Eq, 1, &[product, nine]);
    ls.register_root(root);
    ls.set_max_nprops(1000);

    let assignment = ls.solve().expect("within budget").expect("satisfiable");
    assert_eq!(assignment[x.index()], bv(3, 8));
}

#[test]
fn shifted_equality_covers_multiple_models() {
    // (x << 2) = 1100 over 4 bits has models {0011, 0111, 1011, 1111};
    // distinct seeds must reach at least two of them
    let mut models = HashSet::new();

    for seed in 1..=20 {
        let mut ls = LocalSearch::new(seed);
        let x = ls.mk_input(4);
        let two = ls.mk_const(bv(2, 4));
        let shifted = ls.mk_op(Shl, 4, &[x, two]);
        let c = ls.mk_const(bv(0b1100, 4));
        let root = ls.mk_op(Eq, 1, &[shifted, c]);
        ls.register_root(root);
        ls.set_max_nprops(1000);

        let assignment = ls.solve().expect("within budget").expect("satisfiable");
        let model = assignment[x.index()];
        assert_eq!(model.value() & 0b11, 0b11, "low bits must be 11");
        assert_eq!(model << 2, bv(0b1100, 4));
        models.insert(model.value());
    }

    assert!(
        models.len() >= 2,
        "twenty seeds must cover at least two of the four models, got {:?}",
        models
    );
}

#[test]
fn conjunction_of_constraints_over_shared_inputs() {
    // x < y and y < 10 and x + y = 13, e.g. x = 4, y = 9
    let mut ls = LocalSearch::new(3);
    let x = ls.mk_input(8);
    let y = ls.mk_input(8);
    let ten = ls.mk_const(bv(10, 8));
    let thirteen = ls.mk_const(bv(13, 8));

    let lt = ls.mk_op(Ult, 1, &[x, y]);
    let cap = ls.mk_op(Ult, 1, &[y, ten]);
    let sum = ls.mk_op(Add, 8, &[x, y]);
    let eq = ls.mk_op(Eq, 1, &[sum, thirteen]);

    ls.register_root(lt);
    ls.register_root(cap);
    ls.register_root(eq);
    ls.set_max_nprops(50_000);
    ls.set_max_nupdates(50_000);

    let assignment = ls.solve().expect("within budget").expect("satisfiable");
    let (mx, my) = (assignment[x.index()], assignment[y.index()]);
    assert!(mx.ult(&my));
    assert!(my.ult(&bv(10, 8)));
    assert_eq!(mx + my, bv(13, 8));
}

#[test]
fn inequality_bounds_help_with_chained_constraints() {
    // same constraints with bounds mining enabled
    let mut ls = LocalSearch::new(3);
    ls.set_ineq_bounds(true);
    let x = ls.mk_input(8);
    let y = ls.mk_input(8);
    let ten = ls.mk_const(bv(10, 8));
    let thirteen = ls.mk_const(bv(13, 8));

    let lt = ls.mk_op(Ult, 1, &[x, y]);
    let cap = ls.mk_op(Ult, 1, &[y, ten]);
    let sum = ls.mk_op(Add, 8, &[x, y]);
    let eq = ls.mk_op(Eq, 1, &[sum, thirteen]);

    ls.register_root(lt);
    ls.register_root(cap);
    ls.register_root(eq);
    ls.set_max_nprops(50_000);
    ls.set_max_nupdates(50_000);

    let assignment = ls.solve().expect("within budget").expect("satisfiable");
    let (mx, my) = (assignment[x.index()], assignment[y.index()]);
    assert!(mx.ult(&my) && my.ult(&bv(10, 8)));
    assert_eq!(mx + my, bv(13, 8));
}

#[test]
fn signed_comparison_with_sign_extension() {
    // sext(x, 4) <s 0 forces the sign bit of x
    let mut ls = LocalSearch::new(5);
    let x = ls.mk_input(4);
    let wide = ls.mk_op(Sext { n: 4 }, 8, &[x]);
    let zero = ls.mk_const(bv(0, 8));
    let root = ls.mk_op(Slt, 1, &[wide, zero]);
    ls.register_root(root);
    ls.set_max_nprops(2000);

    let assignment = ls.solve().expect("within budget").expect("satisfiable");
    assert!(assignment[x.index()].msb(), "negative models have the sign bit set");
}

#[test]
fn ite_condition_is_steered_towards_the_target() {
    // ite(c, 5, 7) = 5 forces c = 1
    let mut ls = LocalSearch::new(2);
    let c = ls.mk_input(1);
    let five = ls.mk_const(bv(5, 4));
    let seven = ls.mk_const(bv(7, 4));
    let ite = ls.mk_op(Ite, 4, &[c, five, seven]);
    let target = ls.mk_const(bv(5, 4));
    let root = ls.mk_op(Eq, 1, &[ite, target]);
    ls.register_root(root);
    ls.set_max_nprops(1000);

    let assignment = ls.solve().expect("within budget").expect("satisfiable");
    assert!(assignment[c.index()].is_true());
}

#[test]
fn extract_and_concat_roundtrip_constraint() {
    // concat(x[7:4], x[3:0]) = x is a tautology; use it to exercise the
    // structural operators end to end: concat(hi, lo) = 0xa5
    let mut ls = LocalSearch::new(11);
    let x = ls.mk_input(8);
    let hi = ls.mk_op(Extract { hi: 7, lo: 4 }, 4, &[x]);
    let lo = ls.mk_op(Extract { hi: 3, lo: 0 }, 4, &[x]);
    let joined = ls.mk_op(Concat, 8, &[hi, lo]);
    let c = ls.mk_const(bv(0xa5, 8));
    let root = ls.mk_op(Eq, 1, &[joined, c]);
    ls.register_root(root);
    ls.set_max_nprops(5000);

    let assignment = ls.solve().expect("within budget").expect("satisfiable");
    assert_eq!(assignment[x.index()], bv(0xa5, 8));
}

#[test]
fn results_are_reproducible_for_a_fixed_seed() {
    let run = || {
        let mut ls = LocalSearch::new(99);
        let x = ls.mk_input(8);
        let y = ls.mk_input(8);
        let xy = ls.mk_op(Xor, 8, &[x, y]);
        let c = ls.mk_const(bv(0x5a, 8));
        let root = ls.mk_op(Eq, 1, &[xy, c]);
        ls.register_root(root);
        ls.set_max_nprops(10_000);
        let assignment = ls.solve().expect("within budget").expect("satisfiable");
        (
            assignment[x.index()],
            assignment[y.index()],
            ls.statistics().nmoves,
            ls.statistics().nprops,
        )
    };

    assert_eq!(run(), run());
}

#[test]
fn assignments_stay_consistent_after_every_step() {
    // after each step, every operator node must equal the evaluation of
    // its children and every root must be tracked correctly
    let mut ls = LocalSearch::new(17);
    let x = ls.mk_input(8);
    let y = ls.mk_input(8);
    let sum = ls.mk_op(Add, 8, &[x, y]);
    let prod = ls.mk_op(Mul, 8, &[x, y]);
    let c1 = ls.mk_const(bv(30, 8));
    let c2 = ls.mk_const(bv(11, 8));
    let r1 = ls.mk_op(Ult, 1, &[sum, c1]);
    let r2 = ls.mk_op(Eq, 1, &[sum, c2]);
    ls.register_root(r1);
    ls.register_root(r2);
    ls.set_max_nprops(10_000);

    for _ in 0..200 {
        let result = ls.step();

        let (vx, vy) = (ls.get_assignment(x), ls.get_assignment(y));
        assert_eq!(ls.get_assignment(sum), vx + vy);
        assert_eq!(ls.get_assignment(prod), vx * vy);

        let roots_sat = ls.get_assignment(r1).is_true() && ls.get_assignment(r2).is_true();
        assert_eq!(roots_sat, ls.all_roots_sat());

        match result {
            Solution::Sat => {
                assert!(ls.all_roots_sat());
                return;
            }
            Solution::Unsat => panic!("constraints are satisfiable"),
            Solution::Unknown => {}
        }
    }

    panic!("no model found within 200 moves");
}
