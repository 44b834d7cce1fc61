//! Property tests for the flattening rules and in-place evaluation.
//!
//! Diagonal leaves keep the arithmetic exact enough that sums built in different
//! association orders, and in-place versus allocating applies, can be compared
//! with a tight tolerance over arbitrary inputs.

use lazyop::{ArrayOperator, Diagonal, IdentityOperator, Operator, add, compose, scale};
use proptest::prelude::*;

const N: usize = 4;

fn diag(d: Vec<f64>) -> Operator<f64> {
    ArrayOperator::new(Diagonal::new(d)).into()
}

fn close(a: &[f64], b: &[f64]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() <= 1e-9 * (1.0 + x.abs().max(y.abs())))
}

fn entries() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-10.0_f64..10.0_f64, N)
}

proptest! {
    #[test]
    fn sum_association_flattens(a in entries(), b in entries(), c in entries(), u in entries()) {
        let (a, b, c) = (diag(a), diag(b), diag(c));
        let left = add(vec![add(vec![a.clone(), b.clone()]).unwrap(), c.clone()]).unwrap();
        let right = add(vec![a, add(vec![b, c]).unwrap()]).unwrap();
        for op in [&left, &right] {
            match op {
                Operator::Added(sum) => prop_assert_eq!(sum.len(), 3),
                other => prop_assert!(false, "expected a sum, got {:?}", other),
            }
        }
        prop_assert!(close(&left.apply(&u).unwrap(), &right.apply(&u).unwrap()));
    }

    #[test]
    fn nested_scaling_multiplies(alpha in -5.0_f64..5.0, beta in -5.0_f64..5.0, d in entries()) {
        let op = scale(beta, scale(alpha, diag(d)));
        match &op {
            Operator::Scaled(s) => {
                prop_assert!((s.coefficient().value() - alpha * beta).abs() < 1e-12);
                prop_assert!(matches!(s.inner(), Operator::Array(_)));
            }
            other => prop_assert!(false, "expected a scaling, got {:?}", other),
        }
    }

    #[test]
    fn in_place_matches_allocating(a in entries(), b in entries(), alpha in -3.0_f64..3.0, u in entries()) {
        let mut op = add(vec![
            scale(alpha, diag(a)),
            compose(diag(b), IdentityOperator::new(N).into()).unwrap(),
            IdentityOperator::new(N).into(),
        ]).unwrap();
        let expected = op.apply(&u).unwrap();
        let mut y = vec![0.0; N];
        op.apply_into(&u, &mut y).unwrap();
        prop_assert!(close(&y, &expected));
        op.apply_into(&u, &mut y).unwrap();
        prop_assert!(close(&y, &expected));
    }
}
