use proptest::{prelude::*, sample::Index};

use crate::{
    specification::ltl::{Evaluator, Formula},
    trace::Trace,
};

fn trace() -> BoxedStrategy<Trace> {
    (1..8usize)
        .prop_flat_map(|length| {
            (prop::collection::vec(any::<(bool, bool)>(), length), 0..length)
        })
        .prop_map(|(states, lasso)| {
            Trace::new(
                vec!["p".to_string(), "q".to_string()],
                states.into_iter().map(|(p, q)| vec![p, q]).collect(),
                lasso,
            )
            .unwrap()
        })
        .boxed()
}

fn leaf() -> BoxedStrategy<Formula> {
    prop_oneof![
        Just(Formula::True),
        Just(Formula::False),
        Just(Formula::atom("p")),
        Just(Formula::atom("q")),
    ]
    .boxed()
}

fn formula() -> BoxedStrategy<Formula> {
    leaf()
        .prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(Formula::not),
                inner.clone().prop_map(Formula::yesterday),
                inner.clone().prop_map(Formula::once),
                inner.clone().prop_map(Formula::historically),
                inner.clone().prop_map(Formula::next),
                inner.clone().prop_map(Formula::eventually),
                inner.clone().prop_map(Formula::always),
                (inner.clone(), inner.clone())
                    .prop_map(|(left, right)| Formula::and(left, right)),
                (inner.clone(), inner.clone())
                    .prop_map(|(left, right)| Formula::or(left, right)),
                (inner.clone(), inner.clone())
                    .prop_map(|(left, right)| Formula::implies(left, right)),
                (inner.clone(), inner.clone())
                    .prop_map(|(left, right)| Formula::since(left, right)),
                (inner.clone(), inner.clone())
                    .prop_map(|(left, right)| Formula::until(left, right)),
            ]
        })
        .boxed()
}

/// Formulas without future operators, whose value at an index doesn't
/// depend on the loop budget.
fn past_formula() -> BoxedStrategy<Formula> {
    leaf()
        .prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(Formula::not),
                inner.clone().prop_map(Formula::yesterday),
                inner.clone().prop_map(Formula::once),
                inner.clone().prop_map(Formula::historically),
                (inner.clone(), inner.clone())
                    .prop_map(|(left, right)| Formula::and(left, right)),
                (inner.clone(), inner.clone())
                    .prop_map(|(left, right)| Formula::or(left, right)),
                (inner.clone(), inner.clone())
                    .prop_map(|(left, right)| Formula::since(left, right)),
            ]
        })
        .boxed()
}

fn holds(formula: &Formula, trace: &Trace, index: usize) -> bool {
    Evaluator::new(trace).holds(formula, index).unwrap()
}

fn check_equivalence(
    formula_left: &Formula,
    formula_right: &Formula,
    trace: &Trace,
) {
    let mut evaluator = Evaluator::new(trace);
    for index in 0..trace.len() {
        let left = evaluator.holds(formula_left, index).unwrap();
        let right = evaluator.holds(formula_right, index).unwrap();
        assert_eq!(
            left, right,
            "\n{}\n\n!=\n\n{}\n\nat {} of {}\n",
            formula_left, formula_right, index, trace
        );
    }
}

// Evaluation
proptest! {
    #[test]
    fn test_evaluation_terminates(φ in formula(), trace in trace()) {
        let mut evaluator = Evaluator::new(&trace);
        for index in 0..trace.len() {
            prop_assert!(evaluator.holds(&φ, index).is_ok());
        }
    }

    #[test]
    fn test_determinism(φ in formula(), trace in trace(), index in any::<Index>()) {
        let index = index.index(trace.len());
        let mut evaluator = Evaluator::new(&trace);
        let first = evaluator.holds(&φ, index).unwrap();
        let second = evaluator.holds(&φ, index).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, holds(&φ, &trace, index));
    }

    #[test]
    fn test_holds_throughout_is_conjunction(φ in formula(), trace in trace()) {
        let expected = (0..trace.len()).all(|index| holds(&φ, &trace, index));
        let actual = Evaluator::new(&trace).holds_throughout(&φ).unwrap();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn test_holds_at_start(φ in formula(), trace in trace()) {
        let actual = Evaluator::new(&trace).holds_at_start(&φ).unwrap();
        prop_assert_eq!(holds(&φ, &trace, 0), actual);
    }

    #[test]
    fn test_yesterday_at_start(φ in formula(), trace in trace()) {
        prop_assert!(!holds(&Formula::yesterday(φ), &trace, 0));
    }

    #[test]
    fn test_next_false(trace in trace(), index in any::<Index>()) {
        let index = index.index(trace.len());
        prop_assert!(!holds(&Formula::next(Formula::False), &trace, index));
        prop_assert!(holds(&Formula::always(Formula::True), &trace, index));
    }
}

// Unrolling
proptest! {
    // Within a session, φ U ψ ⇔ ψ ∨ (φ ∧ next(φ U ψ))
    #[test]
    fn test_until_unrolling(φ in formula(), ψ in formula(), trace in trace(), index in any::<Index>()) {
        let index = index.index(trace.len());
        let until = Formula::until(φ.clone(), ψ.clone());
        let mut evaluator = Evaluator::new(&trace);
        let expected = evaluator.holds(&until, index).unwrap();

        evaluator.reset();
        let unrolled = evaluator.evaluate(&ψ, index).unwrap()
            || (evaluator.evaluate(&φ, index).unwrap()
                && match evaluator.successor(index) {
                    Some(next) => evaluator.evaluate(&until, next).unwrap(),
                    None => false,
                });
        prop_assert_eq!(expected, unrolled);
    }

    // With state-only operands the unrolling also holds across fresh queries
    #[test]
    fn test_until_unrolling_past_operands(φ in past_formula(), ψ in past_formula(), trace in trace(), index in any::<Index>()) {
        let index = index.index(trace.len());
        let until = Formula::until(φ.clone(), ψ.clone());
        let successor = Evaluator::new(&trace).successor(index);
        let unrolled = holds(&ψ, &trace, index)
            || (holds(&φ, &trace, index)
                && successor.is_some_and(|next| holds(&until, &trace, next)));
        prop_assert_eq!(holds(&until, &trace, index), unrolled);
    }

    // φ U ψ ⇔ ψ ∨ (φ ∧ X(φ U ψ))
    #[test]
    fn test_until_expansion(φ in formula(), ψ in formula(), trace in trace()) {
        let formula_left = Formula::until(φ.clone(), ψ.clone());
        let formula_right = Formula::or(
            ψ.clone(),
            Formula::and(φ.clone(), Formula::next(formula_left.clone())),
        );
        check_equivalence(&formula_left, &formula_right, &trace);
    }

    // F φ ⇔ φ ∨ X F φ
    #[test]
    fn test_eventually_expansion(φ in formula(), trace in trace()) {
        let formula_left = Formula::eventually(φ.clone());
        let formula_right =
            Formula::or(φ.clone(), Formula::next(formula_left.clone()));
        check_equivalence(&formula_left, &formula_right, &trace);
    }

    // φ S ψ ⇔ ψ ∨ (φ ∧ Y(φ S ψ))
    #[test]
    fn test_since_expansion(φ in formula(), ψ in formula(), trace in trace()) {
        let formula_left = Formula::since(φ.clone(), ψ.clone());
        let formula_right = Formula::or(
            ψ.clone(),
            Formula::and(φ.clone(), Formula::yesterday(formula_left.clone())),
        );
        check_equivalence(&formula_left, &formula_right, &trace);
    }
}

// Derived operators
proptest! {
    // F φ ⇔ TRUE U φ
    #[test]
    fn test_eventually_is_until(φ in formula(), trace in trace()) {
        let formula_left = Formula::eventually(φ.clone());
        let formula_right = Formula::until(Formula::True, φ.clone());
        check_equivalence(&formula_left, &formula_right, &trace);
    }

    // G φ ⇔ ¬F(¬φ)
    #[test]
    fn test_always_eventually_duality(φ in formula(), trace in trace()) {
        let formula_left = Formula::always(φ.clone());
        let formula_right =
            Formula::not(Formula::eventually(Formula::not(φ.clone())));
        check_equivalence(&formula_left, &formula_right, &trace);
    }

    // O φ ⇔ TRUE S φ
    #[test]
    fn test_once_is_since(φ in formula(), trace in trace()) {
        let formula_left = Formula::once(φ.clone());
        let formula_right = Formula::since(Formula::True, φ.clone());
        check_equivalence(&formula_left, &formula_right, &trace);
    }

    // H φ ⇔ ¬O(¬φ)
    #[test]
    fn test_historically_once_duality(φ in formula(), trace in trace()) {
        let formula_left = Formula::historically(φ.clone());
        let formula_right =
            Formula::not(Formula::once(Formula::not(φ.clone())));
        check_equivalence(&formula_left, &formula_right, &trace);
    }
}

// Negation
proptest! {
    // ¬φ ⇔ not φ
    #[test]
    fn test_negation_duality(φ in formula(), trace in trace(), index in any::<Index>()) {
        let index = index.index(trace.len());
        prop_assert_eq!(
            holds(&Formula::not(φ.clone()), &trace, index),
            !holds(&φ, &trace, index)
        );
    }

    // ¬¬φ ⇔ φ
    #[test]
    fn test_double_negation(φ in formula(), trace in trace()) {
        let formula_left = Formula::not(Formula::not(φ.clone()));
        check_equivalence(&formula_left, &φ, &trace);
    }

    // φ ⇒ ψ ⇔ ¬φ ∨ ψ
    #[test]
    fn test_implication(φ in formula(), ψ in formula(), trace in trace()) {
        let formula_left = Formula::implies(φ.clone(), ψ.clone());
        let formula_right = Formula::or(Formula::not(φ.clone()), ψ.clone());
        check_equivalence(&formula_left, &formula_right, &trace);
    }
}
