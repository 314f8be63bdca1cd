use feature_engine::{AlignmentPolicy, Cell, RawTable};
use inference_engine::{ClusteringModel, InferenceContext, RiskLabel};
use normalizer::Normalizer;
use proptest::prelude::*;

const DIM: usize = 3;

fn context(training: &[Vec<f64>]) -> InferenceContext {
    let normalizer = Normalizer::fit(training).unwrap();
    let model = ClusteringModel::new(vec![
        vec![-1.0, -1.0, -1.0],
        vec![0.0, 0.0, 0.0],
        vec![1.0, 1.0, 1.0],
        vec![2.0, -2.0, 0.5],
    ])
    .unwrap();
    InferenceContext::new(normalizer, model, AlignmentPolicy::Lenient).unwrap()
}

fn rows(width: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-500.0f64..500.0, width), 1..16)
}

proptest! {
    #[test]
    fn prop_batch_and_single_agree(training in rows(DIM), input in rows(DIM)) {
        let ctx = context(&training);
        let table = RawTable::from_rows(
            input.iter().map(|r| r.iter().map(|&v| Cell::Number(v)).collect()).collect(),
        ).unwrap();

        let batch = ctx.classify_batch(&table).unwrap();
        prop_assert_eq!(batch.assignments.len(), input.len());
        for (values, assignment) in input.iter().zip(&batch.assignments) {
            prop_assert_eq!(ctx.classify_one(values).unwrap(), *assignment);
        }
    }

    #[test]
    fn prop_labels_stay_in_fixed_set(
        training in rows(DIM),
        point in prop::collection::vec(-1e5f64..1e5, 1..8),
    ) {
        let ctx = context(&training);
        let assignment = ctx.classify_one(&point).unwrap();
        prop_assert!(assignment.cluster_index < RiskLabel::COUNT);
        prop_assert_eq!(RiskLabel::from_index(assignment.cluster_index), Some(assignment.label));
        prop_assert!(RiskLabel::ALL.contains(&assignment.label));
    }

    #[test]
    fn prop_classification_is_deterministic(training in rows(DIM), point in prop::collection::vec(-1e3f64..1e3, DIM)) {
        let ctx = context(&training);
        prop_assert_eq!(ctx.classify_one(&point).unwrap(), ctx.classify_one(&point).unwrap());
    }
}
