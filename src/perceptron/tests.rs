use super::*;
use crate::error::PonderarError;

fn fv(pairs: &[(&str, f64)]) -> FeatureVector {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

fn two_class_data() -> Vec<Example> {
    vec![
        Example::from_pairs(&[("bad", 1.0)], "L0"),
        Example::from_pairs(&[("good", 1.0)], "L1"),
        Example::from_pairs(&[("bad", 1.0), ("good", 1.0)], "L1"),
    ]
}

#[test]
fn defaults() {
    let model = Perceptron::new();
    assert_eq!(model.max_iterations(), DEFAULT_MAX_ITERATIONS);
    assert_eq!(model.examples_seen(), 0);
    assert_eq!(model.updates(), 0);
    assert!(!model.is_imported());
}

#[test]
fn configure_empty_resets_shuffle_keeps_the_rest() {
    let mut model = Perceptron::new()
        .with_shuffle_data(true)
        .with_max_iterations(42);
    model
        .configure(&PerceptronConfig::default())
        .expect("empty config is valid");
    // shuffle_data always takes the configured value; unset fields keep
    // whatever was in force.
    assert!(!model.shuffle_data());
    assert_eq!(model.max_iterations(), 42);
}

#[test]
fn configure_rejects_zero_iterations() {
    let mut model = Perceptron::new();
    let err = model
        .configure(&PerceptronConfig {
            max_iterations: Some(0),
            ..PerceptronConfig::default()
        })
        .unwrap_err();
    assert!(matches!(err, PonderarError::InvalidHyperparameter { .. }));
    // nothing applied
    assert_eq!(model.max_iterations(), DEFAULT_MAX_ITERATIONS);
}

#[test]
fn configure_sets_iterations_and_extractor() {
    fn extract(raw: &[String]) -> Vec<Example> {
        vec![Example::from_pairs(&[(raw[0].as_str(), 1.0)], raw[1].clone())]
    }
    let mut model = Perceptron::new();
    model
        .configure(&PerceptronConfig {
            shuffle_data: false,
            max_iterations: Some(3),
            feature_extractor: Some(extract),
        })
        .expect("valid config");
    assert_eq!(model.max_iterations(), 3);
    let rows: Vec<RawExample> = vec![
        vec!["bad".to_string(), "L0".to_string()],
        vec!["good".to_string(), "L1".to_string()],
    ];
    assert_eq!(model.learn_raw(&rows).expect("two classes"), 2);
}

#[test]
fn learn_returns_raw_example_count() {
    let mut model = Perceptron::new().with_max_iterations(1);
    assert_eq!(model.learn(&two_class_data()).expect("learns"), 3);
    assert_eq!(model.examples_seen(), 3);
}

#[test]
fn scenario_one_prefers_l0_after_averaging() {
    let mut model = Perceptron::new().with_max_iterations(1);
    model.learn(&two_class_data()).expect("learns");
    let guess = model
        .predict(&fv(&[("bad", 1.0), ("good", 1.0)]))
        .expect("trained");
    assert_eq!(guess, "L0");
}

#[test]
fn predict_before_learn_fails() {
    let model = Perceptron::new();
    assert!(matches!(
        model.predict(&fv(&[("a", 1.0)])),
        Err(PonderarError::NotTrained)
    ));
}

#[test]
fn predict_unknown_when_no_feature_overlaps() {
    let mut model = Perceptron::new().with_max_iterations(1);
    model.learn(&two_class_data()).expect("learns");
    let guess = model.predict(&fv(&[("novel", 1.0)])).expect("trained");
    assert_eq!(guess, UNKNOWN_LABEL);
}

#[test]
fn zero_valued_query_features_carry_no_signal() {
    let mut model = Perceptron::new().with_max_iterations(1);
    model.learn(&two_class_data()).expect("learns");
    let guess = model
        .predict(&fv(&[("bad", 0.0), ("good", 0.0)]))
        .expect("trained");
    assert_eq!(guess, UNKNOWN_LABEL);
}

#[test]
fn single_class_training_is_rejected() {
    let mut model = Perceptron::new();
    let data = vec![
        Example::from_pairs(&[("a", 1.0)], "only"),
        Example::from_pairs(&[("b", 1.0)], "only"),
    ];
    let err = model.learn(&data).unwrap_err();
    assert!(matches!(
        err,
        PonderarError::InsufficientClasses { found: 1 }
    ));
    // The pass is not rolled back, but the instance is not trained.
    assert!(model.updates() > 0);
    assert_eq!(model.examples_seen(), 0);
    assert!(matches!(
        model.predict(&fv(&[("a", 1.0)])),
        Err(PonderarError::NotTrained)
    ));
}

#[test]
fn empty_training_set_is_rejected() {
    let mut model = Perceptron::new();
    let err = model.learn(&[]).unwrap_err();
    assert!(matches!(
        err,
        PonderarError::InsufficientClasses { found: 0 }
    ));
}

#[test]
fn learn_raw_requires_an_extractor() {
    let mut model = Perceptron::new();
    let rows: Vec<RawExample> = vec![vec!["a".to_string()]];
    assert!(matches!(
        model.learn_raw(&rows),
        Err(PonderarError::MissingFeatureExtractor)
    ));
}

#[test]
fn learn_raw_counts_rows_not_extracted_examples() {
    // Each raw row expands into two training examples; the return value
    // still counts rows.
    fn extract(raw: &[String]) -> Vec<Example> {
        vec![
            Example::from_pairs(&[(raw[0].as_str(), 1.0)], "L0"),
            Example::from_pairs(&[(raw[0].as_str(), 2.0)], "L1"),
        ]
    }
    let mut model = Perceptron::new()
        .with_max_iterations(1)
        .with_feature_extractor(extract);
    let rows: Vec<RawExample> = vec![vec!["a".to_string()], vec!["b".to_string()]];
    assert_eq!(model.learn_raw(&rows).expect("two classes"), 2);
}

#[test]
fn second_learn_continues_the_update_counter() {
    let mut model = Perceptron::new().with_max_iterations(1);
    model.learn(&two_class_data()).expect("learns");
    let after_first = model.updates();
    assert!(after_first > 0);
    model.learn(&two_class_data()).expect("learns again");
    assert!(model.updates() >= after_first);
}

#[test]
fn reset_clears_state_and_keeps_config() {
    let mut model = Perceptron::new().with_max_iterations(5);
    model.learn(&two_class_data()).expect("learns");
    assert!(model.reset());
    assert_eq!(model.examples_seen(), 0);
    assert_eq!(model.updates(), 0);
    assert!(!model.is_imported());
    assert_eq!(model.max_iterations(), 5);
    assert!(matches!(
        model.predict(&fv(&[("bad", 1.0)])),
        Err(PonderarError::NotTrained)
    ));
    // Training works again from fresh.
    model.learn(&two_class_data()).expect("relearns");
}

#[test]
fn export_requires_a_trained_model() {
    let model = Perceptron::new();
    assert!(matches!(
        model.export_json(),
        Err(PonderarError::NothingToExport)
    ));
}

#[test]
fn imported_models_refuse_learning_until_reset() {
    let mut source = Perceptron::new().with_max_iterations(1);
    source.learn(&two_class_data()).expect("learns");
    let json = source.export_json().expect("exports");

    let mut target = Perceptron::new();
    target.import_json(&json).expect("imports");
    assert!(target.is_imported());
    assert!(matches!(
        target.learn(&two_class_data()),
        Err(PonderarError::AlreadyImported)
    ));

    target.reset();
    assert!(!target.is_imported());
    target.learn(&two_class_data()).expect("learns after reset");
}

#[test]
fn imported_models_cannot_reexport() {
    let mut source = Perceptron::new().with_max_iterations(1);
    source.learn(&two_class_data()).expect("learns");
    let json = source.export_json().expect("exports");

    let mut target = Perceptron::new();
    target.import_json(&json).expect("imports");
    assert!(matches!(
        target.export_json(),
        Err(PonderarError::NothingToExport)
    ));
}

#[test]
fn failed_import_leaves_trained_state_untouched() {
    let mut model = Perceptron::new().with_max_iterations(1);
    model.learn(&two_class_data()).expect("learns");
    let before = model.export_json().expect("exports");

    assert!(model.import_json("not json at all {{{").is_err());
    assert!(model.import_json("").is_err());
    assert!(model.import_json("[{},{}]").is_err());

    assert!(!model.is_imported());
    assert_eq!(model.examples_seen(), 3);
    assert_eq!(model.export_json().expect("still exports"), before);
}

#[test]
fn export_is_stable_without_intervening_learning() {
    let mut model = Perceptron::new().with_max_iterations(2);
    model.learn(&two_class_data()).expect("learns");
    let first = model.export_json().expect("exports");
    let second = model.export_json().expect("exports again");
    assert_eq!(first, second);
}

#[test]
fn learn_rejects_zero_iterations_even_via_builder() {
    let mut model = Perceptron::new().with_max_iterations(0);
    assert!(matches!(
        model.learn(&two_class_data()),
        Err(PonderarError::InvalidHyperparameter { .. })
    ));
}
