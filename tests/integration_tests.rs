use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use rerand::{
    rerandomise, DistanceMetric, Outcome, ProgressEvent, RandomisationBuilder, RerandError,
    VariantTable,
};

fn standard_normal_column(n: usize, seed: u64) -> DMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<f64> = (0..n).map(|_| StandardNormal.sample(&mut rng)).collect();
    DMatrix::from_vec(n, 1, data)
}

#[test]
fn seeded_searches_are_reproducible() {
    let build = || {
        RandomisationBuilder::default()
            .covariates(standard_normal_column(10, 5))
            .tolerance(1.0)
            .max_reps(100)
            .seed(99)
            .build()
            .unwrap()
    };

    let first = build().randomise();
    let second = build().randomise();
    assert_eq!(first, second);

    // Each call on one instance is a fresh, independently seeded run.
    let randomisation = build();
    assert_eq!(randomisation.randomise(), randomisation.randomise());
}

#[test]
fn three_variant_scenario_runs_to_a_stable_outcome() {
    let randomisation = RandomisationBuilder::default()
        .covariates(standard_normal_column(100, 42))
        .distance_metric(DistanceMetric::Euclidean)
        .tolerance(0.1)
        .max_reps(100)
        .variants(VariantTable::new([("a", 0.5), ("b", 0.3), ("c", 0.2)]).unwrap())
        .seed(42)
        .build()
        .unwrap();

    let mut last_distance = None;
    let outcome = randomisation.randomise_with_progress(|event| {
        if let ProgressEvent::Repetition { distance, .. } = event {
            last_distance = Some(*distance);
        }
    });

    match &outcome {
        Outcome::Balanced {
            assignment,
            repetitions,
        } => {
            assert_eq!(assignment.len(), 100);
            assert!(assignment
                .iter()
                .all(|label| ["a", "b", "c"].contains(&label.as_str())));
            assert!(*repetitions >= 1 && *repetitions <= 100);
            assert!(last_distance.unwrap() < 0.1);
        }
        Outcome::NotBalanced { repetitions } => assert_eq!(*repetitions, 100),
    }

    // The fixed seed pins the branch taken and the exact assignment.
    assert_eq!(randomisation.randomise(), outcome);
}

#[test]
fn unachievable_tolerance_exhausts_the_budget() {
    let covariates = standard_normal_column(100, 7) * 100.0;
    let randomisation = RandomisationBuilder::default()
        .covariates(covariates)
        .tolerance(1e-9)
        .max_reps(10)
        .seed(7)
        .build()
        .unwrap();

    let mut repetitions_seen = 0;
    let outcome = randomisation.randomise_with_progress(|event| {
        if matches!(event, ProgressEvent::Repetition { .. }) {
            repetitions_seen += 1;
        }
    });

    assert_eq!(outcome, Outcome::NotBalanced { repetitions: 10 });
    assert_eq!(repetitions_seen, 10);
}

#[test]
fn explicit_even_table_matches_the_default_split() {
    let build = |variants: Option<VariantTable>| {
        let mut builder = RandomisationBuilder::default();
        builder
            .covariates(standard_normal_column(12, 3))
            .tolerance(0.8)
            .max_reps(50)
            .seed(13);
        if let Some(variants) = variants {
            builder.variants(variants);
        }
        builder.build().unwrap()
    };

    let implicit = build(None).randomise();
    let explicit = build(Some(
        VariantTable::new([("control", 0.5), ("treatment", 0.5)]).unwrap(),
    ))
    .randomise();
    assert_eq!(implicit, explicit);
}

#[test]
fn rerandomise_reports_progress_through_the_callback() {
    let covariates = standard_normal_column(40, 21);
    let mut events = Vec::new();
    let outcome = rerandomise(covariates, DistanceMetric::Euclidean, 2.0, 50, |event| {
        events.push(event.clone());
    })
    .unwrap();

    // One terminal record after the per-repetition records.
    let terminal = events.last().unwrap();
    match &outcome {
        Outcome::Balanced { repetitions, .. } => {
            assert_eq!(
                terminal,
                &ProgressEvent::Balanced {
                    repetitions: *repetitions,
                    tolerance: 2.0
                }
            );
            assert_eq!(events.len(), repetitions + 1);
        }
        Outcome::NotBalanced { repetitions } => {
            assert_eq!(
                terminal,
                &ProgressEvent::Exhausted {
                    repetitions: *repetitions,
                    tolerance: 2.0
                }
            );
            assert_eq!(events.len(), repetitions + 1);
        }
    }
}

#[test]
fn configuration_errors_surface_before_any_draw() {
    let covariates = || standard_normal_column(10, 1);

    let err = RandomisationBuilder::default()
        .covariates(covariates())
        .tolerance(0.0)
        .max_reps(10)
        .build()
        .unwrap_err();
    assert!(matches!(err, RerandError::InvalidTolerance(_)));

    let err = RandomisationBuilder::default()
        .covariates(covariates())
        .tolerance(-1.0)
        .max_reps(10)
        .build()
        .unwrap_err();
    assert!(matches!(err, RerandError::InvalidTolerance(_)));

    let err = RandomisationBuilder::default()
        .covariates(covariates())
        .tolerance(0.5)
        .max_reps(0)
        .build()
        .unwrap_err();
    assert!(matches!(err, RerandError::InvalidBudget(0)));

    let err = "Geometric".parse::<DistanceMetric>().unwrap_err();
    assert!(matches!(err, RerandError::UnsupportedMetric(_)));

    let err = VariantTable::new([("a", 1.0)]).unwrap_err();
    assert!(matches!(err, RerandError::InvalidVariants(_)));

    let err = VariantTable::new([("a", 0.5), ("b", 0.2)]).unwrap_err();
    assert!(matches!(err, RerandError::InvalidVariants(_)));

    let mut bad = covariates();
    bad[(0, 0)] = f64::NAN;
    let err = RandomisationBuilder::default()
        .covariates(bad)
        .tolerance(0.5)
        .max_reps(10)
        .build()
        .unwrap_err();
    assert!(matches!(err, RerandError::InvalidData(_)));
}
