//! Integration tests for the dualsvm library
//!
//! These tests verify end-to-end functionality across multiple modules
//! and validate real-world usage scenarios.

use dualsvm::api::{quick, SVM};
use dualsvm::kernel::{KernelType, RBFKernel};
use dualsvm::persistence::SerializableModel;
use dualsvm::{
    Formulation, LibSVMDataset, LinearKernel, Result, SVMError, SVMModel, SVMTrainer,
    TrainerConfig, TrainingSet, VMatrix, VMatrixGenerator,
};
use nalgebra::DMatrix;
use std::io::Write;
use tempfile::NamedTempFile;

const TOL: f64 = 1e-6;

fn clusters() -> TrainingSet {
    TrainingSet::new(
        vec![
            vec![2.0, 1.0],
            vec![1.8, 1.1],
            vec![2.2, 0.9],
            vec![-2.0, -1.0],
            vec![-1.8, -1.1],
            vec![-2.2, -0.9],
        ],
        vec![1.0, 1.0, 1.0, -1.0, -1.0, -1.0],
    )
    .unwrap()
}

/// Two Gaussian clusters centred at `(centre, centre)` and `(-centre, -centre)`
///
/// A fixed linear congruential generator feeds Box-Muller so every run sees
/// the same points. Rows alternate between the +1 and -1 cluster.
fn gaussian_clusters(n: usize, centre: f64, sd: f64) -> TrainingSet {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut uniform = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 11) as f64 + 0.5) / (1u64 << 53) as f64
    };

    let mut features = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let radius = (-2.0 * uniform().ln()).sqrt();
        let angle = 2.0 * std::f64::consts::PI * uniform();
        let label = if i % 2 == 0 { 1.0 } else { -1.0 };
        features.push(vec![
            label * centre + sd * radius * angle.cos(),
            label * centre + sd * radius * angle.sin(),
        ]);
        labels.push(label);
    }
    TrainingSet::new(features, labels).unwrap()
}

fn trainer(formulation: Formulation, c: f64) -> SVMTrainer<LinearKernel> {
    SVMTrainer::new(LinearKernel::new(), TrainerConfig { c, formulation }).without_observer()
}

/// Test complete workflow: data loading -> training -> evaluation
#[test]
fn test_complete_workflow_libsvm() {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");

    // Classic linearly separable dataset
    writeln!(temp_file, "+1 1:2.0 2:1.0").expect("Failed to write");
    writeln!(temp_file, "+1 1:1.8 2:1.1").expect("Failed to write");
    writeln!(temp_file, "+1 1:2.2 2:0.9").expect("Failed to write");
    writeln!(temp_file, "-1 1:-2.0 2:-1.0").expect("Failed to write");
    writeln!(temp_file, "-1 1:-1.8 2:-1.1").expect("Failed to write");
    writeln!(temp_file, "-1 1:-2.2 2:-0.9").expect("Failed to write");
    temp_file.flush().expect("Failed to flush");

    for formulation in [Formulation::StandardSoftMargin, Formulation::L2SoftMargin] {
        let model = SVM::new()
            .with_c(1.0)
            .with_formulation(formulation)
            .train_from_file(temp_file.path())
            .expect("Training should succeed");

        let accuracy = model
            .evaluate_from_file(temp_file.path())
            .expect("Evaluation should succeed");
        assert_eq!(accuracy, 1.0, "{formulation}");

        let info = model.info();
        assert!(info.n_support_vectors > 0, "Should have support vectors");
        assert!(
            info.n_support_vectors <= 6,
            "Should not have more support vectors than samples"
        );

        let dataset = LibSVMDataset::from_file(temp_file.path()).expect("Failed to load dataset");
        let metrics = model
            .evaluate_detailed(&dataset)
            .expect("Detailed evaluation should succeed");
        assert_eq!(metrics.precision(), 1.0);
        assert_eq!(metrics.recall(), 1.0);
        assert_eq!(metrics.f1_score(), 1.0);
    }
}

/// Test CSV workflow with headers
#[test]
fn test_complete_workflow_csv() {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");

    writeln!(temp_file, "feature1,feature2,feature3,label").expect("Failed to write");
    writeln!(temp_file, "3.0,0.0,1.5,1").expect("Failed to write");
    writeln!(temp_file, "2.8,0.1,1.4,-1").expect("Failed to write");
    writeln!(temp_file, "3.2,-0.1,1.6,1").expect("Failed to write");
    writeln!(temp_file, "-3.0,0.0,-1.5,-1").expect("Failed to write");
    writeln!(temp_file, "-2.8,-0.1,-1.4,-1").expect("Failed to write");
    writeln!(temp_file, "-3.2,0.1,-1.6,1").expect("Failed to write");
    temp_file.flush().expect("Failed to flush");

    let model = quick::train_csv(temp_file.path()).expect("CSV training should succeed");
    let accuracy = model
        .evaluate_from_csv(temp_file.path())
        .expect("CSV evaluation should succeed");

    // Two labels are flipped, so the data is not separable
    assert!(
        accuracy >= 0.5,
        "Accuracy should be reasonable, got: {accuracy}"
    );
}

/// Unit square with labels given by the first coordinate
#[test]
fn test_square_decision_boundary() {
    let ts = TrainingSet::new(
        vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
        vec![-1.0, -1.0, 1.0, 1.0],
    )
    .unwrap();

    let predictor = trainer(Formulation::StandardSoftMargin, 1.0)
        .train(&ts)
        .unwrap();

    assert!((predictor.bias() + 1.0).abs() < TOL);
    assert_eq!(predictor.predict(&[2.0, 0.0]).label, 1.0);
    assert_eq!(predictor.predict(&[-1.0, 0.0]).label, -1.0);
    assert_eq!(predictor.score(ts.features(), ts.labels()), 1.0);
}

/// Test various parameter configurations
#[test]
fn test_parameter_sensitivity() {
    let ts = clusters();

    for c in [0.1, 1.0, 10.0] {
        for formulation in [Formulation::StandardSoftMargin, Formulation::L2SoftMargin] {
            let predictor = trainer(formulation, c)
                .train(&ts)
                .unwrap_or_else(|e| panic!("C={c} {formulation}: {e}"));

            assert_eq!(
                predictor.score(ts.features(), ts.labels()),
                1.0,
                "C={c} {formulation}"
            );
        }
    }
}

/// Box and equality constraints hold for every formulation
#[test]
fn test_multiplier_feasibility() {
    let ts = clusters();
    let c = 0.3;

    let l1 = trainer(Formulation::StandardSoftMargin, c)
        .compute_multipliers(&ts)
        .unwrap();
    assert!(l1.iter().all(|&a| a > -TOL && a < c + TOL));

    let l2 = trainer(Formulation::L2SoftMargin, c)
        .compute_multipliers(&ts)
        .unwrap();
    assert!(l2.iter().all(|&a| a > -TOL));

    for alpha in [&l1, &l2] {
        let balance: f64 = alpha.iter().zip(ts.labels()).map(|(a, y)| a * y).sum();
        assert!(balance.abs() < TOL, "sum(alpha * y) = {balance}");
    }

    // The V-matrix bound is 1 whatever C is
    let vm = trainer(Formulation::ExtendedVMatrix, 25.0)
        .compute_multipliers(&ts)
        .unwrap();
    assert!(vm.iter().all(|&a| a > -TOL && a < 1.0 + TOL));
    assert!((vm.sum() - 3.0).abs() < TOL);
}

/// Flipping every label flips every prediction
#[test]
fn test_label_symmetry() {
    let ts = clusters();
    let flipped = TrainingSet::new(
        ts.features().to_vec(),
        ts.labels().iter().map(|y| -y).collect(),
    )
    .unwrap();

    let svm = |data: &TrainingSet| {
        SVMTrainer::new(
            RBFKernel::new(0.5),
            TrainerConfig {
                c: 2.0,
                formulation: Formulation::StandardSoftMargin,
            },
        )
        .without_observer()
        .train(data)
        .unwrap()
    };
    let original = svm(&ts);
    let mirrored = svm(&flipped);

    for x in [[0.5, 0.5], [-1.0, 3.0], [4.0, -2.0]] {
        assert_eq!(original.predict(&x).label, -mirrored.predict(&x).label);
    }
}

/// Well separated clusters leave interior points out of the L2 expansion
#[test]
fn test_l2_rbf_separated_clusters_use_few_support_vectors() {
    let n = 40;
    let ts = gaussian_clusters(n, 2.0, 0.5);

    let predictor = SVMTrainer::new(
        RBFKernel::new(0.5),
        TrainerConfig {
            c: 1.0,
            formulation: Formulation::L2SoftMargin,
        },
    )
    .without_observer()
    .train(&ts)
    .unwrap();

    assert!(predictor.n_support_vectors() > 0);
    assert!(
        predictor.n_support_vectors() < n,
        "{} of {n} samples became support vectors",
        predictor.n_support_vectors()
    );
    assert_eq!(predictor.score(ts.features(), ts.labels()), 1.0);
}

/// A large C makes `C * pinv(K)` dwarf the linear term of the V-matrix dual
#[test]
fn test_vmatrix_rbf_large_c_converges() {
    let ts = gaussian_clusters(100, 0.5, 1.0);

    for c in [1.0, 100.0] {
        let alpha = SVMTrainer::new(
            RBFKernel::new(1.0),
            TrainerConfig {
                c,
                formulation: Formulation::ExtendedVMatrix,
            },
        )
        .without_observer()
        .compute_multipliers(&ts)
        .unwrap_or_else(|e| panic!("C={c}: {e}"));

        assert!(alpha.iter().all(|&a| a > -TOL && a < 1.0 + TOL), "C={c}");
        assert!((alpha.sum() - 50.0).abs() < 1e-5, "C={c}: sum {}", alpha.sum());
    }
}

/// A single class trains to a constant predictor except in the V-matrix formulation
#[test]
fn test_single_class_data() {
    let ts = TrainingSet::new(vec![vec![1.0], vec![2.0], vec![3.0]], vec![-1.0; 3]).unwrap();

    let predictor = trainer(Formulation::L2SoftMargin, 1.0).train(&ts).unwrap();
    assert_eq!(predictor.n_support_vectors(), 0);
    assert_eq!(predictor.predict(&[10.0]).label, -1.0);

    assert!(matches!(
        trainer(Formulation::ExtendedVMatrix, 1.0).train(&ts),
        Err(SVMError::Configuration(_))
    ));
}

/// A caller supplied V-matrix generator is used by the extended formulation
#[test]
fn test_custom_vmatrix_generator() {
    struct Identity;

    impl VMatrixGenerator for Identity {
        fn calculate(&self, features: &[Vec<f64>], _labels: &[f64]) -> Result<VMatrix> {
            let n = features.len();
            Ok(VMatrix {
                v: DMatrix::identity(n, n),
                theta: 0.0,
            })
        }
    }

    let ts = clusters();
    let alpha = trainer(Formulation::ExtendedVMatrix, 1.0)
        .with_vmatrix_generator(Identity)
        .compute_multipliers(&ts)
        .unwrap();

    assert!(alpha.iter().all(|&a| a > -TOL && a < 1.0 + TOL));
    assert!((alpha.sum() - 3.0).abs() < TOL);
}

/// Training twice yields the same predictor
#[test]
fn test_training_is_reproducible() {
    let ts = clusters();
    let trainer = trainer(Formulation::ExtendedVMatrix, 0.5);

    let first = trainer.train(&ts).unwrap();
    let second = trainer.train(&ts).unwrap();
    assert_eq!(first.bias(), second.bias());
    assert_eq!(first.weights(), second.weights());
}

/// Test scalability with a larger dataset
#[test]
fn test_scalability() {
    let n = 80;
    let features: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let t = i as f64;
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            vec![side * (1.0 + 0.5 * (0.7 * t).sin().abs()), (1.3 * t).cos()]
        })
        .collect();
    let labels: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
    let ts = TrainingSet::new(features, labels).unwrap();

    let model = SVM::new().with_c(1.0).train(&ts).expect("Training should succeed");
    assert_eq!(model.evaluate(&ts).unwrap(), 1.0);
    assert!(model.info().n_support_vectors < n);
}

/// Saved models predict exactly like the models they were saved from
#[test]
fn test_save_and_reload() {
    let model = SVM::with_kernel(KernelType::Rbf { gamma: 0.4 })
        .with_formulation(Formulation::L2SoftMargin)
        .with_c(5.0)
        .train(&clusters())
        .unwrap();

    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    SerializableModel::from_trained_model(&model)
        .save_to_file(temp_file.path())
        .unwrap();
    let reloaded = SerializableModel::load_from_file(temp_file.path())
        .unwrap()
        .to_trained_model()
        .unwrap();

    for x in [[0.0, 0.0], [1.0, -1.0], [-3.0, 2.0]] {
        assert_eq!(model.predict(&x).label, reloaded.predict(&x).label);
    }
    assert_eq!(reloaded.info().formulation, Formulation::L2SoftMargin);
}

/// Errors surface with the right variant
#[test]
fn test_error_handling() {
    assert!(matches!(
        LibSVMDataset::from_file("/non/existent/file.libsvm"),
        Err(SVMError::Io(_))
    ));

    assert!(matches!(
        TrainingSet::new(vec![vec![1.0]], vec![0.5]),
        Err(SVMError::Configuration(_))
    ));

    assert!(matches!(
        SVM::new().with_c(-1.0).train(&clusters()),
        Err(SVMError::Configuration(_))
    ));

    assert!(matches!(
        SVM::new().with_max_iterations(1).train(&clusters()),
        Err(SVMError::Solver(_))
    ));
}
