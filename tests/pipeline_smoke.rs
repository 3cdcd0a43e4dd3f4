//! End-to-end pipeline runs against the public API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use quadpipe::pipeline::{run_with_source, JobSource};
use quadpipe::{
    run, run_serial, run_simple, Job, PipelineConfig, ShutdownPolicy, WorkerStatus,
};
use quadpipe::functions::basic::{Constant, Log};
use quadpipe::IntegrationError;

/// Source that hands out copies of one fixed job.
struct FixedJob {
    template: Job,
}

impl JobSource for FixedJob {
    fn next_job(&mut self, seq: u64) -> Job {
        Job {
            seq,
            ..self.template.clone()
        }
    }
}

#[test]
fn single_constant_job_round_trips_exactly() {
    let config = PipelineConfig {
        target: 1,
        ..PipelineConfig::default()
    };
    let source = FixedJob {
        template: Job {
            function: Arc::new(Constant(2.0)),
            left: 0.0,
            right: 3.0,
            step: 0.5,
            seq: 0,
        },
    };
    let report = run_with_source(&config, source).unwrap();

    assert_eq!(report.produced, 1);
    assert_eq!(report.consumed, 1);
    assert_eq!(report.outcomes.len(), 1);
    let value = report.outcomes[0].result.as_ref().unwrap();
    assert!((value - 6.0).abs() < 1e-12);
}

#[test]
fn out_of_domain_job_is_recorded_not_fatal() {
    // A logarithm over a negative interval: the evaluator rejects it and the
    // run still completes normally.
    let config = PipelineConfig {
        target: 3,
        ..PipelineConfig::default()
    };
    let source = FixedJob {
        template: Job {
            function: Arc::new(Log::natural()),
            left: -10.0,
            right: -1.0,
            step: 0.5,
            seq: 0,
        },
    };
    let report = run_with_source(&config, source).unwrap();

    assert_eq!(report.consumed, 3);
    assert_eq!(report.generator, WorkerStatus::Completed);
    assert_eq!(report.integrator, WorkerStatus::Completed);
    for outcome in &report.outcomes {
        assert!(matches!(
            outcome.result,
            Err(IntegrationError::OutOfDomain { .. })
        ));
    }
}

#[test]
fn thousand_jobs_run_to_natural_completion() {
    let config = PipelineConfig {
        target: 1000,
        seed: 2024,
        ..PipelineConfig::default()
    };
    let report = run(&config).unwrap();

    assert_eq!(report.produced, 1000);
    assert_eq!(report.consumed, 1000);
    assert!(!report.cancelled);
    assert_eq!(report.generator, WorkerStatus::Completed);
    assert_eq!(report.integrator, WorkerStatus::Completed);

    // Consumption order is the production order, with no gaps.
    for (i, outcome) in report.outcomes.iter().enumerate() {
        assert_eq!(outcome.seq, i as u64 + 1);
    }
    // The default workload only emits valid jobs.
    assert!(report.outcomes.iter().all(|o| o.result.is_ok()));
}

#[test]
fn cancellation_ends_the_run_within_bounded_grace() {
    for budget_ms in [1, 10, 40] {
        let config = PipelineConfig {
            target: u64::MAX,
            shutdown: ShutdownPolicy::CancelAfter(Duration::from_millis(budget_ms)),
            join_grace: Duration::from_secs(5),
            integrator_pace: Some(Duration::from_micros(200)),
            ..PipelineConfig::default()
        };
        let start = Instant::now();
        let report = run(&config).unwrap();
        let elapsed = start.elapsed();

        assert!(report.cancelled, "budget {budget_ms} ms");
        assert_ne!(report.generator, WorkerStatus::StillRunning);
        assert_ne!(report.integrator, WorkerStatus::StillRunning);
        assert!(report.consumed < report.target);
        assert!(
            elapsed < Duration::from_millis(budget_ms) + Duration::from_secs(6),
            "budget {budget_ms} ms took {elapsed:?}"
        );
        // Partial progress is still well formed.
        for (i, outcome) in report.outcomes.iter().enumerate() {
            assert_eq!(outcome.seq, i as u64 + 1);
        }
    }
}

#[test]
fn slow_integrator_never_loses_or_repeats_jobs() {
    let config = PipelineConfig {
        target: 200,
        seed: 555,
        integrator_pace: Some(Duration::from_micros(100)),
        ..PipelineConfig::default()
    };
    let report = run(&config).unwrap();

    assert_eq!(report.consumed, 200);
    for (i, outcome) in report.outcomes.iter().enumerate() {
        assert_eq!(outcome.seq, i as u64 + 1);
    }
}

#[test]
fn slow_generator_never_loses_or_repeats_jobs() {
    let config = PipelineConfig {
        target: 200,
        seed: 556,
        generator_pace: Some(Duration::from_micros(100)),
        ..PipelineConfig::default()
    };
    let report = run(&config).unwrap();

    assert_eq!(report.consumed, 200);
    for (i, outcome) in report.outcomes.iter().enumerate() {
        assert_eq!(outcome.seq, i as u64 + 1);
    }
}

#[test]
fn all_variants_agree_on_the_same_seed() {
    let config = PipelineConfig {
        target: 30,
        seed: 777,
        ..PipelineConfig::default()
    };
    let gated = run(&config).unwrap();
    let simple = run_simple(&config).unwrap();
    let serial = run_serial(&config);

    assert_eq!(gated.outcomes.len(), 30);
    assert_eq!(simple.outcomes.len(), 30);
    assert_eq!(serial.outcomes.len(), 30);
    for i in 0..30 {
        let (a, b, c) = (
            &gated.outcomes[i].result,
            &simple.outcomes[i].result,
            &serial.outcomes[i].result,
        );
        match (a, b, c) {
            (Ok(x), Ok(y), Ok(z)) => {
                assert_eq!(x.to_bits(), y.to_bits());
                assert_eq!(x.to_bits(), z.to_bits());
            }
            _ => panic!("variants disagree at job {}", i + 1),
        }
    }
}
