//! End-to-end raking pipeline tests over a synthetic world
//!
//! The fixture world has two forecast-covered parents (one with a zero
//! forecast), one orphaned child and one retired location id, so one run
//! exercises imputation, demographic alignment, the zero-factor guard and
//! passthrough merging.

mod support;

use support::{test_config, test_job, IMPUTED_CHILD, ORPHAN_CHILD, RETIRED_CHILD};
use tempfile::TempDir;
use vbdrake_core::domain::Draw;
use vbdrake_core::storage;
use vbdrake_pipeline::{PipelineOrchestrator, RakingContext};

#[tokio::test]
async fn rakes_children_to_forecast_totals() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let job = test_job();
    support::write_world(&config, &job);

    let mut context = RakingContext::new(config.clone(), job);
    let summary = PipelineOrchestrator::new()
        .execute(&mut context)
        .await
        .unwrap();

    // 201, 202, 44858 under parent A; 203 under parent B; 204 passes through.
    assert_eq!(summary.raked_locations, 4);
    assert_eq!(summary.passthrough_locations, 1);
    assert_eq!(summary.parents, 2);
    assert_eq!(summary.factor_min, Some(1.0));
    assert_eq!(summary.factor_max, Some(2.0));

    let output = storage::read_dataset(&storage::output_path(&config, &job)).unwrap();

    // Children of parent A sum to the forecast value in every cell:
    // 201 and 202 keep 1.0 each doubled to 2.0, the imputed child carried
    // 1.0 + 1.0 from the retired id and doubles to 4.0.
    assert_eq!(output.value_at(201, 22, 1, 2030).unwrap(), 2.0);
    assert_eq!(output.value_at(202, 23, 2, 2031).unwrap(), 2.0);
    assert_eq!(output.value_at(IMPUTED_CHILD, 22, 1, 2030).unwrap(), 4.0);
    let parent_a_cell_sum = output.value_at(201, 22, 1, 2030).unwrap()
        + output.value_at(202, 22, 1, 2030).unwrap()
        + output.value_at(IMPUTED_CHILD, 22, 1, 2030).unwrap();
    assert_eq!(parent_a_cell_sum, 8.0);

    // Parent B forecasts zero: its child is left untouched.
    assert_eq!(output.value_at(203, 22, 1, 2030).unwrap(), 1.0);

    // The orphan's parent is not in the forecast: passthrough, unraked.
    assert_eq!(output.value_at(ORPHAN_CHILD, 23, 2, 2031).unwrap(), 1.0);

    // The retired id is gone from the output.
    assert!(output.value_at(RETIRED_CHILD, 22, 1, 2030).is_err());
}

#[tokio::test]
async fn draw_selection_uses_the_requested_slice() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let mut job = test_job();
    support::write_world(&config, &job);

    // Draw 1 forecasts twice the burden for parent A.
    job.draw = Draw::new(1).unwrap();
    support::write_world(&config, &job);

    let mut context = RakingContext::new(config.clone(), job);
    PipelineOrchestrator::new()
        .execute(&mut context)
        .await
        .unwrap();

    let output = storage::read_dataset(&storage::output_path(&config, &job)).unwrap();
    assert_eq!(output.value_at(201, 22, 1, 2030).unwrap(), 4.0);
}

#[tokio::test]
async fn missing_draw_in_bundle_fails_with_context() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let mut job = test_job();
    support::write_world(&config, &job);

    // The fixture bundle only carries draws 0 and 1.
    job.draw = Draw::new(5).unwrap();
    let mut context = RakingContext::new(config, job);
    let err = PipelineOrchestrator::new()
        .execute(&mut context)
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("LoadPhase"));
}

#[tokio::test]
async fn missing_predictions_fail_with_the_path() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let job = test_job();
    support::write_world(&config, &job);

    std::fs::remove_file(storage::predicted_path(&config, &job)).unwrap();

    let mut context = RakingContext::new(config.clone(), job);
    let err = PipelineOrchestrator::new()
        .execute(&mut context)
        .await
        .unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("does not exist"));
    assert!(message.contains("draw_0.bin"));
}

#[tokio::test]
async fn total_burden_is_raked_plus_passthrough() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let job = test_job();
    support::write_world(&config, &job);

    let mut context = RakingContext::new(config.clone(), job);
    let summary = PipelineOrchestrator::new()
        .execute(&mut context)
        .await
        .unwrap();

    let output = storage::read_dataset(&storage::output_path(&config, &job)).unwrap();
    assert_eq!(output.total(), summary.total_burden);

    // 8 cells per location. Parent A's children sum to 8.0 per cell
    // (64.0 across the block); 203 and 204 keep 1.0 per cell (8.0 each).
    let expected = 8.0 * 8.0 + 8.0 + 8.0;
    assert_eq!(output.total(), expected);
}
