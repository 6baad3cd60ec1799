use pretty_assertions::assert_eq;
use risklens_dashboard::config::Config;
use risklens_dashboard::error::DashboardError;
use risklens_dashboard::simulation::{RunOutcome, SimulationController, SimulationStatus};
use risklens_dashboard::testing::{fixtures, MockDataClient};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_run_success_records_result() {
    let client = Arc::new(MockDataClient::new());
    client.simulation.push_ok(fixtures::simulation(9_000.0));

    let controller = SimulationController::new(client.clone());
    assert_eq!(controller.view().await.status, SimulationStatus::Idle);

    let outcome = controller.run().await;
    assert_eq!(outcome, RunOutcome::Completed(fixtures::simulation(9_000.0)));

    let view = controller.view().await;
    assert_eq!(view.status, SimulationStatus::Success);
    assert_eq!(view.current_result(), Some(&fixtures::simulation(9_000.0)));
    assert_eq!(client.requested_volumes(), vec![0.2]);
}

#[tokio::test]
async fn test_second_run_while_running_is_a_no_op() {
    let client = Arc::new(MockDataClient::new());
    let gate = client.simulation.push_gated();
    client.simulation.push_ok(fixtures::simulation(1.0));

    let controller = Arc::new(SimulationController::new(client.clone()));
    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.run().await }
    });
    assert!(client.simulation.wait_for_calls(1).await);
    assert!(controller.view().await.is_running());

    assert_eq!(controller.run().await, RunOutcome::AlreadyRunning);
    assert_eq!(client.simulation.calls(), 1);

    gate.send(Ok(fixtures::simulation(7_500.0))).unwrap();
    assert_eq!(
        first.await.unwrap(),
        RunOutcome::Completed(fixtures::simulation(7_500.0))
    );
    assert_eq!(client.simulation.calls(), 1);
    assert_eq!(controller.view().await.status, SimulationStatus::Success);
}

#[tokio::test]
async fn test_concurrent_runs_send_exactly_one_request() {
    let client = Arc::new(MockDataClient::new());
    let gate = client.simulation.push_gated();

    let controller = Arc::new(SimulationController::new(client.clone()));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let controller = controller.clone();
            tokio::spawn(async move { controller.run().await })
        })
        .collect();

    assert!(client.simulation.wait_for_calls(1).await);
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    gate.send(Ok(fixtures::simulation(100.0))).unwrap();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }
    assert_eq!(
        outcomes.iter().filter(|o| **o == RunOutcome::AlreadyRunning).count(),
        1
    );
    assert!(outcomes.contains(&RunOutcome::Completed(fixtures::simulation(100.0))));
    assert_eq!(client.simulation.calls(), 1);
}

#[tokio::test]
async fn test_failure_sets_indicator_and_hides_stale_result() {
    let client = Arc::new(MockDataClient::new());
    client.simulation.push_ok(fixtures::simulation(5_000.0));
    client
        .simulation
        .push_err(DashboardError::NetworkError("connection refused".into()));

    let controller = SimulationController::new(client.clone());
    controller.run().await;
    let outcome = controller.run().await;
    assert!(matches!(outcome, RunOutcome::Failed(DashboardError::NetworkError(_))));

    let view = controller.view().await;
    assert!(view.is_failed());
    assert!(view.last_error.is_some());
    assert!(view.current_result().is_none());
    assert_eq!(view.last_result, Some(fixtures::simulation(5_000.0)));
    assert_eq!(client.simulation.calls(), 2, "no automatic retry");
}

#[tokio::test]
async fn test_retry_after_failure_recovers() {
    let client = Arc::new(MockDataClient::new());
    client.simulation.push_err(DashboardError::DecodeError("bad shape".into()));
    client.simulation.push_ok(fixtures::simulation(300.0));

    let controller = SimulationController::new(client.clone());
    controller.run().await;
    assert!(controller.view().await.is_failed());

    controller.run().await;
    let view = controller.view().await;
    assert_eq!(view.status, SimulationStatus::Success);
    assert!(view.last_error.is_none());
}

#[tokio::test]
async fn test_slider_change_does_not_rerun_or_replace_result() {
    let client = Arc::new(MockDataClient::new());
    client.simulation.push_ok(fixtures::simulation(4_000.0));
    client.simulation.push_ok(fixtures::simulation(8_000.0));

    let controller = SimulationController::new(client.clone());
    controller.run().await;

    controller.set_volume_increase(0.75).await.unwrap();
    let view = controller.view().await;
    assert_eq!(view.volume_increase, 0.75);
    assert_eq!(view.last_result_volume, Some(0.2));
    assert_eq!(view.current_result(), Some(&fixtures::simulation(4_000.0)));
    assert_eq!(client.simulation.calls(), 1);

    controller.run().await;
    assert_eq!(client.requested_volumes(), vec![0.2, 0.75]);
}

#[tokio::test]
async fn test_set_volume_while_running_applies_to_next_run() {
    let client = Arc::new(MockDataClient::new());
    let gate = client.simulation.push_gated();

    let controller = Arc::new(SimulationController::new(client.clone()));
    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.run().await }
    });
    assert!(client.simulation.wait_for_calls(1).await);

    controller.set_volume_increase(0.5).await.unwrap();
    gate.send(Ok(fixtures::simulation(10.0))).unwrap();
    first.await.unwrap();

    let view = controller.view().await;
    assert_eq!(view.volume_increase, 0.5);
    assert_eq!(view.last_result_volume, Some(0.2));
}

#[tokio::test]
async fn test_out_of_range_volume_is_rejected_consistently() {
    let client = Arc::new(MockDataClient::new());
    let controller = SimulationController::new(client.clone());

    for bad in [-0.1, 1.01, f64::NAN] {
        let err = controller.set_volume_increase(bad).await.unwrap_err();
        assert!(matches!(err, DashboardError::ValidationError(_)));
    }
    assert_eq!(controller.view().await.volume_increase, 0.2);

    assert!(SimulationController::new(client.clone())
        .with_volume_increase(2.0)
        .is_err());
    assert!(SimulationController::new(client.clone())
        .with_volume_increase(1.0)
        .is_ok());
}

#[tokio::test]
async fn test_hung_run_times_out_to_failed() {
    let client = Arc::new(MockDataClient::new());
    let _held = client.simulation.push_gated();

    let controller = SimulationController::new(client.clone())
        .with_request_timeout(Some(Duration::from_millis(50)));
    let outcome = controller.run().await;

    assert!(matches!(outcome, RunOutcome::Failed(DashboardError::NetworkError(_))));
    assert_eq!(controller.view().await.status, SimulationStatus::Failed);
}

#[tokio::test]
async fn test_cancelled_run_does_not_block_later_runs() {
    let client = Arc::new(MockDataClient::new());
    let _gate = client.simulation.push_gated();
    client.simulation.push_ok(fixtures::simulation(2_500.0));

    let controller = Arc::new(SimulationController::new(client.clone()));
    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.run().await }
    });
    assert!(client.simulation.wait_for_calls(1).await);

    first.abort();
    assert!(first.await.unwrap_err().is_cancelled());

    let view = controller.view().await;
    assert_eq!(view.status, SimulationStatus::Failed);
    assert!(view.last_error.is_some());

    let second = controller.run().await;
    assert_eq!(second, RunOutcome::Completed(fixtures::simulation(2_500.0)));
    assert_eq!(client.simulation.calls(), 2);
}

#[tokio::test]
async fn test_configured_volume_is_sent_on_first_run() {
    let client = Arc::new(MockDataClient::new());
    client.simulation.push_ok(fixtures::simulation(600.0));

    let config = Config {
        default_volume_increase: 0.35,
        ..Config::default()
    };
    let controller = SimulationController::from_config(client.clone(), &config).unwrap();
    assert_eq!(controller.view().await.volume_increase, 0.35);

    controller.run().await;
    assert_eq!(client.requested_volumes(), vec![0.35]);
}

#[tokio::test]
async fn test_configured_timeout_applies_to_runs() {
    let client = Arc::new(MockDataClient::new());
    let _held = client.simulation.push_gated();

    let config = Config {
        request_timeout_ms: Some(50),
        ..Config::default()
    };
    let controller = SimulationController::from_config(client.clone(), &config).unwrap();
    let outcome = controller.run().await;
    assert!(matches!(outcome, RunOutcome::Failed(DashboardError::NetworkError(_))));
}

#[tokio::test]
async fn test_out_of_range_configured_volume_is_rejected() {
    let client = Arc::new(MockDataClient::new());
    let config = Config {
        default_volume_increase: 1.5,
        ..Config::default()
    };
    assert!(matches!(
        SimulationController::from_config(client, &config),
        Err(DashboardError::ValidationError(_))
    ));
}
