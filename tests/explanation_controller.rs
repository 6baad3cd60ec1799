use pretty_assertions::assert_eq;
use risklens_dashboard::api::FEATURE_VECTOR_LEN;
use risklens_dashboard::dashboard::ImpactDirection;
use risklens_dashboard::error::DashboardError;
use risklens_dashboard::explain::{ExplainOutcome, ExplanationController, FixedFeatures};
use risklens_dashboard::testing::{fixtures, MockDataClient};
use std::sync::Arc;

fn controller(client: &Arc<MockDataClient>) -> Arc<ExplanationController> {
    Arc::new(ExplanationController::new(client.clone()))
}

#[tokio::test]
async fn test_explain_stores_result_for_selected_transaction() {
    let client = Arc::new(MockDataClient::new());
    client
        .explanation
        .push_ok(fixtures::explanation(&[("Amount", 0.62), ("V14", -0.21)]));

    let controller = controller(&client);
    let outcome = controller.explain(fixtures::transaction(42)).await;
    assert_eq!(outcome, ExplainOutcome::Applied);

    let view = controller.view().await;
    assert_eq!(view.selected.as_ref().map(|t| t.id), Some(42));
    assert!(!view.pending);
    let bars = view.impact_bars();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].direction, ImpactDirection::IncreasesRisk);
    assert_eq!(bars[1].direction, ImpactDirection::DecreasesRisk);

    let sent = client.requested_feature_vectors();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].len(), FEATURE_VECTOR_LEN);
}

#[tokio::test]
async fn test_pending_state_is_keyed_to_new_selection() {
    let client = Arc::new(MockDataClient::new());
    client.explanation.push_ok(fixtures::explanation(&[("Amount", 0.5)]));
    let gate = client.explanation.push_gated();

    let controller = controller(&client);
    controller.explain(fixtures::transaction(1)).await;

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.explain(fixtures::transaction(2)).await }
    });
    assert!(client.explanation.wait_for_calls(2).await);

    let view = controller.view().await;
    assert_eq!(view.selected.as_ref().map(|t| t.id), Some(2));
    assert!(view.pending);
    assert!(view.explanation.is_none(), "previous transaction's explanation must be cleared");

    gate.send(Ok(fixtures::explanation(&[("Time", 0.1)]))).unwrap();
    assert_eq!(pending.await.unwrap(), ExplainOutcome::Applied);
}

#[tokio::test]
async fn test_stale_explanation_is_dropped() {
    let client = Arc::new(MockDataClient::new());
    let gate_a = client.explanation.push_gated();
    let gate_b = client.explanation.push_gated();

    let controller = controller(&client);
    let explain_a = tokio::spawn({
        let controller = controller.clone();
        async move { controller.explain(fixtures::transaction(100)).await }
    });
    assert!(client.explanation.wait_for_calls(1).await);

    let explain_b = tokio::spawn({
        let controller = controller.clone();
        async move { controller.explain(fixtures::transaction(200)).await }
    });
    assert!(client.explanation.wait_for_calls(2).await);

    gate_a
        .send(Ok(fixtures::explanation(&[("Amount", 0.9)])))
        .unwrap();
    assert_eq!(explain_a.await.unwrap(), ExplainOutcome::Stale);

    let view = controller.view().await;
    assert_eq!(view.selected.as_ref().map(|t| t.id), Some(200));
    assert!(view.explanation.is_none());
    assert!(view.pending);

    gate_b
        .send(Ok(fixtures::explanation(&[("V3", -0.4)])))
        .unwrap();
    assert_eq!(explain_b.await.unwrap(), ExplainOutcome::Applied);
    let view = controller.view().await;
    assert_eq!(
        view.explanation,
        Some(fixtures::explanation(&[("V3", -0.4)]))
    );
}

#[tokio::test]
async fn test_stale_failure_does_not_set_error() {
    let client = Arc::new(MockDataClient::new());
    let gate_a = client.explanation.push_gated();
    client.explanation.push_ok(fixtures::explanation(&[("Amount", 0.3)]));

    let controller = controller(&client);
    let explain_a = tokio::spawn({
        let controller = controller.clone();
        async move { controller.explain(fixtures::transaction(1)).await }
    });
    assert!(client.explanation.wait_for_calls(1).await);

    assert_eq!(controller.explain(fixtures::transaction(2)).await, ExplainOutcome::Applied);

    gate_a
        .send(Err(DashboardError::NetworkError("timeout".into())))
        .unwrap();
    assert_eq!(explain_a.await.unwrap(), ExplainOutcome::Stale);

    let view = controller.view().await;
    assert!(view.last_error.is_none());
    assert!(view.explanation.is_some());
}

#[tokio::test]
async fn test_failure_keeps_selection_without_retry() {
    let client = Arc::new(MockDataClient::new());
    client
        .explanation
        .push_err(DashboardError::DecodeError("Explainer not initialized".into()));

    let controller = controller(&client);
    let outcome = controller.explain(fixtures::transaction(9)).await;
    assert!(matches!(outcome, ExplainOutcome::Failed(DashboardError::DecodeError(_))));

    let view = controller.view().await;
    assert_eq!(view.selected.as_ref().map(|t| t.id), Some(9));
    assert!(view.explanation.is_none());
    assert!(view.last_error.is_some());
    assert!(!view.pending);
    assert_eq!(client.explanation.calls(), 1);
}

#[tokio::test]
async fn test_dismiss_is_idempotent() {
    let client = Arc::new(MockDataClient::new());
    client.explanation.push_ok(fixtures::explanation(&[("Amount", 0.5)]));

    let controller = controller(&client);
    controller.explain(fixtures::transaction(3)).await;

    controller.dismiss().await;
    let once = controller.view().await;
    controller.dismiss().await;
    let twice = controller.view().await;

    assert_eq!(once, twice);
    assert!(twice.selected.is_none());
    assert!(twice.explanation.is_none());
}

#[tokio::test]
async fn test_dismiss_discards_in_flight_response() {
    let client = Arc::new(MockDataClient::new());
    let gate = client.explanation.push_gated();

    let controller = controller(&client);
    let explain = tokio::spawn({
        let controller = controller.clone();
        async move { controller.explain(fixtures::transaction(5)).await }
    });
    assert!(client.explanation.wait_for_calls(1).await);

    controller.dismiss().await;
    gate.send(Ok(fixtures::explanation(&[("Amount", 0.7)]))).unwrap();
    assert_eq!(explain.await.unwrap(), ExplainOutcome::Stale);

    let view = controller.view().await;
    assert!(view.selected.is_none());
    assert!(view.explanation.is_none());
}

#[tokio::test]
async fn test_feature_source_is_injectable() {
    let client = Arc::new(MockDataClient::new());
    client.explanation.push_ok(fixtures::explanation(&[("Amount", 0.5)]));

    let fixed = vec![0.25; FEATURE_VECTOR_LEN];
    let controller = ExplanationController::new(client.clone())
        .with_feature_source(Arc::new(FixedFeatures(fixed.clone())));
    controller.explain(fixtures::transaction(1)).await;

    assert_eq!(client.requested_feature_vectors(), vec![fixed]);
}

#[tokio::test]
async fn test_wrong_length_vector_fails_before_request() {
    let client = Arc::new(MockDataClient::new());
    let controller = ExplanationController::new(client.clone())
        .with_feature_source(Arc::new(FixedFeatures(vec![0.0; 4])));

    let outcome = controller.explain(fixtures::transaction(1)).await;
    assert!(matches!(outcome, ExplainOutcome::Failed(DashboardError::ValidationError(_))));
    assert_eq!(client.explanation.calls(), 0);
}
