//! Streaming transformer tests: one fresh engine per call, always released.

mod common;

use common::{init_tracing, monster_schema, FakeFactory, ORC};
use flatrun_core::{
    DecodeOptions, DecodedOutput, OutputEncoding, RunnerConfig, RunnerError, StreamingTransformer,
};
use flatrun_engine::EngineError;
use std::sync::atomic::Ordering;

fn transformer() -> (StreamingTransformer<FakeFactory>, FakeFactory) {
    init_tracing();
    let factory = FakeFactory::new();
    (StreamingTransformer::new(monster_schema(), factory.clone()), factory)
}

#[tokio::test]
async fn test_repeated_calls_are_identical_and_released() {
    let (transformer, factory) = transformer();

    let first = transformer.transform_json_to_binary(ORC).await.unwrap();
    for _ in 0..5 {
        let next = transformer.transform_json_to_binary(ORC).await.unwrap();
        assert_eq!(next, first);
        assert_eq!(transformer.stats().live(), 0);
        assert_eq!(factory.live(), 0);
    }

    assert_eq!(transformer.stats().created(), 6);
    assert_eq!(transformer.stats().released(), 6);
    // Every call mounts into an empty engine, so each is one invocation
    assert_eq!(factory.control.invocations(), 6);
}

#[tokio::test]
async fn test_binary_to_json_round_trip() {
    let (transformer, factory) = transformer();

    let binary = transformer.transform_json_to_binary(ORC).await.unwrap();
    let output = transformer.transform_binary_to_json(&binary).await.unwrap();
    assert!(matches!(output, DecodedOutput::Bytes(_)));

    let json = output.to_json().unwrap();
    assert_eq!(json["name"], "Orc");
    assert_eq!(json["pos"]["z"].as_f64(), Some(3.0));
    assert_eq!(factory.live(), 0);

    let options = DecodeOptions {
        encoding: OutputEncoding::Text,
        defaults_json: true,
        ..Default::default()
    };
    let text = transformer
        .transform_binary_to_json_with(&binary, &options)
        .await
        .unwrap();
    assert!(text.as_text().unwrap().contains("\"hp\": 100"));
}

#[tokio::test]
async fn test_failed_call_still_releases_instance() {
    let (transformer, factory) = transformer();

    let err = transformer
        .transform_json_to_binary("{ broken")
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::EngineInvocation { exit_code: 1, .. }));
    assert_eq!(transformer.stats().released(), 1);
    assert_eq!(factory.live(), 0);

    let err = transformer
        .transform_binary_to_json(b"garbage")
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::MissingOutput { .. }));
    assert_eq!(transformer.stats().released(), 2);
    assert_eq!(factory.live(), 0);
}

#[tokio::test]
async fn test_engine_fault_releases_instance() {
    let (transformer, factory) = transformer();
    factory.control.fault_next.store(true, Ordering::SeqCst);

    let err = transformer.transform_json_to_binary(ORC).await.unwrap_err();
    assert!(matches!(err, RunnerError::Engine(EngineError::Fault(_))));
    assert_eq!(transformer.stats().live(), 0);
    assert_eq!(factory.live(), 0);
}

#[tokio::test]
async fn test_instantiation_failure_creates_nothing() {
    let (transformer, factory) = transformer();
    factory.control.fail_instantiate.store(true, Ordering::SeqCst);

    let err = transformer.transform_json_to_binary(ORC).await.unwrap_err();
    assert!(matches!(err, RunnerError::Engine(EngineError::Startup(_))));
    assert_eq!(transformer.stats().created(), 0);
    assert_eq!(transformer.stats().released(), 0);
}

#[tokio::test]
async fn test_parallel_calls_share_nothing() {
    let (transformer, factory) = transformer();

    let calls = (0..8).map(|_| transformer.transform_json_to_binary(ORC));
    let results = futures::future::join_all(calls).await;

    let first = results[0].as_ref().unwrap();
    assert!(results.iter().all(|r| r.as_ref().unwrap() == first));
    assert_eq!(transformer.stats().created(), 8);
    assert_eq!(transformer.stats().live(), 0);
    assert_eq!(factory.live(), 0);
}

#[tokio::test]
async fn test_custom_config_input_path() {
    init_tracing();
    let factory = FakeFactory::new();
    let config = RunnerConfig::builder()
        .transient_root("/tmp/work")
        .build()
        .unwrap();
    let transformer =
        StreamingTransformer::with_config(monster_schema(), factory.clone(), config).unwrap();

    let binary = transformer.transform_json_to_binary(ORC).await.unwrap();
    let json = transformer
        .transform_binary_to_json(binary)
        .await
        .unwrap()
        .to_json()
        .unwrap();
    assert_eq!(json["name"], "Orc");
    assert_eq!(factory.live(), 0);
}

#[test]
fn test_transformer_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StreamingTransformer<FakeFactory>>();
}
