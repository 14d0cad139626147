//! Exporter integration tests.
//!
//! Registers runtime metrics from real introspection sources and scrapes
//! them through the HTTP router.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use jvmbridge_core::{BridgeConfig, CounterCategory};
use jvmbridge_introspect::{CpuSample, RawCounter, StaticIntrospection};
use jvmbridge_metrics::{GaugeRegistry, register_runtime_metrics, register_runtime_metrics_with};
use jvmbridged::{build_router, demo, render_after, source};

async fn get_body(router: axum::Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn gc_counters_scraped_end_to_end() {
    let source = StaticIntrospection::new();
    source.set_counter(CounterCategory::GarbageCollector, RawCounter::counter("G1-young.count", 3.0));
    source.set_counter(CounterCategory::GarbageCollector, RawCounter::counter("G1-young.time", 120.0));

    let registry = GaugeRegistry::new();
    register_runtime_metrics(&registry, Arc::new(source));

    let (status, body) = get_body(build_router(registry), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("jvm_gc_count{collector=\"G1-young\"} 3\n"), "{body}");
    assert!(body.contains("jvm_gc_time{collector=\"G1-young\"} 120\n"), "{body}");
    assert!(!body.contains("jvm_process_cpu_usage"));
}

#[tokio::test]
async fn snapshot_file_scraped_with_fresh_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(
        &path,
        r#"{
            "memory": { "pools.G1-Eden-Space.used": 2048, "non-heap.used": 512 },
            "buffer_pools": { "direct.count": 4 },
            "threads": { "count": 21, "peak_count": 23, "total_started_count": 40, "daemon_count": 17 },
            "cpu": { "process_busy_time_nanos": 0, "wall_clock_time_nanos": 0 }
        }"#,
    )
    .unwrap();

    let mut config = BridgeConfig::default();
    config.source.snapshot_path = Some(path.clone());
    let introspection = source::from_config(&config).unwrap();

    let registry = GaugeRegistry::new();
    let report = register_runtime_metrics_with(&registry, introspection, config.collect);
    assert!(report.cpu_registered);

    std::fs::write(
        &path,
        r#"{
            "memory": { "pools.G1-Eden-Space.used": 4096, "non-heap.used": 512 },
            "buffer_pools": { "direct.count": 4 },
            "threads": { "count": 22 },
            "cpu": { "process_busy_time_nanos": 50, "wall_clock_time_nanos": 100 }
        }"#,
    )
    .unwrap();

    let (_, body) = get_body(build_router(registry), "/metrics").await;
    assert!(
        body.contains("jvm_memory_pools{memory_pool=\"G1-Eden-Space\",type=\"used\"} 4096\n"),
        "{body}"
    );
    assert!(body.contains("jvm_memory_non_heap{type=\"used\"} 512\n"), "{body}");
    assert!(body.contains("nio_bufferPool_direct{type=\"count\"} 4\n"), "{body}");
    assert!(body.contains("jvm_threads{type=\"count\"} 22\n"), "{body}");
    assert!(body.contains("jvm_process_cpu_usage 50\n"), "{body}");
}

#[tokio::test(start_paused = true)]
async fn render_measures_cpu_over_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    // 80% busy over the process lifetime.
    std::fs::write(
        &path,
        r#"{"cpu": { "process_busy_time_nanos": 8000000000, "wall_clock_time_nanos": 10000000000 }}"#,
    )
    .unwrap();

    let mut config = BridgeConfig::default();
    config.source.snapshot_path = Some(path.clone());
    let registry = GaugeRegistry::new();
    let report = register_runtime_metrics_with(&registry, source::from_config(&config).unwrap(), config.collect);
    assert!(report.cpu_registered);

    // The agent rewrites the snapshot during the window: 0.5s busy over 1s.
    let agent = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        std::fs::write(
            &path,
            r#"{"cpu": { "process_busy_time_nanos": 8500000000, "wall_clock_time_nanos": 11000000000 }}"#,
        )
        .unwrap();
    });

    let body = render_after(&registry, Duration::from_secs(1)).await.unwrap();
    agent.await.unwrap();
    assert!(body.contains("jvm_process_cpu_usage 50\n"), "{body}");
}

#[tokio::test]
async fn samples_endpoint_returns_json() {
    let source = StaticIntrospection::new().with_cpu(CpuSample::new(0, 0));
    let registry = GaugeRegistry::new();
    register_runtime_metrics(&registry, Arc::new(source.clone()));
    source.set_cpu(CpuSample::new(25, 100));

    let (status, body) = get_body(build_router(registry), "/api/v1/samples").await;
    assert_eq!(status, StatusCode::OK);

    let samples: serde_json::Value = serde_json::from_str(&body).unwrap();
    let cpu = samples
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["identifier"]["base_name"] == "jvm_process_cpu_usage")
        .unwrap();
    assert_eq!(cpu["value"], 25.0);
}

#[tokio::test]
async fn demo_source_serves_every_group() {
    let registry = GaugeRegistry::new();
    let report = register_runtime_metrics(&registry, Arc::new(demo::seeded()));
    assert!(report.skipped.is_empty(), "{:?}", report.skipped);

    let (_, body) = get_body(build_router(registry), "/metrics").await;
    for header in [
        "# TYPE jvm_gc_count counter",
        "# TYPE jvm_memory_heap gauge",
        "# TYPE jvm_memory_pools gauge",
        "# TYPE nio_bufferPool_direct gauge",
        "# TYPE jvm_threads gauge",
        "# TYPE jvm_classes gauge",
        "# TYPE jvm_process_cpu_usage gauge",
    ] {
        assert!(body.contains(header), "missing {header}");
    }
}

#[tokio::test]
async fn healthz_ok() {
    let (status, body) = get_body(build_router(GaugeRegistry::new()), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
