use super::*;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test]
async fn publishes_host_memory_and_per_cpu_gauges() {
    let (tx, mut rx) = mpsc::channel(256);
    let cancel = CancellationToken::new();

    let handle = spawn_system_sampler(tx, Duration::from_millis(10), cancel.clone());

    let mut ids = HashSet::new();
    // at least TotalMemory + FreeMemory + one CPUutilization{n}
    for _ in 0..3 {
        let metric = tokio::time::timeout(Duration::from_secs(3), rx.recv())
            .await
            .expect("sampler should publish within the averaging window")
            .expect("channel should stay open");
        ids.insert(metric.id().to_string());
    }

    assert!(ids.contains("TotalMemory"));
    assert!(ids.contains("FreeMemory"));
    assert!(ids.iter().any(|id| id.starts_with("CPUutilization")));

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn stops_promptly_even_mid_cpu_averaging_window() {
    let (tx, _rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();

    let handle = spawn_system_sampler(tx, Duration::from_millis(5), cancel.clone());

    // Let it enter the one-second CPU-averaging pause, then cancel — the
    // inner select! must notice cancellation instead of waiting out the
    // full window.
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_millis(500), handle)
        .await
        .expect("cancellation should be observed well before the 1s averaging window elapses")
        .unwrap();
}
