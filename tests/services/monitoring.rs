use std::time::Duration;

use bundlr_core::pipeline::{BlockerMonitor, BlockerMonitorConfig};
use bundlr_core::{FactoryStatus, PipelineConfig};
use tokio_test::assert_ok;

use crate::common::TestHarness;

#[tokio::test]
async fn test_monitor_tracks_signal_raise_and_clear() {
    let harness = TestHarness::new();
    let factory = assert_ok!(
        harness
            .service
            .bootstrap("contract-77", "Stark", "standard-content")
            .await
    );
    assert_ok!(
        harness
            .service
            .advance_deliverable(factory.id, "creative-brief")
            .await
    );

    let monitor = BlockerMonitor::new(BlockerMonitorConfig {
        enabled: true,
        poll_interval: Duration::from_millis(10),
    });
    assert!(monitor.start(harness.service.clone(), factory.id));

    harness.signals.raise(factory.id, "Legal review pending");
    tokio::time::sleep(Duration::from_millis(80)).await;
    let blocked = assert_ok!(harness.service.load(factory.id).await);
    assert_eq!(blocked.status, FactoryStatus::Blocked);
    assert_eq!(blocked.blockers, vec!["Legal review pending".to_string()]);

    harness.signals.clear(factory.id);
    tokio::time::sleep(Duration::from_millis(80)).await;
    let unblocked = assert_ok!(harness.service.load(factory.id).await);
    assert_eq!(unblocked.status, FactoryStatus::Active);
    assert!(unblocked.blockers.is_empty());

    monitor.stop();
    assert!(!monitor.is_running());
}

#[test]
fn test_monitor_config_from_pipeline_config() {
    let pipeline = PipelineConfig {
        blocker_poll_interval_seconds: 3,
        monitor_enabled: false,
    };
    let config = BlockerMonitorConfig::from(&pipeline);
    assert!(!config.enabled);
    assert_eq!(config.poll_interval, Duration::from_secs(3));
}
