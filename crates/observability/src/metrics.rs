//! 桥接服务指标
//!
//! 所有指标通过 `metrics` 宏记录，由 Prometheus exporter 导出。
//! 未安装 recorder 时这些调用为空操作。

use contracts::EncodingMode;
use metrics::{counter, histogram};

/// Metric names, kept in one place for dashboards and tests
pub mod names {
    pub const REQUESTS_TOTAL: &str = "event_bridge_requests_total";
    pub const HANDOFF_WAIT_MS: &str = "event_bridge_handoff_wait_ms";
    pub const MESSAGES_PUBLISHED_TOTAL: &str = "event_bridge_messages_published_total";
    pub const ENCODE_FAILURES_TOTAL: &str = "event_bridge_encode_failures_total";
    pub const PUBLISH_LATENCY_MS: &str = "event_bridge_publish_latency_ms";
}

/// 记录一次 HTTP 请求及其响应状态码
pub fn record_request(mode: EncodingMode, status: u16) {
    counter!(
        names::REQUESTS_TOTAL,
        "mode" => mode.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录请求等待 publish loop 接收的时间
pub fn record_handoff_wait_ms(wait_ms: f64) {
    histogram!(names::HANDOFF_WAIT_MS).record(wait_ms);
}

/// 记录一次发送结果
pub fn record_message_published(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(names::MESSAGES_PUBLISHED_TOTAL, "status" => status).increment(1);
}

/// 记录编码失败
pub fn record_encode_failure() {
    counter!(names::ENCODE_FAILURES_TOTAL).increment(1);
}

/// 记录 broker client send 的耗时
pub fn record_publish_latency_ms(latency_ms: f64) {
    histogram!(names::PUBLISH_LATENCY_MS).record(latency_ms);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request(EncodingMode::Raw, 200);
        record_request(EncodingMode::Structured, 422);
        record_handoff_wait_ms(1.5);
        record_message_published(true);
        record_message_published(false);
        record_encode_failure();
        record_publish_latency_ms(0.25);
    }

    #[test]
    fn test_metric_names_share_prefix() {
        for name in [
            names::REQUESTS_TOTAL,
            names::HANDOFF_WAIT_MS,
            names::MESSAGES_PUBLISHED_TOTAL,
            names::ENCODE_FAILURES_TOTAL,
            names::PUBLISH_LATENCY_MS,
        ] {
            assert!(name.starts_with("event_bridge_"), "{name}");
        }
    }
}
