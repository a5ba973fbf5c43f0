//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 端到端测试：HTTP → Dispatch Queue → Publish Loop → MemoryBrokerClient（无需真实 broker）
//! - 关闭时限

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_config_round_trips_through_loader() {
        let config = contracts::BridgeConfig::new("events", "localhost:9092");
        let toml = config_loader::ConfigLoader::to_toml(&config).unwrap();
        let loaded = config_loader::ConfigLoader::load_from_str(
            &toml,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(loaded.topic, "events");
        assert_eq!(loaded.drain_timeout(), config.drain_timeout());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use apache_avro::types::Value;
    use axum::routing::post as route_post;
    use axum::{Json, Router};
    use bridge::{BridgeService, ServiceState};
    use contracts::{BridgeConfig, OverloadPolicy};
    use dispatcher::MemoryBrokerClient;

    const EVENT_SCHEMA: &str = r#"{
        "type": "record",
        "name": "MarathonEvent",
        "fields": [
            {"name": "source", "type": "string"},
            {"name": "headers", "type": {"type": "map", "values": {"type": "array", "items": "string"}}},
            {"name": "body", "type": "bytes"}
        ]
    }"#;

    fn local_config(pattern: &str) -> BridgeConfig {
        let mut config = BridgeConfig::new("events", "localhost:9092");
        config.http.bind_host = "127.0.0.1".into();
        config.http.port = 0;
        config.http.pattern = pattern.into();
        config
    }

    async fn post(addr: SocketAddr, path: &str, body: Vec<u8>) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("http://{addr}{path}"))
            .header("x-test", "1")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    /// Registry stub that hands out ids starting at `first_id`
    async fn spawn_registry(first_id: u32) -> (String, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/subjects/{subject}/versions",
            route_post(move |Json(_body): Json<serde_json::Value>| {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    Json(serde_json::json!({ "id": first_id + n }))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), calls)
    }

    /// Registry stub that accepts connections and never answers
    async fn spawn_silent_registry() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    /// Plain mode: bodies arrive on the topic unchanged and in request order
    #[tokio::test]
    async fn test_e2e_plain_bodies_in_order() {
        let client = MemoryBrokerClient::new();
        let mut service = BridgeService::new(local_config("/marathon"), client.clone());
        let addr = service.start().await.unwrap();

        for body in ["hello", "world"] {
            let response = post(addr, "/marathon", body.as_bytes().to_vec()).await;
            assert_eq!(response.status(), reqwest::StatusCode::OK);
            assert!(response.bytes().await.unwrap().is_empty());
        }
        let binary: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        assert_eq!(
            post(addr, "/marathon", binary.clone()).await.status(),
            reqwest::StatusCode::OK
        );

        let report = service.stop().await.unwrap();
        assert!(report.is_clean());
        assert_eq!(report.published, 3);

        assert_eq!(
            client.values(),
            vec![b"hello".to_vec(), b"world".to_vec(), binary]
        );
        assert!(client.sent().iter().all(|m| m.topic == "events"));
        assert!(client.is_closed());
    }

    /// Structured mode: value is registry-framed Avro carrying source, headers and body
    #[tokio::test]
    async fn test_e2e_structured_avro_record() {
        let (registry_url, calls) = spawn_registry(21).await;
        let mut config = local_config("/marathon");
        config.schema_registry_url = Some(registry_url);
        config.schema = Some(EVENT_SCHEMA.to_string());

        let client = MemoryBrokerClient::new();
        let mut service = BridgeService::new(config, client.clone());
        let addr = service.start().await.unwrap();

        for body in ["first", "second"] {
            let response = post(addr, "/marathon", body.as_bytes().to_vec()).await;
            assert_eq!(response.status(), reqwest::StatusCode::OK);
        }
        service.stop().await.unwrap();

        // one registration, cached for the second message
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let schema = apache_avro::Schema::parse_str(EVENT_SCHEMA).unwrap();
        let values = client.values();
        assert_eq!(values.len(), 2);

        for (value, expected_body) in values.iter().zip([b"first".as_slice(), b"second"]) {
            assert_eq!(value[0], codec::MAGIC_BYTE);
            assert_eq!(u32::from_be_bytes([value[1], value[2], value[3], value[4]]), 21);

            let mut datum = &value[5..];
            let Value::Record(fields) =
                apache_avro::from_avro_datum(&schema, &mut datum, None).unwrap()
            else {
                panic!("expected an Avro record");
            };

            for (name, field) in fields {
                match (name.as_str(), field) {
                    ("source", Value::String(source)) => {
                        assert!(source.starts_with("127.0.0.1:"), "source was {source}")
                    }
                    ("headers", Value::Map(headers)) => {
                        assert_eq!(
                            headers.get("X-Test"),
                            Some(&Value::Array(vec![Value::String("1".into())]))
                        );
                    }
                    ("body", Value::Bytes(body)) => assert_eq!(body, expected_body),
                    (name, field) => panic!("unexpected field {name}: {field:?}"),
                }
            }
        }
    }

    /// Broker stuck on send: stop still returns within the drain bound
    #[tokio::test]
    async fn test_e2e_shutdown_is_bounded() {
        let mut config = local_config("/");
        config.shutdown_drain_timeout_ms = 300;

        let client = MemoryBrokerClient::new().with_send_delay(Duration::from_secs(30));
        let mut service = BridgeService::new(config, client.clone());
        let addr = service.start().await.unwrap();

        assert_eq!(
            post(addr, "/", b"stuck".to_vec()).await.status(),
            reqwest::StatusCode::OK
        );

        let started = Instant::now();
        let report = service.stop().await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(report.drain_timed_out);
        assert!(!report.is_clean());
        assert_eq!(service.state(), ServiceState::Stopped);
        assert!(client.values().is_empty());
    }

    /// Reject policy: a request arriving while the only slot is taken gets 503
    #[tokio::test]
    async fn test_e2e_reject_policy_overload() {
        let mut config = local_config("/");
        config.http.overload = OverloadPolicy::Reject { max_in_flight: 1 };
        config.shutdown_drain_timeout_ms = 5000;

        let client = MemoryBrokerClient::new().with_send_delay(Duration::from_millis(1500));
        let mut service = BridgeService::new(config, client.clone());
        let addr = service.start().await.unwrap();

        // taken by the loop at once, which then stays busy sending
        assert_eq!(
            post(addr, "/", b"one".to_vec()).await.status(),
            reqwest::StatusCode::OK
        );

        // waits for the busy loop while holding the only slot
        let waiting = tokio::spawn(async move { post(addr, "/", b"two".to_vec()).await.status() });
        tokio::time::sleep(Duration::from_millis(300)).await;

        let response = post(addr, "/", b"three".to_vec()).await;
        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["error"]["code"], "OVERLOADED");

        assert_eq!(waiting.await.unwrap(), reqwest::StatusCode::OK);
        service.stop().await.unwrap();
        assert_eq!(client.values(), vec![b"one".to_vec(), b"two".to_vec()]);
    }

    /// Stalled registry: requests get 422 instead of hanging, and the loop keeps serving
    #[tokio::test]
    async fn test_e2e_stalled_registry_answers_422() {
        let mut config = local_config("/marathon");
        config.schema_registry_url = Some(spawn_silent_registry().await);
        config.schema = Some(EVENT_SCHEMA.to_string());
        config.schema_registry_timeout_ms = 200;

        let client = MemoryBrokerClient::new();
        let mut service = BridgeService::new(config, client.clone());
        let addr = service.start().await.unwrap();

        for body in ["first", "second"] {
            let response = tokio::time::timeout(
                Duration::from_secs(5),
                post(addr, "/marathon", body.as_bytes().to_vec()),
            )
            .await
            .expect("request must not wait on the registry forever");
            assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
            let json: serde_json::Value = response.json().await.unwrap();
            assert_eq!(json["error"]["code"], "ENCODE_FAILED");
        }

        let report = service.stop().await.unwrap();
        assert_eq!(report.encode_failures, 2);
        assert!(client.values().is_empty());
    }

    /// Reject limit beyond what a semaphore can hold fails start instead of panicking
    #[tokio::test]
    async fn test_e2e_oversized_reject_limit_fails_start() {
        let mut config = local_config("/");
        config.http.overload = OverloadPolicy::Reject {
            max_in_flight: usize::MAX,
        };

        let mut service = BridgeService::new(config, MemoryBrokerClient::new());
        assert!(matches!(
            service.start().await,
            Err(bridge::ServiceError::Startup { .. })
        ));
        assert_eq!(service.state(), ServiceState::Created);
    }

    /// Missing schema for a registry URL fails start and nothing is listening
    #[tokio::test]
    async fn test_e2e_start_failure_leaves_service_created() {
        let mut config = local_config("/");
        config.schema_registry_url = Some("http://127.0.0.1:1".into());

        let mut service = BridgeService::new(config, MemoryBrokerClient::new());
        assert!(service.start().await.is_err());
        assert_eq!(service.state(), ServiceState::Created);
        assert!(service.local_addr().is_none());
    }
}
