// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP controller API using wiremock.

use std::time::Duration;

use garage_envoy::protocol::{DoorApi, HistoryEndpoint, HttpClient, HttpConfig};
use garage_envoy::types::DoorState;
use garage_envoy::{DoorPoller, Error, ParseError, PollerConfig, ProtocolError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// HttpClient Tests
// ============================================================================

mod http_client {
    use super::*;

    #[tokio::test]
    async fn fetch_history() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/history"))
            .and(query_param("n", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "history": [
                    {"time": 1400000000.0, "type": "state", "name": "closed"},
                    {"time": 1400000010.0, "type": "state", "name": "opening"},
                    {"time": 1400000025.0, "type": "state", "name": "open"}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(mock_server.uri()).unwrap();
        let history = client.fetch_history(20).await.unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history[2].door_state(), Some(DoorState::Open));
        assert_eq!(history[0].timestamp().unwrap().timestamp(), 1_400_000_000);
    }

    #[tokio::test]
    async fn fetch_empty_history() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/history"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"history": []})),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(mock_server.uri()).unwrap();
        assert!(client.fetch_history(20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_legacy_events() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("t", "state"))
            .and(query_param("n", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "events": [
                    {"time": 1400000000.0, "type": "state", "name": "half-closed", "value": null}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(mock_server.uri())
            .unwrap()
            .with_endpoint(HistoryEndpoint::legacy_events());
        let history = client.fetch_history(10).await.unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].door_state(), Some(DoorState::HalfClosed));
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/history"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(mock_server.uri()).unwrap();
        let err = client.fetch_history(20).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::Status { code: 500, .. })
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/history"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(mock_server.uri()).unwrap();
        let err = client.fetch_history(20).await.unwrap_err();

        assert!(matches!(err, Error::Parse(ParseError::Json(_))));
    }

    #[tokio::test]
    async fn wrong_list_is_missing_field() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/history"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"events": []})),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(mock_server.uri()).unwrap();
        let err = client.fetch_history(20).await.unwrap_err();

        assert!(matches!(err, Error::Parse(ParseError::MissingField(_))));
    }

    #[tokio::test]
    async fn trigger_posts_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/_trigger"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(mock_server.uri()).unwrap();
        client.trigger().await.unwrap();
    }

    #[tokio::test]
    async fn trigger_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/_trigger"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(mock_server.uri()).unwrap();
        let err = client.trigger().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::Status { code: 503, .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_controller() {
        // Nothing listens on port 1 of the loopback interface.
        let client = HttpConfig::new("127.0.0.1")
            .with_port(1)
            .with_timeout(Duration::from_secs(5))
            .into_client()
            .unwrap();
        let err = client.fetch_history(20).await.unwrap_err();

        assert!(matches!(err, Error::Protocol(ProtocolError::Http(_))));
    }
}

// ============================================================================
// HttpConfig Tests
// ============================================================================

mod http_config {
    use super::*;

    #[tokio::test]
    async fn config_client_reaches_mock_server() {
        let mock_server = MockServer::start().await;
        let address = mock_server.address();

        Mock::given(method("GET"))
            .and(path("/history"))
            .and(query_param("n", "5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"history": [{"name": "closing"}]})),
            )
            .mount(&mock_server)
            .await;

        let client = HttpConfig::new(address.ip().to_string())
            .with_port(address.port())
            .with_timeout(Duration::from_secs(5))
            .into_client()
            .unwrap();
        let history = client.fetch_history(5).await.unwrap();

        assert_eq!(history[0].door_state(), Some(DoorState::Closing));
    }
}

// ============================================================================
// Poller against a live HTTP server
// ============================================================================

mod poller {
    use super::*;

    #[tokio::test]
    async fn poller_renders_and_triggers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/history"))
            .and(query_param("n", "20"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"history": [{"name": "closed"}]})),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/_trigger"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(mock_server.uri()).unwrap();
        let poller = DoorPoller::spawn(client, PollerConfig::default());
        let mut views = poller.subscribe();

        tokio::time::timeout(Duration::from_secs(5), views.changed())
            .await
            .expect("no view published")
            .unwrap();
        let view = views.borrow_and_update().clone();
        assert_eq!(view.current_state(), Some("closed"));
        assert_eq!(view.trigger_label(), "Open Door");

        poller.trigger_door().await.unwrap();

        let mut triggered = false;
        for _ in 0..50 {
            let requests = mock_server.received_requests().await.unwrap_or_default();
            if requests.iter().any(|r| r.method.as_str() == "POST") {
                triggered = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(triggered, "trigger was not posted");

        poller.shutdown().await;
        assert!(poller.is_stopped());
    }

    #[tokio::test]
    async fn poller_clears_view_on_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/history"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(mock_server.uri()).unwrap();
        let poller = DoorPoller::spawn(client, PollerConfig::default());
        let mut views = poller.subscribe();

        tokio::time::timeout(Duration::from_secs(5), views.changed())
            .await
            .expect("no view published")
            .unwrap();
        let view = poller.view();
        assert!(view.is_failed());
        assert!(view.history().is_empty());
        assert!(view.current_state().is_none());
        assert!(view.trigger_action().is_none());

        poller.shutdown().await;
    }
}
