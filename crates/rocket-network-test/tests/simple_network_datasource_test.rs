//! Datasource behaviour against a mock backend

use rocket_network::{NetworkFailure, Outcome};
use rocket_network_commons::logger::{
    LOG_REQUEST_METHOD, LOG_REQUEST_URL, LOG_RESPONSE_CODE, LOG_RESPONSE_URL,
};
use rocket_network_commons::TimeoutConfig;
use rocket_network_test::fakes::{
    fake_api_request_simple_fake, header_interceptor, SimpleFake, SimpleFakeApiService,
    SimpleListFake, SimpleNetworkDatasource,
};
use rocket_network_test::{run_blocking, Fixture, MockServerTest, OutcomeExt, SHORT_TIMEOUT};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn datasource(mock: &MockServerTest) -> SimpleNetworkDatasource {
    let client = Arc::new(mock.api_client(Some(header_interceptor())));
    SimpleNetworkDatasource::new(SimpleFakeApiService::new(client), mock.crash_logger())
}

fn datasource_with_short_timeout(mock: &MockServerTest) -> SimpleNetworkDatasource {
    let client = Arc::new(mock.api_client_with_short_timeout(Some(header_interceptor())));
    SimpleNetworkDatasource::new(SimpleFakeApiService::new(client), mock.crash_logger())
}

fn datasource_for(mock: &MockServerTest, base_url: &str) -> SimpleNetworkDatasource {
    let client = Arc::new(mock.api_client_for(
        base_url,
        Some(header_interceptor()),
        TimeoutConfig::new(SHORT_TIMEOUT, SHORT_TIMEOUT),
    ));
    SimpleNetworkDatasource::new(SimpleFakeApiService::new(client), mock.crash_logger())
}

fn titles(list: &SimpleListFake) -> Vec<String> {
    list.list
        .iter()
        .flatten()
        .filter_map(|fake| fake.title.clone())
        .collect()
}

#[tokio::test]
async fn test_get_all_returns_object() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(200, Fixture::GetFakesObjectResponse).await;

    let datasource = datasource(&mock);
    let result = run_blocking(move || datasource.get_all()).await;

    let list = result.r().expect("body expected");
    assert_eq!(list.list.as_ref().map(Vec::len), Some(2));
    assert_eq!(list.base.code, None);
    mock.assert_get_request_sent_to("/all").await;
    assert_eq!(mock.crash_logger().count(), 0);
}

#[tokio::test]
async fn test_get_all_suspend_returns_object() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(200, Fixture::GetFakesObjectResponse).await;

    let result = datasource(&mock).get_all_suspend().await;

    assert_eq!(result.r().map(|list| titles(&list).len()), Some(2));
    mock.assert_get_request_sent_to("/all").await;
}

#[tokio::test]
async fn test_blocking_and_suspend_agree() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(200, Fixture::GetFakesObjectResponse).await;
    mock.enqueue_fixture(400, Fixture::ErrorResponse).await;
    mock.enqueue_fixture(200, Fixture::GetFakesObjectResponse).await;
    mock.enqueue_fixture(400, Fixture::ErrorResponse).await;

    let blocking = datasource(&mock);
    let (blocking_success, blocking_failure) =
        run_blocking(move || (blocking.get_all(), blocking.get_all())).await;

    let suspend = datasource(&mock);
    let suspend_success = suspend.get_all_suspend().await;
    let suspend_failure = suspend.get_all_suspend().await;

    assert_eq!(blocking_success, suspend_success);
    assert_eq!(blocking_failure, suspend_failure);
    assert_eq!(suspend_failure.l(), NetworkFailure::server("ERR-001", "Error message"));
}

#[tokio::test]
async fn test_get_all_with_error_envelope_on_200() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(200, Fixture::ErrorResponse).await;

    let result = datasource(&mock).get_all_suspend().await;

    assert_eq!(result.l(), NetworkFailure::server("ERR-001", "Error message"));
    let entry = mock.crash_logger().last().expect("failure reported");
    assert_eq!(entry.message.as_deref(), Some("parseError"));
    assert_eq!(entry.value(LOG_RESPONSE_CODE), Some("200"));
}

#[tokio::test]
async fn test_get_all_with_empty_object_is_unknown_error() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(200, Fixture::EmptyObjectFakeResponse).await;

    let result = datasource(&mock).get_all_suspend().await;

    let failure = result.l();
    assert_eq!(failure.code(), Some("-1"));
    assert_eq!(failure.data(), None);
}

#[tokio::test]
async fn test_get_all_with_empty_body_is_success_without_value() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(200, Fixture::EmptyFakeResponse).await;

    let result = datasource(&mock).get_all_suspend().await;

    assert_eq!(result, Outcome::Success(None));
}

#[tokio::test]
async fn test_get_all_with_malformed_body_is_json_format() {
    let mock = MockServerTest::start().await;
    mock.enqueue_mock_response(200, Some("<html>")).await;

    let result = datasource(&mock).get_all_suspend().await;

    assert!(matches!(result.l(), NetworkFailure::JsonFormat(Some(_))));
}

#[tokio::test]
async fn test_save_element_with_no_content() {
    let mock = MockServerTest::start().await;
    mock.enqueue_mock_response(204, None).await;

    let datasource = datasource(&mock);
    let result =
        run_blocking(move || datasource.save_element(&fake_api_request_simple_fake())).await;

    assert_eq!(result, Outcome::Success(None));
    mock.assert_post_request_sent_to("/all").await;
}

#[tokio::test]
async fn test_400_without_body_uses_status() {
    let mock = MockServerTest::start().await;
    mock.enqueue_mock_response(400, None).await;

    let result = datasource(&mock).get_all_suspend().await;

    assert_eq!(result.l(), NetworkFailure::server("400", "Bad Request"));
}

#[tokio::test]
async fn test_400_with_simple_error() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(400, Fixture::ErrorResponse).await;

    let datasource = datasource(&mock);
    let result = run_blocking(move || datasource.get_all()).await;

    assert_eq!(result.l(), NetworkFailure::server("ERR-001", "Error message"));
}

#[tokio::test]
async fn test_400_with_complex_error() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(400, Fixture::ErrorComplexResponse).await;

    let result = datasource(&mock).get_all_suspend().await;

    let failure = result.l();
    assert_eq!(failure.code(), Some("ERR-001"));
    let data = failure.data().expect("error payload");
    assert_eq!(data["message"], json!("Error message"));
    assert_eq!(data["stack"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_400_with_unknown_error_shape_is_json_format() {
    let mock = MockServerTest::start().await;
    mock.enqueue_mock_response(400, Some(r#"{"error": true}"#)).await;

    let result = datasource(&mock).get_all_suspend().await;

    assert!(matches!(result.l(), NetworkFailure::JsonFormat(Some(_))));
}

#[tokio::test]
async fn test_failure_is_reported_once_with_response_context() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(400, Fixture::ErrorResponse).await;

    let _ = datasource(&mock).get_all_suspend().await;

    let logger = mock.crash_logger();
    assert_eq!(logger.count(), 1);
    let entry = logger.last().expect("failure reported");
    assert_eq!(entry.message.as_deref(), Some("parseErrorBody"));
    assert_eq!(entry.value(LOG_RESPONSE_CODE), Some("400"));
    assert!(entry.value(LOG_RESPONSE_URL).is_some_and(|url| url.ends_with("/all")));
}

#[tokio::test]
async fn test_get_all_generic_returns_list() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(200, Fixture::GetFakesListResponse).await;

    let datasource = datasource(&mock);
    let result = run_blocking(move || datasource.get_all_generic()).await;

    let list: Vec<SimpleFake> = result.r().expect("body expected");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id.as_deref(), Some("1"));
    assert_eq!(list[1].is_finished, Some(true));
}

#[tokio::test]
async fn test_get_all_suspend_generic_returns_list() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(200, Fixture::GetFakesListResponse).await;

    let result = datasource(&mock).get_all_suspend_generic().await;

    assert_eq!(result.r().map(|list| list.len()), Some(2));
}

#[tokio::test]
async fn test_generic_error_keeps_message_and_body() {
    let mock = MockServerTest::start().await;
    mock.enqueue_mock_response(500, Some("boom")).await;

    let result = datasource(&mock).get_all_suspend_generic().await;

    assert_eq!(result.l(), NetworkFailure::server("500", "Internal Server Error:boom"));
    let entry = mock.crash_logger().last().expect("failure reported");
    assert_eq!(entry.message.as_deref(), Some("parseGenericError"));
}

#[tokio::test]
async fn test_generic_error_with_status_mapper() {
    let mock = MockServerTest::start().await;
    mock.enqueue_mock_response(401, None).await;
    mock.enqueue_mock_response(503, None).await;
    mock.enqueue_fixture(400, Fixture::ErrorResponse).await;

    let datasource = datasource(&mock);
    let results = run_blocking(move || {
        (
            datasource.get_all_generic_error(),
            datasource.get_all_generic_error(),
            datasource.get_all_generic_error(),
        )
    })
    .await;

    assert_eq!(results.0.l(), NetworkFailure::NotAuthorized);
    assert_eq!(
        results.1.l(),
        NetworkFailure::server("503", "Server error 503: Service Unavailable")
    );
    assert_eq!(results.2.l(), NetworkFailure::server("ERR-001", "Error message"));
}

#[tokio::test]
async fn test_disconnected_sends_nothing() {
    let mock = MockServerTest::start().await;
    mock.configure_network_disconnected();

    let blocking = datasource(&mock);
    let result = run_blocking(move || blocking.get_all()).await;
    assert_eq!(result.l(), NetworkFailure::NoInternetConnection);

    let datasource = datasource(&mock);

    assert_eq!(datasource.get_all_suspend().await.l(), NetworkFailure::NoInternetConnection);
    assert_eq!(
        datasource.get_all_suspend_generic().await.l(),
        NetworkFailure::NoInternetConnection
    );

    mock.assert_no_requests().await;
    let logger = mock.crash_logger();
    assert_eq!(logger.count(), 3);
    let entry = logger.last().expect("failure reported");
    assert_eq!(entry.message.as_deref(), Some("manageRequestException"));
    assert_eq!(entry.value(LOG_REQUEST_METHOD), Some("GET"));
    assert!(entry.value(LOG_REQUEST_URL).is_some_and(|url| url.ends_with("/all")));
}

#[tokio::test]
async fn test_reconnected_sends_again() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(200, Fixture::GetFakesObjectResponse).await;
    let datasource = datasource(&mock);

    mock.configure_network_disconnected();
    assert_eq!(datasource.get_all_suspend().await.l(), NetworkFailure::NoInternetConnection);

    mock.configure_network_connected();
    assert!(datasource.get_all_suspend().await.is_success());
    assert_eq!(mock.received_requests().await.len(), 1);
}

#[tokio::test]
async fn test_timeout() {
    let mock = MockServerTest::start().await;
    mock.enqueue_delayed_response(
        200,
        Some(Fixture::GetFakesObjectResponse.body()),
        Duration::from_secs(2),
    )
    .await;

    let result = datasource_with_short_timeout(&mock).get_all_suspend().await;

    assert_eq!(result.l(), NetworkFailure::Timeout);
}

#[tokio::test]
async fn test_blocking_timeout() {
    let mock = MockServerTest::start().await;
    mock.enqueue_delayed_response(
        200,
        Some(Fixture::GetFakesObjectResponse.body()),
        Duration::from_secs(2),
    )
    .await;

    let datasource = datasource_with_short_timeout(&mock);
    let result = run_blocking(move || datasource.get_all_generic()).await;

    assert_eq!(result.l(), NetworkFailure::Timeout);
}

#[tokio::test]
async fn test_unknown_host() {
    let mock = MockServerTest::start().await;

    let result = datasource_for(&mock, "http://rocket-network.invalid/")
        .get_all_suspend()
        .await;

    assert_eq!(result.l(), NetworkFailure::UnknownHost);
}

#[tokio::test]
async fn test_connection_refused_is_io_failure() {
    let mock = MockServerTest::start().await;

    let result = datasource_for(&mock, "http://127.0.0.1:1/").get_all_suspend().await;

    let failure = result.l();
    assert_eq!(failure.code(), Some("-401"));
    assert!(failure.data().is_some());
    let entry = mock.crash_logger().last().expect("failure reported");
    assert_eq!(entry.message.as_deref(), Some("manageRequestException"));
    assert_eq!(entry.value(LOG_RESPONSE_CODE), Some("-401"));
}

#[tokio::test]
async fn test_domain_mapping_runs_on_success_only() {
    let mock = MockServerTest::start().await;
    mock.enqueue_fixture(200, Fixture::GetFakesObjectResponse).await;
    mock.enqueue_mock_response(204, None).await;

    let datasource = datasource(&mock);
    let (titles, empty) = run_blocking(move || (datasource.titles(), datasource.titles())).await;

    assert_eq!(titles.r().len(), 2);
    assert!(empty.r().is_empty());
}
