//! Fake backend used by the datasource tests
//!
//! Mirrors a typical backend: an `/all` collection answered either as an
//! enveloped object or as a bare list, single elements under `/element/{id}`,
//! and `{code, message}` or `{code, data}` error bodies.

use rocket_network::{
    status_code_mapper, CallResult, CodeMessageErrorParser, EnvelopeResponse, NetworkDatasource,
    NetworkFailure, Outcome,
};
use rocket_network_commons::{ApiClient, ApiRequest, CrashLogger, HeaderInterceptor};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Base envelope: no code means success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiBase<E> {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<E>,
}

impl<E> Default for ApiBase<E> {
    fn default() -> Self {
        Self {
            code: None,
            message: None,
        }
    }
}

impl<E: Serialize> EnvelopeResponse for ApiBase<E> {
    fn error_code(&self) -> Option<String> {
        self.code.clone()
    }

    fn error_data(&self) -> Option<Value> {
        self.message.as_ref().and_then(|m| serde_json::to_value(m).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleFake {
    pub id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "finished")]
    pub is_finished: Option<bool>,
}

impl EnvelopeResponse for SimpleFake {
    fn is_success(&self) -> bool {
        true
    }
}

/// `{"list": [...]}`; only successful when the list has elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleListFake {
    pub list: Option<Vec<SimpleFake>>,
    #[serde(flatten)]
    pub base: ApiBase<String>,
}

impl EnvelopeResponse for SimpleListFake {
    fn is_success(&self) -> bool {
        self.list.as_ref().is_some_and(|list| !list.is_empty())
    }

    fn error_code(&self) -> Option<String> {
        self.base.error_code()
    }

    fn error_data(&self) -> Option<Value> {
        self.base.error_data()
    }
}

/// Body sent when creating or updating an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequestSimpleFake {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub title: String,
    #[serde(rename = "finished")]
    pub is_finished: bool,
}

pub fn fake_api_request_simple_fake() -> ApiRequestSimpleFake {
    ApiRequestSimpleFake {
        id: String::new(),
        user_id: String::new(),
        title: String::new(),
        is_finished: false,
    }
}

/// Headers every fake request carries
pub mod headers {
    use rocket_network_commons::StaticHeaders;

    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const APPLICATION_JSON: &str = "application/json";
    pub const X_LANG: &str = "x-lang";
    pub const ES: &str = "ES";

    pub fn header_interceptor() -> StaticHeaders {
        StaticHeaders::new()
            .with(CONTENT_TYPE, APPLICATION_JSON)
            .with(X_LANG, ES)
    }
}

pub fn header_interceptor() -> Arc<dyn HeaderInterceptor> {
    Arc::new(headers::header_interceptor())
}

/// Endpoints of the fake backend
#[derive(Clone)]
pub struct SimpleFakeApiService {
    client: Arc<ApiClient>,
}

impl SimpleFakeApiService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn get_all(&self) -> CallResult {
        self.client.execute(ApiRequest::get("/all"))
    }

    pub fn get_all_suspend(&self) -> impl Future<Output = CallResult> + '_ {
        self.client.send(ApiRequest::get("/all"))
    }

    pub fn get_by_id(&self, id: &str) -> CallResult {
        self.client.execute(ApiRequest::get(format!("/element/{}", id)))
    }

    pub fn save_element(&self, data: &ApiRequestSimpleFake) -> CallResult {
        self.client.execute(ApiRequest::post("/all").json(data))
    }

    pub fn update_by_id(&self, id: &str, data: &ApiRequestSimpleFake) -> CallResult {
        self.client.execute(ApiRequest::put(format!("/element/{}", id)).json(data))
    }

    pub fn remove_all(&self) -> CallResult {
        self.client.execute(ApiRequest::delete("/all"))
    }

    pub fn remove_by_element(&self, data: &ApiRequestSimpleFake) -> CallResult {
        self.client.execute(ApiRequest::delete("/all").json(data))
    }

    pub fn remove_by_id(&self, id: &str) -> CallResult {
        self.client.execute(ApiRequest::delete(format!("/all/{}", id)))
    }
}

/// Datasource over the fake backend, parsing `{code, message}` and
/// `{code, data}` error bodies
pub struct SimpleNetworkDatasource {
    api_service: SimpleFakeApiService,
    base: NetworkDatasource,
}

impl SimpleNetworkDatasource {
    pub fn new(api_service: SimpleFakeApiService, crash_logger: Arc<dyn CrashLogger>) -> Self {
        Self {
            api_service,
            base: NetworkDatasource::new(crash_logger)
                .with_error_parser(Arc::new(CodeMessageErrorParser)),
        }
    }

    pub fn get_all(&self) -> Outcome<NetworkFailure, Option<SimpleListFake>> {
        self.base
            .request_api(|| self.api_service.get_all(), |body: Option<SimpleListFake>| body)
    }

    pub async fn get_all_suspend(&self) -> Outcome<NetworkFailure, Option<SimpleListFake>> {
        self.base
            .request_suspend_api(
                || self.api_service.get_all_suspend(),
                |body: Option<SimpleListFake>| body,
            )
            .await
    }

    pub fn get_all_generic(&self) -> Outcome<NetworkFailure, Option<Vec<SimpleFake>>> {
        self.base
            .request_generic_api(
                || self.api_service.get_all(),
                |body: Option<Vec<SimpleFake>>| body,
            )
    }

    pub async fn get_all_suspend_generic(
        &self,
    ) -> Outcome<NetworkFailure, Option<Vec<SimpleFake>>> {
        self.base
            .request_generic_suspend_api(
                || self.api_service.get_all_suspend(),
                |body: Option<Vec<SimpleFake>>| body,
            )
            .await
    }

    /// Generic call whose 401 means the session is gone
    pub fn get_all_generic_error(&self) -> Outcome<NetworkFailure, Option<Vec<SimpleFake>>> {
        self.base.request_generic_api_with(
            || self.api_service.get_all(),
            |body: Option<Vec<SimpleFake>>| body,
            status_code_mapper,
        )
    }

    pub fn get_by_id(&self, id: &str) -> Outcome<NetworkFailure, Option<SimpleFake>> {
        self.base
            .request_api(|| self.api_service.get_by_id(id), |body: Option<SimpleFake>| body)
    }

    pub fn save_element(
        &self,
        data: &ApiRequestSimpleFake,
    ) -> Outcome<NetworkFailure, Option<ApiBase<String>>> {
        self.base
            .request_api(
                || self.api_service.save_element(data),
                |body: Option<ApiBase<String>>| body,
            )
    }

    /// Element titles, or the failure
    pub fn titles(&self) -> Outcome<NetworkFailure, Vec<String>> {
        self.base.request_api(
            || self.api_service.get_all(),
            |body: Option<SimpleListFake>| {
                body.and_then(|b| b.list)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|fake| fake.title)
                    .collect()
            },
        )
    }

    /// Run any enveloped call through this datasource's pipeline
    pub fn request<Api>(
        &self,
        call: impl FnOnce() -> CallResult,
    ) -> Outcome<NetworkFailure, Option<Api>>
    where
        Api: DeserializeOwned + EnvelopeResponse,
    {
        self.base.request_api(call, |body: Option<Api>| body)
    }
}
