//! Request/response normalization pipeline
//!
//! [`NetworkDatasource`] runs a transport call and turns whatever comes back
//! into an [`Outcome`]. Four call shapes are offered:
//!
//! | | enveloped | generic |
//! |---|---|---|
//! | blocking | [`request_api`] | [`request_generic_api`] |
//! | async | [`request_suspend_api`] | [`request_generic_suspend_api`] |
//!
//! All of them share one classification path. Only the way the call is
//! invoked differs. Every failure is reported to the [`CrashLogger`] exactly
//! once, at the point where it is classified.
//!
//! [`request_api`]: NetworkDatasource::request_api
//! [`request_generic_api`]: NetworkDatasource::request_generic_api
//! [`request_suspend_api`]: NetworkDatasource::request_suspend_api
//! [`request_generic_suspend_api`]: NetworkDatasource::request_generic_suspend_api

use crate::codes::{
    HTTP_EXCEPTION_CODE, JSON_FORMAT, NO_CONNECTION, TIMEOUT, UNKNOWN_ERROR_CODE, UNKNOWN_HOST,
};
use crate::envelope::{EnvelopeResponse, ErrorEnvelope};
use crate::failure::NetworkFailure;
use crate::mapper::parse_to_failure;
use crate::outcome::Outcome;
use crate::parser::{DefaultErrorParser, ErrorParser};
use rocket_network_commons::logger::{LOG_RESPONSE_CODE, LOG_RESPONSE_MESSAGE};
use rocket_network_commons::{
    map_from_request, map_from_response, CrashLogger, LogEntry, LogLevel, LogMap, NetworkException,
    RawResponse,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of a transport call as handed to the pipeline
pub type CallResult = Result<RawResponse, NetworkException>;

/// Where an enveloped failure came from. Transport faults always take the
/// default mapping; response errors go through the caller's mapper.
enum EnvelopeFailure {
    Response(Box<dyn EnvelopeResponse>),
    Transport(ErrorEnvelope),
}

/// Base datasource: owns the diagnostic sink and the error parsing strategy
#[derive(Clone)]
pub struct NetworkDatasource {
    crash_logger: Arc<dyn CrashLogger>,
    error_parser: Arc<dyn ErrorParser>,
    log_path: Option<PathBuf>,
}

impl std::fmt::Debug for NetworkDatasource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkDatasource")
            .field("log_path", &self.log_path)
            .finish_non_exhaustive()
    }
}

impl NetworkDatasource {
    /// Datasource using the default error parser
    pub fn new(crash_logger: Arc<dyn CrashLogger>) -> Self {
        Self {
            crash_logger,
            error_parser: Arc::new(DefaultErrorParser),
            log_path: None,
        }
    }

    pub fn with_error_parser(mut self, error_parser: Arc<dyn ErrorParser>) -> Self {
        self.error_parser = error_parser;
        self
    }

    /// Destination attached to every reported entry
    pub fn with_log_path(mut self, log_path: Option<PathBuf>) -> Self {
        self.log_path = log_path;
        self
    }

    pub fn error_parser(&self) -> &dyn ErrorParser {
        self.error_parser.as_ref()
    }

    // Enveloped responses

    /// Blocking call whose body carries its own success indicator.
    ///
    /// `parser_success` receives `None` when the server sent no body.
    pub fn request_api<Api, Domain>(
        &self,
        call: impl FnOnce() -> CallResult,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned + EnvelopeResponse,
    {
        self.request_api_with(call, parser_success, parse_to_failure)
    }

    /// [`request_api`](Self::request_api) with a custom mapper for response
    /// errors
    pub fn request_api_with<Api, Domain, M>(
        &self,
        call: impl FnOnce() -> CallResult,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
        parser_error: M,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned + EnvelopeResponse,
        M: Fn(&dyn EnvelopeResponse) -> NetworkFailure,
    {
        self.resolve_envelope(call(), parser_success, &parser_error)
    }

    /// Async counterpart of [`request_api`](Self::request_api)
    pub async fn request_suspend_api<Api, Domain, Fut>(
        &self,
        call: impl FnOnce() -> Fut,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned + EnvelopeResponse,
        Fut: Future<Output = CallResult>,
    {
        self.request_suspend_api_with(call, parser_success, parse_to_failure)
            .await
    }

    pub async fn request_suspend_api_with<Api, Domain, Fut, M>(
        &self,
        call: impl FnOnce() -> Fut,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
        parser_error: M,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned + EnvelopeResponse,
        Fut: Future<Output = CallResult>,
        M: Fn(&dyn EnvelopeResponse) -> NetworkFailure,
    {
        let result = call().await;
        self.resolve_envelope(result, parser_success, &parser_error)
    }

    /// Async enveloped call raced against `cancel`.
    ///
    /// If `cancel` completes first the in-flight request is dropped and the
    /// call fails as a cancelled I/O fault.
    pub async fn request_suspend_api_cancellable<Api, Domain, Fut, C>(
        &self,
        call: impl FnOnce() -> Fut,
        cancel: C,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned + EnvelopeResponse,
        Fut: Future<Output = CallResult>,
        C: Future<Output = ()>,
    {
        self.request_suspend_api_cancellable_with(call, cancel, parser_success, parse_to_failure)
            .await
    }

    pub async fn request_suspend_api_cancellable_with<Api, Domain, Fut, C, M>(
        &self,
        call: impl FnOnce() -> Fut,
        cancel: C,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
        parser_error: M,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned + EnvelopeResponse,
        Fut: Future<Output = CallResult>,
        C: Future<Output = ()>,
        M: Fn(&dyn EnvelopeResponse) -> NetworkFailure,
    {
        let result = race(call(), cancel).await;
        self.resolve_envelope(result, parser_success, &parser_error)
    }

    // Generic responses

    /// Blocking call whose success is decided by HTTP status alone
    pub fn request_generic_api<Api, Domain>(
        &self,
        call: impl FnOnce() -> CallResult,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned,
    {
        self.resolve_generic(call(), parser_success, None)
    }

    /// [`request_generic_api`](Self::request_generic_api) with a custom mapper.
    ///
    /// The mapper receives the envelope built by the error parser's
    /// `parse_error_type` instead of `parse_generic_error_type` being used.
    pub fn request_generic_api_with<Api, Domain, M>(
        &self,
        call: impl FnOnce() -> CallResult,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
        parser_error: M,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned,
        M: Fn(&dyn EnvelopeResponse) -> NetworkFailure,
    {
        self.resolve_generic(call(), parser_success, Some(&parser_error))
    }

    pub async fn request_generic_suspend_api<Api, Domain, Fut>(
        &self,
        call: impl FnOnce() -> Fut,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned,
        Fut: Future<Output = CallResult>,
    {
        let result = call().await;
        self.resolve_generic(result, parser_success, None)
    }

    pub async fn request_generic_suspend_api_with<Api, Domain, Fut, M>(
        &self,
        call: impl FnOnce() -> Fut,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
        parser_error: M,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned,
        Fut: Future<Output = CallResult>,
        M: Fn(&dyn EnvelopeResponse) -> NetworkFailure,
    {
        let result = call().await;
        self.resolve_generic(result, parser_success, Some(&parser_error))
    }

    /// Async generic call raced against `cancel`
    pub async fn request_generic_suspend_api_cancellable<Api, Domain, Fut, C>(
        &self,
        call: impl FnOnce() -> Fut,
        cancel: C,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned,
        Fut: Future<Output = CallResult>,
        C: Future<Output = ()>,
    {
        let result = race(call(), cancel).await;
        self.resolve_generic(result, parser_success, None)
    }

    pub async fn request_generic_suspend_api_cancellable_with<Api, Domain, Fut, C, M>(
        &self,
        call: impl FnOnce() -> Fut,
        cancel: C,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
        parser_error: M,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned,
        Fut: Future<Output = CallResult>,
        C: Future<Output = ()>,
        M: Fn(&dyn EnvelopeResponse) -> NetworkFailure,
    {
        let result = race(call(), cancel).await;
        self.resolve_generic(result, parser_success, Some(&parser_error))
    }

    // Shared pipeline

    fn resolve_envelope<Api, Domain>(
        &self,
        result: CallResult,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
        parser_error: &dyn Fn(&dyn EnvelopeResponse) -> NetworkFailure,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned + EnvelopeResponse,
    {
        let outcome = match result {
            Ok(response) => self.classify_envelope(&response, parser_success),
            Err(exception) => {
                let envelope = self.normalize_exception(&exception);
                Outcome::Failure(EnvelopeFailure::Transport(envelope))
            }
        };

        outcome.map_failure(|failure| match failure {
            EnvelopeFailure::Response(envelope) => parser_error(&*envelope),
            EnvelopeFailure::Transport(envelope) => parse_to_failure(&envelope),
        })
    }

    fn resolve_generic<Api, Domain>(
        &self,
        result: CallResult,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
        parser_error: Option<&dyn Fn(&dyn EnvelopeResponse) -> NetworkFailure>,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned,
    {
        match result {
            Ok(response) => self.classify_generic(&response, parser_success, parser_error),
            Err(exception) => {
                Outcome::Failure(parse_to_failure(&self.normalize_exception(&exception)))
            }
        }
    }

    /// Success needs a 2xx status and a body that is absent or reports
    /// success itself
    fn classify_envelope<Api, Domain>(
        &self,
        response: &RawResponse,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
    ) -> Outcome<EnvelopeFailure, Domain>
    where
        Api: DeserializeOwned + EnvelopeResponse,
    {
        if !response.is_successful() {
            self.report(LogLevel::Error, "parseErrorBody", None, map_from_response(response));
            let envelope = self.error_parser.parse_error_type(
                response.status,
                &response.message,
                response.body_text(),
            );
            return Outcome::Failure(EnvelopeFailure::Response(envelope));
        }

        let text = match response.body_text() {
            Some(text) => text,
            None => return Outcome::Success(parser_success(None)),
        };

        match serde_json::from_str::<Api>(text) {
            Ok(body) if body.is_success() => Outcome::Success(parser_success(Some(body))),
            Ok(body) => {
                self.report(LogLevel::Error, "parseError", None, map_from_response(response));
                let code = body.error_code().unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string());
                Outcome::Failure(EnvelopeFailure::Response(Box::new(ErrorEnvelope {
                    code: Some(code),
                    data: body.error_data(),
                    body: Some(text.to_string()),
                })))
            }
            Err(e) => {
                self.report(
                    LogLevel::Error,
                    "parseError",
                    Some(e.to_string()),
                    map_from_response(response),
                );
                Outcome::Failure(EnvelopeFailure::Response(Box::new(ErrorEnvelope {
                    code: Some(JSON_FORMAT.to_string()),
                    data: Some(Value::String(e.to_string())),
                    body: Some(text.to_string()),
                })))
            }
        }
    }

    /// Success is a 2xx status; the body is only decoded, never inspected
    fn classify_generic<Api, Domain>(
        &self,
        response: &RawResponse,
        parser_success: impl FnOnce(Option<Api>) -> Domain,
        parser_error: Option<&dyn Fn(&dyn EnvelopeResponse) -> NetworkFailure>,
    ) -> Outcome<NetworkFailure, Domain>
    where
        Api: DeserializeOwned,
    {
        if !response.is_successful() {
            self.report(LogLevel::Error, "parseGenericError", None, map_from_response(response));
            let failure = match parser_error {
                Some(mapper) => {
                    let envelope = self.error_parser.parse_error_type(
                        response.status,
                        &response.message,
                        response.body_text(),
                    );
                    mapper(&*envelope)
                }
                None => self.error_parser.parse_generic_error_type(
                    response.status,
                    &response.message,
                    response.body_text(),
                ),
            };
            return Outcome::Failure(failure);
        }

        let text = match response.body_text() {
            Some(text) => text,
            None => return Outcome::Success(parser_success(None)),
        };

        match serde_json::from_str::<Api>(text) {
            Ok(body) => Outcome::Success(parser_success(Some(body))),
            Err(e) => {
                self.report(
                    LogLevel::Error,
                    "parseGenericError",
                    Some(e.to_string()),
                    map_from_response(response),
                );
                Outcome::Failure(NetworkFailure::JsonFormat(Some(e.to_string())))
            }
        }
    }

    /// Transport faults never carry a response. They become envelopes with a
    /// raw error code so the mapper can route them.
    fn normalize_exception(&self, exception: &NetworkException) -> ErrorEnvelope {
        let envelope = match exception {
            NetworkException::NoConnection { .. } => ErrorEnvelope::new(NO_CONNECTION, None),
            NetworkException::Timeout { .. } => ErrorEnvelope::new(TIMEOUT, None),
            NetworkException::UnknownHost { .. } => ErrorEnvelope::new(UNKNOWN_HOST, None),
            NetworkException::Io { .. } | NetworkException::Cancelled { .. } => {
                ErrorEnvelope::with_message(HTTP_EXCEPTION_CODE, exception.to_string())
            }
        };

        let mut map = exception.request().map(map_from_request).unwrap_or_default();
        map.insert(LOG_RESPONSE_CODE.to_string(), envelope.code.clone());
        map.insert(LOG_RESPONSE_MESSAGE.to_string(), Some(exception.to_string()));
        self.report(
            LogLevel::Error,
            "manageRequestException",
            Some(exception.to_string()),
            map,
        );

        envelope
    }

    fn report(&self, level: LogLevel, message: &str, exception: Option<String>, map: LogMap) {
        let mut entry = LogEntry::new(level)
            .message(message)
            .map(map)
            .log_path(self.log_path.clone());
        entry.exception = exception;
        self.crash_logger.log(entry);
    }
}

/// `cancel` wins ties so an already-cancelled call never reaches the server
async fn race<Fut, C>(call: Fut, cancel: C) -> CallResult
where
    Fut: Future<Output = CallResult>,
    C: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = cancel => Err(NetworkException::cancelled()),
        result = call => result,
    }
}
