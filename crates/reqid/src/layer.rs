//! tower integration: inject identifiers into `http::Request` extensions.
//!
//! The layer stores a [`RequestVars`] extension on every request before the
//! inner service sees it. An existing `RequestVars` (set by an outer layer)
//! is reused so other variables survive.

use std::task::{Context, Poll};

use tower::{Layer, Service};

use crate::config::{materialize, IdConfig, RawIdConfig};
use crate::error::ConfigError;
use crate::handler::RequestIdInjector;
use crate::reload::ConfigHandle;
use crate::store::RequestVars;

/// Layer that wraps services with [`RequestIdService`].
#[derive(Debug, Clone, Default)]
pub struct RequestIdLayer {
    injector: RequestIdInjector,
}

impl RequestIdLayer {
    /// Activate from raw configuration. No layer is produced if the
    /// configuration is rejected.
    pub fn activate(raw: &RawIdConfig) -> Result<Self, ConfigError> {
        let config = materialize(raw)?;
        tracing::info!(
            length = config.length().get(),
            additional = ?config.additional().map(|(name, _)| name).collect::<Vec<_>>(),
            "request_id middleware activated"
        );
        Ok(Self::new(config))
    }

    pub fn new(config: IdConfig) -> Self {
        Self {
            injector: RequestIdInjector::new(config),
        }
    }

    pub fn config_handle(&self) -> &ConfigHandle {
        self.injector.config_handle()
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService {
            inner,
            injector: self.injector.clone(),
        }
    }
}

/// Service that injects request identifiers, then calls the inner service.
///
/// The inner service's future and error are returned as-is.
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
    injector: RequestIdInjector,
}

impl<S, B> Service<http::Request<B>> for RequestIdService<S>
where
    S: Service<http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<B>) -> Self::Future {
        let mut vars = req
            .extensions_mut()
            .remove::<RequestVars>()
            .unwrap_or_default();
        self.injector.inject(&mut vars);
        req.extensions_mut().insert(vars);

        self.inner.call(req)
    }
}
