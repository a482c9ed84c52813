//! Keeps a panicking request handler from taking other requests down with it.
//!
//! The panic is caught at the boundary of the wrapped service, logged, counted and turned into a 500 response. Other
//! requests in flight on the same worker are unaffected.
use std::{
    any::Any,
    future::{ready, Ready},
    panic::AssertUnwindSafe,
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::{future::LocalBoxFuture, FutureExt};
use log::error;

use crate::{errors::ServerError, metrics::GatewayMetrics};

#[derive(Clone, Copy, Debug, Default)]
pub struct PanicGuardFactory;

impl<S, B> Transform<S, ServiceRequest> for PanicGuardFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = PanicGuardService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PanicGuardService { service: Rc::new(service) }))
    }
}

pub struct PanicGuardService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for PanicGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        // The router needs sole ownership of the request, so no `HttpRequest` clone may outlive this point
        let path = req.path().to_string();
        let metrics = req.app_data::<web::Data<GatewayMetrics>>().cloned();
        Box::pin(async move {
            let result = AssertUnwindSafe(async move { service.call(req).await }).catch_unwind().await;
            match result {
                Ok(res) => res,
                Err(panic) => {
                    error!("💥️ The handler for {path} panicked: {}", panic_message(panic.as_ref()));
                    if let Some(metrics) = metrics {
                        GatewayMetrics::inc(&metrics.handler_panics);
                    }
                    Err(ServerError::Unspecified("The request could not be completed.".into()).into())
                },
            }
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}
