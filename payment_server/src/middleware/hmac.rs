//! HMAC middleware for Actix Web.
//!
//! Payment processors sign every webhook delivery with a secret shared with the gateway. The signature is an HMAC of
//! the raw request body, sent hex-encoded in a provider-specific header:
//!
//! * BTCPay Server: HMAC-SHA256 in `BTCPay-Sig`, written as `sha256=<hex>`.
//! * NowPayments: HMAC-SHA512 in `x-nowpayments-sig`.
//!
//! Wrap each webhook route with a [`HmacMiddlewareFactory`] configured for its provider. Requests with a missing or
//! invalid signature are rejected with a 401 before they reach the handler. The body is read in full to check the
//! signature and then handed on to the handler unchanged.
//!
//! If no secret is configured, every delivery is rejected, unless unsigned webhooks have been explicitly allowed.
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use bytes::Bytes;
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use payment_engine::helpers::{verify_signature, SignatureScheme};
use pgw_common::Secret;

use crate::{
    errors::ServerError,
    metrics::{record, GatewayMetrics},
};

pub struct HmacMiddlewareFactory {
    hmac_header: String,
    scheme: SignatureScheme,
    key: Secret<String>,
    // If true, and no key is configured, requests are let through without a signature check
    allow_unsigned: bool,
}

impl HmacMiddlewareFactory {
    pub fn new(hmac_header: &str, scheme: SignatureScheme, key: Secret<String>, allow_unsigned: bool) -> Self {
        HmacMiddlewareFactory { hmac_header: hmac_header.into(), scheme, key, allow_unsigned }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService {
            hmac_header: self.hmac_header.clone(),
            scheme: self.scheme,
            key: self.key.clone(),
            allow_unsigned: self.allow_unsigned,
            service: Rc::new(service),
        }))
    }
}

pub struct HmacMiddlewareService<S> {
    hmac_header: String,
    scheme: SignatureScheme,
    key: Secret<String>,
    allow_unsigned: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let key = self.key.clone();
        let hmac_header = self.hmac_header.clone();
        let scheme = self.scheme;
        let allow_unsigned = self.allow_unsigned;
        Box::pin(async move {
            trace!("🔐️ Checking HMAC for request to {}", req.path());
            if key.is_empty() {
                if allow_unsigned {
                    warn!("🔐️ No webhook secret is configured for {}. Accepting the request UNSIGNED.", req.path());
                    return service.call(req).await;
                }
                warn!("🔐️ No webhook secret is configured for {}. Denying access.", req.path());
                return Err(reject(&req, "Webhook signatures cannot be checked."));
            }
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {e:?}");
                ServerError::InvalidRequestBody("Failed to extract request data.".into())
            })?;
            let signature = match req.headers().get(&hmac_header).and_then(|v| v.to_str().ok()) {
                Some(s) if !s.trim().is_empty() => s.to_string(),
                _ => {
                    warn!("🔐️ No HMAC signature found in request. Denying access.");
                    return Err(reject(&req, "No signature provided."));
                },
            };
            match verify_signature(scheme, key.reveal(), data.as_ref(), &signature) {
                Ok(()) => {
                    trace!("🔐️ HMAC check for request ✅️");
                    req.set_payload(bytes_to_payload(data));
                    service.call(req).await
                },
                Err(e) => {
                    warn!("🔐️ Invalid HMAC signature found in request. {e}. Denying access.");
                    Err(reject(&req, "Invalid signature."))
                },
            }
        })
    }
}

fn reject(req: &ServiceRequest, reason: &str) -> Error {
    record(req.request(), |m| GatewayMetrics::inc(&m.webhook_signature_failures));
    ServerError::AuthenticationError(reason.to_string()).into()
}

fn bytes_to_payload(buf: Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
