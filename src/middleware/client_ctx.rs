use crate::actor::Actor;
use crate::constants::ACCESS_TOKEN_KEY;
use crate::identity::{IdentityError, IdentityProvider};
use actix_session::SessionExt;
use actix_web::dev::{self, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web::Data, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

/// Shape in which the identity provider is registered as app data.
pub type IdentityData = Data<Arc<dyn IdentityProvider>>;

/// Client data stored for a single request cycle.
/// Distinct from ClientCtx because it is defined through request data.
#[derive(Clone, Debug)]
pub struct ClientCtxInner {
    /// Resolved identity. Anonymous without a valid token.
    pub actor: Actor,
}

impl Default for ClientCtxInner {
    fn default() -> Self {
        Self {
            actor: Actor::Anonymous,
        }
    }
}

impl ClientCtxInner {
    /// Ask the identity provider who owns `access_token`.
    pub async fn resolve(
        identity: &dyn IdentityProvider,
        access_token: Option<String>,
    ) -> Result<Self, IdentityError> {
        let actor = match &access_token {
            Some(token) => identity.current_actor(token).await?,
            None => Actor::Anonymous,
        };

        Ok(Self { actor })
    }
}

/// Reads the access token from the `Authorization: Bearer` header, falling
/// back to the session cookie.
pub fn access_token_from_request(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    if bearer.is_some() {
        return bearer;
    }

    match req.get_session().get::<String>(ACCESS_TOKEN_KEY) {
        Ok(token) => token.filter(|token| !token.is_empty()),
        Err(e) => {
            log::error!("Unable to read access token from session: {}", e);
            None
        }
    }
}

/// Client context passed to routes.
/// Wraps ClientCtxInner, which is set at the beginning of the request.
#[derive(Clone, Debug)]
pub struct ClientCtx(Data<ClientCtxInner>);

impl Default for ClientCtx {
    fn default() -> Self {
        Self(Data::new(ClientCtxInner::default()))
    }
}

impl ClientCtx {
    pub fn actor(&self) -> &Actor {
        &self.0.actor
    }
}

/// This implementation is what actually provides the `client: ClientCtx` in the parameters of route functions.
///
/// When the middleware already resolved the actor it is reused; otherwise it
/// is resolved here and stored for the rest of the request.
impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(inner) = req.extensions().get::<Data<ClientCtxInner>>() {
            let ctx = Self(inner.clone());
            return Box::pin(ready(Ok(ctx)));
        }

        let identity = match req.app_data::<IdentityData>() {
            Some(identity) => identity.clone(),
            None => {
                return Box::pin(ready(Err(actix_web::error::ErrorServiceUnavailable(
                    "Identity provider is not loaded.",
                ))))
            }
        };

        let req = req.clone();
        let access_token = access_token_from_request(&req);

        Box::pin(async move {
            let inner = Data::new(
                ClientCtxInner::resolve(identity.get_ref().as_ref(), access_token).await?,
            );
            req.extensions_mut().insert(inner.clone());
            Ok(Self(inner))
        })
    }
}

impl<S: 'static, B> Transform<S, ServiceRequest> for ClientCtx
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ClientCtxMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClientCtxMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Client context middleware
pub struct ClientCtxMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ClientCtxMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let access_token = access_token_from_request(req.request());
        let identity = req.app_data::<IdentityData>().cloned();

        // Nothing is stored when resolution fails. Routes that take a
        // `ClientCtx` then retry and report the failure; the rest, such as
        // sign-out, still run.
        Box::pin(async move {
            if let Some(identity) = identity {
                match ClientCtxInner::resolve(identity.get_ref().as_ref(), access_token).await {
                    Ok(inner) => {
                        req.extensions_mut().insert(Data::new(inner));
                    }
                    Err(e) => log::warn!("Unable to resolve client in middleware: {}", e),
                }
            }

            svc.call(req).await
        })
    }
}
