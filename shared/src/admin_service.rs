use crate::http::{make_error_response, make_text_response};
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

/// Serves `/health` and `/ready` on the admin listener. The process holds no
/// state that must warm up, so it is ready as soon as it is listening.
pub struct AdminService<E> {
    _error: PhantomData<fn() -> E>,
}

impl<E> AdminService<E> {
    pub fn new() -> Self {
        Self {
            _error: PhantomData,
        }
    }
}

impl<E> Default for AdminService<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, B> Service<Request<B>> for AdminService<E>
where
    E: Send + 'static,
{
    type Response = Response<BoxBody<Bytes, E>>;
    type Error = E;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let res = match req.uri().path() {
            "/health" | "/ready" => make_text_response(StatusCode::OK, "ok\n"),
            _ => make_error_response(StatusCode::NOT_FOUND),
        };

        Box::pin(async move { Ok(res) })
    }
}
