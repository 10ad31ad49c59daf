//! Request handler abstractions.
//!
//! A [`RequestHandler`] runs to completion on a [`Connection`]. Handlers can
//! be built from closures with [`handler_fn`], or from a per-method table with
//! [`MethodHandler`] and [`method_handler`].

use dispatch_http::connection::Connection;
use dispatch_http::protocol::HttpMethod;
use tracing::warn;

pub trait RequestHandler: Send + Sync {
    fn handle(&self, conn: &mut Connection);
}

impl<T: RequestHandler + ?Sized> RequestHandler for Box<T> {
    fn handle(&self, conn: &mut Connection) {
        (**self).handle(conn);
    }
}

impl<T: RequestHandler + ?Sized> RequestHandler for std::sync::Arc<T> {
    fn handle(&self, conn: &mut Connection) {
        (**self).handle(conn);
    }
}

/// A closure holder, see [`handler_fn`]
#[derive(Debug, Clone, Copy)]
pub struct FnHandler<F> {
    f: F,
}

/// Wraps any `Fn(&mut Connection)` into a [`RequestHandler`]
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&mut Connection) + Send + Sync,
{
    FnHandler { f }
}

impl<F> RequestHandler for FnHandler<F>
where
    F: Fn(&mut Connection) + Send + Sync,
{
    fn handle(&self, conn: &mut Connection) {
        (self.f)(conn);
    }
}

fn not_found(conn: &mut Connection) {
    if let Err(e) = conn.send_error(404) {
        warn!(method = %conn.method(), path = %conn.path(), cause = %e, "failed to send 404");
    }
}

/// One entry point per method. Every method not overridden answers `404`.
pub trait MethodHandler: Send + Sync {
    fn get(&self, conn: &mut Connection) {
        not_found(conn);
    }

    fn post(&self, conn: &mut Connection) {
        not_found(conn);
    }

    fn put(&self, conn: &mut Connection) {
        not_found(conn);
    }

    fn patch(&self, conn: &mut Connection) {
        not_found(conn);
    }

    fn delete(&self, conn: &mut Connection) {
        not_found(conn);
    }

    fn head(&self, conn: &mut Connection) {
        not_found(conn);
    }

    fn options(&self, conn: &mut Connection) {
        not_found(conn);
    }
}

/// Adapts a [`MethodHandler`] into a [`RequestHandler`], see [`method_handler`]
#[derive(Debug, Clone, Copy)]
pub struct MethodDispatch<T> {
    inner: T,
}

pub fn method_handler<T: MethodHandler>(inner: T) -> MethodDispatch<T> {
    MethodDispatch { inner }
}

impl<T: MethodHandler> RequestHandler for MethodDispatch<T> {
    fn handle(&self, conn: &mut Connection) {
        match conn.method() {
            HttpMethod::Get => self.inner.get(conn),
            HttpMethod::Post => self.inner.post(conn),
            HttpMethod::Put => self.inner.put(conn),
            HttpMethod::Patch => self.inner.patch(conn),
            HttpMethod::Delete => self.inner.delete(conn),
            HttpMethod::Head => self.inner.head(conn),
            HttpMethod::Options => self.inner.options(conn),
            HttpMethod::Other => not_found(conn),
        }
    }
}
