//! Ties the route table to connections.
//!
//! For each request the dispatcher installs the router's error handler on the
//! connection, looks the path up, binds the captured path arguments and runs
//! the matched handler. A miss is answered through the error handler with
//! `404`. If the handler returns without finishing the response, the
//! dispatcher finishes it.

use std::sync::Arc;

use dispatch_http::connection::{Connection, InitError, ReplySink};
use dispatch_http::protocol::RawRequest;
use tracing::{debug, info, warn};

use crate::router::{RouteMatch, Router};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
}

impl Dispatcher {
    pub fn new(router: impl Into<Arc<Router>>) -> Self {
        Self { router: router.into() }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Builds a connection for `raw` and dispatches it
    pub fn serve(&self, raw: RawRequest, sink: Box<dyn ReplySink + Send>) -> Result<(), InitError> {
        let mut conn = Connection::initialize(raw, sink)?;
        self.dispatch(&mut conn);
        Ok(())
    }

    pub fn dispatch(&self, conn: &mut Connection) {
        conn.set_error_handler(Arc::clone(self.router.error_handler()));

        let path = conn.path().to_owned();
        let method = conn.method();
        match self.router.at(&path, method) {
            RouteMatch::Found { handler, params } => {
                debug!(%method, path = %path, params = ?params, "route matched");
                for (name, value) in params {
                    conn.bind_path_argument(name, value);
                }
                handler.handle(conn);
            }
            RouteMatch::NotFound => {
                info!(%method, path = %path, "no route matched");
                if let Err(e) = conn.send_error(404) {
                    warn!(%method, path = %path, cause = %e, "failed to send 404");
                }
            }
        }

        if !conn.is_finished() {
            if let Err(e) = conn.finish() {
                warn!(%method, path = %path, cause = %e, "failed to finish response");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler_fn;
    use crate::router::{get, post};
    use crate::test_utils::{connection, drain};
    use dispatch_http::connection::MessageWriter;
    use http::Method;

    fn dispatcher() -> Dispatcher {
        let router = Router::builder()
            .route(
                "/page/<int:page>",
                get(handler_fn(|conn: &mut Connection| {
                    let page = conn.get_path_argument("page").to_owned();
                    conn.write(format!("page {page}")).unwrap();
                })),
            )
            .route(
                "/stream",
                get(handler_fn(|conn: &mut Connection| {
                    conn.write("a").unwrap();
                    conn.flush().unwrap();
                    conn.write("b").unwrap();
                })),
            )
            .route(
                "/teapot",
                post(handler_fn(|conn: &mut Connection| {
                    conn.send_error(503).unwrap();
                })),
            )
            .build()
            .unwrap();
        Dispatcher::new(router)
    }

    #[test]
    fn test_binds_params_and_finishes() {
        let (mut conn, mut receiver) = connection(Method::GET, "/page/7");
        dispatcher().dispatch(&mut conn);

        assert!(conn.is_finished());
        assert_eq!(conn.get_path_argument("page"), "7");
        let wire = drain(&mut receiver);
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.ends_with("\r\n\r\npage 7"));
    }

    #[test]
    fn test_finishes_chunked_response() {
        let (mut conn, mut receiver) = connection(Method::GET, "/stream");
        dispatcher().dispatch(&mut conn);

        assert!(conn.is_finished());
        assert!(drain(&mut receiver).ends_with("\r\n\r\n1\r\na\r\n1\r\nb\r\n0\r\n\r\n"));
    }

    #[test]
    fn test_not_found() {
        let (mut conn, mut receiver) = connection(Method::GET, "/nowhere");
        dispatcher().dispatch(&mut conn);

        assert_eq!(conn.status(), 404);
        let wire = drain(&mut receiver);
        assert!(wire.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(wire.ends_with("Not Found"));
    }

    #[test]
    fn test_wrong_method_is_not_found() {
        let (mut conn, mut receiver) = connection(Method::DELETE, "/page/1");
        dispatcher().dispatch(&mut conn);
        assert!(drain(&mut receiver).starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[test]
    fn test_handler_uses_error_handler() {
        let (mut conn, mut receiver) = connection(Method::POST, "/teapot");
        dispatcher().dispatch(&mut conn);
        assert!(drain(&mut receiver).starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
    }

    #[test]
    fn test_custom_error_handler() {
        let router = Router::builder()
            .error_handler(|code: u16, conn: &mut Connection| {
                conn.set_status(code).unwrap();
                conn.write(format!("custom {code}")).unwrap();
            })
            .build()
            .unwrap();

        let (mut conn, mut receiver) = connection(Method::GET, "/");
        Dispatcher::new(router).dispatch(&mut conn);

        assert!(conn.is_finished());
        assert!(drain(&mut receiver).ends_with("custom 404"));
    }

    #[test]
    fn test_serve_rejects_bad_request() {
        let (writer, _receiver) = MessageWriter::channel();
        let result = dispatcher().serve(RawRequest::new(Method::GET, "/a b"), Box::new(writer));
        assert!(result.is_err());
    }
}
