//! Routing and serving on top of `dispatch-http`.
//!
//! - [`pattern`] compiles route patterns such as `/users/<int:id>` into anchored regexes
//! - [`router`] keeps the ordered route table and the error handler
//! - [`Dispatcher`] matches a connection against the router and runs the handler
//! - [`Server`] accepts TCP connections and feeds decoded requests to the dispatcher
//!
//! ```no_run
//! use dispatch_web::router::{Router, get};
//! use dispatch_web::{Server, handler_fn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::builder()
//!         .route("/hello/<name>", get(handler_fn(|conn| {
//!             let greeting = format!("hello {}", conn.get_path_argument("name"));
//!             conn.write(greeting).unwrap();
//!         })))
//!         .build()
//!         .unwrap();
//!
//!     Server::builder().address("127.0.0.1:8080").router(router).build().unwrap().start().await.unwrap();
//! }
//! ```

mod dispatcher;
mod handler;
mod server;

pub mod pattern;
pub mod router;

pub use dispatcher::Dispatcher;
pub use handler::FnHandler;
pub use handler::MethodDispatch;
pub use handler::MethodHandler;
pub use handler::RequestHandler;
pub use handler::handler_fn;
pub use handler::method_handler;
pub use router::Router;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;

#[cfg(test)]
mod test_utils {
    use bytes::Bytes;
    use dispatch_http::connection::{Connection, MessageWriter};
    use dispatch_http::protocol::RawRequest;
    use http::Method;
    use tokio::sync::mpsc::UnboundedReceiver;

    pub fn connection(method: Method, uri: &str) -> (Connection, UnboundedReceiver<Bytes>) {
        let (writer, receiver) = MessageWriter::channel();
        let conn = Connection::initialize(RawRequest::new(method, uri), Box::new(writer)).unwrap();
        (conn, receiver)
    }

    /// Everything written to the wire so far, lossily decoded
    pub fn drain(receiver: &mut UnboundedReceiver<Bytes>) -> String {
        let mut wire = Vec::new();
        while let Ok(bytes) = receiver.try_recv() {
            wire.extend_from_slice(&bytes);
        }
        String::from_utf8_lossy(&wire).into_owned()
    }
}
