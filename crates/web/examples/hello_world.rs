use dispatch_http::connection::Connection;
use dispatch_web::router::{Router, get, post};
use dispatch_web::{Server, handler_fn};
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

fn hello_world(conn: &mut Connection) {
    if let Err(e) = conn.write("hello world") {
        error!(cause = %e, "write failed");
    }
}

fn hello_name(conn: &mut Connection) {
    let greeting = format!("hello {}", conn.get_path_argument("name"));
    if let Err(e) = conn.write(greeting) {
        error!(cause = %e, "write failed");
    }
}

fn echo(conn: &mut Connection) {
    let body = conn.body().to_vec();
    if let Err(e) = conn.add_header("Content-Type", "application/octet-stream").and_then(|()| conn.write(body)) {
        error!(cause = %e, "echo failed");
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = Router::builder()
        .route("/", get(handler_fn(hello_world)))
        .route("/hello/<name>", get(handler_fn(hello_name)))
        .route("/echo", post(handler_fn(echo)))
        .build()
        .expect("routes should compile");

    let server = Server::builder().address("127.0.0.1:3000").router(router).build().expect("server config should be valid");
    if let Err(e) = server.start().await {
        error!(cause = %e, "server stopped");
    }
}
