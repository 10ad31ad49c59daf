//! Cookies, redirects, form fields and uploads in a handful of handlers.
//!
//! ```bash
//! curl -i -d 'user=ann' http://127.0.0.1:3000/login
//! curl -i -b 'session=ann' http://127.0.0.1:3000/me
//! curl -i -F 'avatar=@Cargo.toml' http://127.0.0.1:3000/upload
//! ```

use dispatch_http::codec::cookie::Cookie;
use dispatch_http::connection::{Connection, ConnectionError};
use dispatch_web::router::{Router, get, post};
use dispatch_web::{MethodHandler, Server, handler_fn, method_handler};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

fn login(conn: &mut Connection) -> Result<(), ConnectionError> {
    let user = conn.get_body_argument("user").to_owned();
    if user.is_empty() {
        return conn.send_error(400);
    }
    conn.set_cookie("session", Cookie::new(user).http_only(true).expires(600))?;
    conn.redirect("/me")
}

fn me(conn: &mut Connection) -> Result<(), ConnectionError> {
    let user = conn.get_cookie("session").to_owned();
    if user.is_empty() {
        return conn.send_error(403);
    }
    conn.write(format!("signed in as {user}"))
}

fn logout(conn: &mut Connection) -> Result<(), ConnectionError> {
    conn.remove_cookie("session", "", "")?;
    conn.set_cookie("session", Cookie::new("").expires(-1))?;
    conn.redirect("/")
}

fn upload(conn: &mut Connection) -> Result<(), ConnectionError> {
    let summary: Vec<String> = conn
        .files()
        .map(|(field, file)| format!("{field}: {} ({} bytes, {})", file.filename, file.size(), file.content_type))
        .collect();
    info!(files = summary.len(), "received upload");
    conn.write(summary.join("\n"))
}

/// A streamed response, flushed once per line
struct Countdown;

impl MethodHandler for Countdown {
    fn get(&self, conn: &mut Connection) {
        let result = (1..=3).rev().try_for_each(|n| {
            conn.write(format!("{n}\n"))?;
            conn.flush()
        });
        if let Err(e) = result.and_then(|()| conn.finish()) {
            error!(cause = %e, "countdown failed");
        }
    }
}

fn logged(f: fn(&mut Connection) -> Result<(), ConnectionError>) -> impl Fn(&mut Connection) + Send + Sync {
    move |conn: &mut Connection| {
        if let Err(e) = f(conn) {
            error!(path = conn.path(), cause = %e, "handler failed");
        }
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = Router::builder()
        .route("/login", post(handler_fn(logged(login))))
        .route("/me", get(handler_fn(logged(me))))
        .route("/logout", get(handler_fn(logged(logout))))
        .route("/upload", post(handler_fn(logged(upload))))
        .route("/countdown", get(method_handler(Countdown)))
        .error_handler(|code: u16, conn: &mut Connection| {
            let result = conn.set_status(code).and_then(|()| conn.write(format!("<h1>{code}</h1>")));
            if let Err(e) = result {
                error!(code, cause = %e, "error page failed");
            }
        })
        .build()
        .expect("routes should compile");

    let server = Server::builder()
        .address("127.0.0.1:3000")
        .router(router)
        .max_body_bytes(1024 * 1024)
        .build()
        .expect("server config should be valid");
    if let Err(e) = server.start().await {
        error!(cause = %e, "server stopped");
    }
}
