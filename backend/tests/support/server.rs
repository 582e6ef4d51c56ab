//! In-process HTTP server shared by the behaviour suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. Dropping the harness stops the server
//! even if a step panics.

use std::future::Future;
use std::net::TcpListener;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use hello_assistant::Trace;
use hello_assistant::inbound::http::assistant::chat_resource;
use hello_assistant::inbound::http::greeting::get_greeting;
use hello_assistant::inbound::http::state::HttpState;

pub(crate) struct TestServer {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    handle: ServerHandle,
}

impl TestServer {
    /// Bind an ephemeral port and serve the API with `state`.
    pub(crate) fn start(state: HttpState) -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        let local = LocalSet::new();
        let (base_url, handle) = local.block_on(&runtime, spawn_server(state));
        Self {
            runtime,
            local,
            base_url,
            handle,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Drive `operation` while the server keeps serving.
    pub(crate) fn block_on<F: Future>(&self, operation: F) -> F::Output {
        self.local.block_on(&self.runtime, operation)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let handle = self.handle.clone();
        self.local.block_on(&self.runtime, async move {
            handle.stop(true).await;
        });
    }
}

async fn spawn_server(state: HttpState) -> (String, ServerHandle) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    let data = web::Data::new(state);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Trace)
            .service(get_greeting)
            .service(chat_resource())
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .expect("listen")
    .run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{addr}"), handle)
}
