use axum::Router;
use std::net::TcpListener;

/// Serve `app` on an ephemeral local port and return its base url.
pub fn spawn_upstream(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .unwrap();
    });
    format!("http://{addr}")
}
