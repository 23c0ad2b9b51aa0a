//! In-process fake of the habits backend for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::Router;

/// Every request URI (path plus query) the fake backend received, in order.
#[derive(Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<String>>>);

impl RequestLog {
    pub fn uris(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, path_prefix: &str) -> usize {
        self.uris().iter().filter(|u| u.starts_with(path_prefix)).count()
    }

    pub fn find(&self, path_prefix: &str) -> Option<String> {
        self.uris().into_iter().find(|u| u.starts_with(path_prefix))
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> (String, RequestLog) {
    let log = RequestLog::default();
    let recorder = log.clone();
    let router = router.layer(middleware::from_fn(move |req: Request, next: Next| {
        let recorder = recorder.clone();
        async move {
            recorder.0.lock().unwrap().push(req.uri().to_string());
            next.run(req).await
        }
    }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), log)
}
