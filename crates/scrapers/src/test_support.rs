//! In-process mock store server for adapter tests.

use axum::Router;
use storewatch_core::types::StoreTarget;

use crate::client::StoreEndpoints;

/// Serve `router` on an ephemeral local port and return endpoints pointing
/// at it.
pub(crate) async fn serve(router: Router) -> StoreEndpoints {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, router).await.expect("serve mock") });
    StoreEndpoints::with_base(&format!("http://{addr}"))
}

pub(crate) fn target(kind: &str) -> StoreTarget {
    StoreTarget {
        id: "test".into(),
        name: String::new(),
        url: String::new(),
        kind: kind.into(),
        app_id: None,
        package_id: None,
        product_id: None,
    }
}
