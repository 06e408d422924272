mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use common::TestApp;
use l1nkzip::api::handlers::link_info_handler;

fn server(app: &TestApp) -> TestServer {
    let router = Router::new()
        .route("/url/{code}", get(link_info_handler))
        .with_state(app.state());

    TestServer::new(router).unwrap()
}

#[tokio::test]
async fn test_link_info() {
    let app = TestApp::new().await;
    let short = app
        .service
        .create_short_link("https://example.com/info")
        .await
        .unwrap();
    app.service
        .resolve_short_link(&short.link.code)
        .await
        .unwrap();
    let server = server(&app);

    let response = server.get(&format!("/url/{}", short.link.code)).await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["link"], short.link.code);
    assert_eq!(json["full_link"], short.full_link);
    assert_eq!(json["url"], "https://example.com/info");
    assert_eq!(json["visits"], 1);
    assert!(json["created_at"].is_string());
}

#[tokio::test]
async fn test_link_info_not_found() {
    let app = TestApp::new().await;
    let server = server(&app);

    server.get("/url/5wppq").await.assert_status_not_found();
}
