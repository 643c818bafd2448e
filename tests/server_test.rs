use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use social_graph::graphql::create_schema_with_hasher;
use social_graph::credentials::Argon2Hasher;
use social_graph::server::create_server;
use social_graph::storage::Collections;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Result<axum::Router> {
    let hasher = Arc::new(Argon2Hasher::with_cost(64, 1)?);
    Ok(create_server(create_schema_with_hasher(
        Collections::in_memory(),
        hasher,
    )))
}

async fn body_json(response: axum::response::Response) -> Result<serde_json::Value> {
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_reports_service() -> Result<()> {
    let response = app()?
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn graphql_endpoint_executes_posted_queries() -> Result<()> {
    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "query": "{ users { id } posts { id } comments { id } }" }).to_string(),
        ))?;

    let response = app()?.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(
        body["data"],
        serde_json::json!({ "users": [], "posts": [], "comments": [] })
    );
    Ok(())
}

#[tokio::test]
async fn graphiql_serves_html() -> Result<()> {
    let response = app()?
        .oneshot(Request::builder().uri("/graphiql").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    assert!(String::from_utf8_lossy(&bytes).contains("/graphql"));
    Ok(())
}
