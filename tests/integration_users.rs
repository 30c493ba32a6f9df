mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use healthtrack::config::cors::CorsConfig;
use healthtrack::config::session::SessionConfig;
use healthtrack::policy::Role;
use healthtrack::router::init_router;
use healthtrack::state::AppState;
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{create_test_user, generate_unique_email};

async fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool,
        cors_config: CorsConfig::from_env(),
        session_config: SessionConfig::from_env(),
    };
    init_router(state)
}

async fn get_session_cookie(app: axum::Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({"email": email, "password": password})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[sqlx::test(migrations = "./migrations")]
async fn non_admin_user_listing_is_empty(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let parent_email = generate_unique_email();
    create_test_user(&mut tx, "Parent One", &parent_email, "testpass123", Role::Parent).await;
    create_test_user(&mut tx, "Teacher One", &generate_unique_email(), "testpass123", Role::Teacher)
        .await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let cookie = get_session_cookie(app, &parent_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/users")
        .header("cookie", &cookie)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let users: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
    assert!(users.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn admin_lists_all_users(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin_email = generate_unique_email();
    create_test_user(&mut tx, "Admin", &admin_email, "testpass123", Role::Admin).await;
    create_test_user(&mut tx, "Parent One", &generate_unique_email(), "testpass123", Role::Parent)
        .await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let cookie = get_session_cookie(app, &admin_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/users")
        .header("cookie", &cookie)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let users: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(users.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn user_reads_self_but_not_others(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let parent_email = generate_unique_email();
    let parent =
        create_test_user(&mut tx, "Parent One", &parent_email, "testpass123", Role::Parent).await;
    let other = create_test_user(
        &mut tx,
        "Parent Two",
        &generate_unique_email(),
        "testpass123",
        Role::Parent,
    )
    .await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let cookie = get_session_cookie(app, &parent_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/users/{}", parent.id))
        .header("cookie", &cookie)
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(request).await.unwrap().status(), StatusCode::OK);

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/users/{}", other.id))
        .header("cookie", &cookie)
        .body(Body::empty())
        .unwrap();
    assert_eq!(
        app.oneshot(request).await.unwrap().status(),
        StatusCode::FORBIDDEN
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn user_updates_own_profile_but_not_own_role(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let parent_email = generate_unique_email();
    let parent =
        create_test_user(&mut tx, "Parent One", &parent_email, "testpass123", Role::Parent).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let cookie = get_session_cookie(app, &parent_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/users/{}", parent.id))
        .header("content-type", "application/json")
        .header("cookie", &cookie)
        .body(Body::from(
            serde_json::to_string(&json!({"name": "Renamed Parent"})).unwrap(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["name"], "Renamed Parent");

    // Self-service stops at privilege escalation.
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/users/{}", parent.id))
        .header("content-type", "application/json")
        .header("cookie", &cookie)
        .body(Body::from(
            serde_json::to_string(&json!({"role": "admin"})).unwrap(),
        ))
        .unwrap();
    assert_eq!(
        app.oneshot(request).await.unwrap().status(),
        StatusCode::FORBIDDEN
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn only_admins_create_users(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin_email = generate_unique_email();
    create_test_user(&mut tx, "Admin", &admin_email, "testpass123", Role::Admin).await;
    let teacher_email = generate_unique_email();
    create_test_user(&mut tx, "Teacher One", &teacher_email, "testpass123", Role::Teacher).await;
    tx.commit().await.unwrap();

    let payload = json!({
        "name": "New Parent",
        "email": generate_unique_email(),
        "password": "password123",
        "role": "parent"
    });

    let app = setup_test_app(pool.clone()).await;
    let teacher_cookie = get_session_cookie(app, &teacher_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header("content-type", "application/json")
        .header("cookie", &teacher_cookie)
        .body(Body::from(serde_json::to_string(&payload).unwrap()))
        .unwrap();
    assert_eq!(
        app.oneshot(request).await.unwrap().status(),
        StatusCode::FORBIDDEN
    );

    let app = setup_test_app(pool.clone()).await;
    let admin_cookie = get_session_cookie(app, &admin_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header("content-type", "application/json")
        .header("cookie", &admin_cookie)
        .body(Body::from(serde_json::to_string(&payload).unwrap()))
        .unwrap();
    assert_eq!(
        app.oneshot(request).await.unwrap().status(),
        StatusCode::CREATED
    );
}
