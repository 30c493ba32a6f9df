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
use uuid::Uuid;

use common::{
    create_test_class_group, create_test_health_data, create_test_student, create_test_user,
    generate_unique_email,
};

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

async fn list_students(app: axum::Router, cookie: &str) -> Vec<serde_json::Value> {
    let request = Request::builder()
        .method("GET")
        .uri("/api/students")
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn teacher_lists_only_students_of_assigned_groups(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();

    let teacher_email = generate_unique_email();
    let teacher =
        create_test_user(&mut tx, "Teacher One", &teacher_email, "testpass123", Role::Teacher)
            .await;
    let other_teacher = create_test_user(
        &mut tx,
        "Teacher Two",
        &generate_unique_email(),
        "testpass123",
        Role::Teacher,
    )
    .await;

    let own_group = create_test_class_group(&mut tx, "Class 1A", &[teacher.id]).await;
    let other_group = create_test_class_group(&mut tx, "Class 2B", &[other_teacher.id]).await;

    create_test_student(&mut tx, "Visible Student", "p1@test.com", Some(own_group)).await;
    create_test_student(&mut tx, "Hidden Student", "p2@test.com", Some(other_group)).await;
    create_test_student(&mut tx, "Unassigned Student", "p3@test.com", None).await;

    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let cookie = get_session_cookie(app, &teacher_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let students = list_students(app, &cookie).await;

    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["name"], "Visible Student");
}

#[sqlx::test(migrations = "./migrations")]
async fn parent_lists_only_own_children(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();

    let parent_email = generate_unique_email();
    create_test_user(&mut tx, "Parent One", &parent_email, "testpass123", Role::Parent).await;

    create_test_student(&mut tx, "Child A", &parent_email, None).await;
    create_test_student(&mut tx, "Child B", &parent_email, None).await;
    create_test_student(&mut tx, "Other Child", "someone-else@test.com", None).await;

    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let cookie = get_session_cookie(app, &parent_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let students = list_students(app, &cookie).await;

    assert_eq!(students.len(), 2);
    for student in &students {
        assert_eq!(student["parent_email"], parent_email.as_str());
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn admin_lists_all_students(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();

    let admin_email = generate_unique_email();
    create_test_user(&mut tx, "Admin", &admin_email, "testpass123", Role::Admin).await;

    create_test_student(&mut tx, "Student A", "p1@test.com", None).await;
    create_test_student(&mut tx, "Student B", "p2@test.com", None).await;

    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let cookie = get_session_cookie(app, &admin_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let students = list_students(app, &cookie).await;

    assert_eq!(students.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn any_authenticated_role_can_create_a_student(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let parent_email = generate_unique_email();
    create_test_user(&mut tx, "Parent One", &parent_email, "testpass123", Role::Parent).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let cookie = get_session_cookie(app, &parent_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/students")
        .header("content-type", "application/json")
        .header("cookie", &cookie)
        .body(Body::from(
            serde_json::to_string(&json!({
                "name": "New Student",
                "address": "5 Elm Road",
                "parent_email": parent_email,
                "contact": "0711111111"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["name"], "New Student");
    assert!(body["class_group_id"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn parent_cannot_update_own_child(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();

    let parent_email = generate_unique_email();
    create_test_user(&mut tx, "Parent One", &parent_email, "testpass123", Role::Parent).await;
    let student_id = create_test_student(&mut tx, "Child A", &parent_email, None).await;

    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let cookie = get_session_cookie(app, &parent_email, "testpass123").await;

    // Readable...
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/students/{}", student_id))
        .header("cookie", &cookie)
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(request).await.unwrap().status(), StatusCode::OK);

    // ...but never writable.
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/students/{}", student_id))
        .header("content-type", "application/json")
        .header("cookie", &cookie)
        .body(Body::from(
            serde_json::to_string(&json!({"name": "Renamed"})).unwrap(),
        ))
        .unwrap();
    assert_eq!(
        app.oneshot(request).await.unwrap().status(),
        StatusCode::FORBIDDEN
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn denied_read_does_not_reveal_existence(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();

    let parent_email = generate_unique_email();
    create_test_user(&mut tx, "Parent One", &parent_email, "testpass123", Role::Parent).await;
    let other_student = create_test_student(&mut tx, "Other Child", "other@test.com", None).await;

    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let cookie = get_session_cookie(app, &parent_email, "testpass123").await;

    // An existing student the parent cannot see...
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/students/{}", other_student))
        .header("cookie", &cookie)
        .body(Body::empty())
        .unwrap();
    let existing = app.oneshot(request).await.unwrap();
    assert_eq!(existing.status(), StatusCode::FORBIDDEN);
    let existing_body = existing.into_body().collect().await.unwrap().to_bytes();

    // ...answers exactly like a student that does not exist.
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/students/{}", Uuid::new_v4()))
        .header("cookie", &cookie)
        .body(Body::empty())
        .unwrap();
    let missing = app.oneshot(request).await.unwrap();
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);
    let missing_body = missing.into_body().collect().await.unwrap().to_bytes();

    assert_eq!(existing_body, missing_body);
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_student_cascades_health_records(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();

    let admin_email = generate_unique_email();
    create_test_user(&mut tx, "Admin", &admin_email, "testpass123", Role::Admin).await;
    let student_id = create_test_student(&mut tx, "Student A", "p@test.com", None).await;
    create_test_health_data(&mut tx, student_id).await;

    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let cookie = get_session_cookie(app, &admin_email, "testpass123").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/students/{}", student_id))
        .header("cookie", &cookie)
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(request).await.unwrap().status(), StatusCode::OK);

    let remaining = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM health_data WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(remaining, 0);

    // Deleting again reports the record as gone, not a crash.
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/students/{}", student_id))
        .header("cookie", &cookie)
        .body(Body::empty())
        .unwrap();
    assert_eq!(
        app.oneshot(request).await.unwrap().status(),
        StatusCode::NOT_FOUND
    );
}
