use healthtrack::policy::Role;
use healthtrack::utils::password::hash_password;
#[allow(unused_imports)]
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

/// Create a test user with the given role.
pub async fn create_test_user(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> TestUser {
    let hashed = hash_password(password).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (name, email, password, role)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(&hashed)
    .bind(role)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestUser {
        id,
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[allow(dead_code)]
pub async fn create_test_class_group(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    teacher_ids: &[Uuid],
) -> Uuid {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO class_groups (name) VALUES ($1) RETURNING id",
    )
    .bind(name)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    for teacher_id in teacher_ids {
        sqlx::query("INSERT INTO class_group_teachers (class_group_id, teacher_id) VALUES ($1, $2)")
            .bind(id)
            .bind(teacher_id)
            .execute(&mut **tx)
            .await
            .unwrap();
    }

    id
}

#[allow(dead_code)]
pub async fn create_test_student(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    parent_email: &str,
    class_group_id: Option<Uuid>,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO students (name, address, parent_email, contact, class_group_id)
         VALUES ($1, '1 Test Street', $2, '0700000000', $3)
         RETURNING id",
    )
    .bind(name)
    .bind(parent_email)
    .bind(class_group_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_health_data(
    tx: &mut Transaction<'_, Postgres>,
    student_id: Uuid,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO health_data (student_id, height, weight, blood_type)
         VALUES ($1, 120.5, 25.0, 'O+')
         RETURNING id",
    )
    .bind(student_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_medical_history(
    tx: &mut Transaction<'_, Postgres>,
    student_id: Uuid,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO medical_history (student_id, medical_condition)
         VALUES ($1, 'Asthma')
         RETURNING id",
    )
    .bind(student_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}
