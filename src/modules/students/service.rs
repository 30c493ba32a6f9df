use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::policy::{self, Action, Principal, Resource, StudentAccess, visibility};
use crate::utils::errors::AppError;

use super::model::{CreateStudentDto, Student, StudentWithAccess, UpdateStudentDto};

const STUDENT_COLUMNS: &str =
    "s.id, s.name, s.date_of_birth, s.gender, s.address, s.parent_email, s.contact, s.class_group_id";

const TEACHER_SET_JOIN: &str = "LEFT JOIN (
         SELECT class_group_id, array_agg(teacher_id) AS teacher_ids
         FROM class_group_teachers
         GROUP BY class_group_id
     ) t ON t.class_group_id = s.class_group_id";

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, principal: &Principal) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, StudentWithAccess>(&format!(
            "SELECT {STUDENT_COLUMNS},
                    COALESCE(t.teacher_ids, ARRAY[]::uuid[]) AS teacher_ids
             FROM students s
             {TEACHER_SET_JOIN}
             ORDER BY s.name"
        ))
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(visibility::filter_students(principal, students)
            .into_iter()
            .map(|row| row.student)
            .collect())
    }

    /// Any authenticated role may register a student.
    #[instrument(skip(db, dto))]
    pub async fn create(
        db: &PgPool,
        principal: &Principal,
        dto: CreateStudentDto,
    ) -> Result<Student, AppError> {
        policy::authorize(principal, Action::Create, Resource::Student(None)).require()?;

        if let Some(group_id) = dto.class_group_id {
            Self::check_class_group(db, group_id).await?;
        }

        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO students (name, date_of_birth, gender, address, parent_email, contact, class_group_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, name, date_of_birth, gender, address, parent_email, contact, class_group_id",
        )
        .bind(&dto.name)
        .bind(dto.date_of_birth)
        .bind(&dto.gender)
        .bind(&dto.address)
        .bind(&dto.parent_email)
        .bind(&dto.contact)
        .bind(dto.class_group_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, principal: &Principal, id: Uuid) -> Result<Student, AppError> {
        let row = Self::fetch_with_access(db, id).await?;

        match row {
            Some(row) => {
                policy::authorize(principal, Action::Read, Resource::Student(Some(&row.access())))
                    .require()?;
                Ok(row.student)
            }
            None => Err(policy::not_found_for(principal, "Student")),
        }
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        principal: &Principal,
        id: Uuid,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        policy::authorize(principal, Action::Update, Resource::Student(None)).require()?;

        let existing = Self::fetch_with_access(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?
            .student;

        if let Some(group_id) = dto.class_group_id {
            Self::check_class_group(db, group_id).await?;
        }

        let name = dto.name.unwrap_or(existing.name);
        let date_of_birth = dto.date_of_birth.or(existing.date_of_birth);
        let gender = dto.gender.or(existing.gender);
        let address = dto.address.unwrap_or(existing.address);
        let parent_email = dto.parent_email.unwrap_or(existing.parent_email);
        let contact = dto.contact.unwrap_or(existing.contact);
        let class_group_id = dto.class_group_id.or(existing.class_group_id);

        let student = sqlx::query_as::<_, Student>(
            "UPDATE students
             SET name = $1, date_of_birth = $2, gender = $3, address = $4,
                 parent_email = $5, contact = $6, class_group_id = $7
             WHERE id = $8
             RETURNING id, name, date_of_birth, gender, address, parent_email, contact, class_group_id",
        )
        .bind(&name)
        .bind(date_of_birth)
        .bind(&gender)
        .bind(&address)
        .bind(&parent_email)
        .bind(&contact)
        .bind(class_group_id)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(student)
    }

    /// Health data, medical history and test results of the student are
    /// removed with it (schema ON DELETE CASCADE).
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, principal: &Principal, id: Uuid) -> Result<(), AppError> {
        policy::authorize(principal, Action::Delete, Resource::Student(None)).require()?;

        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        Ok(())
    }

    /// Owner context of a single student, for the health-domain services.
    #[instrument(skip(db))]
    pub async fn student_access(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Option<StudentAccess>, AppError> {
        let row = Self::fetch_with_access(db, student_id).await?;
        Ok(row.map(|r| r.access()))
    }

    async fn fetch_with_access(
        db: &PgPool,
        id: Uuid,
    ) -> Result<Option<StudentWithAccess>, AppError> {
        sqlx::query_as::<_, StudentWithAccess>(&format!(
            "SELECT {STUDENT_COLUMNS},
                    COALESCE(t.teacher_ids, ARRAY[]::uuid[]) AS teacher_ids
             FROM students s
             {TEACHER_SET_JOIN}
             WHERE s.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)
    }

    async fn check_class_group(db: &PgPool, group_id: Uuid) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM class_groups WHERE id = $1)",
        )
        .bind(group_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        if !exists {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "class_group_id must reference an existing class group"
            )));
        }

        Ok(())
    }
}
