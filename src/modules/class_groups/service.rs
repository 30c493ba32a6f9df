use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::policy::{self, Action, Principal, Resource, visibility};
use crate::utils::errors::AppError;

use super::model::{ClassGroup, CreateClassGroupDto, UpdateClassGroupDto};

const GROUP_WITH_TEACHERS: &str = "SELECT g.id, g.name,
            COALESCE(t.teacher_ids, ARRAY[]::uuid[]) AS teacher_ids
     FROM class_groups g
     LEFT JOIN (
         SELECT class_group_id, array_agg(teacher_id) AS teacher_ids
         FROM class_group_teachers
         GROUP BY class_group_id
     ) t ON t.class_group_id = g.id";

pub struct ClassGroupService;

impl ClassGroupService {
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, principal: &Principal) -> Result<Vec<ClassGroup>, AppError> {
        let groups = sqlx::query_as::<_, ClassGroup>(&format!(
            "{GROUP_WITH_TEACHERS} ORDER BY g.name"
        ))
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(visibility::filter_class_groups(principal, groups))
    }

    #[instrument(skip(db, dto))]
    pub async fn create(
        db: &PgPool,
        principal: &Principal,
        dto: CreateClassGroupDto,
    ) -> Result<ClassGroup, AppError> {
        policy::authorize(principal, Action::Create, Resource::ClassGroup(None)).require()?;

        Self::check_teacher_ids(db, &dto.teacher_ids).await?;

        let mut tx = db.begin().await.map_err(AppError::database)?;

        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO class_groups (name) VALUES ($1) RETURNING id",
        )
        .bind(&dto.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        sqlx::query(
            "INSERT INTO class_group_teachers (class_group_id, teacher_id)
             SELECT $1, unnest($2::uuid[])",
        )
        .bind(id)
        .bind(&dto.teacher_ids)
        .execute(&mut *tx)
        .await
        .map_err(AppError::database)?;

        tx.commit().await.map_err(AppError::database)?;

        Ok(ClassGroup {
            id,
            name: dto.name,
            teacher_ids: dto.teacher_ids,
        })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, principal: &Principal, id: Uuid) -> Result<ClassGroup, AppError> {
        let group = Self::fetch(db, id).await?;

        match group {
            Some(group) => {
                policy::authorize(
                    principal,
                    Action::Read,
                    Resource::ClassGroup(Some(&group.teacher_ids)),
                )
                .require()?;
                Ok(group)
            }
            None => Err(policy::not_found_for(principal, "Class group")),
        }
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        principal: &Principal,
        id: Uuid,
        dto: UpdateClassGroupDto,
    ) -> Result<ClassGroup, AppError> {
        policy::authorize(principal, Action::Update, Resource::ClassGroup(None)).require()?;

        let existing = Self::fetch(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Class group not found")))?;

        let name = dto.name.unwrap_or(existing.name);
        let teacher_ids = match dto.teacher_ids {
            Some(ids) => {
                Self::check_teacher_ids(db, &ids).await?;
                ids
            }
            None => existing.teacher_ids,
        };

        let mut tx = db.begin().await.map_err(AppError::database)?;

        sqlx::query("UPDATE class_groups SET name = $1 WHERE id = $2")
            .bind(&name)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        sqlx::query("DELETE FROM class_group_teachers WHERE class_group_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        sqlx::query(
            "INSERT INTO class_group_teachers (class_group_id, teacher_id)
             SELECT $1, unnest($2::uuid[])",
        )
        .bind(id)
        .bind(&teacher_ids)
        .execute(&mut *tx)
        .await
        .map_err(AppError::database)?;

        tx.commit().await.map_err(AppError::database)?;

        Ok(ClassGroup {
            id,
            name,
            teacher_ids,
        })
    }

    /// Students of the group are kept; their group reference is nulled by
    /// the schema's ON DELETE SET NULL.
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, principal: &Principal, id: Uuid) -> Result<(), AppError> {
        policy::authorize(principal, Action::Delete, Resource::ClassGroup(None)).require()?;

        let result = sqlx::query("DELETE FROM class_groups WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Class group not found")));
        }

        Ok(())
    }

    async fn fetch(db: &PgPool, id: Uuid) -> Result<Option<ClassGroup>, AppError> {
        sqlx::query_as::<_, ClassGroup>(&format!("{GROUP_WITH_TEACHERS} WHERE g.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)
    }

    async fn check_teacher_ids(db: &PgPool, teacher_ids: &[Uuid]) -> Result<(), AppError> {
        if teacher_ids.is_empty() {
            return Ok(());
        }

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE id = ANY($1) AND role = 'teacher'",
        )
        .bind(teacher_ids)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        if count as usize != teacher_ids.len() {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "teacher_ids must reference teacher accounts"
            )));
        }

        Ok(())
    }
}
