use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr,
};

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, UpdateUserDto, User, UserRepositoryInterface,
};
use crate::infrastructure::database::entities::user;
use crate::shared::InfraError;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at,
        updated_at: model.updated_at,
        last_login_at: model.last_login_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::from(e).into()
}

fn write_err(e: sea_orm::DbErr) -> DomainError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        DomainError::Conflict("This username already exists.".to_string())
    } else {
        db_err(e)
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        let now = Utc::now();

        let new_user = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(dto.username),
            email: Set(dto.email),
            password_hash: Set(dto.password_hash),
            created_at: Set(now),
            updated_at: Set(now),
            last_login_at: Set(None),
        };

        let model = new_user.insert(&self.db).await.map_err(write_err)?;
        Ok(user_model_to_domain(model))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn username_taken(
        &self,
        username: &str,
        excluding_id: Option<&str>,
    ) -> DomainResult<bool> {
        let mut query = user::Entity::find().filter(user::Column::Username.eq(username));
        if let Some(id) = excluding_id {
            query = query.filter(user::Column::Id.ne(id));
        }

        let count = query.count(&self.db).await.map_err(db_err)?;
        Ok(count > 0)
    }

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let existing = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();
        active.username = Set(dto.username);
        active.email = Set(dto.email);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(write_err)?;

        Ok(Some(user_model_to_domain(updated)))
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let existing = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found("id", id))?;

        let mut active: user::ActiveModel = existing.into();
        active.last_login_at = Set(Some(at));
        active.update(&self.db).await.map_err(db_err)?;

        Ok(())
    }

    async fn delete_user(&self, id: &str) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::user_not_found("id", id));
        }

        Ok(())
    }
}
