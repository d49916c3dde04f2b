use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::{
    DomainError, DomainResult, FlashMessage, SessionRecord, SessionRepositoryInterface,
};
use crate::infrastructure::database::entities::session;
use crate::shared::InfraError;

pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::from(e).into()
}

fn session_model_to_domain(model: session::Model) -> DomainResult<SessionRecord> {
    let flashes: Vec<FlashMessage> =
        serde_json::from_str(&model.flashes).map_err(InfraError::from)?;
    Ok(SessionRecord {
        id: model.id,
        user_id: model.user_id,
        flashes,
        created_at: model.created_at,
        expires_at: model.expires_at,
    })
}

#[async_trait]
impl SessionRepositoryInterface for SessionRepository {
    async fn get_session(&self, id: &str) -> DomainResult<Option<SessionRecord>> {
        let model = session::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        model.map(session_model_to_domain).transpose()
    }

    async fn save_session(&self, record: &SessionRecord) -> DomainResult<()> {
        let flashes = serde_json::to_string(&record.flashes).map_err(InfraError::from)?;

        let existing = session::Entity::find_by_id(record.id.as_str())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        match existing {
            Some(existing) => {
                let mut active: session::ActiveModel = existing.into();
                active.user_id = Set(record.user_id.clone());
                active.flashes = Set(flashes);
                active.expires_at = Set(record.expires_at);
                active.update(&self.db).await.map_err(db_err)?;
            }
            None => {
                let active = session::ActiveModel {
                    id: Set(record.id.clone()),
                    user_id: Set(record.user_id.clone()),
                    flashes: Set(flashes),
                    created_at: Set(record.created_at),
                    expires_at: Set(record.expires_at),
                };
                active.insert(&self.db).await.map_err(db_err)?;
            }
        }

        Ok(())
    }

    async fn delete_session(&self, id: &str) -> DomainResult<()> {
        session::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: &str) -> DomainResult<u64> {
        let result = session::Entity::delete_many()
            .filter(session::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> DomainResult<u64> {
        let result = session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }
}
