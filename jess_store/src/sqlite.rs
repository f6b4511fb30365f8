use async_trait::async_trait;
use jess_core::{DialogError, DialogId, Message, MessageStore, Result};
use jess_entities::messages;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Schema,
};
use std::path::Path;
use tracing::{debug, info};

use crate::convert::{active_model_from_message, message_from_model};

fn is_table_already_exists_error(err: &DbErr) -> bool {
    err.to_string().contains("table") && err.to_string().contains("already exists")
}

/// Message log persisted in SQLite.
pub struct SqliteMessageStore {
    db: DatabaseConnection,
}

impl SqliteMessageStore {
    /// Open (creating if needed) the database file at `db_path`.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(DialogError::storage)?;
        }
        Self::connect(&format!("sqlite://{}?mode=rwc", db_path.display())).await
    }

    /// Connect to an SQLite URL and make sure the `messages` table exists.
    pub async fn connect(db_url: &str) -> Result<Self> {
        info!("Connecting to database: {}", db_url);

        let mut options = ConnectOptions::new(db_url.to_owned());
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .map_err(DialogError::storage)?;

        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let stmt = schema.create_table_from_entity(messages::Entity);
        match db
            .execute_unprepared(&backend.build(&stmt).to_string())
            .await
        {
            Ok(_) => {}
            Err(e) if is_table_already_exists_error(&e) => {
                debug!("Table already exists, skipping creation");
            }
            Err(e) => return Err(DialogError::storage(e)),
        }

        info!("SqliteMessageStore initialized");
        Ok(Self { db })
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn messages_by_dialog(&self, dialog_id: &DialogId) -> Result<Vec<Message>> {
        let models = messages::Entity::find()
            .filter(messages::Column::DialogId.eq(dialog_id.as_str()))
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .all(&self.db)
            .await
            .map_err(DialogError::storage)?;

        models.into_iter().map(message_from_model).collect()
    }

    async fn store_message(&self, message: &Message) -> Result<()> {
        active_model_from_message(message)
            .insert(&self.db)
            .await
            .map_err(DialogError::storage)?;

        debug!(
            "Stored {} message {} in dialog {}",
            message.role(),
            message.id(),
            message.dialog_id()
        );
        Ok(())
    }

    async fn remove_dialog(&self, dialog_id: &DialogId) -> Result<u64> {
        let result = messages::Entity::delete_many()
            .filter(messages::Column::DialogId.eq(dialog_id.as_str()))
            .exec(&self.db)
            .await
            .map_err(DialogError::storage)?;

        info!(
            "Removed dialog {} ({} messages)",
            dialog_id, result.rows_affected
        );
        Ok(result.rows_affected)
    }

    async fn list_dialog_ids(&self) -> Result<Vec<DialogId>> {
        let ids = messages::Entity::find()
            .select_only()
            .column(messages::Column::DialogId)
            .distinct()
            .order_by_asc(messages::Column::DialogId)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(DialogError::storage)?;

        Ok(ids.into_iter().map(DialogId::new).collect())
    }
}
