use chrono::{ DateTime, NaiveDate, Utc };
use sea_orm::{
    sea_query::OnConflict,
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::db::entity::{ task_log, TaskLog };
use crate::error::{ AppError, Result };

pub struct TaskLogRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TaskLogRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_for_day(&self, user_id: &str, date: NaiveDate) -> Result<Option<task_log::Model>> {
        Ok(
            TaskLog::find()
                .filter(task_log::Column::UserId.eq(user_id))
                .filter(task_log::Column::Date.eq(date))
                .one(self.conn).await?
        )
    }

    /// Returns the day's row, inserting a zeroed one if none exists yet.
    /// A concurrent insert of the same (user, date) is absorbed by the
    /// unique index.
    pub async fn fetch_or_create(&self, user_id: &str, date: NaiveDate) -> Result<task_log::Model> {
        if let Some(log) = self.find_for_day(user_id, date).await? {
            return Ok(log);
        }

        let log = task_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id.to_string()),
            date: Set(date),
            counter: Set(0),
            last_claim: Set(None),
        };

        TaskLog::insert(log)
            .on_conflict(
                OnConflict::columns([task_log::Column::UserId, task_log::Column::Date])
                    .do_nothing()
                    .to_owned()
            )
            .exec_without_returning(self.conn).await?;

        self.find_for_day(user_id, date).await?.ok_or_else(||
            AppError::Internal(format!("Task log for {} on {} vanished after insert", user_id, date))
        )
    }

    pub async fn record_claim(
        &self,
        log: task_log::Model,
        now: DateTime<Utc>
    ) -> Result<task_log::Model> {
        let counter = log.counter + 1;

        let mut active: task_log::ActiveModel = log.into();
        active.counter = Set(counter);
        active.last_claim = Set(Some(now));

        Ok(active.update(self.conn).await?)
    }
}
