use sea_orm::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entity::{ company_bank, contact_center, task_config };
use crate::db::entity::{ CompanyBank, ContactCenter, TaskConfig };
use crate::error::{ AppError, Result };

#[derive(Debug, Clone, Deserialize)]
pub struct BankInput {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    pub name: String,
    pub contact_type: String,
    pub value: String,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfigInput {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Admin-managed lookup data: company bank accounts for deposits, support
/// contacts and the task links users visit.
pub struct ReferenceService {
    db: DatabaseConnection,
}

impl ReferenceService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ─── Company banks ───────────────────────────────────────────────

    pub async fn create_bank(&self, input: BankInput) -> Result<company_bank::Model> {
        let input = input.validated()?;
        let now = chrono::Utc::now();

        let bank = company_bank::ActiveModel {
            id: Set(Uuid::new_v4()),
            bank_name: Set(input.bank_name),
            account_number: Set(input.account_number),
            account_name: Set(input.account_name),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(bank.insert(&self.db).await?)
    }

    pub async fn update_bank(&self, id: Uuid, input: BankInput) -> Result<company_bank::Model> {
        let input = input.validated()?;
        let bank = CompanyBank::find_by_id(id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Bank".to_string()))?;

        let mut active: company_bank::ActiveModel = bank.into();
        active.bank_name = Set(input.bank_name);
        active.account_number = Set(input.account_number);
        active.account_name = Set(input.account_name);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(chrono::Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_bank(&self, id: Uuid) -> Result<()> {
        let result = CompanyBank::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Bank".to_string()));
        }

        Ok(())
    }

    pub async fn list_banks(&self, active_only: bool) -> Result<Vec<company_bank::Model>> {
        let mut query = CompanyBank::find();

        if active_only {
            query = query.filter(company_bank::Column::IsActive.eq(true));
        }

        Ok(query.order_by_asc(company_bank::Column::BankName).all(&self.db).await?)
    }

    // ─── Contact centers ─────────────────────────────────────────────

    pub async fn create_contact(&self, input: ContactInput) -> Result<contact_center::Model> {
        let input = input.validated()?;
        let now = chrono::Utc::now();

        let contact = contact_center::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            contact_type: Set(input.contact_type),
            value: Set(input.value),
            sequence: Set(input.sequence),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(contact.insert(&self.db).await?)
    }

    pub async fn update_contact(&self, id: Uuid, input: ContactInput) -> Result<contact_center::Model> {
        let input = input.validated()?;
        let contact = ContactCenter::find_by_id(id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Contact".to_string()))?;

        let mut active: contact_center::ActiveModel = contact.into();
        active.name = Set(input.name);
        active.contact_type = Set(input.contact_type);
        active.value = Set(input.value);
        active.sequence = Set(input.sequence);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(chrono::Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_contact(&self, id: Uuid) -> Result<()> {
        let result = ContactCenter::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Contact".to_string()));
        }

        Ok(())
    }

    pub async fn list_contacts(&self, active_only: bool) -> Result<Vec<contact_center::Model>> {
        let mut query = ContactCenter::find();

        if active_only {
            query = query.filter(contact_center::Column::IsActive.eq(true));
        }

        Ok(
            query
                .order_by_asc(contact_center::Column::Sequence)
                .order_by_asc(contact_center::Column::Name)
                .all(&self.db).await?
        )
    }

    // ─── Task configs ────────────────────────────────────────────────

    pub async fn create_task(&self, input: TaskConfigInput) -> Result<task_config::Model> {
        let input = input.validated()?;
        let now = chrono::Utc::now();

        let task = task_config::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            url: Set(input.url),
            sequence: Set(input.sequence),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(task.insert(&self.db).await?)
    }

    pub async fn update_task(&self, id: Uuid, input: TaskConfigInput) -> Result<task_config::Model> {
        let input = input.validated()?;
        let task = TaskConfig::find_by_id(id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Task".to_string()))?;

        let mut active: task_config::ActiveModel = task.into();
        active.title = Set(input.title);
        active.url = Set(input.url);
        active.sequence = Set(input.sequence);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(chrono::Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<()> {
        let result = TaskConfig::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Task".to_string()));
        }

        Ok(())
    }

    pub async fn list_tasks(&self, active_only: bool) -> Result<Vec<task_config::Model>> {
        let mut query = TaskConfig::find();

        if active_only {
            query = query.filter(task_config::Column::IsActive.eq(true));
        }

        Ok(
            query
                .order_by_asc(task_config::Column::Sequence)
                .order_by_asc(task_config::Column::Title)
                .all(&self.db).await?
        )
    }
}

fn required(name: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::ValidationError(format!("{} is required", name)));
    }
    Ok(value)
}

impl BankInput {
    fn validated(self) -> Result<Self> {
        Ok(Self {
            bank_name: required("bank_name", self.bank_name)?,
            account_number: required("account_number", self.account_number)?,
            account_name: required("account_name", self.account_name)?,
            is_active: self.is_active,
        })
    }
}

impl ContactInput {
    fn validated(self) -> Result<Self> {
        Ok(Self {
            name: required("name", self.name)?,
            contact_type: required("contact_type", self.contact_type)?.to_uppercase(),
            value: required("value", self.value)?,
            sequence: self.sequence,
            is_active: self.is_active,
        })
    }
}

impl TaskConfigInput {
    fn validated(self) -> Result<Self> {
        let url = required("url", self.url)?;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::ValidationError("url must be an http(s) link".into()));
        }

        Ok(Self {
            title: required("title", self.title)?,
            url,
            sequence: self.sequence,
            is_active: self.is_active,
        })
    }
}
