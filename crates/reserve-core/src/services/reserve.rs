//! Record, user, and session operations over the local store.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use super::history::{self, BATCH_IMPORT_SUMMARY, CREATED_SUMMARY};
use crate::models::{
    CloudConfig, HistoryEntry, Record, RecordDraft, RecordId, RecordPatch, User, UserId,
};
use crate::scope::can_view;
use crate::storage::{KeyValueStore, StoreKey};
use crate::sync::SyncTrigger;
use crate::{Error, Result};

/// Local-first service: every mutation commits to the store, then asks for a
/// background sync.
pub struct ReserveService<S> {
    store: Arc<S>,
    sync: Option<Arc<dyn SyncTrigger>>,
}

impl<S> Clone for ReserveService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            sync: self.sync.clone(),
        }
    }
}

impl<S: KeyValueStore> ReserveService<S> {
    /// Local-only service with no sync trigger.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store, sync: None }
    }

    #[must_use]
    pub fn with_sync(mut self, sync: Arc<dyn SyncTrigger>) -> Self {
        self.sync = Some(sync);
        self
    }

    fn request_sync(&self) {
        if let Some(sync) = &self.sync {
            sync.request();
        }
    }

    // Records

    pub fn list_records(&self) -> Result<Vec<Record>> {
        Ok(self.store.load(StoreKey::Records)?.unwrap_or_default())
    }

    pub fn get_record(&self, id: &RecordId) -> Result<Record> {
        self.list_records()?
            .into_iter()
            .find(|record| &record.id == id)
            .ok_or_else(|| Error::NotFound(format!("record {id}")))
    }

    /// Find an existing record for a company, exact name first, then by
    /// substring.
    pub fn find_record_by_company(&self, company_name: &str) -> Result<Option<Record>> {
        let needle = company_name.trim();
        if needle.is_empty() {
            return Ok(None);
        }
        let records = self.list_records()?;
        let exact = records
            .iter()
            .position(|record| record.company_name.trim() == needle);
        let index = exact.or_else(|| {
            records
                .iter()
                .position(|record| record.company_name.contains(needle))
        });
        Ok(index.map(|index| records[index].clone()))
    }

    pub fn add_record(&self, draft: RecordDraft, actor: &User) -> Result<Record> {
        let record = new_record(draft, actor, CREATED_SUMMARY)?;
        self.store
            .modify(StoreKey::Records, |records: &mut Vec<Record>| {
                records.push(record.clone());
                Ok(())
            })?;
        tracing::debug!(id = %record.id, "Added record");

        self.request_sync();
        Ok(record)
    }

    /// Add every draft or none of them.
    pub fn batch_add_records(
        &self,
        drafts: Vec<RecordDraft>,
        actor: &User,
    ) -> Result<Vec<Record>> {
        let added = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                new_record(draft, actor, BATCH_IMPORT_SUMMARY).map_err(|error| match error {
                    Error::InvalidInput(message) => {
                        Error::InvalidInput(format!("row {}: {message}", index + 1))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if added.is_empty() {
            return Ok(added);
        }

        self.store
            .modify(StoreKey::Records, |records: &mut Vec<Record>| {
                records.extend(added.iter().cloned());
                Ok(())
            })?;
        tracing::info!(count = added.len(), "Imported records");

        self.request_sync();
        Ok(added)
    }

    /// Apply `patch`, recording what changed in the record's history.
    ///
    /// The record ends up owned by `patch.owner` when given, otherwise by
    /// the actor. Naming anyone other than yourself needs a management role.
    pub fn update_record(
        &self,
        id: &RecordId,
        patch: RecordPatch,
        actor: &User,
    ) -> Result<Record> {
        let owner = self.resolve_owner(patch.owner.as_ref(), actor)?;

        let updated = self
            .store
            .modify(StoreKey::Records, |records: &mut Vec<Record>| {
                let record = records
                    .iter_mut()
                    .find(|record| &record.id == id)
                    .ok_or_else(|| Error::NotFound(format!("record {id}")))?;
                if !can_view(actor, record) {
                    return Err(Error::Forbidden(format!(
                        "{} cannot edit record {id}",
                        actor.name
                    )));
                }
                *record = edited_record(record, &patch, actor, &owner)?;
                Ok(record.clone())
            })?;
        tracing::debug!(id = %id, owner = %updated.updated_by_user_id, "Updated record");

        self.request_sync();
        Ok(updated)
    }

    fn resolve_owner(&self, requested: Option<&UserId>, actor: &User) -> Result<User> {
        match requested {
            Some(owner_id) if *owner_id != actor.id => {
                if !actor.role.is_management() {
                    return Err(Error::Forbidden(
                        "only managers can assign a record to someone else".to_string(),
                    ));
                }
                self.get_user(owner_id)
            }
            _ => Ok(actor.clone()),
        }
    }

    /// Remove the record outright. Another device that still holds it will
    /// bring it back on the next sync.
    pub fn delete_record(&self, id: &RecordId) -> Result<()> {
        self.store
            .modify(StoreKey::Records, |records: &mut Vec<Record>| {
                let before = records.len();
                records.retain(|record| &record.id != id);
                if records.len() == before {
                    return Err(Error::NotFound(format!("record {id}")));
                }
                Ok(())
            })?;
        tracing::debug!(id = %id, "Deleted record");

        self.request_sync();
        Ok(())
    }

    // Users

    pub fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.store.load(StoreKey::Users)?.unwrap_or_default())
    }

    pub fn get_user(&self, id: &UserId) -> Result<User> {
        self.list_users()?
            .into_iter()
            .find(|user| &user.id == id)
            .ok_or_else(|| Error::NotFound(format!("user {id}")))
    }

    pub fn find_user_by_employee_id(&self, employee_id: &str) -> Result<Option<User>> {
        let code = employee_id.trim();
        Ok(self
            .list_users()?
            .into_iter()
            .find(|user| user.employee_id == code))
    }

    /// Insert the user, or replace the stored user with the same id.
    pub fn save_user(&self, user: User) -> Result<User> {
        let user = normalize_user(user)?;
        self.store.modify(StoreKey::Users, |users: &mut Vec<User>| {
            if users
                .iter()
                .any(|existing| existing.id != user.id && existing.employee_id == user.employee_id)
            {
                return Err(Error::InvalidInput(format!(
                    "employee id {} is already in use",
                    user.employee_id
                )));
            }
            match users.iter_mut().find(|existing| existing.id == user.id) {
                Some(existing) => *existing = user.clone(),
                None => users.push(user.clone()),
            }
            Ok(())
        })?;

        self.request_sync();
        Ok(user)
    }

    /// Remove the user. If they are the session user, the session is cleared.
    pub fn delete_user(&self, id: &UserId) -> Result<()> {
        self.store.modify(StoreKey::Users, |users: &mut Vec<User>| {
            let before = users.len();
            users.retain(|user| &user.id != id);
            if users.len() == before {
                return Err(Error::NotFound(format!("user {id}")));
            }
            Ok(())
        })?;

        if self.session_user_id()?.as_ref() == Some(id) {
            self.clear_current_user()?;
        }

        self.request_sync();
        Ok(())
    }

    /// Add every user or none of them; employee ids must be new and distinct.
    pub fn batch_add_users(&self, new_users: Vec<User>) -> Result<Vec<User>> {
        let new_users = new_users
            .into_iter()
            .map(normalize_user)
            .collect::<Result<Vec<_>>>()?;
        if new_users.is_empty() {
            return Ok(new_users);
        }

        self.store.modify(StoreKey::Users, |users: &mut Vec<User>| {
            let mut taken: HashSet<&str> =
                users.iter().map(|user| user.employee_id.as_str()).collect();
            if let Some(duplicate) = new_users
                .iter()
                .find(|user| !taken.insert(user.employee_id.as_str()))
            {
                return Err(Error::InvalidInput(format!(
                    "employee id {} is already in use",
                    duplicate.employee_id
                )));
            }
            users.extend(new_users.iter().cloned());
            Ok(())
        })?;
        tracing::info!(count = new_users.len(), "Imported users");

        self.request_sync();
        Ok(new_users)
    }

    // Session

    /// Select the acting user for this device.
    pub fn set_current_user(&self, employee_id: &str) -> Result<User> {
        let user = self
            .find_user_by_employee_id(employee_id)?
            .ok_or_else(|| Error::NotFound(format!("employee {}", employee_id.trim())))?;
        self.store.save(StoreKey::SessionUser, &user.id)?;
        Ok(user)
    }

    /// The session user, if one is selected and still exists.
    pub fn current_user(&self) -> Result<Option<User>> {
        let Some(id) = self.session_user_id()? else {
            return Ok(None);
        };
        Ok(self.list_users()?.into_iter().find(|user| user.id == id))
    }

    pub fn clear_current_user(&self) -> Result<()> {
        self.store.remove(StoreKey::SessionUser)
    }

    fn session_user_id(&self) -> Result<Option<UserId>> {
        self.store.load(StoreKey::SessionUser)
    }

    // Cloud config

    pub fn cloud_config(&self) -> Result<CloudConfig> {
        Ok(self.store.load(StoreKey::CloudConfig)?.unwrap_or_default())
    }

    /// Persist the config; a usable config triggers a sync right away.
    pub fn save_cloud_config(&self, config: CloudConfig) -> Result<CloudConfig> {
        let config = config.normalized();
        self.store.save(StoreKey::CloudConfig, &config)?;
        tracing::debug!(?config, "Saved cloud config");

        if config.is_usable() {
            self.request_sync();
        }
        Ok(config)
    }
}

fn new_record(draft: RecordDraft, actor: &User, summary: &str) -> Result<Record> {
    let record = Record {
        id: RecordId::new(),
        company_name: draft.company_name.trim().to_string(),
        total_employees: draft.total_employees,
        estimated_new_payroll: draft.estimated_new_payroll,
        estimated_landing_date: draft.estimated_landing_date,
        cards_issued: draft.cards_issued,
        card_schedule: draft.card_schedule,
        last_visit_date: draft.last_visit_date,
        probability: draft.probability,
        progress_notes: draft.progress_notes,
        updated_at: Utc::now(),
        updated_by_user_id: actor.id.clone(),
        updated_by_name: actor.name.clone(),
        department: actor.department.clone(),
        line: actor.line,
        status: draft.status,
        history: vec![HistoryEntry::now(&actor.name, summary)],
    };
    validate_record(&record)?;
    Ok(record)
}

/// `old` after applying `patch` on behalf of `actor`, owned by `owner`.
fn edited_record(old: &Record, patch: &RecordPatch, actor: &User, owner: &User) -> Result<Record> {
    let mut updated = old.clone();
    patch.apply_fields(&mut updated);
    validate_record(&updated)?;

    let mut changes = history::describe_changes(old, &updated);
    if owner.id != old.updated_by_user_id {
        changes.push(format!(
            "Owner: {} -> {}",
            old.updated_by_name, owner.name
        ));
    }
    if owner.id != actor.id {
        updated.department.clone_from(&owner.department);
        updated.line = owner.line;
    }
    updated.updated_by_user_id = owner.id.clone();
    updated.updated_by_name.clone_from(&owner.name);
    updated.updated_at = Utc::now();
    updated
        .history
        .insert(0, HistoryEntry::now(&actor.name, history::summarize(&changes)));
    Ok(updated)
}

fn validate_record(record: &Record) -> Result<()> {
    if record.company_name.trim().is_empty() {
        return Err(Error::InvalidInput(
            "company name must not be empty".to_string(),
        ));
    }
    if record.probability > 100 {
        return Err(Error::InvalidInput(format!(
            "probability must be between 0 and 100, got {}",
            record.probability
        )));
    }
    Ok(())
}

fn normalize_user(mut user: User) -> Result<User> {
    user.employee_id = user.employee_id.trim().to_string();
    user.name = user.name.trim().to_string();
    user.department = user.department.trim().to_string();
    if user.employee_id.is_empty() {
        return Err(Error::InvalidInput("employee id must not be empty".to_string()));
    }
    if user.name.is_empty() {
        return Err(Error::InvalidInput("user name must not be empty".to_string()));
    }
    Ok(user)
}
