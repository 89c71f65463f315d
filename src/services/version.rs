//! Version service
//!
//! The top-level entry point of the ledger. Owns the loaded budget versions,
//! tracks which one is selected, runs the legacy migration once before the
//! first load and funnels every mutation through validation, persistence and
//! the audit trail.
//!
//! Mutations work on a copy of the version. The copy replaces the loaded
//! version only after the repository has saved it, so a failed save leaves
//! the in-memory state untouched. `revision()` increases after every
//! successful change so callers know when to refresh.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::audit::{AuditAction, AuditLogger, EntityType};
use crate::calculation::{
    calculate_category_variances, calculate_item_variances, effective_total, project_remaining,
    summarize, BudgetSummary, Projection, Variance,
};
use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    BudgetCategory, BudgetLineItem, BudgetTransaction, BudgetVersion, LineItemId, PayrollLineItem,
    RateCardId, TransactionId, VersionId,
};
use crate::storage::{Storage, VersionRecord};
use crate::validation::{
    can_modify, sanitize_numeric, validate_account_code, validate_currency, validate_line_item,
    validate_pay_period, validate_payroll_item, validate_transaction, validate_version_name,
};

use super::migration::{MigrationManager, MigrationReport};
use super::payroll::PayrollManager;
use super::rate_card::propagate_rate;

/// Key-value entry remembering the selected version between runs
const SELECTED_VERSION_KEY: &str = "selectedBudgetVersion";

/// Prefix of the per-version expanded line item entries
const EXPANDED_ITEMS_PREFIX: &str = "expandedLineItems.";

pub struct VersionManager<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
    audit: Arc<AuditLogger>,
    versions: Vec<BudgetVersion>,
    selected: Option<VersionId>,
    expanded: HashSet<LineItemId>,
    migration_done: bool,
    migration_report: Option<MigrationReport>,
    revision: u64,
}

impl<'a> VersionManager<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings, audit: Arc<AuditLogger>) -> Self {
        Self {
            storage,
            settings,
            audit,
            versions: Vec::new(),
            selected: None,
            expanded: HashSet::new(),
            migration_done: false,
            migration_report: None,
            revision: 0,
        }
    }

    /// Migrate (once per manager), load versions and select one
    ///
    /// A default version is created when the store is empty. The previously
    /// selected version is restored when it still exists; otherwise the most
    /// recent version is selected.
    pub fn start(&mut self) -> LedgerResult<()> {
        self.run_migration_once();
        self.reload()?;

        if self.versions.is_empty() {
            self.create_default_version()?;
        }

        let remembered = match self.storage.defaults.get(SELECTED_VERSION_KEY) {
            Ok(value) => value.and_then(|s| s.parse::<VersionId>().ok()),
            Err(e) => {
                warn!(error = %e, "could not read the selected version");
                None
            }
        };

        let id = remembered
            .filter(|id| self.index_of(*id).is_ok())
            .or_else(|| self.versions.first().map(|v| v.id));
        if let Some(id) = id {
            self.load_selection(id);
        }

        debug!(versions = self.versions.len(), "budget versions loaded");
        Ok(())
    }

    fn run_migration_once(&mut self) {
        if self.migration_done {
            return;
        }
        self.migration_done = true;

        let migration = MigrationManager::new(self.storage, &self.settings.legacy_versions_key);
        match migration.migrate() {
            Ok(report) => self.migration_report = Some(report),
            Err(e) => error!(error = %e, "legacy version migration failed"),
        }
    }

    /// Result of the startup migration, if it ran and succeeded
    pub fn migration_report(&self) -> Option<&MigrationReport> {
        self.migration_report.as_ref()
    }

    fn reload(&mut self) -> LedgerResult<()> {
        let mut versions = Vec::new();
        for record in self.storage.versions.get_all()? {
            match record.to_version() {
                Ok(version) => versions.push(version),
                Err(e) => warn!(version = %record.id, error = %e, "skipping unreadable budget version"),
            }
        }
        self.versions = versions;
        Ok(())
    }

    /// Incremented after every successful mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Loaded versions, newest first
    pub fn versions(&self) -> &[BudgetVersion] {
        &self.versions
    }

    pub fn get(&self, id: VersionId) -> Option<&BudgetVersion> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Find a version by name (case-insensitive), full id or short display id
    pub fn find(&self, identifier: &str) -> Option<&BudgetVersion> {
        let identifier = identifier.trim();
        self.versions
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(identifier) || v.id.matches(identifier))
    }

    pub fn selected(&self) -> Option<&BudgetVersion> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> LedgerResult<VersionId> {
        self.selected
            .ok_or_else(|| LedgerError::version_not_found("no version selected"))
    }

    /// Expanded line items of the selected version
    pub fn selected_expanded_items(&self) -> &HashSet<LineItemId> {
        &self.expanded
    }

    fn index_of(&self, id: VersionId) -> LedgerResult<usize> {
        self.versions
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| LedgerError::version_not_found(id.to_string()))
    }

    fn sort_versions(&mut self) {
        self.versions
            .sort_by(|a, b| b.created_date.cmp(&a.created_date));
    }

    fn record(&self, action: AuditAction, entity_type: EntityType, entity_id: String, detail: String) {
        if let Err(e) = self.audit.record_change(action, entity_type, entity_id, detail) {
            warn!(error = %e, "failed to append audit entry");
        }
    }

    /// Apply `change` to a copy of the version and commit it
    fn apply<F, R>(&mut self, id: VersionId, change: F) -> LedgerResult<R>
    where
        F: FnOnce(&mut BudgetVersion) -> LedgerResult<R>,
    {
        let index = self.index_of(id)?;
        let mut updated = self.versions[index].clone();
        let result = change(&mut updated)?;

        self.storage
            .versions
            .commit(VersionRecord::from_version(&updated)?)?;
        self.versions[index] = updated;
        self.revision += 1;

        Ok(result)
    }

    fn insert_version(&mut self, version: BudgetVersion, detail: String) -> LedgerResult<VersionId> {
        self.storage
            .versions
            .commit(VersionRecord::from_version(&version)?)?;

        let id = version.id;
        self.versions.push(version);
        self.sort_versions();
        self.revision += 1;

        self.record(AuditAction::Created, EntityType::BudgetVersion, id.to_string(), detail);
        Ok(id)
    }

    fn create_default_version(&mut self) -> LedgerResult<VersionId> {
        let version = BudgetVersion::new(
            self.settings.default_version_label(),
            &self.settings.default_currency,
        );
        info!(name = %version.name, "creating default budget version");
        let detail = format!("Created default version '{}'", version.name);
        self.insert_version(version, detail)
    }

    fn load_selection(&mut self, id: VersionId) {
        self.selected = Some(id);
        self.expanded = match self.expanded_items(id) {
            Ok(items) => items,
            Err(e) => {
                warn!(version = %id, error = %e, "could not load expanded items");
                HashSet::new()
            }
        };
    }

    /// Select a version and remember the choice
    pub fn select(&mut self, id: VersionId) -> LedgerResult<()> {
        self.index_of(id)?;
        self.load_selection(id);

        if let Err(e) = self.storage.defaults.set(SELECTED_VERSION_KEY, id.as_uuid().to_string()) {
            warn!(version = %id, error = %e, "could not remember the selected version");
        }
        self.revision += 1;
        Ok(())
    }

    /// Expanded line items stored for a version
    pub fn expanded_items(&self, id: VersionId) -> LedgerResult<HashSet<LineItemId>> {
        let key = format!("{}{}", EXPANDED_ITEMS_PREFIX, id.as_uuid());
        let Some(value) = self.storage.defaults.get(&key)? else {
            return Ok(HashSet::new());
        };

        match serde_json::from_str::<Vec<LineItemId>>(&value) {
            Ok(ids) => Ok(ids.into_iter().collect()),
            Err(e) => {
                warn!(version = %id, error = %e, "ignoring malformed expanded items");
                Ok(HashSet::new())
            }
        }
    }

    pub fn set_expanded_items(&mut self, id: VersionId, items: &HashSet<LineItemId>) -> LedgerResult<()> {
        self.index_of(id)?;

        let mut ids: Vec<_> = items.iter().copied().collect();
        ids.sort_by_key(|i| *i.as_uuid());
        let key = format!("{}{}", EXPANDED_ITEMS_PREFIX, id.as_uuid());
        self.storage.defaults.set(&key, serde_json::to_string(&ids)?)?;

        if self.selected == Some(id) {
            self.expanded = items.clone();
        }
        Ok(())
    }

    /// Create and select a new version
    ///
    /// With `copy_from_current` the new version gets the selected version's
    /// line item structure (names, accounts, categories, sections) with fresh
    /// ids and zeroed amounts.
    pub fn create_version(&mut self, name: &str, copy_from_current: bool) -> LedgerResult<VersionId> {
        validate_version_name(name)?;

        let mut version = BudgetVersion::new(name.trim(), &self.settings.default_currency);
        let mut detail = format!("Created version '{}'", version.name);

        if copy_from_current {
            if let Some(current) = self.selected() {
                version.line_items = current.skeleton_line_items();
                version.currency = current.currency.clone();
                detail = format!(
                    "Created version '{}' from the structure of '{}'",
                    version.name, current.name
                );
            }
        }

        let id = self.insert_version(version, detail)?;
        self.select(id)?;
        Ok(id)
    }

    /// Rename a version
    ///
    /// Allowed on locked versions; the lock covers budget contents, not labels.
    pub fn rename_version(&mut self, id: VersionId, name: &str) -> LedgerResult<()> {
        validate_version_name(name)?;
        let name = name.trim().to_string();

        let old_name = self.apply(id, |version| {
            Ok(std::mem::replace(&mut version.name, name.clone()))
        })?;

        self.record(
            AuditAction::Updated,
            EntityType::BudgetVersion,
            id.to_string(),
            format!("Renamed '{}' to '{}'", old_name, name),
        );
        Ok(())
    }

    /// Lock a version; locking a locked version is a no-op
    pub fn lock_version(&mut self, id: VersionId) -> LedgerResult<()> {
        let index = self.index_of(id)?;
        if self.versions[index].is_locked {
            return Ok(());
        }

        let actor = self.settings.actor.clone();
        let name = self.apply(id, |version| {
            version.lock(actor.clone());
            Ok(version.name.clone())
        })?;

        self.record(
            AuditAction::Locked,
            EntityType::BudgetVersion,
            id.to_string(),
            format!("Locked '{}' by {}", name, actor),
        );
        Ok(())
    }

    pub fn unlock_version(&mut self, id: VersionId) -> LedgerResult<()> {
        let index = self.index_of(id)?;
        if !self.versions[index].is_locked {
            return Ok(());
        }

        let name = self.apply(id, |version| {
            version.unlock();
            Ok(version.name.clone())
        })?;

        self.record(
            AuditAction::Unlocked,
            EntityType::BudgetVersion,
            id.to_string(),
            format!("Unlocked '{}'", name),
        );
        Ok(())
    }

    /// Delete a version
    ///
    /// The list never ends up empty: deleting the last version creates a new
    /// default. Deleting the selected version selects the most recent one left.
    pub fn delete_version(&mut self, id: VersionId) -> LedgerResult<()> {
        let index = self.index_of(id)?;
        self.storage.versions.remove(id)?;

        let removed = self.versions.remove(index);
        self.revision += 1;
        self.record(
            AuditAction::Deleted,
            EntityType::BudgetVersion,
            id.to_string(),
            format!("Deleted version '{}'", removed.name),
        );

        let key = format!("{}{}", EXPANDED_ITEMS_PREFIX, id.as_uuid());
        if let Err(e) = self.storage.defaults.remove(&key) {
            warn!(version = %id, error = %e, "could not clear expanded items");
        }

        if self.versions.is_empty() {
            self.create_default_version()?;
        }

        if self.selected == Some(id) || self.selected.is_none() {
            if let Some(next) = self.versions.first().map(|v| v.id) {
                self.select(next)?;
            }
        }

        Ok(())
    }

    /// Full copy with fresh ids everywhere, named "<name> (Copy)"; selects the copy
    pub fn duplicate_version(&mut self, id: VersionId) -> LedgerResult<VersionId> {
        let index = self.index_of(id)?;
        let source = &self.versions[index];
        let copy = source.deep_copy(format!("{} (Copy)", source.name));
        let detail = format!("Duplicated '{}' as '{}'", source.name, copy.name);

        let copy_id = self.insert_version(copy, detail)?;
        self.select(copy_id)?;
        Ok(copy_id)
    }

    /// Replace the selected version's line items
    pub fn update_line_items(&mut self, mut items: Vec<BudgetLineItem>) -> LedgerResult<()> {
        let id = self.selected_id()?;
        items.iter_mut().for_each(sanitize_line_item);
        let count = items.len();

        self.apply(id, move |version| {
            can_modify(version)?;
            for item in &items {
                validate_line_item(item, &items)?;
                validate_account_code(&item.account)?;
            }
            version.line_items = items;
            Ok(())
        })?;

        self.record(
            AuditAction::Updated,
            EntityType::LineItem,
            id.to_string(),
            format!("Replaced line items ({} rows)", count),
        );
        Ok(())
    }

    /// Replace the selected version's transactions
    pub fn update_transactions(&mut self, transactions: Vec<BudgetTransaction>) -> LedgerResult<()> {
        let id = self.selected_id()?;
        let count = transactions.len();

        self.apply(id, move |version| {
            can_modify(version)?;
            for tx in &transactions {
                validate_transaction(tx, None)?;
            }
            version.transactions = transactions;
            Ok(())
        })?;

        self.record(
            AuditAction::Updated,
            EntityType::Transaction,
            id.to_string(),
            format!("Replaced transactions ({} rows)", count),
        );
        Ok(())
    }

    /// Add one line item to the selected version
    ///
    /// A child is registered in its parent's explicit child list.
    pub fn add_line_item(&mut self, mut item: BudgetLineItem) -> LedgerResult<LineItemId> {
        let id = self.selected_id()?;
        sanitize_line_item(&mut item);
        let item_id = item.id;
        let detail = format!("Added line item '{}' ({})", item.name, item.category);

        self.apply(id, move |version| {
            can_modify(version)?;
            validate_line_item(&item, &version.line_items)?;
            validate_account_code(&item.account)?;

            if let Some(parent_id) = item.parent_item_id {
                let parent = version
                    .line_items
                    .iter_mut()
                    .find(|i| i.id == parent_id)
                    .ok_or_else(|| LedgerError::NotFound {
                        entity_type: "Line item",
                        identifier: parent_id.to_string(),
                    })?;
                if !parent.child_item_ids.contains(&item.id) {
                    parent.child_item_ids.push(item.id);
                }
            }

            version.line_items.push(item);
            Ok(())
        })?;

        self.record(AuditAction::Created, EntityType::LineItem, item_id.to_string(), detail);
        Ok(item_id)
    }

    /// Record one transaction against the selected version
    ///
    /// An expense linked to a line item may not exceed what is left of that
    /// item's budget.
    pub fn add_transaction(&mut self, tx: BudgetTransaction) -> LedgerResult<TransactionId> {
        let id = self.selected_id()?;
        let tx_id = tx.id;
        let detail = format!("Recorded {} of {:.2} ({})", tx.transaction_type, tx.amount, tx.category);

        self.apply(id, move |version| {
            can_modify(version)?;

            let remaining = match tx.line_item_id {
                Some(item_id) => {
                    let item = version
                        .line_items
                        .iter()
                        .find(|i| i.id == item_id)
                        .ok_or_else(|| LedgerError::NotFound {
                            entity_type: "Line item",
                            identifier: item_id.to_string(),
                        })?;
                    let spent: f64 = version
                        .transactions
                        .iter()
                        .filter(|t| t.is_expense() && t.line_item_id == Some(item_id))
                        .map(|t| t.amount)
                        .sum();
                    Some(effective_total(item, &version.line_items) - spent)
                }
                None => None,
            };

            validate_transaction(&tx, remaining)?;
            version.transactions.push(tx);
            Ok(())
        })?;

        self.record(AuditAction::Created, EntityType::Transaction, tx_id.to_string(), detail);
        Ok(tx_id)
    }

    /// Replace the selected version's payroll entries
    pub fn update_payroll_items(&mut self, items: Vec<PayrollLineItem>) -> LedgerResult<()> {
        let id = self.selected_id()?;
        let count = items.len();

        self.apply(id, move |version| {
            can_modify(version)?;
            for item in &items {
                validate_payroll_item(item, &items)?;
                for period in &item.pay_periods {
                    validate_pay_period(period)?;
                }
            }
            version.payroll_items = items;
            Ok(())
        })?;

        self.record(
            AuditAction::Updated,
            EntityType::PayrollItem,
            id.to_string(),
            format!("Replaced payroll ({} entries)", count),
        );
        Ok(())
    }

    /// Run payroll edits against the selected version and persist the result
    ///
    /// Nothing is saved when `edit` fails or leaves the payroll unchanged.
    /// The audit entries queued by `edit` are written only after the commit.
    pub fn edit_payroll<F, R>(&mut self, edit: F) -> LedgerResult<R>
    where
        F: FnOnce(&mut PayrollManager) -> LedgerResult<R>,
    {
        let id = self.selected_id()?;
        let index = self.index_of(id)?;

        let mut manager = PayrollManager::for_version(&self.versions[index]);
        let result = edit(&mut manager)?;
        let (items, pending) = manager.into_parts();

        if items == self.versions[index].payroll_items {
            return Ok(result);
        }

        self.apply(id, move |version| {
            version.payroll_items = items;
            Ok(())
        })?;

        for entry in &pending {
            if let Err(e) = self.audit.log(entry) {
                warn!(error = %e, "failed to append payroll audit entry");
            }
        }

        Ok(result)
    }

    /// Read-only payroll view of the selected version
    pub fn payroll(&self) -> LedgerResult<PayrollManager> {
        let id = self.selected_id()?;
        let index = self.index_of(id)?;
        Ok(PayrollManager::for_version(&self.versions[index]))
    }

    pub fn set_currency(&mut self, code: &str) -> LedgerResult<()> {
        let id = self.selected_id()?;
        let code = code.trim().to_uppercase();
        validate_currency(&code)?;

        let previous = self.apply(id, |version| {
            can_modify(version)?;
            Ok(std::mem::replace(&mut version.currency, code.clone()))
        })?;

        self.record(
            AuditAction::Updated,
            EntityType::BudgetVersion,
            id.to_string(),
            format!("Currency {} -> {}", previous, code),
        );
        Ok(())
    }

    pub fn set_notes(&mut self, notes: &str) -> LedgerResult<()> {
        let id = self.selected_id()?;
        let notes = notes.to_string();

        self.apply(id, move |version| {
            can_modify(version)?;
            version.notes = notes;
            Ok(())
        })?;

        self.record(
            AuditAction::Updated,
            EntityType::BudgetVersion,
            id.to_string(),
            "Updated notes".to_string(),
        );
        Ok(())
    }

    /// Push a rate card's current rate into the selected version's linked items
    ///
    /// Returns how many items changed; nothing is saved when none did.
    pub fn apply_rate_card(&mut self, card_id: RateCardId) -> LedgerResult<usize> {
        let id = self.selected_id()?;
        let card = self
            .storage
            .rate_cards
            .get(card_id)?
            .ok_or_else(|| LedgerError::rate_card_not_found(card_id.to_string()))?;

        let index = self.index_of(id)?;
        can_modify(&self.versions[index])?;
        let mut preview = self.versions[index].line_items.clone();
        if propagate_rate(&card, &mut preview) == 0 {
            return Ok(0);
        }

        let changed = self.apply(id, |version| Ok(propagate_rate(&card, &mut version.line_items)))?;

        self.record(
            AuditAction::Updated,
            EntityType::LineItem,
            id.to_string(),
            format!("Applied {} to {} linked items", card, changed),
        );
        Ok(changed)
    }

    fn selected_version(&self) -> LedgerResult<&BudgetVersion> {
        let id = self.selected_id()?;
        self.get(id)
            .ok_or_else(|| LedgerError::version_not_found(id.to_string()))
    }

    pub fn summary(&self) -> LedgerResult<BudgetSummary> {
        Ok(summarize(&self.selected_version()?.line_items))
    }

    pub fn category_variances(&self) -> LedgerResult<Vec<(BudgetCategory, Variance)>> {
        let version = self.selected_version()?;
        let variances = calculate_category_variances(&version.line_items, &version.transactions);

        Ok(BudgetCategory::all()
            .iter()
            .filter_map(|c| variances.get(c).map(|v| (*c, *v)))
            .collect())
    }

    pub fn item_variances(&self) -> LedgerResult<Vec<(BudgetLineItem, Variance)>> {
        let version = self.selected_version()?;
        let variances = calculate_item_variances(&version.line_items, &version.transactions);

        Ok(version
            .line_items
            .iter()
            .filter_map(|item| variances.get(&item.id).map(|v| (item.clone(), *v)))
            .collect())
    }

    /// Total recorded expenses of the selected version
    pub fn spent(&self) -> LedgerResult<f64> {
        Ok(self
            .selected_version()?
            .transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum())
    }

    pub fn projection(&self, days_elapsed: i64, total_days: i64) -> LedgerResult<Projection> {
        let total = self.summary()?.total_budget;
        Ok(project_remaining(total, self.spent()?, days_elapsed, total_days))
    }
}

/// Coerce NaN and infinite amounts to zero; negatives are left for validation
fn sanitize_line_item(item: &mut BudgetLineItem) {
    item.quantity = sanitize_numeric(item.quantity, true);
    item.days = sanitize_numeric(item.days, true);
    item.unit_cost = sanitize_numeric(item.unit_cost, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::error::ValidationError;
    use crate::models::{ContactType, PaymentStatus, PayrollPayPeriod, RateCard};
    use crate::services::rate_card::link_item_to_rate_card;
    use chrono::{Duration, Local, NaiveDate};
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        storage: Storage,
        settings: Settings,
        audit: Arc<AuditLogger>,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
            let audit = Arc::new(AuditLogger::new(paths.audit_log()));
            let storage = Storage::new(paths).unwrap();
            storage.load_all().unwrap();
            Self {
                _temp_dir: temp_dir,
                storage,
                settings: Settings::default(),
                audit,
            }
        }

        fn manager(&self) -> VersionManager<'_> {
            let mut manager = VersionManager::new(&self.storage, &self.settings, self.audit.clone());
            manager.start().unwrap();
            manager
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    #[test]
    fn test_first_start_creates_default_version() {
        let fixture = Fixture::new();
        let manager = fixture.manager();

        assert_eq!(manager.versions().len(), 1);
        assert_eq!(manager.selected().unwrap().name, "Budget v1");
        assert_eq!(fixture.storage.versions.count().unwrap(), 1);
    }

    #[test]
    fn test_restart_keeps_versions_and_selection() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let first = manager.selected_id().unwrap();
        manager.create_version("Shooting", false).unwrap();
        manager.select(first).unwrap();

        fixture.storage.load_all().unwrap();
        let reopened = fixture.manager();
        assert_eq!(reopened.versions().len(), 2);
        assert_eq!(reopened.selected_id().unwrap(), first);
    }

    #[test]
    fn test_startup_migrates_legacy_versions() {
        let fixture = Fixture::new();
        let legacy = vec![BudgetVersion::new("Legacy A", "USD"), BudgetVersion::new("Legacy B", "EUR")];
        fixture
            .storage
            .defaults
            .set(&fixture.settings.legacy_versions_key, serde_json::to_string(&legacy).unwrap())
            .unwrap();

        let manager = fixture.manager();
        assert_eq!(manager.versions().len(), 2);
        assert_eq!(manager.migration_report().unwrap().migrated, 2);
        assert!(manager.find("legacy b").is_some());
    }

    #[test]
    fn test_create_version_copies_structure_only() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let original = manager.selected_id().unwrap();
        manager
            .add_line_item(BudgetLineItem::with_amounts("Camera", "Below the Line", 1.0, 10.0, 900.0))
            .unwrap();

        let copy = manager.create_version("Blank", true).unwrap();
        assert_eq!(manager.selected_id().unwrap(), copy);

        let copied = &manager.get(copy).unwrap().line_items;
        let source = &manager.get(original).unwrap().line_items;
        assert_eq!(copied.len(), 1);
        assert_eq!(copied[0].name, "Camera");
        assert_eq!(copied[0].line_total(), 0.0);
        assert_ne!(copied[0].id, source[0].id);
    }

    #[test]
    fn test_create_version_rejects_empty_name() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let err = manager.create_version("   ", false).unwrap_err();
        assert_eq!(err.validation(), Some(ValidationError::EmptyName));
        assert_eq!(manager.versions().len(), 1);
    }

    #[test]
    fn test_lock_blocks_mutations_and_leaves_data_unchanged() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let id = manager.selected_id().unwrap();
        manager
            .add_line_item(BudgetLineItem::with_amounts("Grip", "Below the Line", 2.0, 5.0, 400.0))
            .unwrap();
        manager.lock_version(id).unwrap();

        let before = manager.get(id).unwrap().clone();
        let stored_before = fixture.storage.versions.get(id).unwrap().unwrap();
        let revision = manager.revision();

        let err = manager.update_line_items(Vec::new()).unwrap_err();
        assert!(err.is_locked());
        let tx = BudgetTransaction::expense(today(), 10.0, "Grip");
        assert!(manager.update_transactions(vec![tx.clone()]).unwrap_err().is_locked());
        assert!(manager.add_transaction(tx).unwrap_err().is_locked());
        assert!(manager.update_payroll_items(Vec::new()).unwrap_err().is_locked());
        let payroll_err = manager
            .edit_payroll(|payroll| {
                payroll.add_item(PayrollLineItem::new("Ana", "Gaffer", "Electric", ContactType::Crew, 1.0))
            })
            .unwrap_err();
        assert!(payroll_err.is_locked());
        assert!(manager.set_notes("changed").unwrap_err().is_locked());

        assert_eq!(manager.get(id).unwrap(), &before);
        assert_eq!(fixture.storage.versions.get(id).unwrap().unwrap(), stored_before);
        assert_eq!(manager.revision(), revision);

        manager.unlock_version(id).unwrap();
        manager.update_line_items(Vec::new()).unwrap();
        assert!(manager.get(id).unwrap().line_items.is_empty());
    }

    #[test]
    fn test_rename_is_allowed_while_locked() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let id = manager.selected_id().unwrap();
        manager.lock_version(id).unwrap();

        manager.rename_version(id, "Archived").unwrap();
        assert_eq!(manager.get(id).unwrap().name, "Archived");
        assert!(manager.get(id).unwrap().is_locked);
    }

    #[test]
    fn test_lock_records_actor_and_audit() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let id = manager.selected_id().unwrap();

        manager.lock_version(id).unwrap();
        manager.lock_version(id).unwrap();

        let version = manager.get(id).unwrap();
        assert_eq!(version.lock_info.as_ref().unwrap().locked_by, "local user");

        let locks = fixture
            .audit
            .read_all()
            .unwrap()
            .into_iter()
            .filter(|e| e.action == AuditAction::Locked)
            .count();
        assert_eq!(locks, 1);
    }

    #[test]
    fn test_deleting_last_version_creates_default() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let id = manager.selected_id().unwrap();
        manager.rename_version(id, "Only").unwrap();

        manager.delete_version(id).unwrap();

        assert_eq!(manager.versions().len(), 1);
        assert_ne!(manager.versions()[0].id, id);
        assert_eq!(manager.selected_id().unwrap(), manager.versions()[0].id);
        assert_eq!(fixture.storage.versions.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_selected_promotes_most_recent() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let first = manager.selected_id().unwrap();
        let second = manager.create_version("Second", false).unwrap();
        let third = manager.create_version("Third", false).unwrap();
        manager.select(first).unwrap();

        manager.delete_version(first).unwrap();
        assert_eq!(manager.selected_id().unwrap(), third);

        manager.delete_version(second).unwrap();
        assert_eq!(manager.selected_id().unwrap(), third);
        assert_eq!(manager.versions().len(), 1);
    }

    #[test]
    fn test_duplicate_is_a_deep_copy() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let original = manager.selected_id().unwrap();
        let item_id = manager
            .add_line_item(BudgetLineItem::with_amounts("Lights", "Below the Line", 1.0, 3.0, 100.0))
            .unwrap();
        manager
            .add_transaction(BudgetTransaction::expense(today(), 50.0, "Lighting").linked_to(item_id))
            .unwrap();
        manager.lock_version(original).unwrap();

        let copy_id = manager.duplicate_version(original).unwrap();
        let copy = manager.get(copy_id).unwrap();

        assert_eq!(copy.name, "Budget v1 (Copy)");
        assert!(!copy.is_locked);
        assert_eq!(copy.line_items[0].line_total(), 300.0);
        assert_ne!(copy.line_items[0].id, item_id);
        assert_eq!(copy.transactions[0].line_item_id, Some(copy.line_items[0].id));
    }

    #[test]
    fn test_add_line_item_validates_and_links_parent() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        let parent = BudgetLineItem::new("Camera Dept", "Below the Line");
        let parent_id = manager.add_line_item(parent).unwrap();
        let child = BudgetLineItem::with_amounts("DP", "Below the Line", 1.0, 20.0, 1500.0).as_child_of(parent_id);
        let child_id = manager.add_line_item(child).unwrap();

        let version = manager.selected().unwrap();
        assert_eq!(version.line_items[0].child_item_ids, vec![child_id]);
        assert_eq!(manager.summary().unwrap().total_budget, 30000.0);

        let dup = BudgetLineItem::new("camera dept", "Below the Line");
        assert_eq!(
            manager.add_line_item(dup).unwrap_err().validation(),
            Some(ValidationError::DuplicateName)
        );

        let mut bad_code = BudgetLineItem::new("Grip", "Below the Line");
        bad_code.account = "1000".into();
        assert_eq!(
            manager.add_line_item(bad_code).unwrap_err().validation(),
            Some(ValidationError::InvalidAccountCode)
        );

        let mut nan = BudgetLineItem::new("Odd", "Other");
        nan.unit_cost = f64::NAN;
        let nan_id = manager.add_line_item(nan).unwrap();
        let stored = manager.selected().unwrap().line_items.iter().find(|i| i.id == nan_id).unwrap().unit_cost;
        assert_eq!(stored, 0.0);
    }

    #[test]
    fn test_add_transaction_checks_item_budget() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let item_id = manager
            .add_line_item(BudgetLineItem::with_amounts("Catering", "Below the Line", 1.0, 1.0, 1000.0))
            .unwrap();

        manager
            .add_transaction(BudgetTransaction::expense(today(), 600.0, "Catering").linked_to(item_id))
            .unwrap();
        let err = manager
            .add_transaction(BudgetTransaction::expense(today(), 500.0, "Catering").linked_to(item_id))
            .unwrap_err();
        assert_eq!(err.validation(), Some(ValidationError::TransactionExceedsBudget));

        let future = BudgetTransaction::expense(today() + Duration::days(3), 10.0, "Catering");
        assert_eq!(
            manager.add_transaction(future).unwrap_err().validation(),
            Some(ValidationError::FutureDate)
        );

        assert_eq!(manager.spent().unwrap(), 600.0);
        let variances = manager.item_variances().unwrap();
        assert_eq!(variances[0].1.actual, 600.0);
    }

    #[test]
    fn test_edit_payroll_persists() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let id = manager.selected_id().unwrap();

        let item_id = manager
            .edit_payroll(|payroll| {
                let item_id = payroll.add_item(PayrollLineItem::new(
                    "Ana Ruiz",
                    "Gaffer",
                    "Electric",
                    ContactType::Crew,
                    10000.0,
                ))?;
                let period = PayrollPayPeriod::new("Week 1", today(), today(), 2500.0, 500.0);
                let period_id = payroll.add_pay_period(item_id, period)?;
                payroll.update_payment_status(item_id, period_id, PaymentStatus::Paid)?;
                Ok(item_id)
            })
            .unwrap();

        let stored = fixture.storage.versions.get(id).unwrap().unwrap().to_version().unwrap();
        let item = stored.payroll_items.iter().find(|i| i.id == item_id).unwrap();
        assert_eq!(item.total_paid(), 2000.0);
        assert_eq!(manager.payroll().unwrap().calculate_summary().total_remaining, 8000.0);
    }

    #[test]
    fn test_failed_payroll_edit_discards_changes() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let revision = manager.revision();

        let result: LedgerResult<()> = manager.edit_payroll(|payroll| {
            payroll.add_item(PayrollLineItem::new("Ana", "Gaffer", "Electric", ContactType::Crew, 1.0))?;
            payroll.add_item(PayrollLineItem::new("", "Grip", "Grip", ContactType::Crew, 1.0))?;
            Ok(())
        });

        assert_eq!(result.unwrap_err().validation(), Some(ValidationError::EmptyName));
        assert!(manager.selected().unwrap().payroll_items.is_empty());
        assert_eq!(manager.revision(), revision);
    }

    #[test]
    fn test_failed_payroll_edit_leaves_audit_log_untouched() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let before = fixture.audit.entry_count().unwrap();

        let result: LedgerResult<()> = manager.edit_payroll(|payroll| {
            payroll.add_item(PayrollLineItem::new("Ana", "Gaffer", "Electric", ContactType::Crew, 1.0))?;
            payroll.add_item(PayrollLineItem::new("", "Grip", "Grip", ContactType::Crew, 1.0))?;
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(fixture.audit.entry_count().unwrap(), before);

        manager
            .edit_payroll(|payroll| {
                payroll.add_item(PayrollLineItem::new("Ana", "Gaffer", "Electric", ContactType::Crew, 1.0))
            })
            .unwrap();
        let entries = fixture.audit.read_all().unwrap();
        assert_eq!(entries.len(), before + 1);
        assert_eq!(entries[before].detail, "Added payroll entry for Ana (Gaffer)");
    }

    #[test]
    fn test_currency_and_notes() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        manager.set_currency("eur").unwrap();
        assert_eq!(manager.selected().unwrap().currency, "EUR");
        assert_eq!(
            manager.set_currency("XYZ").unwrap_err().validation(),
            Some(ValidationError::InvalidCurrency)
        );

        manager.set_notes("Second unit").unwrap();
        assert_eq!(manager.selected().unwrap().notes, "Second unit");
    }

    #[test]
    fn test_apply_rate_card_is_explicit() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        let mut card = RateCard::new("Key Grip", "Grip", "day", 650.0);
        fixture.storage.rate_cards.upsert(card.clone()).unwrap();

        let mut item = BudgetLineItem::with_amounts("Key Grip", "Below the Line", 1.0, 10.0, 0.0);
        link_item_to_rate_card(&mut item, &card);
        let item_id = manager.add_line_item(item).unwrap();

        card.default_rate = 700.0;
        fixture.storage.rate_cards.upsert(card.clone()).unwrap();
        let cost = |m: &VersionManager| m.selected().unwrap().line_items.iter().find(|i| i.id == item_id).unwrap().unit_cost;
        assert_eq!(cost(&manager), 650.0);

        assert_eq!(manager.apply_rate_card(card.id).unwrap(), 1);
        assert_eq!(cost(&manager), 700.0);
        assert_eq!(manager.apply_rate_card(card.id).unwrap(), 0);
    }

    #[test]
    fn test_expanded_items_follow_selection() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let first = manager.selected_id().unwrap();
        let item_id = manager
            .add_line_item(BudgetLineItem::new("Camera", "Below the Line"))
            .unwrap();

        let expanded: HashSet<_> = [item_id].into_iter().collect();
        manager.set_expanded_items(first, &expanded).unwrap();
        assert_eq!(manager.selected_expanded_items(), &expanded);

        manager.create_version("Other", false).unwrap();
        assert!(manager.selected_expanded_items().is_empty());

        manager.select(first).unwrap();
        assert_eq!(manager.selected_expanded_items(), &expanded);
    }

    #[test]
    fn test_revision_increases_on_change() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        let start = manager.revision();
        let id = manager.selected_id().unwrap();

        manager.rename_version(id, "Renamed").unwrap();
        assert!(manager.revision() > start);
    }

    #[test]
    fn test_category_variances_cover_all_categories() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();
        manager
            .add_line_item(BudgetLineItem::with_amounts("Director", "Above the Line", 1.0, 1.0, 1000.0))
            .unwrap();

        let variances = manager.category_variances().unwrap();
        assert_eq!(variances.len(), 4);
        assert_eq!(variances[0].0, BudgetCategory::AboveTheLine);
        assert_eq!(variances[0].1.budgeted, 1000.0);
        let projection = manager.projection(0, 10).unwrap();
        assert!(projection.on_track);
    }
}
