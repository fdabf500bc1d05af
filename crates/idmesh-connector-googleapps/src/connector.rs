//! The connector: capability trait implementations over the transport.
//!
//! Every remote call goes through the retry executor; this module only
//! deals in [`CallOutcome`]s and classified errors. Which outcomes are
//! benign depends on the call site: re-adding an existing member is
//! fine, creating an existing account is not.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::{
    wellknown, AttributeSet, AttributeValue, Filter, PageOptions, SearchResult, Uid,
};
use idmesh_connector::traits::{Connector, CreateOp, DeleteOp, SearchOp, UpdateOp};
use idmesh_connector::types::ObjectType;

use crate::attrs;
use crate::client::{ApiRequest, DirectoryTransport};
use crate::config::GoogleAppsConfig;
use crate::filter::{self, TranslatedFilter};
use crate::groups;
use crate::identity::{LicenseId, MemberId};
use crate::licensing;
use crate::members;
use crate::membership::{self, GroupMember};
use crate::orgunits;
use crate::pagination::{self, ListPage};
use crate::projection::{self, AttrNames};
use crate::retry::{CallOutcome, RetryConfig, RetryExecutor};
use crate::users;

const DISPLAY_NAME: &str = "google-workspace-directory";

/// Directory and Licensing API connector.
pub struct GoogleAppsConnector {
    config: GoogleAppsConfig,
    transport: Arc<dyn DirectoryTransport>,
    retry: RetryExecutor,
}

/// Success or duplicate are fine; missing is not.
fn allow_duplicate(outcome: CallOutcome<Value>, identifier: &str) -> ConnectorResult<()> {
    match outcome {
        CallOutcome::Success(_) => Ok(()),
        CallOutcome::Duplicate => {
            debug!(identifier, "already present, skipping");
            Ok(())
        }
        CallOutcome::NotFound => Err(ConnectorError::not_found(identifier)),
    }
}

/// Success or missing are fine; duplicate is not.
fn allow_missing(outcome: CallOutcome<Value>, identifier: &str) -> ConnectorResult<()> {
    match outcome {
        CallOutcome::Success(_) => Ok(()),
        CallOutcome::NotFound => {
            debug!(identifier, "already absent, skipping");
            Ok(())
        }
        CallOutcome::Duplicate => Err(ConnectorError::already_exists(identifier)),
    }
}

/// Uid from a write response, carrying the etag as revision.
fn value_uid(value: &Value, id_field: &str) -> ConnectorResult<Uid> {
    let id = value
        .get(id_field)
        .and_then(Value::as_str)
        .ok_or_else(|| ConnectorError::serialization(format!("response has no {id_field}")))?;
    Ok(match value.get(attrs::ETAG).and_then(Value::as_str) {
        Some(etag) => Uid::with_revision(id, etag),
        None => Uid::new(id),
    })
}

/// Like [`value_uid`], but keeps the current Uid when the response does
/// not carry the identifier.
fn refreshed_uid(current: &Uid, value: &Value, id_field: &str) -> Uid {
    value_uid(value, id_field).unwrap_or_else(|_| current.clone())
}

fn wants_expensive(requested: Option<&AttrNames>, name: &str) -> bool {
    requested.is_some_and(|set| set.contains(name))
}

fn finish(objects: Vec<AttributeSet>, cursor: Option<String>) -> SearchResult {
    match cursor {
        Some(cursor) => SearchResult::with_next_cursor(objects, cursor),
        None => SearchResult::complete(objects),
    }
}

impl GoogleAppsConnector {
    /// Build a connector over an already-validated configuration.
    pub fn new(config: GoogleAppsConfig, transport: Arc<dyn DirectoryTransport>) -> Self {
        Self {
            config,
            transport,
            retry: RetryExecutor::default(),
        }
    }

    /// Override the retry timing, mainly for tests.
    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = RetryExecutor::new(retry);
        self
    }

    async fn call(&self, request: &ApiRequest) -> ConnectorResult<CallOutcome<Value>> {
        self.retry.call(self.transport.as_ref(), request).await
    }

    /// Emails of the groups an account belongs to.
    async fn account_groups(&self, user_key: &str) -> ConnectorResult<Vec<String>> {
        let mut group_emails = Vec::new();
        pagination::drive(
            &PageOptions::default(),
            |token| {
                let request = groups::list_for_member_request(&self.config, user_key, token);
                async move {
                    let body = self.call(&request).await?.required(user_key)?;
                    Ok(ListPage::from_response(&body, "groups"))
                }
            },
            |item| {
                if let Some(email) = item.get(attrs::EMAIL).and_then(Value::as_str) {
                    group_emails.push(email.to_string());
                }
                Ok(())
            },
        )
        .await?;
        Ok(group_emails)
    }

    /// Current members of a group, all roles.
    async fn group_members(&self, group_key: &str) -> ConnectorResult<Vec<GroupMember>> {
        let mut current = Vec::new();
        let page = PageOptions::default();
        pagination::drive(
            &page,
            |token| {
                let request = members::list_request(&self.config, group_key, &page, token);
                async move {
                    let body = self.call(&request).await?.required(group_key)?;
                    Ok(ListPage::from_response(&body, "members"))
                }
            },
            |item| {
                if let Some(email) = item.get(attrs::EMAIL).and_then(Value::as_str) {
                    let role = item
                        .get(attrs::ROLE)
                        .and_then(Value::as_str)
                        .unwrap_or(attrs::DEFAULT_ROLE);
                    current.push(GroupMember::new(email, role));
                }
                Ok(())
            },
        )
        .await?;
        Ok(current)
    }

    /// Group members rendered as the expensive group attribute.
    async fn member_attribute(&self, group_key: &str) -> ConnectorResult<AttributeValue> {
        let current = self.group_members(group_key).await?;
        let entries: Vec<Value> = current
            .into_iter()
            .map(|m| json!({ attrs::EMAIL: m.email, attrs::ROLE: m.role }))
            .collect();
        Ok(AttributeValue::from(Value::Array(entries)))
    }

    /// Reconcile an account's group list against the desired one.
    async fn apply_group_assignments(
        &self,
        member_key: &str,
        desired: &[String],
    ) -> ConnectorResult<()> {
        let current = self.account_groups(member_key).await?;
        let diff = membership::diff_values(desired, &current);
        info!(
            member = member_key,
            add = diff.to_add.len(),
            remove = diff.to_remove.len(),
            "reconciling group assignments"
        );
        for group in &diff.to_add {
            let request =
                members::insert_request(&self.config, group, member_key, attrs::DEFAULT_ROLE);
            allow_duplicate(self.call(&request).await?, group)?;
        }
        for group in &diff.to_remove {
            let id = MemberId::new(group.clone(), member_key)?;
            let request = members::delete_request(&self.config, &id);
            allow_missing(self.call(&request).await?, &id.to_string())?;
        }
        Ok(())
    }

    /// Reconcile a group's member list against the desired one.
    /// Additions first, then role changes, removals last.
    async fn apply_group_members(
        &self,
        group_key: &str,
        desired: &[GroupMember],
    ) -> ConnectorResult<()> {
        let current = self.group_members(group_key).await?;
        let diff = membership::diff_members(desired, &current);
        info!(
            group = group_key,
            add = diff.to_add.len(),
            patch = diff.to_patch_role.len(),
            remove = diff.to_remove.len(),
            "reconciling group membership"
        );
        for member in &diff.to_add {
            let request =
                members::insert_request(&self.config, group_key, &member.email, &member.role);
            allow_duplicate(self.call(&request).await?, &member.email)?;
        }
        for member in &diff.to_patch_role {
            let id = MemberId::new(group_key, member.email.clone())?;
            let request = members::patch_role_request(&self.config, &id, &member.role);
            self.call(&request).await?.required(&id.to_string())?;
        }
        for email in &diff.to_remove {
            let id = MemberId::new(group_key, email.clone())?;
            let request = members::delete_request(&self.config, &id);
            allow_missing(self.call(&request).await?, &id.to_string())?;
        }
        Ok(())
    }

    /// Drop the configured SKU licenses of a disabled account. Absent
    /// assignments are skipped.
    async fn remove_licenses(&self, user_key: &str) -> ConnectorResult<()> {
        let Some(product) = self.config.product_id.clone() else {
            // Guarded by config validation.
            return Ok(());
        };
        for sku in &self.config.sku_ids {
            let id = LicenseId::new(product.clone(), sku.clone(), user_key)?;
            info!(license = %id, "removing license of disabled account");
            let request = licensing::delete_request(&self.config, &id);
            allow_missing(self.call(&request).await?, &id.to_string())?;
        }
        Ok(())
    }

    async fn create_account(&self, attributes: AttributeSet) -> ConnectorResult<Uid> {
        // Everything the create touches is validated before the first
        // remote call, so a bad alias cannot leave an orphaned account.
        let effects = users::validate_side_effects(&attributes)?;
        let desired_groups = attributes
            .get(wellknown::GROUPS)
            .map(membership::groups_from_attribute)
            .transpose()?;
        let payload = users::create_payload(&attributes, &self.config)?;
        let identifier = attributes.get_str(wellknown::NAME).unwrap_or_default().to_string();

        let request = users::insert_request(&self.config, payload);
        let body = self.call(&request).await?.required(&identifier)?;
        let uid = value_uid(&body, attrs::ID)?;
        info!(uid = %uid, "account created");

        for alias in &effects.aliases {
            let request = users::alias_insert_request(&self.config, uid.value(), alias);
            allow_duplicate(self.call(&request).await?, alias)?;
        }
        if let Some(photo) = &effects.photo {
            let request = users::photo_update_request(&self.config, uid.value(), photo);
            self.call(&request).await?.required(uid.value())?;
        }
        if effects.make_admin {
            let request = users::make_admin_request(&self.config, uid.value());
            self.call(&request).await?.required(uid.value())?;
        }
        if let Some(desired) = desired_groups {
            self.apply_group_assignments(&identifier, &desired).await?;
        }
        Ok(uid)
    }

    async fn create_group(&self, attributes: AttributeSet) -> ConnectorResult<Uid> {
        let aliases = users::alias_list(&attributes)?;
        let desired_members = attributes
            .get(wellknown::MEMBERS)
            .map(membership::members_from_attribute)
            .transpose()?;
        let payload = groups::create_payload(&attributes)?;
        let identifier = attributes.get_str(wellknown::NAME).unwrap_or_default().to_string();

        let request = groups::insert_request(&self.config, payload);
        let body = self.call(&request).await?.required(&identifier)?;
        let uid = value_uid(&body, attrs::ID)?;
        info!(uid = %uid, "group created");

        for alias in &aliases {
            let request = groups::alias_insert_request(&self.config, uid.value(), alias);
            allow_duplicate(self.call(&request).await?, alias)?;
        }
        if let Some(desired) = desired_members {
            self.apply_group_members(&identifier, &desired).await?;
        }
        Ok(uid)
    }

    async fn create_member(&self, attributes: AttributeSet) -> ConnectorResult<Uid> {
        let (group, email, role) = members::create_parts(&attributes)?;
        let id = MemberId::new(group.clone(), email.clone())?;
        let request = members::insert_request(&self.config, &group, &email, &role);
        let body = self.call(&request).await?.required(&id.to_string())?;
        Ok(match body.get(attrs::ETAG).and_then(Value::as_str) {
            Some(etag) => Uid::with_revision(id.to_string(), etag),
            None => id.to_uid(),
        })
    }

    async fn create_org_unit(&self, attributes: AttributeSet) -> ConnectorResult<Uid> {
        let payload = orgunits::create_payload(&attributes)?;
        let identifier = attributes.get_str(attrs::NAME).unwrap_or_default().to_string();
        let request = orgunits::insert_request(&self.config, payload);
        let body = self.call(&request).await?.required(&identifier)?;
        value_uid(&body, attrs::ORG_UNIT_PATH)
    }

    async fn create_license(&self, attributes: AttributeSet) -> ConnectorResult<Uid> {
        let id = licensing::create_identity(&attributes, &self.config)?;
        let request = licensing::insert_request(&self.config, &id);
        let body = self.call(&request).await?.required(&id.to_string())?;
        Ok(match body.get(attrs::ETAG).and_then(Value::as_str) {
            Some(etag) => Uid::with_revision(id.to_string(), etag),
            None => id.to_uid(),
        })
    }

    async fn update_account(&self, uid: &Uid, attributes: AttributeSet) -> ConnectorResult<Uid> {
        // Parsed before the patch so a malformed group list cannot
        // leave the update half-applied.
        let desired_groups = attributes
            .get(wellknown::GROUPS)
            .map(membership::groups_from_attribute)
            .transpose()?;

        let mut updated = uid.clone();
        if let Some(payload) = users::update_payload(&attributes, &self.config)? {
            let request = users::patch_request(&self.config, uid.value(), payload);
            let body = self.call(&request).await?.required(uid.value())?;
            updated = refreshed_uid(uid, &body, attrs::ID);
        }

        // Member operations key on email when the caller renamed or
        // named the account, on the remote id otherwise.
        let member_key = attributes
            .get_str(wellknown::NAME)
            .unwrap_or_else(|| uid.value())
            .to_string();
        if let Some(desired) = desired_groups {
            self.apply_group_assignments(&member_key, &desired).await?;
        }
        if self.config.remove_license_on_disable
            && attributes.get_bool(wellknown::ENABLE) == Some(false)
        {
            self.remove_licenses(&member_key).await?;
        }
        Ok(updated)
    }

    async fn update_group(&self, uid: &Uid, attributes: AttributeSet) -> ConnectorResult<Uid> {
        let desired_members = attributes
            .get(wellknown::MEMBERS)
            .map(membership::members_from_attribute)
            .transpose()?;

        let mut updated = uid.clone();
        if let Some(payload) = groups::update_payload(&attributes) {
            let request = groups::patch_request(&self.config, uid.value(), payload);
            let body = self.call(&request).await?.required(uid.value())?;
            updated = refreshed_uid(uid, &body, attrs::ID);
        }
        if let Some(desired) = desired_members {
            self.apply_group_members(uid.value(), &desired).await?;
        }
        Ok(updated)
    }

    async fn update_member(&self, uid: &Uid, attributes: AttributeSet) -> ConnectorResult<Uid> {
        let Some(role) = attributes.get_str(attrs::ROLE) else {
            return Ok(uid.clone());
        };
        let id = MemberId::parse(uid.value())?;
        let request = members::patch_role_request(&self.config, &id, role);
        let body = self.call(&request).await?.required(uid.value())?;
        Ok(match body.get(attrs::ETAG).and_then(Value::as_str) {
            Some(etag) => Uid::with_revision(id.to_string(), etag),
            None => id.to_uid(),
        })
    }

    async fn update_org_unit(&self, uid: &Uid, attributes: AttributeSet) -> ConnectorResult<Uid> {
        let Some(payload) = orgunits::update_payload(&attributes) else {
            return Ok(uid.clone());
        };
        let request = orgunits::patch_request(&self.config, uid.value(), payload);
        let body = self.call(&request).await?.required(uid.value())?;
        // Renames move the unit; the identity is its new path.
        Ok(refreshed_uid(uid, &body, attrs::ORG_UNIT_PATH))
    }

    async fn update_license(&self, uid: &Uid, attributes: AttributeSet) -> ConnectorResult<Uid> {
        let current = LicenseId::parse(uid.value())?;
        let Some(new_sku) = attributes.get_str(attrs::SKU_ID) else {
            return Ok(uid.clone());
        };
        if new_sku == current.sku {
            return Ok(uid.clone());
        }
        info!(license = %current, new_sku, "moving license to another sku");
        let request = licensing::move_sku_request(&self.config, &current, new_sku);
        self.call(&request).await?.required(uid.value())?;
        let moved = LicenseId::new(current.product, new_sku.to_string(), current.user)?;
        Ok(moved.to_uid())
    }

    async fn search_accounts(
        &self,
        translated: TranslatedFilter,
        requested: Option<&AttrNames>,
        mask: Option<&str>,
        page: &PageOptions,
    ) -> ConnectorResult<SearchResult> {
        let (mut objects, cursor) = match translated {
            TranslatedFilter::DirectKey(key) => {
                let request = users::get_request(&self.config, &key, mask);
                match self.call(&request).await?.optional(&key)? {
                    Some(body) => {
                        (vec![users::to_object(&body, requested, &self.config)?], None)
                    }
                    None => (Vec::new(), None),
                }
            }
            TranslatedFilter::All => {
                let mut objects = Vec::new();
                let cursor = pagination::drive(
                    page,
                    |token| {
                        let request = users::list_request(&self.config, page, mask, token, false);
                        async move {
                            let body = self
                                .call(&request)
                                .await?
                                .required(&self.config.customer_id)?;
                            Ok(ListPage::from_response(&body, "users"))
                        }
                    },
                    |item| {
                        objects.push(users::to_object(&item, requested, &self.config)?);
                        Ok(())
                    },
                )
                .await?;
                (objects, cursor)
            }
            other => {
                return Err(ConnectorError::operation_failed(format!(
                    "untranslatable account filter {other:?}"
                )))
            }
        };

        if wants_expensive(requested, wellknown::GROUPS) {
            for object in &mut objects {
                let Some(key) = object.get_str(attrs::ID).map(str::to_string) else {
                    continue;
                };
                let group_emails = self.account_groups(&key).await?;
                object.set(wellknown::GROUPS, group_emails);
            }
        }
        Ok(finish(objects, cursor))
    }

    async fn search_groups(
        &self,
        translated: TranslatedFilter,
        requested: Option<&AttrNames>,
        mask: Option<&str>,
        page: &PageOptions,
    ) -> ConnectorResult<SearchResult> {
        let (mut objects, cursor) = match translated {
            TranslatedFilter::DirectKey(key) => {
                let request = groups::get_request(&self.config, &key, mask);
                match self.call(&request).await?.optional(&key)? {
                    Some(body) => (vec![groups::to_object(&body, requested)?], None),
                    None => (Vec::new(), None),
                }
            }
            TranslatedFilter::All => {
                let mut objects = Vec::new();
                let cursor = pagination::drive(
                    page,
                    |token| {
                        let request = groups::list_request(&self.config, page, mask, token);
                        async move {
                            let body = self
                                .call(&request)
                                .await?
                                .required(&self.config.customer_id)?;
                            Ok(ListPage::from_response(&body, "groups"))
                        }
                    },
                    |item| {
                        objects.push(groups::to_object(&item, requested)?);
                        Ok(())
                    },
                )
                .await?;
                (objects, cursor)
            }
            other => {
                return Err(ConnectorError::operation_failed(format!(
                    "untranslatable group filter {other:?}"
                )))
            }
        };

        if wants_expensive(requested, wellknown::MEMBERS) {
            for object in &mut objects {
                let Some(key) = object.get_str(attrs::ID).map(str::to_string) else {
                    continue;
                };
                let value = self.member_attribute(&key).await?;
                object.set(wellknown::MEMBERS, value);
            }
        }
        Ok(finish(objects, cursor))
    }

    async fn search_members(
        &self,
        translated: TranslatedFilter,
        requested: Option<&AttrNames>,
        page: &PageOptions,
    ) -> ConnectorResult<SearchResult> {
        match translated {
            TranslatedFilter::DirectKey(key) => {
                let id = MemberId::parse(&key)?;
                let request = members::get_request(&self.config, &id);
                let objects = match self.call(&request).await?.optional(&key)? {
                    Some(body) => vec![members::to_object(&id.group, &body, requested)?],
                    None => Vec::new(),
                };
                Ok(SearchResult::complete(objects))
            }
            TranslatedFilter::MembersOf(group) => {
                let mut objects = Vec::new();
                let cursor = pagination::drive(
                    page,
                    |token| {
                        let request = members::list_request(&self.config, &group, page, token);
                        let group = &group;
                        async move {
                            let body = self.call(&request).await?.required(group)?;
                            Ok(ListPage::from_response(&body, "members"))
                        }
                    },
                    |item| {
                        objects.push(members::to_object(&group, &item, requested)?);
                        Ok(())
                    },
                )
                .await?;
                Ok(finish(objects, cursor))
            }
            other => Err(ConnectorError::operation_failed(format!(
                "untranslatable member filter {other:?}"
            ))),
        }
    }

    async fn search_org_units(
        &self,
        translated: TranslatedFilter,
        requested: Option<&AttrNames>,
    ) -> ConnectorResult<SearchResult> {
        let scope = match translated {
            TranslatedFilter::DirectKey(key) => {
                let request = orgunits::get_request(&self.config, &key);
                let objects = match self.call(&request).await?.optional(&key)? {
                    Some(body) => vec![orgunits::to_object(&body, requested)?],
                    None => Vec::new(),
                };
                return Ok(SearchResult::complete(objects));
            }
            TranslatedFilter::OrgUnitScope(path) => Some(path),
            TranslatedFilter::All => None,
            other => {
                return Err(ConnectorError::operation_failed(format!(
                    "untranslatable org unit filter {other:?}"
                )))
            }
        };

        // The org unit listing is unpaged.
        let request = orgunits::list_request(&self.config, scope.as_deref());
        let body = self
            .call(&request)
            .await?
            .required(&self.config.customer_id)?;
        let listing = ListPage::from_response(&body, orgunits::LIST_FIELD);
        let objects = listing
            .items
            .iter()
            .map(|item| orgunits::to_object(item, requested))
            .collect::<ConnectorResult<Vec<_>>>()?;
        Ok(SearchResult::complete(objects))
    }

    async fn search_licenses(
        &self,
        translated: TranslatedFilter,
        requested: Option<&AttrNames>,
        page: &PageOptions,
    ) -> ConnectorResult<SearchResult> {
        match translated {
            TranslatedFilter::DirectKey(key) => {
                let id = LicenseId::parse(&key)?;
                let request = licensing::get_request(&self.config, &id);
                let objects = match self.call(&request).await?.optional(&key)? {
                    Some(body) => vec![licensing::to_object(&body, requested)?],
                    None => Vec::new(),
                };
                Ok(SearchResult::complete(objects))
            }
            TranslatedFilter::All => {
                let Some(product) = self.config.product_id.clone() else {
                    return Err(ConnectorError::InvalidConfiguration {
                        message: "license search requires a configured product_id".to_string(),
                    });
                };
                let mut objects = Vec::new();

                // Bounded pages stay product-wide so the continuation
                // cookie is a single API token. Unbounded enumeration
                // scopes to the configured SKUs when there are any.
                if page.is_bounded() || self.config.sku_ids.is_empty() {
                    let cursor = pagination::drive(
                        page,
                        |token| {
                            let request = licensing::list_for_product_request(
                                &self.config,
                                &product,
                                page,
                                token,
                            );
                            let product = &product;
                            async move {
                                let body = self.call(&request).await?.required(product)?;
                                Ok(ListPage::from_response(&body, "items"))
                            }
                        },
                        |item| {
                            objects.push(licensing::to_object(&item, requested)?);
                            Ok(())
                        },
                    )
                    .await?;
                    return Ok(finish(objects, cursor));
                }

                for sku in &self.config.sku_ids {
                    pagination::drive(
                        &PageOptions::default(),
                        |token| {
                            let request = licensing::list_for_sku_request(
                                &self.config,
                                &product,
                                sku,
                                page,
                                token,
                            );
                            let product = &product;
                            async move {
                                let body = self.call(&request).await?.required(product)?;
                                Ok(ListPage::from_response(&body, "items"))
                            }
                        },
                        |item| {
                            objects.push(licensing::to_object(&item, requested)?);
                            Ok(())
                        },
                    )
                    .await?;
                }
                Ok(SearchResult::complete(objects))
            }
            other => Err(ConnectorError::operation_failed(format!(
                "untranslatable license filter {other:?}"
            ))),
        }
    }
}

#[async_trait]
impl Connector for GoogleAppsConnector {
    fn display_name(&self) -> &str {
        DISPLAY_NAME
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> ConnectorResult<()> {
        let request = users::list_request(
            &self.config,
            &PageOptions::sized(1),
            Some(attrs::ID),
            None,
            false,
        );
        self.call(&request).await?.required(&self.config.customer_id)?;
        debug!("connection test passed");
        Ok(())
    }
}

#[async_trait]
impl CreateOp for GoogleAppsConnector {
    #[instrument(skip(self, attributes))]
    async fn create(
        &self,
        object_type: ObjectType,
        attributes: AttributeSet,
    ) -> ConnectorResult<Uid> {
        match object_type {
            ObjectType::Account => self.create_account(attributes).await,
            ObjectType::Group => self.create_group(attributes).await,
            ObjectType::Member => self.create_member(attributes).await,
            ObjectType::OrgUnit => self.create_org_unit(attributes).await,
            ObjectType::LicenseAssignment => self.create_license(attributes).await,
        }
    }
}

#[async_trait]
impl UpdateOp for GoogleAppsConnector {
    #[instrument(skip(self, attributes))]
    async fn update(
        &self,
        object_type: ObjectType,
        uid: &Uid,
        attributes: AttributeSet,
    ) -> ConnectorResult<Uid> {
        match object_type {
            ObjectType::Account => self.update_account(uid, attributes).await,
            ObjectType::Group => self.update_group(uid, attributes).await,
            ObjectType::Member => self.update_member(uid, attributes).await,
            ObjectType::OrgUnit => self.update_org_unit(uid, attributes).await,
            ObjectType::LicenseAssignment => self.update_license(uid, attributes).await,
        }
    }
}

#[async_trait]
impl DeleteOp for GoogleAppsConnector {
    #[instrument(skip(self))]
    async fn delete(&self, object_type: ObjectType, uid: &Uid) -> ConnectorResult<()> {
        let request = match object_type {
            ObjectType::Account => users::delete_request(&self.config, uid.value()),
            ObjectType::Group => groups::delete_request(&self.config, uid.value()),
            ObjectType::Member => {
                let id = MemberId::parse(uid.value())?;
                members::delete_request(&self.config, &id)
            }
            ObjectType::OrgUnit => orgunits::delete_request(&self.config, uid.value()),
            ObjectType::LicenseAssignment => {
                let id = LicenseId::parse(uid.value())?;
                licensing::delete_request(&self.config, &id)
            }
        };
        self.call(&request).await?.required(uid.value())?;
        info!("object deleted");
        Ok(())
    }
}

#[async_trait]
impl SearchOp for GoogleAppsConnector {
    #[instrument(skip(self, filter, attributes_to_get, page))]
    async fn search(
        &self,
        object_type: ObjectType,
        filter: Option<Filter>,
        attributes_to_get: Option<Vec<String>>,
        page: Option<PageOptions>,
    ) -> ConnectorResult<SearchResult> {
        let page = page.unwrap_or_default();
        pagination::validate_page_size(object_type, &page)?;

        let requested = attributes_to_get
            .as_deref()
            .map(|names| AttrNames::from_requested(object_type, names))
            .transpose()?;
        let mask = projection::field_mask(object_type, attributes_to_get.as_deref(), &self.config)?;
        let translated = filter::translate(object_type, filter.as_ref())?;

        match object_type {
            ObjectType::Account => {
                self.search_accounts(translated, requested.as_ref(), mask.as_deref(), &page)
                    .await
            }
            ObjectType::Group => {
                self.search_groups(translated, requested.as_ref(), mask.as_deref(), &page)
                    .await
            }
            ObjectType::Member => {
                self.search_members(translated, requested.as_ref(), &page).await
            }
            ObjectType::OrgUnit => self.search_org_units(translated, requested.as_ref()).await,
            ObjectType::LicenseAssignment => {
                self.search_licenses(translated, requested.as_ref(), &page).await
            }
        }
    }
}
