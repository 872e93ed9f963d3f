//! Host and driver profiles
//!
//! Thin store-and-filter operations over the generic repository.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain::principal::Principal;
use crate::domain::profile::{Driver, Host, ServiceTier};
use crate::domain::record::Record;
use crate::domain::repositories::{Repository, RepositoryProvider};
use crate::shared::errors::{DomainError, DomainResult};

/// Fields callers may never patch on a host profile
const HOST_LOCKED_FIELDS: &[&str] = &["userId", "subscriptionStatus"];
/// Fields callers may never patch on a driver profile; admins may set verification
const DRIVER_LOCKED_FIELDS: &[&str] = &["userId"];
const DRIVER_ADMIN_FIELDS: &[&str] = &["verificationStatus"];

#[derive(Debug, Clone)]
pub struct NewHost {
    pub name: String,
    pub email: String,
    pub service_tier: ServiceTier,
}

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub name: String,
    pub email: String,
    pub license_number: Option<String>,
}

/// Profiles expose the owning user id for access checks
trait OwnedProfile: Record {
    fn user_id(&self) -> &str;
}

impl OwnedProfile for Host {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl OwnedProfile for Driver {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

pub struct ProfileService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ProfileService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn create_host(&self, principal: &Principal, details: NewHost) -> DomainResult<Host> {
        let repo = self.repos.hosts();
        ensure_single(repo, &principal.user_id, "host").await?;
        let host = repo
            .insert(Host::new(
                principal.user_id.clone(),
                details.name,
                details.email,
                details.service_tier,
            ))
            .await?;
        info!(host_id = %host.id, user_id = %host.user_id, "Host profile created");
        Ok(host)
    }

    pub async fn create_driver(
        &self,
        principal: &Principal,
        details: NewDriver,
    ) -> DomainResult<Driver> {
        let repo = self.repos.drivers();
        ensure_single(repo, &principal.user_id, "driver").await?;
        let mut driver = Driver::new(principal.user_id.clone(), details.name, details.email);
        driver.license_number = details.license_number;
        let driver = repo.insert(driver).await?;
        info!(driver_id = %driver.id, user_id = %driver.user_id, "Driver profile created");
        Ok(driver)
    }

    pub async fn get_host(&self, principal: &Principal, id: &str) -> DomainResult<Host> {
        load_visible(self.repos.hosts(), principal, id, "Host").await
    }

    pub async fn get_driver(&self, principal: &Principal, id: &str) -> DomainResult<Driver> {
        load_visible(self.repos.drivers(), principal, id, "Driver").await
    }

    /// Admins see every host; other callers see their own profile.
    pub async fn list_hosts(&self, principal: &Principal) -> DomainResult<Vec<Host>> {
        list_visible(self.repos.hosts(), principal).await
    }

    pub async fn list_drivers(&self, principal: &Principal) -> DomainResult<Vec<Driver>> {
        list_visible(self.repos.drivers(), principal).await
    }

    pub async fn update_host(
        &self,
        principal: &Principal,
        id: &str,
        patch: Value,
    ) -> DomainResult<Host> {
        check_patch(&patch, HOST_LOCKED_FIELDS, &[], principal)?;
        load_visible(self.repos.hosts(), principal, id, "Host").await?;
        self.repos
            .hosts()
            .update(id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("Host", id))
    }

    pub async fn update_driver(
        &self,
        principal: &Principal,
        id: &str,
        patch: Value,
    ) -> DomainResult<Driver> {
        check_patch(&patch, DRIVER_LOCKED_FIELDS, DRIVER_ADMIN_FIELDS, principal)?;
        load_visible(self.repos.drivers(), principal, id, "Driver").await?;
        self.repos
            .drivers()
            .update(id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("Driver", id))
    }
}

async fn ensure_single<T: OwnedProfile>(
    repo: &dyn Repository<T>,
    user_id: &str,
    kind: &str,
) -> DomainResult<()> {
    if repo.list().await?.iter().any(|p| p.user_id() == user_id) {
        return Err(DomainError::Conflict(format!(
            "user {} already has a {} profile",
            user_id, kind
        )));
    }
    Ok(())
}

async fn load_visible<T: OwnedProfile>(
    repo: &dyn Repository<T>,
    principal: &Principal,
    id: &str,
    entity: &'static str,
) -> DomainResult<T> {
    let profile = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found(entity, id))?;
    if principal.is_admin() || profile.user_id() == principal.user_id {
        Ok(profile)
    } else {
        Err(DomainError::AccessDenied(format!(
            "{} profile {} belongs to another user",
            entity, id
        )))
    }
}

async fn list_visible<T: OwnedProfile>(
    repo: &dyn Repository<T>,
    principal: &Principal,
) -> DomainResult<Vec<T>> {
    Ok(repo
        .list()
        .await?
        .into_iter()
        .filter(|p| principal.is_admin() || p.user_id() == principal.user_id)
        .collect())
}

fn check_patch(
    patch: &Value,
    locked: &[&str],
    admin_only: &[&str],
    principal: &Principal,
) -> DomainResult<()> {
    let Some(fields) = patch.as_object() else {
        return Err(DomainError::Validation(
            "update payload must be a JSON object".to_string(),
        ));
    };
    for key in fields.keys() {
        if locked.contains(&key.as_str())
            || (admin_only.contains(&key.as_str()) && !principal.is_admin())
        {
            return Err(DomainError::Validation(format!(
                "field {} cannot be changed",
                key
            )));
        }
    }
    Ok(())
}
