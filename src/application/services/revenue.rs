//! Revenue rollups for hosts

use std::sync::Arc;

use crate::domain::principal::Principal;
use crate::domain::repositories::{Repository, RepositoryProvider};
use crate::domain::reservation::parse_date;
use crate::domain::revenue::{summarize, RevenueSummary};
use crate::shared::errors::{DomainError, DomainResult};

pub struct RevenueService {
    repos: Arc<dyn RepositoryProvider>,
}

impl RevenueService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Summary for one host. Hosts get their own figures; admins name the host.
    /// `from`/`to` bound the pickup date inclusively.
    pub async fn host_summary(
        &self,
        principal: &Principal,
        host_id: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> DomainResult<RevenueSummary> {
        let host_id = match (principal.is_admin(), host_id) {
            (true, Some(id)) => id.to_string(),
            (true, None) => {
                return Err(DomainError::Validation("hostId is required".to_string()));
            }
            (false, requested) => {
                let own = principal.require_host()?;
                if requested.is_some_and(|id| id != own) {
                    return Err(DomainError::AccessDenied(
                        "revenue of another host".to_string(),
                    ));
                }
                own.to_string()
            }
        };

        let from = from.map(parse_date).transpose()?;
        let to = to.map(parse_date).transpose()?;
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(DomainError::InvalidRange(format!(
                    "from {} is after to {}",
                    f, t
                )));
            }
        }

        let reservations = self.repos.reservations().list().await?;
        let trips = self.repos.trips().list().await?;
        Ok(summarize(&host_id, &reservations, &trips, from, to))
    }
}
