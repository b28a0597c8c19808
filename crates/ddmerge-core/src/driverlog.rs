//! DriverLog integration: attach CI driver records to repositories and
//! register a static contributor for each CI system.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::dataset::{CompanyEntry, DefaultData, Driver, EndDate, User};
use crate::error::{DatasetError, DatasetResult};
use crate::identity::ci_user_id;
use crate::obs;
use crate::retrieval::JsonFetcher;

/// Outcome of applying one DriverLog document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverReport {
    pub drivers_seen: usize,
    /// Drivers appended to a tracked repository.
    pub attached: usize,
    /// Drivers whose repository is not tracked.
    pub dropped: usize,
    /// Drivers without a `ci` block.
    pub skipped_without_ci: usize,
    /// Entries that do not parse as a driver.
    pub malformed: usize,
    pub users_added: usize,
}

/// Fetch the DriverLog document at `uri` and apply it to `data`.
///
/// On a fetch or shape error `data` is left untouched.
pub async fn update_with_driverlog_data(
    data: &mut DefaultData,
    fetcher: &dyn JsonFetcher,
    uri: &str,
) -> DatasetResult<DriverReport> {
    let document = fetcher.read_json(uri).await?;
    apply_driverlog(data, &document, uri)
}

/// Apply an already fetched DriverLog document.
pub fn apply_driverlog(
    data: &mut DefaultData,
    document: &Value,
    uri: &str,
) -> DatasetResult<DriverReport> {
    let entries = document
        .get("drivers")
        .and_then(Value::as_array)
        .ok_or_else(|| DatasetError::Shape {
            uri: uri.to_string(),
            detail: "expected a top-level 'drivers' array".to_string(),
        })?;

    let mut report = DriverReport::default();
    let mut known_users: HashSet<String> = data
        .users
        .iter()
        .filter_map(|u| u.user_id.clone())
        .collect();

    for entry in entries {
        report.drivers_seen += 1;
        let driver: Driver = match serde_json::from_value(entry.clone()) {
            Ok(driver) => driver,
            Err(err) => {
                warn!(event = "driverlog.malformed_driver", error = %err);
                report.malformed += 1;
                continue;
            }
        };
        if driver.ci.is_none() {
            report.skipped_without_ci += 1;
            continue;
        }

        let user_id = ci_user_id(&driver.name);
        if known_users.insert(user_id.clone()) {
            data.users.push(ci_user(user_id, &driver));
            report.users_added += 1;
        }

        match data.repo_mut(driver.target_module()) {
            Some(repo) => {
                repo.drivers.get_or_insert_with(Vec::new).push(driver);
                report.attached += 1;
            }
            None => {
                obs::emit_driver_dropped(&driver.name, driver.target_module());
                report.dropped += 1;
            }
        }
    }

    obs::emit_driverlog_finished(report.attached, report.dropped, report.users_added);
    Ok(report)
}

/// Static identity of the CI system behind `driver`, employed by its vendor.
fn ci_user(user_id: String, driver: &Driver) -> User {
    User::synthesized(
        user_id,
        driver.name.clone(),
        CompanyEntry::new(driver.vendor.clone(), EndDate::Open),
    )
}
