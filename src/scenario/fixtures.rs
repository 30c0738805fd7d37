//! Fixture naming and in-page seeding
//!
//! Entity names get a run-unique suffix so scenarios can be re-run against
//! the same instance without colliding with data from earlier runs.

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::config::FixtureConfig;

/// Length of generated suffixes
const SUFFIX_LEN: usize = 6;

/// Produces fixture names for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixtures {
    suffix: Option<String>,
}

impl Fixtures {
    /// Names are used exactly as given
    pub fn literal() -> Self {
        Self { suffix: None }
    }

    /// Names get `-<suffix>` appended
    pub fn with_suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: Some(suffix.into()),
        }
    }

    /// Names get a fresh random suffix
    pub fn unique() -> Self {
        Self::with_suffix(random_suffix())
    }

    pub fn from_config(config: &FixtureConfig) -> Self {
        if !config.unique_names {
            return Self::literal();
        }
        match &config.suffix {
            Some(suffix) if !suffix.is_empty() => Self::with_suffix(suffix.clone()),
            _ => Self::unique(),
        }
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Fixture name derived from `base`
    pub fn name(&self, base: &str) -> String {
        match &self.suffix {
            Some(suffix) => format!("{}-{}", base, suffix),
            None => base.to_string(),
        }
    }
}

/// Random lowercase alphanumeric suffix
pub fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// One line of the bulk-add textarea: `name` or `name|role`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkEntry {
    pub name: String,
    pub role: Option<String>,
}

impl BulkEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
        }
    }

    pub fn with_role(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Some(role.into()),
        }
    }
}

/// Render bulk-add input, one entry per line, names passed through `fixtures`
pub fn bulk_payload(fixtures: &Fixtures, entries: &[BulkEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let name = fixtures.name(&entry.name);
            match &entry.role {
                Some(role) => format!("{}|{}", name, role),
                None => name,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedShift {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
}

/// A user, a site and one shift on that site, created through `window.api`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPlan {
    pub user: SeedUser,
    pub site_name: String,
    pub shift: SeedShift,
}

impl SeedPlan {
    /// TestUser (admin), TestSite and a Day shift 08:00-16:00
    pub fn standard(fixtures: &Fixtures) -> Self {
        Self {
            user: SeedUser {
                username: fixtures.name("TestUser"),
                role: "admin".to_string(),
            },
            site_name: fixtures.name("TestSite"),
            shift: SeedShift {
                name: "Day".to_string(),
                start_time: "08:00".to_string(),
                end_time: "16:00".to_string(),
            },
        }
    }

    /// In-page script creating the fixtures, refreshing the lists and
    /// entering the new site's dashboard. Resolves to `{ siteId }`.
    pub fn script(&self) -> String {
        let user = json!({ "username": self.user.username, "role": self.user.role });
        let site = json!({ "name": self.site_name });
        let shift = json!({
            "name": self.shift.name,
            "start_time": self.shift.start_time,
            "end_time": self.shift.end_time,
        });

        format!(
            r#"(async () => {{
  if (!window.api || typeof window.api.request !== 'function') {{
    throw new Error('window.api.request is not exposed by the page');
  }}
  for (const fn of ['loadSites', 'loadUsers', 'enterSite']) {{
    if (typeof window[fn] !== 'function') throw new Error('window.' + fn + ' is not exposed by the page');
  }}
  const call = async (method, path, body) => {{
    const res = await window.api.request(method, path, body);
    if (res && res.error) throw new Error(method + ' ' + path + ': ' + res.error);
    return res;
  }};
  await call('POST', '/api/users', {user});
  const site = await call('POST', '/api/sites', {site});
  const siteId = site.id;
  await call('POST', '/api/sites/' + siteId + '/shifts', {shift});
  await window.loadSites();
  await window.loadUsers();
  await window.enterSite(siteId);
  return {{ siteId }};
}})()"#
        )
    }
}
