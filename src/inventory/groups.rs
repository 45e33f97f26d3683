use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail, ensure};
use serde::{Deserialize, Serialize};

use crate::util::slug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    pub count: usize,
    pub anomaly_rate: f64,
}

impl GroupSpec {
    pub fn new(name: &str, count: usize, anomaly_rate: f64) -> Self {
        Self {
            name: name.to_owned(),
            count,
            anomaly_rate,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupTable {
    groups: Vec<GroupSpec>,
}

impl Default for GroupTable {
    fn default() -> Self {
        Self {
            groups: vec![
                GroupSpec::new("production", 90, 0.08),
                GroupSpec::new("staging", 45, 0.05),
                GroupSpec::new("development", 60, 0.03),
                GroupSpec::new("qa", 35, 0.04),
                GroupSpec::new("dmz", 20, 0.15),
            ],
        }
    }
}

impl GroupTable {
    pub fn new(groups: Vec<GroupSpec>) -> Result<Self> {
        let table = Self { groups };
        table.validate()?;
        Ok(table)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(raw).context("invalid group table JSON")?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read group table {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("failed to load group table {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.groups.is_empty(), "group table is empty");

        // Asset ids are prefixed with the slug, so two groups must never share one.
        let mut seen: HashMap<String, &str> = HashMap::new();
        for group in &self.groups {
            let name = group.name.trim();
            if name.is_empty() {
                bail!("group names must not be empty");
            }
            if let Some(previous) = seen.insert(slug(name), name) {
                if previous == name {
                    return Err(anyhow!("duplicate group name {name:?}"));
                }
                return Err(anyhow!(
                    "groups {previous:?} and {name:?} both map to the id prefix {:?}",
                    slug(name)
                ));
            }
            if !(0.0..=1.0).contains(&group.anomaly_rate) {
                return Err(anyhow!(
                    "group {name:?} has anomaly rate {} outside [0, 1]",
                    group.anomaly_rate
                ));
            }
            if group.count == 0 {
                log::warn!("group {name:?} has a zero baseline count and will never be populated");
            }
        }

        ensure!(
            self.baseline_total() > 0,
            "group table has no assets; every count is zero"
        );
        Ok(())
    }

    pub fn groups(&self) -> &[GroupSpec] {
        &self.groups
    }

    pub fn names(&self) -> Vec<String> {
        self.groups.iter().map(|group| group.name.clone()).collect()
    }

    pub fn baseline_total(&self) -> usize {
        self.groups.iter().map(|group| group.count).sum()
    }

    pub fn scaled_counts(&self, total: usize) -> Vec<usize> {
        let baseline = self.baseline_total();
        if baseline == 0 {
            return vec![0; self.groups.len()];
        }

        let factor = total as f64 / baseline as f64;
        self.groups
            .iter()
            .map(|group| (group.count as f64 * factor).round() as usize)
            .collect()
    }
}
