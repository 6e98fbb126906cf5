use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use super::snapshot::{AppAggregate, ProcessSample};

/// How matched process names become app keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Key by the raw process name; `Chrome.exe` and `chrome.exe` stay separate.
    #[default]
    Exact,
    /// Key by the lowercased name, so case variants fold into one app.
    Lowercase,
}

impl GroupBy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "exact" => Some(GroupBy::Exact),
            "lowercase" | "lower" => Some(GroupBy::Lowercase),
            _ => None,
        }
    }
}

/// Case-insensitive set of application names eligible for grouping.
#[derive(Clone, Debug, Default)]
pub struct AllowList {
    names: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, process_name: &str) -> bool {
        self.names.contains(&process_name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Fold samples into per-app totals, in order of first occurrence.
///
/// Samples outside the allow-list are ignored here; they still belong in the
/// snapshot's full process list.
pub fn aggregate(
    samples: &[ProcessSample],
    allow_list: &AllowList,
    group_by: GroupBy,
) -> Vec<AppAggregate> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut apps: Vec<AppAggregate> = Vec::new();

    for sample in samples.iter().filter(|s| allow_list.matches(&s.name)) {
        let key = match group_by {
            GroupBy::Exact => sample.name.clone(),
            GroupBy::Lowercase => sample.name.to_lowercase(),
        };

        match index.get(&key) {
            Some(&slot) => {
                let app = &mut apps[slot];
                app.cpu_percent += sample.cpu_percent;
                app.memory_mb += sample.memory_mb;
                app.instances += 1;
            }
            None => {
                index.insert(key.clone(), apps.len());
                apps.push(AppAggregate {
                    name: key,
                    cpu_percent: sample.cpu_percent,
                    memory_mb: sample.memory_mb,
                    instances: 1,
                });
            }
        }
    }

    apps
}
