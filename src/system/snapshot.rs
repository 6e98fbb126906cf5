use serde::Serialize;

use crate::format::round2;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessSample {
    pub name: String,
    pub pid: u32,
    #[serde(rename = "cpu")]
    pub cpu_percent: f64,
    #[serde(rename = "memory")]
    pub memory_mb: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppAggregate {
    pub name: String,
    #[serde(rename = "cpu")]
    pub cpu_percent: f64,
    #[serde(rename = "memory")]
    pub memory_mb: f64,
    pub instances: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SystemStats {
    #[serde(rename = "totalCpuUsage")]
    pub total_cpu_usage: f64,
    #[serde(rename = "totalMemory")]
    pub total_memory_gb: f64,
    #[serde(rename = "usedMemory")]
    pub used_memory_gb: f64,
}

/// Output of one sampler run. `total_memory_used` and `total_cpu_used` cover
/// the grouped apps only, not the whole system.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub apps: Vec<AppAggregate>,
    pub total_memory_used: f64,
    pub total_cpu_used: f64,
    pub all_processes: Vec<ProcessSample>,
    pub system_stats: SystemStats,
}

impl Snapshot {
    /// Round every numeric leaf to two places and derive the app totals.
    ///
    /// Totals are summed from the already rounded app values, so they always
    /// agree with what a consumer can add up from `apps`.
    pub fn assemble(
        apps: Vec<AppAggregate>,
        all_processes: Vec<ProcessSample>,
        system_stats: SystemStats,
    ) -> Self {
        let apps: Vec<AppAggregate> = apps
            .into_iter()
            .map(|app| AppAggregate {
                cpu_percent: round2(app.cpu_percent),
                memory_mb: round2(app.memory_mb),
                ..app
            })
            .collect();

        let total_memory_used = round2(apps.iter().map(|a| a.memory_mb).sum());
        let total_cpu_used = round2(apps.iter().map(|a| a.cpu_percent).sum());

        let all_processes = all_processes
            .into_iter()
            .map(|p| ProcessSample {
                cpu_percent: round2(p.cpu_percent),
                memory_mb: round2(p.memory_mb),
                ..p
            })
            .collect();

        let system_stats = SystemStats {
            total_cpu_usage: round2(system_stats.total_cpu_usage),
            total_memory_gb: round2(system_stats.total_memory_gb),
            used_memory_gb: round2(system_stats.used_memory_gb),
        };

        Snapshot {
            apps,
            total_memory_used,
            total_cpu_used,
            all_processes,
            system_stats,
        }
    }
}
