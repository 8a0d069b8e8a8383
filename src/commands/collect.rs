use crate::core::{
    cache::{utc_timestamp, CacheStore},
    cleanup,
    config::Config,
    error::{RepoStatsError, Result},
    exec::CommandRunner,
    identity::RepositoryIdentity,
    lock::FileLock,
    state::{Metrics, RunReport, Step, StepFailure},
    stats::StatsExtractor,
    sync::Synchronizer,
};

/// Run the full metrics pipeline for one repository URL.
///
/// Only an unusable URL is returned as an error. Every later step failure is
/// recorded in the report and the run carries on, so the caller always gets
/// the best metrics available.
pub fn execute_collect(url: &str, config: &Config, runner: &CommandRunner) -> Result<RunReport> {
    let identity = RepositoryIdentity::resolve(url, &config.repos_root, config.follow_hierarchy)?;
    log::debug!(
        "Repository {} resolved to {}/{} at {}",
        identity.url,
        identity.organization,
        identity.repository,
        identity.local_path.display()
    );

    let mut failures = Vec::new();

    let lock_path = config
        .cache_root
        .join(&identity.organization)
        .join(format!("{}.lock", identity.file_key()));
    let _lock = match FileLock::acquire(&lock_path, config.lock_timeout) {
        Ok(lock) => Some(lock),
        Err(e) => {
            log::error!("Repository lock error {e}");
            failures.push(StepFailure::new(Step::Lock, e));
            None
        }
    };

    let mut cache =
        CacheStore::open(&config.cache_root, &identity).with_lock_timeout(config.lock_timeout);
    if let Err(e) = cache.load() {
        log::error!("Cache file write error {e}");
        failures.push(StepFailure::new(Step::Cache, e));
    }

    let sync = Synchronizer::new(runner, &identity).synchronize();
    failures.extend(sync.failures);

    let metrics = collect_metrics(&identity, config, runner, &mut cache, &mut failures);

    if !config.skip_cleanup {
        if let Err(e) = cleanup::clean(&identity.local_path, config.force_cleanup) {
            log::error!("rm error {e}");
        }
    }

    Ok(RunReport {
        metrics,
        uptodate: sync.uptodate,
        failures,
    })
}

/// Count the mirror and refresh the cache, or fall back to the cached values.
fn collect_metrics(
    identity: &RepositoryIdentity,
    config: &Config,
    runner: &CommandRunner,
    cache: &mut CacheStore,
    failures: &mut Vec<StepFailure>,
) -> Metrics {
    let cached = cache.entry();
    let cached = Metrics {
        loc: cached.loc,
        pls: cached.pls,
    };

    let extractor = StatsExtractor::new(runner, &config.cloc_bin, config.stats_format);
    let fresh = match extractor.extract(&identity.local_path) {
        Ok(metrics) => metrics,
        Err(e) => {
            log::error!("LOC error {e}");
            if matches!(
                e,
                RepoStatsError::CommandFailed { .. } | RepoStatsError::CommandSpawn { .. }
            ) {
                failures.push(StepFailure::new(Step::Stats, e));
            }
            Metrics::default()
        }
    };

    log::debug!("Cache loc value {}", cached.loc);
    log::debug!("New loc value {}", fresh.loc);

    if fresh.loc == 0 {
        log::debug!("LOC value set from old cache");
        return cached;
    }

    log::debug!("Updating LOC value in cache");
    cache.update(&fresh, utc_timestamp());
    if let Err(e) = cache.persist() {
        log::error!("Cache file write error {e}");
        failures.push(StepFailure::new(Step::Cache, e));
    }

    fresh
}
