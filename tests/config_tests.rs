use repo_stats::core::config::{
    Config, StatsFormat, ENV_CACHE_PATH, ENV_CLOC_FORMAT, ENV_FOLLOW_HIERARCHY, ENV_REPOS_PATH,
    ENV_SKIP_CLEANUP,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

const TOUCHED: [&str; 5] = [
    ENV_REPOS_PATH,
    ENV_CACHE_PATH,
    ENV_SKIP_CLEANUP,
    ENV_FOLLOW_HIERARCHY,
    ENV_CLOC_FORMAT,
];

fn clear_env() {
    for key in TOUCHED {
        env::remove_var(key);
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        clear_env();
        env::set_var(ENV_REPOS_PATH, "/srv/mirrors");
        env::set_var(ENV_CACHE_PATH, "/srv/cache");
        env::set_var(ENV_SKIP_CLEANUP, "true");
        env::set_var(ENV_CLOC_FORMAT, "text");

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.repos_root, PathBuf::from("/srv/mirrors"));
        assert_eq!(config.cache_root, PathBuf::from("/srv/cache"));
        assert!(config.skip_cleanup);
        assert!(!config.follow_hierarchy);
        assert_eq!(config.stats_format, StatsFormat::Text);
    }

    #[test]
    #[serial]
    fn test_from_env_expands_home() {
        clear_env();
        let temp_dir = tempfile::TempDir::new().unwrap();
        let previous_home = env::var_os("HOME");
        env::set_var("HOME", temp_dir.path());
        env::set_var(ENV_REPOS_PATH, "~/mirrors");

        let config = Config::from_env();

        match previous_home {
            Some(home) => env::set_var("HOME", home),
            None => env::remove_var("HOME"),
        }
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.repos_root, temp_dir.path().join("mirrors"));
        assert_eq!(
            config.cache_root,
            temp_dir.path().join(".perceval").join("cache")
        );
    }
}
