//! Fake line-counting tools and canned reports
//!
//! The binary clears the environment of every command it runs, so each fake
//! tool is a self-contained shell script that prints a fixed report.

#![allow(dead_code)]

use super::repository::TestEnv;
use repo_stats::core::error::Result;
use std::fs;
use std::path::PathBuf;

pub const MULTI_LANGUAGE_REPORT: &str = "\
       4 text files.
       4 unique files.
       0 files ignored.

github.com/AlDanial/cloc v 1.90  T=0.01 s
-------------------------------------------------------------------------------
Language                     files          blank        comment           code
-------------------------------------------------------------------------------
Rust                             3             10              4            120
Bourne Shell                     1              2              1              9
-------------------------------------------------------------------------------
SUM:                             4             12              5            129
-------------------------------------------------------------------------------
";

pub const SINGLE_LANGUAGE_REPORT: &str = "\
       1 text file.
       1 unique file.
       0 files ignored.

github.com/AlDanial/cloc v 1.90  T=0.01 s
-------------------------------------------------------------------------------
Language                     files          blank        comment           code
-------------------------------------------------------------------------------
Markdown                         1              0              0              1
-------------------------------------------------------------------------------
";

pub const EMPTY_REPORT: &str = "\
       0 text files.
       0 unique files.
       0 files ignored.
";

pub const JSON_REPORT: &str = r#"{"header": {"cloc_url": "github.com/AlDanial/cloc", "n_files": 2},
"Go": {"nFiles": 2, "blank": 6, "comment": 2, "code": 48},
"SUM": {"blank": 6, "comment": 2, "code": 48, "nFiles": 2}}
"#;

/// Writes an executable script that prints `report` and exits with `code`
pub fn fake_cloc(env: &TestEnv, name: &str, report: &str, code: i32) -> Result<PathBuf> {
    let report_path = env.temp_dir.path().join(format!("{name}.out"));
    fs::write(&report_path, report)?;

    let script = env.temp_dir.path().join(name);
    fs::write(
        &script,
        format!("#!/bin/sh\ncat '{}'\nexit {code}\n", report_path.display()),
    )?;
    make_executable(&script)?;

    Ok(script)
}

#[cfg(unix)]
fn make_executable(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}
