use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::storage::UPLOAD_FOLDERS;

/// Template files the admin panel cannot render without.
const CRITICAL_TEMPLATES: &[&str] = &[
    "website/templates/admin/base.html.tera",
    "website/templates/admin/login.html.tera",
    "website/templates/admin/dashboard.html.tera",
    "website/templates/admin/collections/list.html.tera",
    "website/templates/admin/collections/form.html.tera",
    "website/templates/admin/collections/delete.html.tera",
    "website/templates/admin/settings.html.tera",
    "website/templates/admin/submissions.html.tera",
    "website/templates/admin/footer.html.tera",
];

#[derive(Debug, Default, PartialEq)]
pub struct BootReport {
    pub created: Vec<PathBuf>,
    pub warnings: u32,
    pub errors: u32,
}

fn required_dirs(cfg: &AppConfig) -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("website/templates/admin")];
    if let Some(parent) = Path::new(&cfg.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            dirs.push(parent.to_path_buf());
        }
    }
    let uploads = PathBuf::from(&cfg.uploads_dir);
    for folder in UPLOAD_FOLDERS {
        dirs.push(uploads.join(folder));
    }
    dirs.push(uploads);
    dirs
}

fn writable(dir: &Path) -> Result<(), std::io::Error> {
    let probe = dir.join(".write_test");
    fs::write(&probe, "test")?;
    fs::remove_file(&probe)
}

/// Creates missing directories and checks that the database and upload
/// directories are writable.
pub fn check(cfg: &AppConfig) -> BootReport {
    let mut report = BootReport::default();

    // ── 1. Directories ─────────────────────────────────
    for dir in required_dirs(cfg) {
        if dir.exists() {
            continue;
        }
        match fs::create_dir_all(&dir) {
            Ok(_) => {
                info!("  Created directory: {}", dir.display());
                report.created.push(dir);
            }
            Err(e) => {
                error!("  FAILED to create directory {}: {}", dir.display(), e);
                report.errors += 1;
            }
        }
    }

    // ── 2. Critical templates ──────────────────────────
    for file in CRITICAL_TEMPLATES {
        if !Path::new(file).exists() {
            warn!("  Missing template: {} (admin pages using it will 500)", file);
            report.warnings += 1;
        }
    }

    // ── 3. Database directory writable ─────────────────
    if let Some(db_dir) = Path::new(&cfg.database_path).parent().filter(|p| p.exists()) {
        if let Err(e) = writable(db_dir) {
            error!("  Database directory not writable: {}", e);
            report.errors += 1;
        }
    }

    // ── 4. Uploads directory writable ──────────────────
    let uploads = Path::new(&cfg.uploads_dir);
    if uploads.exists() {
        if let Err(e) = writable(uploads) {
            warn!("  Uploads directory not writable: {} (image uploads will fail)", e);
            report.warnings += 1;
        }
    }

    // ── 5. Geocoding ───────────────────────────────────
    if cfg.amap_key.trim().is_empty() {
        warn!("  amap_key not set, store geocoding is disabled");
        report.warnings += 1;
    }

    report
}

/// Run all boot checks before Rocket launches. Aborts the process on errors.
pub fn run(cfg: &AppConfig) {
    info!("Chaolai boot check starting...");
    let report = check(cfg);

    if report.errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            report.errors, report.warnings
        );
        std::process::exit(1);
    }

    if report.warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some features may not work correctly.",
            report.warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_upload_folders_under_configured_root() {
        let root = std::env::temp_dir().join(format!("chaolai-boot-{}", uuid::Uuid::new_v4()));
        let cfg = AppConfig {
            database_path: root.join("db/chaolai.db").to_string_lossy().into_owned(),
            uploads_dir: root.join("uploads").to_string_lossy().into_owned(),
            ..AppConfig::default()
        };
        let report = check(&cfg);
        assert_eq!(report.errors, 0);
        assert!(root.join("db").is_dir());
        for folder in UPLOAD_FOLDERS {
            assert!(root.join("uploads").join(folder).is_dir());
        }
        // second run creates nothing new
        assert!(check(&cfg).created.iter().all(|d| !d.starts_with(&root)));
        let _ = fs::remove_dir_all(&root);
    }
}
