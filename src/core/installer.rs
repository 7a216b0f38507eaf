//! Install pipeline: resolve, download, verify, place atomically, smoke-test, record.
//!
//! # Atomicity
//! Every install is assembled in a hidden `.staging-*` directory inside the
//! tool's versions directory, so the final rename to `<version>/` never crosses
//! a filesystem boundary. An error removes the staging directory on the way
//! out. A killed process leaves it behind, next to a `.staging-*.lock` file
//! nobody holds any more; the next install or uninstall sweeps those up along
//! with `.removing-*` directories from an interrupted uninstall.
//!
//! # Concurrency
//! Two processes installing the same version race on the final rename. The
//! loser sees the winner's directory and reports an already-installed success.

use crate::core::catalog::ReleaseCatalog;
use crate::core::config::Config;
use crate::core::dirs::Layout;
use crate::core::download::{download_to, make_executable, parse_checksum_text, verify_checksum};
use crate::core::error::{OpavmError, Result};
use crate::core::github::{ReleaseSource, ReleaseTag};
use crate::core::platform::Platform;
use crate::core::resolver::{locate_binary, InstalledVersion};
use crate::core::state::StateStore;
use crate::core::tool::Tool;
use fs4::FileExt;
use semver::Version;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tempfile::NamedTempFile;

const STAGING_PREFIX: &str = ".staging-";
const REMOVING_PREFIX: &str = ".removing-";
const LOCK_SUFFIX: &str = ".lock";
/// A free staging lock with no directory is only discarded past this age
const ORPHAN_LOCK_AGE: Duration = Duration::from_secs(60 * 60);
const ETXTBSY: i32 = 26;
const EXEC_ATTEMPTS: u32 = 5;

/// Progress notifications emitted during [`Installer::install`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Resolving,
    AlreadyInstalled,
    Downloading,
    VerifyingChecksum,
    SmokeTesting,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub installed: InstalledVersion,
    /// False when the version was already present (including a lost install race)
    pub fresh: bool,
}

type Reporter = Box<dyn Fn(Tool, InstallStage)>;

pub struct Installer<S> {
    catalog: ReleaseCatalog<S>,
    layout: Layout,
    state: StateStore,
    platform: Platform,
    reporter: Option<Reporter>,
}

impl<S: ReleaseSource> Installer<S> {
    pub fn new(source: S, config: Config, platform: Platform) -> Self {
        let layout = config.layout.clone();
        let state = StateStore::new(&layout);
        Self {
            catalog: ReleaseCatalog::new(source, config),
            layout,
            state,
            platform,
            reporter: None,
        }
    }

    pub fn with_reporter(mut self, reporter: impl Fn(Tool, InstallStage) + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    pub fn catalog(&self) -> &ReleaseCatalog<S> {
        &self.catalog
    }

    fn report(&self, tool: Tool, stage: InstallStage) {
        log::debug!("{} install stage: {stage:?}", tool.name());
        if let Some(reporter) = &self.reporter {
            reporter(tool, stage);
        }
    }

    pub fn is_installed(&self, tool: Tool, version: &str) -> bool {
        self.locate(tool, version).is_some()
    }

    fn locate(&self, tool: Tool, version: &str) -> Option<InstalledVersion> {
        locate_binary(&self.layout, self.platform, tool, version)
    }

    /// Install `token` (`latest` or an exact version). Re-installing is a no-op success.
    pub fn install(&self, tool: Tool, token: &str) -> Result<InstallOutcome> {
        self.report(tool, InstallStage::Resolving);

        if let ReleaseTag::Exact(version) = ReleaseTag::parse(token) {
            if let Some(installed) = self.locate(tool, &version) {
                return self.already_installed(installed);
            }
        }

        let release = self.catalog.fetch_release(tool, token)?;
        let version = release.version().to_string();
        if let Some(installed) = self.locate(tool, &version) {
            return self.already_installed(installed);
        }

        let asset = self.catalog.find_asset(tool, &release, self.platform)?;
        let checksum = self.catalog.checksum_asset(&release, asset);

        let versions_dir = self.layout.versions_dir(tool);
        fs::create_dir_all(&versions_dir)?;
        sweep_abandoned(&versions_dir);
        let staging = Staging::create(&versions_dir)?;
        let staged_binary = staging.path().join(self.platform.binary_filename(tool));

        self.report(tool, InstallStage::Downloading);
        let sha256 = download_to(self.catalog.source(), &asset.url, &staged_binary)?;

        match checksum {
            Some(checksum_asset) => {
                self.report(tool, InstallStage::VerifyingChecksum);
                let text = self.catalog.source().fetch_text(&checksum_asset.url)?;
                let expected = parse_checksum_text(&text, &asset.name)?;
                verify_checksum(&asset.name, &expected, &sha256)?;
            }
            None => log::debug!("No checksum asset published for {}", asset.name),
        }

        make_executable(&staged_binary)?;

        self.report(tool, InstallStage::SmokeTesting);
        smoke_test(tool, &version, &staged_binary)?;

        let final_dir = self.layout.version_dir(tool, &version);
        if let Err(e) = fs::rename(staging.path(), &final_dir) {
            if let Some(installed) = self.locate(tool, &version) {
                log::debug!("Concurrent install of {} {version} won the rename", tool.name());
                return self.already_installed(installed);
            }
            if !final_dir.exists() {
                return Err(e.into());
            }
            // A leftover directory without a binary is never a valid install.
            log::warn!("Replacing incomplete version directory {}", final_dir.display());
            fs::remove_dir_all(&final_dir)?;
            fs::rename(staging.path(), &final_dir)?;
        }

        let installed = self.locate(tool, &version).ok_or_else(|| {
            OpavmError::corrupt_install(tool, &version, "binary missing after placement")
        })?;
        self.state.record_install(tool, &version)?;
        self.report(tool, InstallStage::Done);

        Ok(InstallOutcome {
            installed,
            fresh: true,
        })
    }

    fn already_installed(&self, installed: InstalledVersion) -> Result<InstallOutcome> {
        self.report(installed.tool, InstallStage::AlreadyInstalled);
        self.state.record_install(installed.tool, &installed.version)?;
        Ok(InstallOutcome {
            installed,
            fresh: false,
        })
    }

    /// Remove an installed version. The directory is renamed aside first so the
    /// resolver never observes a half-deleted version.
    pub fn uninstall(&self, tool: Tool, version: &str) -> Result<()> {
        if !self.is_installed(tool, version) {
            return Err(OpavmError::version_not_installed(tool, version));
        }
        let versions_dir = self.layout.versions_dir(tool);
        sweep_abandoned(&versions_dir);
        let version_dir = self.layout.version_dir(tool, version);
        let doomed = versions_dir.join(format!(
            "{REMOVING_PREFIX}{version}-{}",
            std::process::id()
        ));
        fs::rename(&version_dir, &doomed)?;
        fs::remove_dir_all(&doomed)?;
        self.state.remove(tool, version)?;
        log::debug!("Removed {} {version}", tool.name());
        Ok(())
    }

    /// Installed versions on disk, newest first when they parse as semver.
    /// The state cache is brought back in line if it disagrees with the directory scan.
    pub fn installed_versions(&self, tool: Tool) -> Result<Vec<String>> {
        let versions_dir = self.layout.versions_dir(tool);
        let mut on_disk = BTreeSet::new();
        if versions_dir.is_dir() {
            for entry in fs::read_dir(&versions_dir)? {
                let entry = entry?;
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                if name.starts_with('.') || !entry.path().is_dir() {
                    continue;
                }
                if self.is_installed(tool, &name) {
                    on_disk.insert(name);
                }
            }
        }

        if self.state.list_installed(tool) != on_disk {
            log::debug!("Installed-version cache for {} is stale, resyncing", tool.name());
            if let Err(e) = self.state.sync_installed(tool, &on_disk) {
                log::warn!("Could not update installed-version cache: {e}");
            }
        }

        let mut versions: Vec<String> = on_disk.into_iter().collect();
        sort_versions_desc(&mut versions);
        Ok(versions)
    }
}

/// Hidden directory an install is assembled in. It is claimed by an exclusive
/// lock on the sibling `<name>.lock` file, taken before the directory exists.
struct Staging {
    dir: PathBuf,
    _lock: NamedTempFile,
}

impl Staging {
    fn create(versions_dir: &Path) -> Result<Self> {
        let lock = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(LOCK_SUFFIX)
            .tempfile_in(versions_dir)?;
        lock.as_file().lock_exclusive()?;
        let name = lock
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(LOCK_SUFFIX))
            .ok_or_else(|| io::Error::other("unexpected staging lock file name"))?;
        let dir = versions_dir.join(name);
        fs::create_dir(&dir)?;
        Ok(Self { dir, _lock: lock })
    }

    fn path(&self) -> &Path {
        &self.dir
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        // Gone already once renamed into place.
        if self.dir.exists() {
            if let Err(e) = fs::remove_dir_all(&self.dir) {
                log::warn!("Could not remove staging directory {}: {e}", self.dir.display());
            }
        }
    }
}

enum LockClaim {
    Missing,
    Held,
    Free(File),
}

fn claim_lock(path: &Path) -> LockClaim {
    match File::open(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => LockClaim::Missing,
        Err(_) => LockClaim::Held,
        Ok(file) => match file.try_lock_exclusive() {
            Ok(()) => LockClaim::Free(file),
            Err(_) => LockClaim::Held,
        },
    }
}

fn older_than(path: &Path, age: Duration) -> bool {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|elapsed| elapsed >= age)
}

fn remove_entry(path: &Path) -> bool {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            log::debug!("Could not remove {}: {e}", path.display());
            false
        }
    }
}

/// Remove what killed installs and uninstalls left in `versions_dir`: staging
/// directories whose lock nobody holds and `.removing-*` directories.
/// Returns how many entries were removed; failures are only logged.
pub(crate) fn sweep_abandoned(versions_dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(versions_dir) else {
        return 0;
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let path = entry.path();

        if name.starts_with(REMOVING_PREFIX) {
            removed += usize::from(remove_entry(&path));
        } else if !name.starts_with(STAGING_PREFIX) {
            continue;
        } else if let Some(stem) = name.strip_suffix(LOCK_SUFFIX) {
            if versions_dir.join(stem).exists() {
                continue;
            }
            if let LockClaim::Free(_file) = claim_lock(&path) {
                if older_than(&path, ORPHAN_LOCK_AGE) {
                    removed += usize::from(remove_entry(&path));
                }
            }
        } else {
            let lock_path = versions_dir.join(format!("{name}{LOCK_SUFFIX}"));
            match claim_lock(&lock_path) {
                LockClaim::Held => continue,
                LockClaim::Missing => removed += usize::from(remove_entry(&path)),
                LockClaim::Free(_file) => {
                    removed += usize::from(remove_entry(&path));
                    remove_entry(&lock_path);
                }
            }
        }
    }
    if removed > 0 {
        log::debug!("Swept {removed} abandoned entries from {}", versions_dir.display());
    }
    removed
}

/// Newest first; tokens that are not semver sort after those that are, lexically
pub fn sort_versions_desc(versions: &mut [String]) {
    versions.sort_by(|a, b| {
        match (Version::parse(a), Version::parse(b)) {
            (Ok(va), Ok(vb)) => vb.cmp(&va),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => b.cmp(a),
        }
    });
}

/// Run `<binary> version` and require a zero exit status
pub fn smoke_test(tool: Tool, version: &str, binary: &Path) -> Result<()> {
    let mut attempt = 0;
    let output = loop {
        attempt += 1;
        match Command::new(binary).arg("version").stdin(Stdio::null()).output() {
            Ok(output) => break output,
            // A fork in another thread can briefly inherit the write handle.
            Err(e) if e.raw_os_error() == Some(ETXTBSY) && attempt < EXEC_ATTEMPTS => {
                log::debug!("{} busy, retrying smoke test", binary.display());
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => return Err(OpavmError::corrupt_install(tool, version, e.to_string())),
        }
    };

    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = match stderr.lines().find(|line| !line.trim().is_empty()) {
        Some(line) => format!("{}: {}", output.status, line.trim()),
        None => output.status.to_string(),
    };
    Err(OpavmError::corrupt_install(tool, version, detail))
}
