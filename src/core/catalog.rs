//! Release catalog: symbolic version resolution, release listing and asset selection.

use crate::core::config::Config;
use crate::core::error::{OpavmError, Result};
use crate::core::github::{Asset, Release, ReleaseSource, ReleaseTag};
use crate::core::platform::Platform;
use crate::core::tool::Tool;

const MAX_PAGE_SIZE: usize = 100;

pub struct ReleaseCatalog<S> {
    source: S,
    config: Config,
}

impl<S: ReleaseSource> ReleaseCatalog<S> {
    pub fn new(source: S, config: Config) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the release for a version token (`latest`, `v1.2.3` or `1.2.3`)
    pub fn fetch_release(&self, tool: Tool, token: &str) -> Result<Release> {
        let repo = self.config.repository(tool)?;
        let tag = ReleaseTag::parse(token);
        log::debug!("Fetching {} release {} from {repo}", tool.name(), tag.api_tag());
        let release = self.source.fetch_release(&repo, &tag)?;
        if release.tag.trim().is_empty() {
            return Err(OpavmError::invalid_response(repo.to_string(), "release tag missing"));
        }
        Ok(release)
    }

    /// Concrete version behind a token; exact tokens are returned unchanged
    pub fn resolve_symbolic(&self, tool: Tool, token: &str) -> Result<String> {
        match ReleaseTag::parse(token) {
            ReleaseTag::Exact(version) => Ok(version),
            ReleaseTag::Latest => Ok(self.fetch_release(tool, token)?.version().to_string()),
        }
    }

    /// Most recent releases first, at most `limit`. Paging stops once `limit` are collected.
    pub fn list_releases(&self, tool: Tool, limit: usize) -> Result<Vec<Release>> {
        if limit < 1 {
            return Err(OpavmError::InvalidLimit);
        }
        let repo = self.config.repository(tool)?;
        let per_page = limit.min(MAX_PAGE_SIZE);

        let mut releases = Vec::with_capacity(limit);
        let mut page = 1;
        while releases.len() < limit {
            let batch = self
                .source
                .fetch_release_page(&repo, page, per_page as u32)?;
            let exhausted = batch.len() < per_page;
            let remaining = limit - releases.len();
            releases.extend(
                batch
                    .into_iter()
                    .filter(|release| !release.tag.trim().is_empty())
                    .take(remaining),
            );
            if exhausted {
                break;
            }
            page += 1;
        }
        Ok(releases)
    }

    /// The single asset of `release` that matches `platform`
    pub fn find_asset<'r>(
        &self,
        tool: Tool,
        release: &'r Release,
        platform: Platform,
    ) -> Result<&'r Asset> {
        select_asset(tool, release, platform)
    }

    /// Companion `<asset>.sha256` on the same release, if published
    pub fn checksum_asset<'r>(&self, release: &'r Release, asset: &Asset) -> Option<&'r Asset> {
        checksum_asset_for(release, asset)
    }
}

/// Candidates are tried in preference order; the first with a match wins.
/// A candidate that matches more than one asset is an error, never a guess.
pub fn select_asset(tool: Tool, release: &Release, platform: Platform) -> Result<&Asset> {
    let candidates = platform.asset_candidates(tool);
    for candidate in &candidates {
        let matches: Vec<&Asset> = release
            .assets
            .iter()
            .filter(|asset| asset.name == *candidate)
            .collect();
        match matches.as_slice() {
            [] => continue,
            [asset] => {
                log::debug!("Selected asset {} for {platform}", asset.name);
                return Ok(asset);
            }
            _ => {
                let urls: Vec<String> = matches.iter().map(|asset| asset.url.clone()).collect();
                return Err(OpavmError::ambiguous_asset(
                    tool,
                    release.version(),
                    platform.to_string(),
                    &urls,
                ));
            }
        }
    }
    Err(OpavmError::asset_not_found(
        tool,
        release.version(),
        platform.to_string(),
        &candidates,
    ))
}

pub fn checksum_asset_for<'r>(release: &'r Release, asset: &Asset) -> Option<&'r Asset> {
    let checksum_name = format!("{}.sha256", asset.name);
    release
        .assets
        .iter()
        .find(|candidate| candidate.name == checksum_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Repository;
    use crate::core::dirs::Layout;
    use crate::core::platform::{Arch, Os};
    use std::cell::RefCell;
    use std::io::Write;

    fn asset(name: &str) -> Asset {
        Asset {
            name: name.to_string(),
            url: format!("https://example.test/{name}"),
        }
    }

    fn release(tag: &str, assets: Vec<Asset>) -> Release {
        Release {
            tag: tag.to_string(),
            published_at: None,
            prerelease: false,
            assets,
        }
    }

    struct PagedSource {
        releases: Vec<Release>,
        pages: RefCell<Vec<(String, u32, u32)>>,
    }

    impl ReleaseSource for PagedSource {
        fn fetch_release(&self, _repo: &Repository, tag: &ReleaseTag) -> Result<Release> {
            match tag {
                ReleaseTag::Latest => Ok(self.releases[0].clone()),
                ReleaseTag::Exact(version) => self
                    .releases
                    .iter()
                    .find(|r| r.version() == version)
                    .cloned()
                    .ok_or_else(|| OpavmError::release_not_found("acme/opa", tag.api_tag())),
            }
        }

        fn fetch_release_page(
            &self,
            repo: &Repository,
            page: u32,
            per_page: u32,
        ) -> Result<Vec<Release>> {
            self.pages
                .borrow_mut()
                .push((repo.to_string(), page, per_page));
            let start = ((page - 1) * per_page) as usize;
            Ok(self
                .releases
                .iter()
                .skip(start)
                .take(per_page as usize)
                .cloned()
                .collect())
        }

        fn download(&self, _url: &str, _sink: &mut dyn Write) -> Result<u64> {
            unreachable!("catalog never downloads")
        }

        fn fetch_text(&self, _url: &str) -> Result<String> {
            unreachable!("catalog never fetches text")
        }
    }

    fn catalog(count: usize) -> ReleaseCatalog<PagedSource> {
        let releases = (0..count)
            .map(|i| release(&format!("v0.{}.0", count - i), vec![]))
            .collect();
        let source = PagedSource {
            releases,
            pages: RefCell::new(Vec::new()),
        };
        ReleaseCatalog::new(source, Config::with_layout(Layout::new("/tmp/opavm")))
    }

    #[test]
    fn test_resolve_latest_returns_most_recent() {
        let catalog = catalog(3);
        assert_eq!(catalog.resolve_symbolic(Tool::Opa, "latest").unwrap(), "0.3.0");
        assert_eq!(catalog.resolve_symbolic(Tool::Opa, "v0.1.0").unwrap(), "0.1.0");
    }

    #[test]
    fn test_list_releases_stops_at_limit() {
        let catalog = catalog(250);
        let releases = catalog.list_releases(Tool::Opa, 120).unwrap();
        assert_eq!(releases.len(), 120);
        assert_eq!(releases[0].version(), "0.250.0");
        assert_eq!(catalog.source().pages.borrow().len(), 2);
    }

    #[test]
    fn test_list_releases_single_page_for_small_limits() {
        let catalog = catalog(30);
        let releases = catalog.list_releases(Tool::Opa, 5).unwrap();
        assert_eq!(releases.len(), 5);
        assert_eq!(
            catalog.source().pages.borrow().as_slice(),
            &[("open-policy-agent/opa".to_string(), 1, 5)]
        );
    }

    #[test]
    fn test_list_releases_stops_on_short_page() {
        let catalog = catalog(3);
        let releases = catalog.list_releases(Tool::Opa, 10).unwrap();
        assert_eq!(releases.len(), 3);
        assert_eq!(catalog.source().pages.borrow().len(), 1);
    }

    #[test]
    fn test_list_releases_rejects_zero_limit() {
        let catalog = catalog(3);
        assert!(matches!(
            catalog.list_releases(Tool::Opa, 0),
            Err(OpavmError::InvalidLimit)
        ));
        assert!(catalog.source().pages.borrow().is_empty());
    }

    #[test]
    fn test_repo_override_validated_before_network() {
        let source = PagedSource {
            releases: vec![],
            pages: RefCell::new(Vec::new()),
        };
        let config =
            Config::with_layout(Layout::new("/tmp/opavm")).with_repo_override(Tool::Opa, "broken");
        let catalog = ReleaseCatalog::new(source, config);

        assert!(matches!(
            catalog.list_releases(Tool::Opa, 5),
            Err(OpavmError::InvalidRepository { .. })
        ));
        assert!(catalog.source().pages.borrow().is_empty());
    }

    #[test]
    fn test_select_asset_prefers_first_candidate() {
        let release = release(
            "v1.2.3",
            vec![asset("opa_linux_arm64_static"), asset("opa_linux_amd64")],
        );
        let arm64 = Platform::new(Os::Linux, Arch::Arm64);
        let picked = select_asset(Tool::Opa, &release, arm64).unwrap();
        assert_eq!(picked.name, "opa_linux_arm64_static");

        let release = self::release(
            "v1.2.3",
            vec![asset("opa_linux_arm64_static"), asset("opa_linux_arm64")],
        );
        let arm64 = Platform::new(Os::Linux, Arch::Arm64);
        let picked = select_asset(Tool::Opa, &release, arm64).unwrap();
        assert_eq!(picked.name, "opa_linux_arm64");
    }

    #[test]
    fn test_select_asset_missing_names_tool_version_platform() {
        let release = release("v1.2.3", vec![asset("opa_darwin_amd64")]);
        let amd64 = Platform::new(Os::Linux, Arch::Amd64);
        let err = select_asset(Tool::Opa, &release, amd64).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("OPA 1.2.3"));
        assert!(msg.contains("linux/amd64"));
    }

    #[test]
    fn test_select_asset_duplicate_names_are_ambiguous() {
        let mut duplicate = asset("regal_Linux_x86_64");
        duplicate.url = "https://mirror.test/regal_Linux_x86_64".to_string();
        let release = release("v0.38.1", vec![asset("regal_Linux_x86_64"), duplicate]);
        let amd64 = Platform::new(Os::Linux, Arch::Amd64);
        let err = select_asset(Tool::Regal, &release, amd64).unwrap_err();
        assert!(matches!(err, OpavmError::AmbiguousAsset { .. }));
    }

    #[test]
    fn test_checksum_asset_lookup() {
        let release = release(
            "v1.2.3",
            vec![asset("opa_linux_amd64"), asset("opa_linux_amd64.sha256")],
        );
        let binary = &release.assets[0];
        assert_eq!(
            checksum_asset_for(&release, binary).unwrap().name,
            "opa_linux_amd64.sha256"
        );
        let other = asset("opa_darwin_amd64");
        assert!(checksum_asset_for(&release, &other).is_none());
    }
}
