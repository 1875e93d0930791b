//! Layer source resolution.
//! Classifies a layer's source specifier as a local directory or a remote
//! git repository, acquires it (cache clone/update for remotes, path
//! validation for locals) and reports its revision.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use sha2::{Digest, Sha256};
use url::Url;

use crate::constants::LOCAL_REVISION;
use crate::error::{Error, Result};

/// Classified layer source.
#[derive(Debug, PartialEq, Eq)]
pub enum LayerSource {
    /// Local filesystem directory (relative, absolute or file:// URI)
    Local(String),
    /// Remote git repository specifier
    Remote(String),
}

impl std::fmt::Display for LayerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerSource::Local(path) => write!(f, "local path: '{path}'"),
            LayerSource::Remote(repo) => write!(f, "git repository: '{repo}'"),
        }
    }
}

impl LayerSource {
    /// Classifies a source specifier. Relative/absolute paths, drive
    /// letters and file:// URIs are local; everything else is remote git.
    pub fn classify(source: &str) -> Self {
        let local = source.starts_with("./")
            || source.starts_with("../")
            || source.starts_with('/')
            || source.starts_with("file://")
            || is_drive_absolute(source);

        if local {
            LayerSource::Local(source.to_string())
        } else {
            LayerSource::Remote(source.to_string())
        }
    }
}

fn is_drive_absolute(source: &str) -> bool {
    let bytes = source.as_bytes();
    bytes.len() >= 3 && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// The local filesystem location a layer source resolved to, plus its
/// revision: a commit hash, or [`LOCAL_REVISION`] for plain directories.
#[derive(Debug)]
pub struct ResolvedLayer {
    pub path: PathBuf,
    pub revision: String,
}

/// Resolves layer sources against a shared on-disk cache.
pub struct LayerResolver {
    cache_dir: PathBuf,
    work_dir: PathBuf,
}

impl LayerResolver {
    /// Creates a resolver. `work_dir` anchors relative local sources.
    pub fn new(cache_dir: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self { cache_dir: cache_dir.into(), work_dir: work_dir.into() }
    }

    /// Turns a layer's source specifier into a [`ResolvedLayer`].
    pub fn resolve(&self, source: &str) -> Result<ResolvedLayer> {
        let path = match LayerSource::classify(source) {
            LayerSource::Local(spec) => self.resolve_local(&spec)?,
            LayerSource::Remote(spec) => self.clone_or_update(&spec)?,
        };
        let revision = revision_of(&path)?;
        Ok(ResolvedLayer { path, revision })
    }

    fn resolve_local(&self, spec: &str) -> Result<PathBuf> {
        let raw = if spec.starts_with("file://") {
            let url = Url::parse(spec).map_err(|e| {
                Error::AcquisitionError(format!("failed to parse file:// URL {spec}: {e}"))
            })?;
            url.to_file_path().map_err(|_| {
                Error::AcquisitionError(format!("file:// URL has no usable path: {spec}"))
            })?
        } else {
            PathBuf::from(spec)
        };

        let path = if raw.is_absolute() { raw } else { self.work_dir.join(raw) };

        if !path.exists() {
            return Err(Error::AcquisitionError(format!(
                "local layer directory does not exist: {}",
                path.display()
            )));
        }
        if !path.is_dir() {
            return Err(Error::AcquisitionError(format!(
                "local layer path is not a directory: {}",
                path.display()
            )));
        }

        println!("Using local layer: {}", path.display());
        Ok(path)
    }

    fn clone_or_update(&self, repo_url: &str) -> Result<PathBuf> {
        let path = self.cache_dir.join(cache_entry_name(repo_url));

        if path.join(".git").exists() {
            println!("Updating layer: {repo_url}");
            self.update_repository(&path)?;
        } else {
            println!("Cloning layer: {repo_url}");
            self.clone_repository(repo_url, &path)?;
        }

        Ok(path)
    }

    fn clone_repository(&self, repo_url: &str, path: &Path) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        debug!("Cloning '{}' to '{}'", repo_url, path.display());

        let mut fetch_opts = git2::FetchOptions::new();
        fetch_opts.remote_callbacks(auth_callbacks());

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_opts);
        builder.clone(repo_url, path).map_err(|e| {
            Error::AcquisitionError(format!("failed to clone repository {repo_url}: {e}"))
        })?;

        Ok(())
    }

    fn update_repository(&self, path: &Path) -> Result<()> {
        let repo = git2::Repository::open(path)?;

        let mut fetch_opts = git2::FetchOptions::new();
        fetch_opts.remote_callbacks(auth_callbacks());
        let mut remote = repo.find_remote("origin")?;
        remote.fetch(&[] as &[&str], Some(&mut fetch_opts), None)?;

        let fetch_head = repo.find_reference("FETCH_HEAD")?;
        let fetched = repo.reference_to_annotated_commit(&fetch_head)?;
        let (analysis, _) = repo.merge_analysis(&[&fetched])?;

        if analysis.is_up_to_date() {
            println!("  Already up-to-date");
            return Ok(());
        }

        if !analysis.is_fast_forward() {
            return Err(Error::AcquisitionError(format!(
                "cannot fast-forward cached layer at {}",
                path.display()
            )));
        }

        let head = repo.head()?;
        let refname = head.name().ok_or_else(|| {
            Error::AcquisitionError(format!("non UTF-8 HEAD reference in {}", path.display()))
        })?;
        let refname = refname.to_string();
        repo.find_reference(&refname)?.set_target(fetched.id(), "otter: fast-forward")?;
        repo.set_head(&refname)?;
        repo.checkout_head(Some(git2::build::CheckoutBuilder::default().force()))?;

        Ok(())
    }
}

fn auth_callbacks() -> git2::RemoteCallbacks<'static> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, _allowed_types| {
        let home = std::env::var("HOME").unwrap_or_default();
        git2::Cred::ssh_key(
            username_from_url.unwrap_or("git"),
            None,
            Path::new(&format!("{home}/.ssh/id_rsa")),
            None,
        )
    });
    callbacks
}

/// Derives the deterministic cache directory name for a remote source:
/// the URL's trailing path segment plus a short hash of the full URL, so
/// entries stay readable without colliding.
pub fn cache_entry_name(repo_url: &str) -> String {
    let trimmed = repo_url.trim_end_matches(".git");
    let mut name = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if let Some(idx) = name.rfind(':') {
        name = &name[idx + 1..];
    }

    let digest = Sha256::digest(repo_url.as_bytes());
    let suffix: String = digest[..4].iter().map(|b| format!("{b:02x}")).collect();

    format!("{name}-{suffix}")
}

/// Returns the head commit hash for a git-backed path, or the
/// [`LOCAL_REVISION`] sentinel for a plain directory. A path that does
/// not exist at all is an error.
pub fn revision_of(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::AcquisitionError(format!(
            "layer path does not exist: {}",
            path.display()
        )));
    }
    if !path.join(".git").exists() {
        return Ok(LOCAL_REVISION.to_string());
    }

    let repo = git2::Repository::open(path)?;
    let head = repo.head()?.peel_to_commit()?;
    Ok(head.id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_local_sources() {
        assert_eq!(LayerSource::classify("./layer"), LayerSource::Local("./layer".into()));
        assert_eq!(LayerSource::classify("../up"), LayerSource::Local("../up".into()));
        assert_eq!(LayerSource::classify("/abs/path"), LayerSource::Local("/abs/path".into()));
        assert_eq!(
            LayerSource::classify("file:///srv/layer"),
            LayerSource::Local("file:///srv/layer".into())
        );
        assert_eq!(LayerSource::classify("C:\\layers"), LayerSource::Local("C:\\layers".into()));
    }

    #[test]
    fn test_classify_remote_sources() {
        assert_eq!(
            LayerSource::classify("git@github.com:user/repo.git"),
            LayerSource::Remote("git@github.com:user/repo.git".into())
        );
        assert_eq!(
            LayerSource::classify("https://github.com/user/repo.git"),
            LayerSource::Remote("https://github.com/user/repo.git".into())
        );
        assert_eq!(LayerSource::classify("plain-name"), LayerSource::Remote("plain-name".into()));
    }

    #[test]
    fn test_layer_source_display() {
        let local = LayerSource::Local("./layer".into());
        assert_eq!(format!("{}", local), "local path: './layer'");

        let remote = LayerSource::Remote("git@github.com:user/repo".into());
        assert_eq!(format!("{}", remote), "git repository: 'git@github.com:user/repo'");
    }

    #[test]
    fn test_cache_entry_name_is_readable_and_unique() {
        let a = cache_entry_name("https://github.com/otter-layers/go-cobra-cli.git");
        let b = cache_entry_name("git@github.com:forked/go-cobra-cli.git");

        assert!(a.starts_with("go-cobra-cli-"));
        assert!(b.starts_with("go-cobra-cli-"));
        assert_ne!(a, b);
        // Deterministic across calls
        assert_eq!(a, cache_entry_name("https://github.com/otter-layers/go-cobra-cli.git"));
    }

    #[test]
    fn test_revision_of_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(revision_of(dir.path()).unwrap(), LOCAL_REVISION);
    }

    #[test]
    fn test_revision_of_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(revision_of(&missing).is_err());
    }
}
