//! File watching shared by `build --watch` and the dev server

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::Site;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Block the current thread, calling `on_change` with each batch of changed paths
///
/// Watches the content directory, the static directory and the config file.
/// Returns when the watcher's channel closes.
pub fn watch<F>(site: &Site, mut on_change: F) -> Result<()>
where
    F: FnMut(&[PathBuf]),
{
    let (tx, rx) = mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(DEBOUNCE, tx)?;

    let targets = [
        (site.content_dir.clone(), RecursiveMode::Recursive),
        (site.static_dir.clone(), RecursiveMode::Recursive),
        (site.config_path(), RecursiveMode::NonRecursive),
    ];
    for (path, mode) in &targets {
        if path.exists() {
            debouncer.watcher().watch(path, *mode)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }
    let roots = watch_roots(site);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed = relevant_changes(&roots, events.into_iter().map(|e| e.path));
                if changed.is_empty() {
                    continue;
                }
                for path in &changed {
                    tracing::info!("File changed: {}", path.display());
                }
                on_change(&changed);
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Watched paths, as configured and in canonical form
///
/// Events arrive with canonical absolute paths, so both spellings are kept.
pub fn watch_roots(site: &Site) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for path in [
        site.content_dir.clone(),
        site.static_dir.clone(),
        site.config_path(),
    ] {
        if let Ok(canonical) = fs::canonicalize(&path) {
            if canonical != path {
                roots.push(canonical);
            }
        }
        roots.push(path);
    }
    roots
}

/// Keep the changed paths worth a rebuild
pub fn relevant_changes<I>(roots: &[PathBuf], paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    paths
        .into_iter()
        .filter(|p| is_relevant(roots, p))
        .collect()
}

/// Skip VCS internals, hidden files and editor backups below a watched root
///
/// Only the part of the path under the root is inspected; the directories
/// holding the site may be hidden themselves.
fn is_relevant(roots: &[PathBuf], path: &Path) -> bool {
    let relative = roots
        .iter()
        .find_map(|root| path.strip_prefix(root).ok())
        .or_else(|| path.file_name().map(Path::new))
        .unwrap_or(path);

    let hidden = relative.components().any(|c| match c {
        Component::Normal(s) => s.to_str().is_some_and(|s| s.starts_with('.')),
        _ => false,
    });
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    !hidden && !name.ends_with('~') && !name.ends_with(".swp")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots(base: &str) -> Vec<PathBuf> {
        let base = Path::new(base);
        vec![
            base.join("posts"),
            base.join("static"),
            base.join("_config.yml"),
        ]
    }

    #[test]
    fn test_is_relevant() {
        let roots = roots("/site");
        assert!(is_relevant(&roots, Path::new("/site/posts/hello.mdx")));
        assert!(is_relevant(&roots, Path::new("/site/_config.yml")));
        assert!(!is_relevant(&roots, Path::new("/site/posts/.git/index")));
        assert!(!is_relevant(&roots, Path::new("/site/posts/.hello.mdx.swp")));
        assert!(!is_relevant(&roots, Path::new("/site/posts/hello.mdx~")));
        assert!(!is_relevant(&roots, Path::new("/site/static/.DS_Store")));
    }

    #[test]
    fn test_hidden_parent_directories_are_ignored() {
        let roots = roots("/home/ada/.sites/blog");
        assert!(is_relevant(
            &roots,
            Path::new("/home/ada/.sites/blog/posts/hello.mdx")
        ));
        assert!(is_relevant(
            &roots,
            Path::new("/home/ada/.sites/blog/static/img/a.png")
        ));
        assert!(!is_relevant(
            &roots,
            Path::new("/home/ada/.sites/blog/static/.cache/a")
        ));

        // Outside every root only the file name counts
        assert!(is_relevant(&roots, Path::new("/tmp/.tmpjDt5Cl/posts/hello.mdx")));
        assert!(!is_relevant(&roots, Path::new("/tmp/.tmpjDt5Cl/posts/.hello.mdx")));
    }

    #[test]
    fn test_watch_roots_include_canonical_form() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("posts")).unwrap();
        let site = Site::new(dir.path().join("posts").join("..")).unwrap();

        let roots = watch_roots(&site);
        let canonical = fs::canonicalize(dir.path()).unwrap().join("posts");
        assert!(roots.contains(&canonical));
        assert!(roots.contains(&site.content_dir));

        let changed = relevant_changes(&roots, vec![canonical.join("new.mdx")]);
        assert_eq!(changed, vec![canonical.join("new.mdx")]);
    }
}
