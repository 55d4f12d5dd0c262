//! Git branch lookup without shelling out
//!
//! The statusline refreshes often, so spawning `git` per tick is too
//! expensive. Reading `.git/HEAD` directly covers branches, detached
//! heads, and linked worktrees, which is all a one-line label needs.

use std::fs;
use std::path::{Path, PathBuf};

/// Current branch for the repository containing `dir`, if any.
///
/// Returns the branch name for a symbolic HEAD, a shortened commit id
/// for a detached HEAD, or `None` when `dir` is not inside a repository.
pub fn current_branch(dir: &Path) -> Option<String> {
    let git_dir = find_git_dir(dir)?;
    let head = fs::read_to_string(git_dir.join("HEAD")).ok()?;
    parse_head(&head)
}

/// Walks up from `dir` looking for a `.git` entry. A plain directory is
/// the repository itself; a file holds a `gitdir:` pointer for worktrees
/// and submodules, which we follow one level.
fn find_git_dir(dir: &Path) -> Option<PathBuf> {
    for ancestor in dir.ancestors() {
        let dot_git = ancestor.join(".git");
        let meta = match fs::metadata(&dot_git) {
            Ok(m) => m,
            Err(_) => continue,
        };
        if meta.is_dir() {
            return Some(dot_git);
        }
        if meta.is_file() {
            let contents = fs::read_to_string(&dot_git).ok()?;
            let target = contents.trim().strip_prefix("gitdir:")?.trim();
            let target = PathBuf::from(target);
            return Some(if target.is_absolute() {
                target
            } else {
                ancestor.join(target)
            });
        }
    }
    None
}

fn parse_head(head: &str) -> Option<String> {
    let head = head.trim();
    if let Some(branch) = head.strip_prefix("ref: refs/heads/") {
        return Some(branch.to_string());
    }
    // Detached HEAD stores the raw commit id.
    if head.len() >= 40 && head.chars().all(|c| c.is_ascii_hexdigit()) {
        return Some(head[..8].to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo(head: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), head).unwrap();
        dir
    }

    #[test]
    fn test_branch_head() {
        let repo = init_repo("ref: refs/heads/main\n");
        assert_eq!(current_branch(repo.path()).as_deref(), Some("main"));
    }

    #[test]
    fn test_branch_with_slashes() {
        let repo = init_repo("ref: refs/heads/feature/cache-rework\n");
        assert_eq!(
            current_branch(repo.path()).as_deref(),
            Some("feature/cache-rework")
        );
    }

    #[test]
    fn test_detached_head_is_shortened() {
        let repo = init_repo("a1b2c3d4e5f60718293a4b5c6d7e8f9012345678\n");
        assert_eq!(current_branch(repo.path()).as_deref(), Some("a1b2c3d4"));
    }

    #[test]
    fn test_lookup_walks_up_from_subdirectory() {
        let repo = init_repo("ref: refs/heads/dev\n");
        let nested = repo.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(current_branch(&nested).as_deref(), Some("dev"));
    }

    #[test]
    fn test_worktree_gitdir_file() {
        let main = TempDir::new().unwrap();
        let wt_git = main.path().join("worktrees/wt1");
        fs::create_dir_all(&wt_git).unwrap();
        fs::write(wt_git.join("HEAD"), "ref: refs/heads/hotfix\n").unwrap();

        let wt = TempDir::new().unwrap();
        fs::write(
            wt.path().join(".git"),
            format!("gitdir: {}\n", wt_git.display()),
        )
        .unwrap();
        assert_eq!(current_branch(wt.path()).as_deref(), Some("hotfix"));
    }

    #[test]
    fn test_no_repository() {
        let dir = TempDir::new().unwrap();
        assert_eq!(current_branch(&dir.path().join("x")), None);
        assert_eq!(current_branch(dir.path()), None);
    }

    #[test]
    fn test_garbage_head() {
        let repo = init_repo("not a head\n");
        assert_eq!(current_branch(repo.path()), None);
    }
}
