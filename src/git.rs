//! Thin wrappers over the `git` CLI for the working tree in the current directory.

use log::debug;
use tokio::process::Command;

use crate::error::{PipeError, Result};

async fn run_git(args: &[&str]) -> Result<String> {
    debug!("git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .output()
        .await
        .map_err(|e| PipeError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PipeError::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Name of the checked out branch.
pub async fn current_branch() -> Result<String> {
    let branch = run_git(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
    if branch == "HEAD" {
        return Err(PipeError::Git(
            "HEAD is detached; pass --branch to choose the branch to build".to_string(),
        ));
    }
    Ok(branch)
}

pub async fn head_commit() -> Result<String> {
    run_git(&["rev-parse", "HEAD"]).await
}

/// Commit the remote `origin` has for `branch`, if the branch exists there.
pub async fn remote_head(branch: &str) -> Result<Option<String>> {
    let reference = format!("refs/heads/{branch}");
    let output = run_git(&["ls-remote", "origin", &reference]).await?;
    Ok(parse_ls_remote(&output, &reference))
}

fn parse_ls_remote(output: &str, reference: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (sha, name) = line.split_once('\t')?;
        (name.trim() == reference).then(|| sha.trim().to_string())
    })
}
