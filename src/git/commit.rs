//! Commit creation and branch lookup.

use tracing::{debug, warn};

use super::GitRepo;
use crate::error::CommitError;

/// Current branch name from `git rev-parse --abbrev-ref HEAD`.
///
/// Returns an empty string if git fails; the branch name is only prompt context.
pub(crate) fn current_branch(repo: &GitRepo) -> String {
    match repo.run_git(&["rev-parse", "--abbrev-ref", "HEAD"]) {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        Ok(output) => {
            debug!(
                "git rev-parse failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            String::new()
        }
        Err(e) => {
            debug!("Failed to run git rev-parse: {e}");
            String::new()
        }
    }
}

/// Run `git commit -m <message>`.
///
/// The message is passed as a single argv entry, so no shell ever sees it.
/// Unless strict commit checking is enabled the result is not inspected:
/// a failed commit is logged at debug level and reported as success.
pub(crate) fn commit(repo: &GitRepo, message: &str) -> Result<(), CommitError> {
    let result = repo.run_git(&["commit", "-m", message]);

    if !repo.strict_commit {
        match &result {
            Ok(output) if !output.status.success() => debug!(
                code = ?output.status.code(),
                "git commit failed (not checked): {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            Err(e) => debug!("Failed to run git commit (not checked): {e}"),
            Ok(_) => {}
        }
        return Ok(());
    }

    let output = result.map_err(CommitError::SpawnFailed)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("git commit exited with {:?}", output.status.code());
        return Err(CommitError::NonZeroExit {
            code: output.status.code(),
            stderr,
        });
    }

    Ok(())
}
