//! Actor gate
//!
//! Entry point for checks made on behalf of an actor. Anonymous and internal
//! actors are settled here; regular users are handed to the checker.

use crate::access_control::resolver::PermissionChecker;
use crate::access_control::types::{Actor, Perms, RepoContent, RepoName};
use crate::error::{AuthzError, AuthzResult};
use tracing::trace;

/// Level of access the given actor has on the content
///
/// The enforcement switch is consulted here as well as in the checker because
/// the anonymous and internal decisions below only apply while it is on.
pub async fn actor_permissions<C>(
    checker: &C,
    actor: &Actor,
    content: &RepoContent,
) -> AuthzResult<Perms>
where
    C: PermissionChecker + ?Sized,
{
    if !checker.enabled() {
        return Ok(Perms::Read);
    }

    if !actor.is_authenticated() {
        return Err(AuthzError::Unauthenticated);
    }
    if actor.is_internal() {
        trace!(repo = %content.repo, path = %content.path, "Internal actor bypasses path rules");
        return Ok(Perms::Read);
    }

    checker.permissions(actor.uid, content).await
}

/// Keep only the paths the actor may read, preserving input order
///
/// The first failing check aborts the whole call.
pub async fn filter_actor_paths<C, I, S>(
    checker: &C,
    actor: &Actor,
    repo: &RepoName,
    paths: I,
) -> AuthzResult<Vec<String>>
where
    C: PermissionChecker + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut readable = Vec::new();

    for path in paths {
        let content = RepoContent::new(repo.clone(), path);
        if actor_permissions(checker, actor, &content).await?.can_read() {
            readable.push(content.path);
        }
    }

    Ok(readable)
}
