use crate::repo::RepoStatus;

/// A policy turning a repository status into a version string. Pure
/// function of the status; callers supply their own to override the
/// default formatting.
pub type VersionPolicy = fn(&RepoStatus) -> String;

/// Derive a version string from a status, using `policy` when given and
/// the default policy otherwise.
pub fn derive_version(status: &RepoStatus, policy: Option<VersionPolicy>) -> String {
    policy.unwrap_or(default_policy)(status)
}

/// Default formatting: the tag without its leading `v`, plus build
/// metadata for commits past the tag and for a dirty tree.
///
/// `v1.2.0-0-gabc1234` clean -> `1.2.0`
/// `v1.2.0-3-gabc1234` clean -> `1.2.0+3.gabc1234`
/// `v1.2.0-3-gabc1234-dirty`  -> `1.2.0+3.gabc1234.dirty`
/// `v1.2.0-0-gabc1234-dirty`  -> `1.2.0+dirty`
pub fn default_policy(status: &RepoStatus) -> String {
    let base = status.tag.strip_prefix('v').unwrap_or(&status.tag);
    let mut version = base.to_string();

    if status.is_ahead() {
        version.push_str(&format!("+{}.g{}", status.ahead, status.ref_short));
        if status.dirty {
            version.push_str(".dirty");
        }
    } else if status.dirty {
        version.push_str("+dirty");
    }

    version
}
