//! Platform detection.

/// Check if running in a CI environment.
///
/// Used to force non-interactive output in `main()` and to skip opening
/// a browser once the UI service is up. Checks common CI environment
/// variables: `CI`, `GITHUB_ACTIONS`, `GITLAB_CI`, `CIRCLECI`, `TRAVIS`,
/// `JENKINS_URL`.
pub fn is_ci() -> bool {
    is_ci_with(|key| std::env::var(key).ok())
}

/// [`is_ci`] with a custom environment lookup.
pub fn is_ci_with<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    const CI_VARS: &[&str] = &[
        "CI",
        "GITHUB_ACTIONS",
        "GITLAB_CI",
        "CIRCLECI",
        "TRAVIS",
        "JENKINS_URL",
    ];
    CI_VARS.iter().any(|var| lookup(var).is_some())
}
