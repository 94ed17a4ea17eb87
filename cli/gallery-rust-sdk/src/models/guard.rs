//! Access rules for the admin area.

pub const ADMIN_ROOT: &str = "/admin";
pub const LOGIN_PATH: &str = "/admin/login";
pub const ADMIN_HOME: &str = "/admin/websites";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

fn is_admin_path(path: &str) -> bool {
    path == ADMIN_ROOT || path.starts_with("/admin/")
}

/// Decide whether navigating to `target` may proceed.
///
/// Admin pages other than the login page require a session,
/// and a signed in user has no business on the login page.
pub fn guard(target: &str, authenticated: bool) -> GuardDecision {
    if target == LOGIN_PATH {
        return if authenticated {
            GuardDecision::Redirect(ADMIN_HOME)
        } else {
            GuardDecision::Proceed
        };
    }

    if is_admin_path(target) && !authenticated {
        return GuardDecision::Redirect(LOGIN_PATH);
    }

    GuardDecision::Proceed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_pages_require_authentication() {
        assert_eq!(
            guard("/admin/websites", false),
            GuardDecision::Redirect(LOGIN_PATH)
        );
        assert_eq!(guard("/admin", false), GuardDecision::Redirect(LOGIN_PATH));
        assert_eq!(guard("/admin/websites/acme", true), GuardDecision::Proceed);
    }

    #[test]
    fn login_page_redirects_signed_in_users() {
        assert_eq!(guard(LOGIN_PATH, false), GuardDecision::Proceed);
        assert_eq!(guard(LOGIN_PATH, true), GuardDecision::Redirect(ADMIN_HOME));
    }

    #[test]
    fn public_pages_always_proceed() {
        for path in ["/", "/websites/acme", "/categories/saas", "/administrators"] {
            assert_eq!(guard(path, false), GuardDecision::Proceed, "path: {path}");
        }
    }
}
