//! Page route table and guard resolution

use crate::models::user::UserClaims;

/// Pages the frontend can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    Register,
    Customer,
    Admin,
    NotFound,
}

/// Who may open a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Requires a session
    Private,
    /// Requires a session with the admin role
    Admin,
}

#[derive(Debug)]
pub struct Route {
    pub path: &'static str,
    pub page: Page,
    pub access: Access,
}

pub const LOGIN_PATH: &str = "/login";
pub const NOT_FOUND_PATH: &str = "/notFound";
pub const CUSTOMER_PATH: &str = "/customerviews";
pub const ADMIN_PATH: &str = "/adminviews";

pub const ROUTES: &[Route] = &[
    Route { path: "/", page: Page::Home, access: Access::Public },
    Route { path: "/home", page: Page::Home, access: Access::Public },
    Route { path: LOGIN_PATH, page: Page::Login, access: Access::Public },
    Route { path: "/register", page: Page::Register, access: Access::Public },
    Route { path: CUSTOMER_PATH, page: Page::Customer, access: Access::Private },
    Route { path: ADMIN_PATH, page: Page::Admin, access: Access::Admin },
    Route { path: NOT_FOUND_PATH, page: Page::NotFound, access: Access::Public },
];

/// Outcome of resolving a path against the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Render(Page),
    Redirect(&'static str),
}

/// Dashboard a signed-in user lands on
pub fn dashboard_for(claims: &UserClaims) -> &'static str {
    if claims.is_admin() {
        ADMIN_PATH
    } else {
        CUSTOMER_PATH
    }
}

pub fn lookup(path: &str) -> Option<&'static Route> {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    ROUTES.iter().find(|route| route.path == path)
}

/// Decide what to show for `path` given the current session
pub fn resolve(path: &str, session: Option<&UserClaims>) -> Resolution {
    let Some(route) = lookup(path) else {
        return Resolution::Render(Page::NotFound);
    };

    match (route.access, session) {
        (Access::Private | Access::Admin, None) => return Resolution::Redirect(LOGIN_PATH),
        (Access::Admin, Some(claims)) if !claims.is_admin() => {
            return Resolution::Redirect(NOT_FOUND_PATH)
        }
        _ => {}
    }

    match (route.page, session) {
        (Page::Login, Some(claims)) => Resolution::Redirect(dashboard_for(claims)),
        // Administrators use the register page to create accounts
        (Page::Register, Some(claims)) if !claims.is_admin() => {
            Resolution::Redirect(dashboard_for(claims))
        }
        (page, _) => Resolution::Render(page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn claims(role: Role) -> UserClaims {
        UserClaims {
            sub: "lector@biblioteca.test".into(),
            id: 7,
            correo: "lector@biblioteca.test".into(),
            role,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_public_pages_render_without_session() {
        assert_eq!(resolve("/", None), Resolution::Render(Page::Home));
        assert_eq!(resolve("/home", None), Resolution::Render(Page::Home));
        assert_eq!(resolve("/login", None), Resolution::Render(Page::Login));
        assert_eq!(resolve("/register", None), Resolution::Render(Page::Register));
    }

    #[test]
    fn test_private_pages_require_session() {
        assert_eq!(resolve("/customerviews", None), Resolution::Redirect("/login"));
        assert_eq!(resolve("/adminviews", None), Resolution::Redirect("/login"));
    }

    #[test]
    fn test_admin_page_rejects_students() {
        let student = claims(Role::Estudiante);
        assert_eq!(resolve("/adminviews", Some(&student)), Resolution::Redirect("/notFound"));
        assert_eq!(resolve("/customerviews", Some(&student)), Resolution::Render(Page::Customer));

        let admin = claims(Role::Admin);
        assert_eq!(resolve("/adminviews", Some(&admin)), Resolution::Render(Page::Admin));
    }

    #[test]
    fn test_signed_in_users_skip_login() {
        let student = claims(Role::Estudiante);
        assert_eq!(resolve("/login", Some(&student)), Resolution::Redirect("/customerviews"));
        assert_eq!(resolve("/register", Some(&student)), Resolution::Redirect("/customerviews"));

        let admin = claims(Role::Admin);
        assert_eq!(resolve("/login", Some(&admin)), Resolution::Redirect("/adminviews"));
        assert_eq!(resolve("/register", Some(&admin)), Resolution::Render(Page::Register));
    }

    #[test]
    fn test_unknown_paths_render_not_found() {
        assert_eq!(resolve("/catalogo", None), Resolution::Render(Page::NotFound));
        assert_eq!(resolve("/home/", None), Resolution::Render(Page::Home));
    }
}
