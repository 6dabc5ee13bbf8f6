//! Navigation guard: which console routes need a logged-in user, and where
//! to send the visitor when there is none.

use crate::store::State;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login { return_to: Option<String> },
    Register,
    Home,
    CreateBlog,
    EditBlog { slug: String },
}

impl Route {
    /// Match a console path (without query string) to a route.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.trim_end_matches('/');
        match path {
            "" => Some(Route::Home),
            "/login" => Some(Route::Login { return_to: None }),
            "/register" => Some(Route::Register),
            "/create" => Some(Route::CreateBlog),
            _ => {
                let slug = path.strip_prefix("/edit/")?;
                if slug.is_empty() || slug.contains('/') {
                    return None;
                }
                Some(Route::EditBlog {
                    slug: slug.to_string(),
                })
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Login { .. } => "login",
            Route::Register => "register",
            Route::Home => "home",
            Route::CreateBlog => "createBlog",
            Route::EditBlog { .. } => "editBlog",
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login { .. } => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Home => "/".to_string(),
            Route::CreateBlog => "/create".to_string(),
            Route::EditBlog { slug } => format!("/edit/{slug}"),
        }
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, Route::Home | Route::CreateBlog | Route::EditBlog { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Route),
}

/// Protected routes need a loaded user; anything else is sent to the login
/// page, remembering where the visitor was headed.
pub fn guard(state: &State, to: &Route) -> Navigation {
    if to.requires_login() && !state.user.is_loaded() {
        tracing::debug!(route = to.name(), user = ?state.user.state(), "redirecting to login");
        return Navigation::Redirect(Route::Login {
            return_to: Some(to.path()),
        });
    }
    Navigation::Proceed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadable::Loadable;
    use crate::types::User;

    fn logged_in() -> State {
        State {
            user: Loadable::loaded(User {
                username: "alice".to_string(),
                display_name: None,
            }),
            blogs: Loadable::Uninitialized,
        }
    }

    #[test]
    fn parse_known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse("/create"), Some(Route::CreateBlog));
        assert_eq!(
            Route::parse("/edit/travels"),
            Some(Route::EditBlog {
                slug: "travels".to_string()
            })
        );
        assert_eq!(Route::parse("/edit/"), None);
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn anonymous_visitor_is_redirected_with_return_path() {
        let to = Route::EditBlog {
            slug: "travels".to_string(),
        };
        assert_eq!(
            guard(&State::default(), &to),
            Navigation::Redirect(Route::Login {
                return_to: Some("/edit/travels".to_string())
            })
        );
    }

    #[test]
    fn loading_user_is_not_logged_in() {
        let state = State {
            user: Loadable::Loading,
            blogs: Loadable::Uninitialized,
        };
        assert!(matches!(guard(&state, &Route::Home), Navigation::Redirect(_)));
    }

    #[test]
    fn public_routes_always_proceed() {
        assert_eq!(guard(&State::default(), &Route::Register), Navigation::Proceed);
        assert_eq!(
            guard(&State::default(), &Route::Login { return_to: None }),
            Navigation::Proceed
        );
    }

    #[test]
    fn logged_in_user_proceeds() {
        assert_eq!(guard(&logged_in(), &Route::CreateBlog), Navigation::Proceed);
    }
}
