//! Named routes
//!
//! Path patterns for the router and concrete URLs for redirects.

pub const HOME: &str = "/";
pub const SIGN_UP: &str = "/accounts/sign-up/";
pub const SIGN_IN: &str = "/accounts/sign-in/";
pub const SIGN_OUT: &str = "/accounts/sign-out/";
pub const USER_PAGE: &str = "/accounts/{username}/";
pub const USER_UPDATE: &str = "/accounts/{username}/update/";
pub const USER_DELETE: &str = "/accounts/{username}/delete/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Home,
    SignUp,
    SignIn,
    SignOut,
    UserPage(&'a str),
    UserUpdate(&'a str),
    UserDelete(&'a str),
}

impl Route<'_> {
    pub fn path(&self) -> String {
        match self {
            Route::Home => HOME.to_string(),
            Route::SignUp => SIGN_UP.to_string(),
            Route::SignIn => SIGN_IN.to_string(),
            Route::SignOut => SIGN_OUT.to_string(),
            Route::UserPage(username) => format!("/accounts/{}/", urlencoding::encode(username)),
            Route::UserUpdate(username) => {
                format!("/accounts/{}/update/", urlencoding::encode(username))
            }
            Route::UserDelete(username) => {
                format!("/accounts/{}/delete/", urlencoding::encode(username))
            }
        }
    }
}

/// Sign-in URL that returns to `next` afterwards.
pub fn sign_in_with_next(next: &str) -> String {
    format!("{}?next={}", SIGN_IN, urlencoding::encode(next))
}

/// Accept only same-site absolute paths as post-login targets.
///
/// Anything outside printable ASCII is refused: browsers drop tabs and
/// newlines from `Location`, which can turn `/\t/host` into `//host`.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.contains('\\')
            && n.bytes().all(|b| b.is_ascii_graphic())
    })
}
