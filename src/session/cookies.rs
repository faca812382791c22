//! Session cookies: the only client-side state the console persists

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::token::TokenPair;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
pub const LOCALE_COOKIE: &str = "NEXT_LOCALE";

fn non_empty(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

pub fn access_token(jar: &CookieJar) -> Option<String> {
    non_empty(jar, ACCESS_TOKEN_COOKIE)
}

/// Both cookies, or nothing
pub fn read_pair(jar: &CookieJar) -> Option<TokenPair> {
    Some(TokenPair {
        access_token: non_empty(jar, ACCESS_TOKEN_COOKIE)?,
        refresh_token: non_empty(jar, REFRESH_TOKEN_COOKIE)?,
    })
}

pub fn locale(jar: &CookieJar) -> Option<String> {
    non_empty(jar, LOCALE_COOKIE)
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Overwrite both token cookies
pub fn store_pair(jar: CookieJar, pair: &TokenPair, secure: bool) -> CookieJar {
    jar.add(session_cookie(ACCESS_TOKEN_COOKIE, pair.access_token.clone(), secure))
        .add(session_cookie(REFRESH_TOKEN_COOKIE, pair.refresh_token.clone(), secure))
}

pub fn clear_pair(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"))
}
