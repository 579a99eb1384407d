use axum::response::Redirect;
use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};

use crate::auth::LOGIN_COOKIE;

pub async fn do_logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    let mut cookie = Cookie::from(LOGIN_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), Redirect::to("/login"))
}
