use axum::{
    Extension,
    extract::Path,
    http::header,
    response::{Html, IntoResponse},
};

use crate::models::user::User;

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>marginalia</title></head>
<body>
  <h1>marginalia</h1>
  <p>Embeddable comments for your pages.</p>
  <p><a href="/login">Log in</a> or <a href="/register">register</a>.</p>
</body>
</html>
"#;

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Log in</title></head>
<body>
  <h1>Log in</h1>
  <form method="post" action="/login">
    <label>Email <input type="email" name="email"></label>
    <label>Password <input type="password" name="password"></label>
    <button type="submit">Log in</button>
  </form>
</body>
</html>
"#;

const REGISTER_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Register</title></head>
<body>
  <h1>Register</h1>
  <form method="post" action="/register">
    <label>Email <input type="email" name="email"></label>
    <label>Password <input type="password" name="password1"></label>
    <label>Password again <input type="password" name="password2"></label>
    <button type="submit">Register</button>
  </form>
</body>
</html>
"#;

/// Handles GET /.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Handles GET /login.
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// Handles GET /register.
pub async fn register_page() -> Html<&'static str> {
    Html(REGISTER_PAGE)
}

/// Handles GET /admin. Reachable only through the session-check middleware,
/// which put the owning credential into the request extensions.
pub async fn admin(Extension(user): Extension<User>) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Admin</title></head>\n<body>\n  \
         <h1>Admin</h1>\n  <p>Logged in as {}.</p>\n  \
         <p><a href=\"/logout\">Log out</a></p>\n</body>\n</html>\n",
        user.email
    ))
}

/// Handles GET /{id}/js: the per-site embed script.
pub async fn widget_js(Path(site_id): Path<String>) -> impl IntoResponse {
    // The id is echoed into a JS string, so keep it to safe characters.
    let site_id: String = site_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    let body = format!(
        "(function () {{\n  var site = \"{site_id}\";\n  \
         console.log(\"marginalia widget loaded for site \" + site);\n}})();\n"
    );

    ([(header::CONTENT_TYPE, "application/javascript")], body)
}
