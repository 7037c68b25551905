//! Server-rendered HTML pages. Every page goes through [`layout`]; all
//! user-supplied values are escaped with [`esc`].

use axum::http::StatusCode;
use axum::response::Html;

use crate::auth::repo::User;
use crate::events::repo::Event;
use crate::middleware::flash::{Flash, FlashKind};

/// Escape a value for interpolation into HTML text or attributes.
pub fn esc(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn alerts_html(alerts: &[Flash]) -> String {
    alerts
        .iter()
        .map(|f| {
            let class = match f.kind {
                FlashKind::Success => "alert alert-success",
                FlashKind::Error => "alert alert-error",
                FlashKind::Info => "alert alert-info",
            };
            format!(r#"<p class="{}">{}</p>"#, class, esc(&f.message))
        })
        .collect()
}

fn nav_html(current_user: Option<&User>) -> String {
    match current_user {
        Some(user) => format!(
            r#"<a href="/">Home</a> <a href="/resources">Resources</a> <a href="/profile">Profile</a> <a href="/events">Events</a> <a href="/auth/logout">Log out ({})</a>"#,
            esc(&user.name)
        ),
        None => r#"<a href="/">Home</a> <a href="/resources">Resources</a> <a href="/auth/login">Log in</a> <a href="/auth/signup">Sign up</a>"#.to_string(),
    }
}

pub fn layout(title: &str, current_user: Option<&User>, alerts: &[Flash], body: &str) -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Eventbook</title>
<link rel="stylesheet" href="/style.css">
</head>
<body>
<nav>{nav}</nav>
{alerts}
<main>
{body}
</main>
</body>
</html>
"#,
        title = esc(title),
        nav = nav_html(current_user),
        alerts = alerts_html(alerts),
        body = body,
    ))
}

pub fn index(current_user: Option<&User>, alerts: &[Flash]) -> Html<String> {
    layout(
        "Home",
        current_user,
        alerts,
        "<h1>Eventbook</h1>\n<p>Keep track of the events you care about. Sign up to start your own list.</p>",
    )
}

pub fn resources(current_user: Option<&User>, alerts: &[Flash]) -> Html<String> {
    layout(
        "Resources",
        current_user,
        alerts,
        r#"<h1>Resources</h1>
<ul>
<li><a href="https://developer.mozilla.org/">MDN Web Docs</a></li>
<li><a href="https://owasp.org/">OWASP</a></li>
<li><a href="https://12factor.net/">The Twelve-Factor App</a></li>
</ul>"#,
    )
}

pub fn profile(user: &User, alerts: &[Flash], events: &[Event]) -> Html<String> {
    let list = if events.is_empty() {
        "<p>No events yet. <a href=\"/events/new\">Create one</a>.</p>".to_string()
    } else {
        let items: String = events
            .iter()
            .map(|e| {
                format!(
                    r#"<li><a href="/events/{}">{}</a></li>"#,
                    e.id,
                    esc(&e.title)
                )
            })
            .collect();
        format!("<ul>{items}</ul>")
    };
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<h2>Your events</h2>\n{}",
        esc(&user.name),
        esc(&user.email),
        list
    );
    layout("Profile", Some(user), alerts, &body)
}

pub fn login_form(alerts: &[Flash]) -> Html<String> {
    layout(
        "Log in",
        None,
        alerts,
        r#"<h1>Log in</h1>
<form method="post" action="/auth/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p>No account? <a href="/auth/signup">Sign up</a>.</p>"#,
    )
}

pub fn signup_form(alerts: &[Flash]) -> Html<String> {
    layout(
        "Sign up",
        None,
        alerts,
        r#"<h1>Sign up</h1>
<form method="post" action="/auth/signup">
<label>Name <input type="text" name="name" required></label>
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" minlength="8" required></label>
<button type="submit">Sign up</button>
</form>
<p>Already registered? <a href="/auth/login">Log in</a>.</p>"#,
    )
}

pub fn events_list(user: &User, alerts: &[Flash], events: &[Event]) -> Html<String> {
    let items: String = events
        .iter()
        .map(|e| {
            format!(
                r#"<li><a href="/events/{}">{}</a></li>"#,
                e.id,
                esc(&e.title)
            )
        })
        .collect();
    let body = format!(
        "<h1>Events</h1>\n<ul>{}</ul>\n<p><a href=\"/events/new\">New event</a></p>",
        items
    );
    layout("Events", Some(user), alerts, &body)
}

pub fn event_form(user: &User, alerts: &[Flash]) -> Html<String> {
    layout(
        "New event",
        Some(user),
        alerts,
        r#"<h1>New event</h1>
<form method="post" action="/events">
<label>Title <input type="text" name="title" required></label>
<label>Location <input type="text" name="location"></label>
<label>Description <textarea name="description"></textarea></label>
<button type="submit">Create</button>
</form>"#,
    )
}

pub fn event_detail(user: &User, alerts: &[Flash], event: &Event) -> Html<String> {
    let location = event
        .location
        .as_deref()
        .map(|l| format!("<p>Location: {}</p>", esc(l)))
        .unwrap_or_default();
    let description = event
        .description
        .as_deref()
        .map(|d| format!("<p>{}</p>", esc(d)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>{title}</h1>
{location}
{description}
<form method="post" action="/events/{id}/delete">
<button type="submit">Delete</button>
</form>
<p><a href="/events">Back to events</a></p>"#,
        title = esc(&event.title),
        location = location,
        description = description,
        id = event.id,
    );
    layout(&event.title, Some(user), alerts, &body)
}

pub fn error_page(status: StatusCode) -> Html<String> {
    let (title, message) = match status {
        StatusCode::NOT_FOUND => ("Not found", "That page does not exist."),
        _ => ("Something went wrong", "Please try again later."),
    };
    layout(
        title,
        None,
        &[],
        &format!("<h1>{}</h1>\n<p>{}</p>", title, message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "x".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn test_event(title: &str) -> Event {
        Event {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            location: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn esc_escapes_html_metacharacters() {
        assert_eq!(
            esc(r#"<script>alert("x&y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn profile_lists_exactly_the_given_events() {
        let user = test_user();
        let events = vec![test_event("Picnic"), test_event("Hack night")];
        let Html(page) = profile(&user, &[], &events);
        assert!(page.contains("Picnic"));
        assert!(page.contains("Hack night"));
        assert!(page.contains("ada@example.com"));
    }

    #[test]
    fn profile_escapes_event_titles() {
        let user = test_user();
        let events = vec![test_event("<b>bold</b>")];
        let Html(page) = profile(&user, &[], &events);
        assert!(page.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!page.contains("<b>bold</b>"));
    }

    #[test]
    fn alerts_render_once_per_flash() {
        let alerts = vec![Flash {
            kind: FlashKind::Error,
            message: "Invalid email or password.".into(),
        }];
        let Html(page) = login_form(&alerts);
        assert_eq!(page.matches("Invalid email or password.").count(), 1);
    }
}
