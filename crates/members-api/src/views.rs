//! HTML rendering. Every value that came from a user goes through [`escape`].

use members_types::models::{Message, User};

const STYLESHEET: &str = "https://cdn.jsdelivr.net/npm/water.css@2/out/water.css";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Wraps `body` in the document shell and the navigation bar for `viewer`.
pub fn layout(viewer: Option<&User>, body: &str) -> String {
    let nav = match viewer {
        Some(user) => format!(
            r#"<a href="/new-message">New Message</a>
      <a href="/join-club">Join Club</a>
      <form method="POST" action="/logout" style="display:inline"><button type="submit">Log Out</button></form>
      <span>Welcome, {}!</span>"#,
            escape(&user.first_name)
        ),
        None => r#"<a href="/login">Login</a>
      <a href="/signup">Sign Up</a>"#
            .to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>Members Only</title>
    <link rel="stylesheet" href="{STYLESHEET}" />
  </head>
  <body>
    <nav>
      <a href="/">Home</a>
      {nav}
    </nav>
    {body}
  </body>
</html>
"#
    )
}

pub fn message_list(messages: &[Message], viewer: Option<&User>) -> String {
    let show_authors = viewer.is_some_and(User::can_see_authors);
    let show_delete = viewer.is_some_and(User::can_delete_messages);

    let mut out = String::from("<div>\n");
    if messages.is_empty() {
        out.push_str("<p>No messages yet.</p>\n");
    }

    for message in messages {
        out.push_str(&format!(
            "<article id=\"message-{}\">\n<h2>{}</h2>\n<p>{}</p>\n",
            message.id,
            escape(&message.title),
            escape(&message.content)
        ));

        if show_authors {
            out.push_str(&format!(
                "<p class=\"meta\">By: {} (user #{}) on {}</p>\n",
                escape(&message.author_name),
                message.author_id,
                message.created_at.format("%Y-%m-%d %H:%M UTC")
            ));
        }

        if show_delete {
            out.push_str(&format!(
                "<form method=\"POST\" action=\"/delete-message/{}\">\n<button type=\"submit\">Delete</button>\n</form>\n",
                message.id
            ));
        }

        out.push_str("</article>\n");
    }

    out.push_str("</div>\n");
    out
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|e| format!("<p class=\"error\" style=\"color: red;\">{}</p>\n", escape(e)))
        .unwrap_or_default()
}

pub fn signup_form(error: Option<&str>) -> String {
    format!(
        r#"<h1>Sign Up</h1>
{}<form method="POST" action="/signup">
  <input name="firstName" type="text" placeholder="First Name" required />
  <input name="lastName" type="text" placeholder="Last Name" required />
  <input name="email" type="email" placeholder="Email" required />
  <input name="password" type="password" placeholder="Password" required />
  <input name="confirmPassword" type="password" placeholder="Confirm Password" required />
  <button type="submit">Sign Up</button>
</form>
"#,
        error_banner(error)
    )
}

pub fn login_form(error: Option<&str>) -> String {
    format!(
        r#"<h1>Login</h1>
{}<form method="POST" action="/login">
  <input name="email" type="email" placeholder="Email" required />
  <input name="password" type="password" placeholder="Password" required />
  <button type="submit">Login</button>
</form>
"#,
        error_banner(error)
    )
}

pub fn join_club_form(error: Option<&str>) -> String {
    format!(
        r#"<h1>Join the Club</h1>
{}<form method="POST" action="/join-club">
  <input name="secretCode" type="password" placeholder="Secret Code" required />
  <button type="submit">Join</button>
</form>
"#,
        error_banner(error)
    )
}

pub fn new_message_form(error: Option<&str>) -> String {
    format!(
        r#"<h1>New Message</h1>
{}<form method="POST" action="/new-message">
  <input name="title" type="text" placeholder="Title" required />
  <textarea name="content" placeholder="Content" required></textarea>
  <button type="submit">Create Message</button>
</form>
"#,
        error_banner(error)
    )
}

pub fn error_page(viewer: Option<&User>) -> String {
    layout(
        viewer,
        "<h1>Something went wrong</h1>\n<p>Please try again later.</p>\n",
    )
}
