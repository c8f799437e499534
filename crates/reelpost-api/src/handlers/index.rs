//! Landing page with sign-in state and the upload form.

use crate::state::AppState;
use axum::{extract::State, response::Html};
use reelpost_core::models::{VideoCategory, DEFAULT_CATEGORY_ID};
use std::fmt::Write;
use std::sync::Arc;

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn category_options(categories: &[VideoCategory]) -> String {
    let mut options = String::new();
    for category in categories {
        let selected = if category.id == DEFAULT_CATEGORY_ID {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            options,
            r#"<option value="{}"{}>{}</option>"#,
            escape_html(&category.id),
            selected,
            escape_html(&category.name)
        );
    }
    options
}

fn upload_form(categories: &[VideoCategory]) -> String {
    format!(
        r#"<form action="/upload" method="post" enctype="multipart/form-data">
<p><label>Video <input type="file" name="video" accept="video/*" required></label></p>
<p><label>Thumbnail <input type="file" name="thumbnail" accept="image/*"></label></p>
<p><label>Title <input type="text" name="title" maxlength="100"></label></p>
<p><label>Description <textarea name="description"></textarea></label></p>
<p><label>Tags <input type="text" name="tags" placeholder="comma, separated"></label></p>
<p><label>Category <select name="category_id">{}</select></label></p>
<p><label>Privacy <select name="privacy_status">
<option value="private" selected>Private</option>
<option value="unlisted">Unlisted</option>
<option value="public">Public</option>
</select></label></p>
<p><label>Publish at <input type="text" name="publish_at" placeholder="2030-01-01T00:00:00Z"></label></p>
<p><label><input type="checkbox" name="made_for_kids" value="true"> Made for kids</label></p>
<p><button type="submit">Upload</button></p>
</form>"#,
        category_options(categories)
    )
}

fn render_page(authenticated: bool, categories: &[VideoCategory]) -> String {
    let body = if authenticated {
        format!(
            r#"<p>Signed in. <a href="/auth/logout">Sign out</a></p>
{}"#,
            upload_form(categories)
        )
    } else {
        r#"<p>Not signed in. <a href="/auth">Sign in with Google</a></p>"#.to_string()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Reelpost</title>
</head>
<body>
<h1>Reelpost</h1>
{}
</body>
</html>
"#,
        body
    )
}

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let authenticated = state.auth.is_authenticated().await;
    Html(render_page(authenticated, &state.uploader.get_categories()))
}
