//! HTML helpers for document export

use serde::Serialize;

use crate::error::RenderError;

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// JSON that is safe to inline in a `<script>` element
pub(crate) fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub(crate) fn page(title: &str, head: &str, body_script: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head>
<meta charset="utf-8"/>
<title>{title}</title>
<style>html,body,#map{{margin:0;width:100%;height:100%}}</style>
{head}
</head>
<body>
<div id="map"></div>
<script>
{body_script}
</script>
</body>
</html>
"#,
        title = escape(title),
        head = head,
        body_script = body_script
    )
}
