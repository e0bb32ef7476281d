use super::escape_html;
use super::fields::{fields_for, FieldKind, FormField};
use filekit_core::catalog::{Category, ToolDescriptor};
use filekit_core::OptionalIdentity;
use std::fmt::Write;

const FONT_AWESOME: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css";

const STYLE: &str = r#"
body { font-family: system-ui, -apple-system, sans-serif; margin: 0; background: #f5f6f8; color: #1f2933; }
header { background: #1f2933; color: #fff; padding: 1rem 2rem; display: flex; justify-content: space-between; align-items: center; }
header a { color: #fff; text-decoration: none; margin-left: 1rem; }
main { max-width: 1100px; margin: 0 auto; padding: 2rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(230px, 1fr)); gap: 1rem; }
.card { background: #fff; border-radius: 8px; padding: 1rem 1.25rem; box-shadow: 0 1px 3px rgba(0,0,0,.08); text-decoration: none; color: inherit; display: block; }
.card h3 { margin: .5rem 0 .25rem; font-size: 1.05rem; }
.card p { margin: 0; color: #52606d; font-size: .9rem; }
.red { color: #d64545; } .blue { color: #2f80ed; } .purple { color: #8e44ad; } .green { color: #27ae60; }
form label { display: block; margin: .75rem 0 .25rem; font-weight: 600; }
form input, form select { padding: .4rem; width: 100%; max-width: 360px; }
form input[type=checkbox] { width: auto; }
button { margin-top: 1rem; padding: .6rem 1.4rem; border: 0; border-radius: 6px; background: #2f80ed; color: #fff; cursor: pointer; }
#result { margin-top: 1.5rem; }
pre { background: #fff; padding: 1rem; white-space: pre-wrap; border-radius: 6px; }
.error { color: #d64545; }
"#;

const UPLOAD_SCRIPT: &str = r#"
document.getElementById('tool-form').addEventListener('submit', async (event) => {
  event.preventDefault();
  const form = event.target;
  const result = document.getElementById('result');
  result.textContent = 'Processing...';
  try {
    const response = await fetch(form.action, { method: 'POST', body: new FormData(form) });
    const body = await response.json();
    result.replaceChildren();
    if (!body.success) {
      const p = document.createElement('p');
      p.className = 'error';
      p.textContent = body.error || 'Processing failed';
      result.appendChild(p);
      return;
    }
    const message = document.createElement('p');
    message.textContent = body.message;
    result.appendChild(message);
    const outputs = body.output_files || [body];
    for (const output of outputs) {
      const link = document.createElement('a');
      link.href = output.download_url;
      link.textContent = 'Download ' + output.filename;
      result.appendChild(link);
      result.appendChild(document.createElement('br'));
    }
    if (body.text_preview) {
      const pre = document.createElement('pre');
      pre.textContent = body.text_preview;
      result.appendChild(pre);
    }
  } catch (err) {
    result.textContent = 'Request failed: ' + err;
  }
});
"#;

fn page(title: &str, identity: &OptionalIdentity, body: &str) -> String {
    let account = match identity.username() {
        Some(name) => format!("<span>{}</span>", escape_html(name)),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | File Tools</title>
<link rel="stylesheet" href="{FONT_AWESOME}">
<style>{STYLE}</style>
</head>
<body>
<header><a href="/"><strong><i class="fas fa-toolbox"></i> File Tools</strong></a><nav><a href="/tools">All tools</a>{account}</nav></header>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
    )
}

fn tool_card(out: &mut String, tool: &ToolDescriptor) {
    let _ = write!(
        out,
        r#"<a class="card" href="/tool/{id}"><i class="{icon} {color}"></i><h3>{name}</h3><p>{description}</p></a>"#,
        id = escape_html(tool.id),
        icon = escape_html(tool.icon),
        color = tool.category.color(),
        name = escape_html(tool.name),
        description = escape_html(tool.description),
    );
}

fn category_section(out: &mut String, category: Category, heading_link: bool) {
    let heading = escape_html(category.display_name());
    if heading_link {
        let _ = write!(
            out,
            r#"<h2><i class="{} {}"></i> <a href="/tools/{}">{}</a></h2>"#,
            category.icon(),
            category.color(),
            category.as_str(),
            heading
        );
    } else {
        let _ = write!(
            out,
            r#"<h2><i class="{} {}"></i> {}</h2>"#,
            category.icon(),
            category.color(),
            heading
        );
    }
    out.push_str(r#"<div class="grid">"#);
    for tool in category.tools() {
        tool_card(out, tool);
    }
    out.push_str("</div>");
}

/// `/`: one card per category.
pub fn home_page(identity: &OptionalIdentity) -> String {
    let mut body = String::from(
        "<h1>Free online file tools</h1><p>Convert, compress and edit PDFs, images, video and audio.</p><div class=\"grid\">",
    );
    for category in Category::ALL {
        let _ = write!(
            body,
            r#"<a class="card" href="/tools/{slug}"><i class="{icon} {color} fa-2x"></i><h3>{name}</h3><p>{count} tools</p></a>"#,
            slug = category.as_str(),
            icon = category.icon(),
            color = category.color(),
            name = category.display_name(),
            count = category.tools().count(),
        );
    }
    body.push_str("</div>");
    page("Home", identity, &body)
}

/// `/tools`: every category with its tools.
pub fn tools_page(identity: &OptionalIdentity) -> String {
    let mut body = String::from("<h1>All tools</h1>");
    for category in Category::ALL {
        category_section(&mut body, category, true);
    }
    page("All tools", identity, &body)
}

pub fn category_page(category: Category, identity: &OptionalIdentity) -> String {
    let mut body = String::new();
    category_section(&mut body, category, false);
    page(category.display_name(), identity, &body)
}

fn number_attr(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn render_field(out: &mut String, field: &FormField) {
    let name = escape_html(field.name);
    let label = escape_html(field.label);

    match field.kind {
        FieldKind::Number {
            default,
            min,
            max,
            step,
        } => {
            let _ = write!(
                out,
                r#"<label for="{name}">{label}</label><input type="number" id="{name}" name="{name}" value="{}" min="{}" max="{}" step="{}">"#,
                number_attr(default),
                number_attr(min),
                number_attr(max),
                number_attr(step),
            );
        }
        FieldKind::OptionalNumber { min, max, step } => {
            let _ = write!(
                out,
                r#"<label for="{name}">{label}</label><input type="number" id="{name}" name="{name}" min="{}" max="{}" step="{}" placeholder="optional">"#,
                number_attr(min),
                number_attr(max),
                number_attr(step),
            );
        }
        FieldKind::Select { options, default } => {
            let _ = write!(out, r#"<label for="{name}">{label}</label><select id="{name}" name="{name}">"#);
            for option in options {
                let selected = if *option == default { " selected" } else { "" };
                let option = escape_html(option);
                let _ = write!(out, r#"<option value="{option}"{selected}>{option}</option>"#);
            }
            out.push_str("</select>");
        }
        FieldKind::Text { default } => {
            let _ = write!(
                out,
                r#"<label for="{name}">{label}</label><input type="text" id="{name}" name="{name}" value="{}" maxlength="200">"#,
                escape_html(default)
            );
        }
        FieldKind::Color { default } => {
            let _ = write!(
                out,
                r#"<label for="{name}">{label}</label><input type="color" id="{name}" name="{name}" value="{}">"#,
                escape_html(default)
            );
        }
        FieldKind::Checkbox => {
            let _ = write!(
                out,
                r#"<label><input type="checkbox" name="{name}" value="true" checked> {label}</label>"#
            );
        }
    }
}

/// `/tool/{id}`: description, upload form and result area.
pub fn tool_page(tool: &ToolDescriptor, identity: &OptionalIdentity, max_upload_mb: usize) -> String {
    let accept: Vec<String> = tool.accepts.iter().map(|ext| format!(".{}", ext)).collect();
    let (field, multiple, hint) = if tool.arity.allows_many() {
        (
            "files",
            " multiple",
            format!("Select at least {} files", tool.arity.min_files()),
        )
    } else {
        ("file", "", "Select a file".to_string())
    };

    let mut body = String::new();
    let _ = write!(
        body,
        r#"<p><a href="/tools/{slug}">{category}</a></p><h1><i class="{icon} {color}"></i> {name}</h1><p>{description}</p>"#,
        slug = tool.category.as_str(),
        category = escape_html(tool.category.display_name()),
        icon = escape_html(tool.icon),
        color = tool.category.color(),
        name = escape_html(tool.name),
        description = escape_html(tool.description),
    );
    let _ = write!(
        body,
        r#"<form id="tool-form" action="/process/{category}/{id}" method="post" enctype="multipart/form-data"><label for="{field}">{hint} ({accept}, up to {max_upload_mb}MB)</label><input type="file" id="{field}" name="{field}" accept="{accept}"{multiple} required>"#,
        category = tool.category.as_str(),
        id = escape_html(tool.id),
        hint = escape_html(&hint),
        accept = escape_html(&accept.join(",")),
    );
    for form_field in fields_for(tool.id) {
        render_field(&mut body, form_field);
    }
    let _ = write!(
        body,
        r#"<button type="submit">Process</button></form><div id="result"></div><script>{UPLOAD_SCRIPT}</script>"#
    );

    page(tool.name, identity, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filekit_core::catalog::find_tool;

    #[test]
    fn test_home_page_links_every_category() {
        let html = home_page(&OptionalIdentity::Anonymous);
        for category in Category::ALL {
            assert!(html.contains(&format!("href=\"/tools/{}\"", category.as_str())));
        }
    }

    #[test]
    fn test_tool_page_has_multi_file_input_for_merger() {
        let tool = find_tool("pdf-merger").unwrap();
        let html = tool_page(tool, &OptionalIdentity::Anonymous, 100);
        assert!(html.contains(r#"name="files""#));
        assert!(html.contains(" multiple"));
        assert!(html.contains(r#"action="/process/pdf/pdf-merger""#));
    }

    #[test]
    fn test_tool_page_renders_parameter_fields() {
        let tool = find_tool("image-resize").unwrap();
        let html = tool_page(tool, &OptionalIdentity::Anonymous, 100);
        assert!(html.contains(r#"name="width""#));
        assert!(html.contains(r#"max="5000""#));
        assert!(html.contains(r#"name="file""#));
    }

    #[test]
    fn test_username_is_escaped() {
        let identity = OptionalIdentity::Authenticated {
            username: "<b>eve</b>".to_string(),
        };
        let html = tools_page(&identity);
        assert!(html.contains("&lt;b&gt;eve&lt;/b&gt;"));
        assert!(!html.contains("<b>eve</b>"));
    }
}
