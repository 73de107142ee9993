//! HTML for the index page

const UPLOAD_FORM: &str = r#"<form method="post" enctype="multipart/form-data" action="/upload">
  <div>
    <label for="file">Choose file to upload (JPEG only)</label>
    <input type="file" id="file" name="form_file" accept="image/jpeg">
  </div>
  <div>
    <button>Submit</button>
  </div>
</form>
"#;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Upload form followed by one list item per file with view and delete links.
/// Link targets are percent-encoded path segments; the visible name is HTML-escaped.
pub fn render_index(files: &[String]) -> String {
    let mut html = String::from(UPLOAD_FORM);
    html.push_str("<ul>\n");
    for file in files {
        let name = escape_html(file);
        let segment = escape_html(&urlencoding::encode(file));
        html.push_str(&format!(
            "<li>{0} - <a href='/files/{1}'>View</a> | <a href='/delete/{1}'>Delete</a></li>\n",
            name, segment
        ));
    }
    html.push_str("</ul>\n");
    html
}
