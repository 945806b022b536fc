//! Minimal Markdown-to-HTML rendering for AI summary text.
//!
//! Supported: `#`/`##`/`###` headings, `- ` list items, fenced code blocks,
//! inline `` `code` ``, `**bold**`, `*italic*`, blank lines and paragraphs.
//! No tables, links, nested lists or blockquotes.
//!
//! Literal text is always HTML-escaped before inline markup is substituted,
//! so summary content cannot inject markup of its own.

/// Escape `&`, `<` and `>`.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace `<delim>text<delim>` spans, where `text` is non-empty and free of
/// `forbidden`, with `open text close`. Unmatched delimiters stay literal.
fn replace_delimited(input: &str, delim: &str, forbidden: char, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find(delim) {
        let after = &rest[start + delim.len()..];
        let end = after.find(forbidden).unwrap_or(after.len());
        if end > 0 && after[end..].starts_with(delim) {
            out.push_str(&rest[..start]);
            out.push_str(open);
            out.push_str(&after[..end]);
            out.push_str(close);
            rest = &after[end + delim.len()..];
        } else {
            // Delimiters are ASCII, so stepping one byte stays on a char boundary.
            out.push_str(&rest[..=start]);
            rest = &rest[start + 1..];
        }
    }
    out.push_str(rest);
    out
}

fn render_inline(value: &str) -> String {
    let output = escape_html(value);
    let output = replace_delimited(&output, "`", '`', "<code>", "</code>");
    let output = replace_delimited(&output, "**", '*', "<strong>", "</strong>");
    replace_delimited(&output, "*", '*', "<em>", "</em>")
}

/// Render `text` to an HTML fragment.
///
/// An unterminated list or code block is closed at end of input.
pub fn render_markdown(text: &str) -> String {
    let mut html = String::new();
    let mut list_open = false;
    let mut code_open = false;

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.trim().starts_with("```") {
            if code_open {
                html.push_str("</code></pre>");
            } else {
                if list_open {
                    list_open = false;
                    html.push_str("</ul>");
                }
                html.push_str("<pre><code>");
            }
            code_open = !code_open;
            continue;
        }

        if code_open {
            html.push_str(&escape_html(line));
            html.push('\n');
            continue;
        }

        let heading = [("### ", "h3"), ("## ", "h2"), ("# ", "h1")]
            .into_iter()
            .find_map(|(prefix, tag)| line.strip_prefix(prefix).map(|rest| (tag, rest)));
        if let Some((tag, rest)) = heading {
            if list_open {
                list_open = false;
                html.push_str("</ul>");
            }
            html.push_str(&format!("<{tag}>{}</{tag}>", render_inline(rest)));
            continue;
        }

        if let Some(item) = line.strip_prefix("- ") {
            if !list_open {
                list_open = true;
                html.push_str("<ul>");
            }
            html.push_str(&format!("<li>{}</li>", render_inline(item)));
            continue;
        }

        if list_open {
            list_open = false;
            html.push_str("</ul>");
        }

        if line.trim().is_empty() {
            html.push_str("<br />");
            continue;
        }

        html.push_str(&format!("<p>{}</p>", render_inline(line)));
    }

    if list_open {
        html.push_str("</ul>");
    }
    if code_open {
        html.push_str("</code></pre>");
    }

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_before_inline_markup() {
        assert_eq!(
            render_markdown("**bold** and <script>"),
            "<p><strong>bold</strong> and &lt;script&gt;</p>"
        );
    }

    #[test]
    fn test_markup_inside_delimiters_stays_escaped() {
        assert_eq!(
            render_markdown("*<b>x</b>*"),
            "<p><em>&lt;b&gt;x&lt;/b&gt;</em></p>"
        );
        assert_eq!(render_markdown("a & b"), "<p>a &amp; b</p>");
    }

    #[test]
    fn test_headings() {
        assert_eq!(
            render_markdown("# Title\n## Section\n### Detail\n#### Too deep"),
            "<h1>Title</h1><h2>Section</h2><h3>Detail</h3><p>#### Too deep</p>"
        );
    }

    #[test]
    fn test_inline_spans() {
        assert_eq!(
            render_inline("use `df.describe()` then *check* **nulls**"),
            "use <code>df.describe()</code> then <em>check</em> <strong>nulls</strong>"
        );
        assert_eq!(render_inline("2 * 3 = 6"), "2 * 3 = 6");
        assert_eq!(render_inline("**"), "**");
        assert_eq!(render_inline("`unclosed"), "`unclosed");
    }

    #[test]
    fn test_list_closes_on_other_content() {
        assert_eq!(
            render_markdown("- one\n- two\nafter"),
            "<ul><li>one</li><li>two</li></ul><p>after</p>"
        );
        assert_eq!(
            render_markdown("- one\n\n- two"),
            "<ul><li>one</li></ul><br /><ul><li>two</li></ul>"
        );
    }

    #[test]
    fn test_unterminated_blocks_are_closed() {
        assert_eq!(render_markdown("- dangling"), "<ul><li>dangling</li></ul>");
        assert_eq!(
            render_markdown("```\nlet x = 1;"),
            "<pre><code>let x = 1;\n</code></pre>"
        );
    }

    #[test]
    fn test_code_block_is_escaped_but_not_formatted() {
        assert_eq!(
            render_markdown("```python\nif a < b: **kw\n```"),
            "<pre><code>if a &lt; b: **kw\n</code></pre>"
        );
    }

    #[test]
    fn test_code_fence_closes_open_list() {
        assert_eq!(
            render_markdown("- item\n```\nx\n```"),
            "<ul><li>item</li></ul><pre><code>x\n</code></pre>"
        );
    }

    #[test]
    fn test_heading_closes_open_list() {
        assert_eq!(
            render_markdown("- a\n# H\n- b"),
            "<ul><li>a</li></ul><h1>H</h1><ul><li>b</li></ul>"
        );
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        assert_eq!(render_markdown("a\r\n\r\nb"), "<p>a</p><br /><p>b</p>");
        assert_eq!(render_markdown(""), "<br />");
    }
}
