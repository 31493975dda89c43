//! Prompt templates
//!
//! Placeholders are written as `{topic}` and `{context}` and filled with
//! [`render`].

pub const WEB_SUMMARY_PROMPT: &str = "You are a study assistant. \
Using the web search results below, write a clear, well-structured summary \
of the topic \"{topic}\" for a student. Cover the key concepts, important \
facts and any notable examples. Only use information found in the search results.

Search results:
{context}

Summary:";

pub const PDF_SUMMARY_PROMPT: &str = "You are a study assistant. \
Summarize the following document for a student. Capture the main ideas, key \
definitions and important details in a clear, well-structured summary. \
Only use information found in the document.

Document:
{context}

Summary:";

pub const COMBINED_SUMMARY_PROMPT: &str = "You are a study assistant. \
Write one cohesive summary of the topic \"{topic}\" for a student, combining \
the web search results and the uploaded document below. Prefer the document \
where the sources disagree, and only use information found in them.

{context}

Summary:";

pub const QUIZ_PROMPT: &str = "You are a teacher writing a multiple-choice quiz. \
Based only on the summary below, write a quiz with a short title and at least \
{min_questions} questions. Each question must have four options labelled \
\"A\", \"B\", \"C\" and \"D\", and `correct_answer` must be the label of \
the single correct option.

Summary:
{context}";

/// Fill `{key}` placeholders in a template.
///
/// Single pass: substituted values are never expanded again, so braces in
/// search results or document text pass through untouched.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 2]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Join the web and document contributions for the combined summary
pub fn combined_context(web: &str, document: &str) -> String {
    format!("Web search results:\n{web}\n\nDocument content:\n{document}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_web_prompt() {
        let prompt = render(
            WEB_SUMMARY_PROMPT,
            &[("topic", "quantum computing"), ("context", "Page: Qubit")],
        );
        assert!(prompt.contains("\"quantum computing\""));
        assert!(prompt.contains("Search results:\nPage: Qubit"));
        assert!(!prompt.contains("{topic}"));
        assert!(!prompt.contains("{context}"));
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        assert_eq!(render("{a} {b}", &[("a", "x")]), "x {b}");
    }

    #[test]
    fn test_render_does_not_reexpand_values() {
        let prompt = render("{context}|{topic}", &[("context", "{topic}"), ("topic", "T")]);
        assert_eq!(prompt, "{topic}|T");
        assert_eq!(render("open { brace", &[("a", "x")]), "open { brace");
    }

    #[test]
    fn test_combined_context() {
        let ctx = combined_context("wiki text", "pdf text");
        assert!(ctx.starts_with("Web search results:\nwiki text"));
        assert!(ctx.ends_with("Document content:\npdf text"));
    }
}
