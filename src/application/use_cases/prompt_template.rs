use crate::domain::DomainError;

/// A fixed prompt text with `{name}` placeholders.
///
/// Filling is plain substitution: no conditionals, loops or escaping of the
/// bound values. `{{` and `}}` stand for literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

enum Segment<'a> {
    Literal(&'a str),
    Brace(char),
    Variable(&'a str),
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in self.segments() {
            if let Segment::Variable(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute every placeholder with its binding.
    ///
    /// A placeholder without a binding is an error; unused bindings are
    /// ignored.
    pub fn fill(&self, bindings: &[(&str, &str)]) -> Result<String, DomainError> {
        let mut output = String::with_capacity(self.text.len());

        for segment in self.segments() {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Brace(c) => output.push(c),
                Segment::Variable(name) => {
                    let value = bindings
                        .iter()
                        .find(|(key, _)| *key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            DomainError::invalid_input(format!(
                                "prompt variable '{name}' has no value"
                            ))
                        })?;
                    output.push_str(value);
                }
            }
        }

        Ok(output)
    }

    fn segments(&self) -> Vec<Segment<'_>> {
        let text = self.text.as_str();
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match c {
                '{' | '}' if matches!(chars.peek(), Some((_, next)) if *next == c) => {
                    segments.push(Segment::Literal(&text[literal_start..i]));
                    segments.push(Segment::Brace(c));
                    chars.next();
                    literal_start = i + 2;
                }
                '{' => {
                    let rest = &text[i + 1..];
                    let name_len = rest
                        .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
                        .unwrap_or(rest.len());
                    if name_len > 0 && rest[name_len..].starts_with('}') {
                        segments.push(Segment::Literal(&text[literal_start..i]));
                        segments.push(Segment::Variable(&rest[..name_len]));
                        // Skip the name and the closing brace.
                        for _ in 0..=name_len {
                            chars.next();
                        }
                        literal_start = i + name_len + 2;
                    }
                }
                _ => {}
            }
        }

        segments.push(Segment::Literal(&text[literal_start..]));
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_all_placeholders() {
        let template = PromptTemplate::new("<SCHEMA>{schema}</SCHEMA>\nQuestion: {question}");
        let filled = template
            .fill(&[("schema", "CREATE TABLE decisions (...)"), ("question", "how many?")])
            .unwrap();
        assert_eq!(
            filled,
            "<SCHEMA>CREATE TABLE decisions (...)</SCHEMA>\nQuestion: how many?"
        );
    }

    #[test]
    fn repeated_placeholder_is_filled_everywhere() {
        let template = PromptTemplate::new("{q} and again {q}");
        assert_eq!(template.fill(&[("q", "x")]).unwrap(), "x and again x");
    }

    #[test]
    fn missing_binding_is_an_error() {
        let template = PromptTemplate::new("Question: {question}");
        let err = template.fill(&[("schema", "s")]).unwrap_err();
        assert!(err.to_string().contains("question"));
    }

    #[test]
    fn values_are_inserted_literally() {
        let template = PromptTemplate::new("Response: {response}");
        let filled = template.fill(&[("response", "[('{year}',)]")]).unwrap();
        assert_eq!(filled, "Response: [('{year}',)]");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let template = PromptTemplate::new("JSON: {{\"a\": {value}}}");
        assert_eq!(template.fill(&[("value", "1")]).unwrap(), "JSON: {\"a\": 1}");
        assert_eq!(template.variables(), vec!["value"]);
    }

    #[test]
    fn lone_braces_without_a_name_are_kept() {
        let template = PromptTemplate::new("set { a } here: {x}");
        assert_eq!(template.fill(&[("x", "1")]).unwrap(), "set { a } here: 1");
    }

    #[test]
    fn variables_are_listed_once_in_order() {
        let template = PromptTemplate::new("{schema} {chat_history} {schema} {question}");
        assert_eq!(template.variables(), vec!["schema", "chat_history", "question"]);
    }
}
