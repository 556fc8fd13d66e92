//! Best-effort JSON extraction from free-form model output.
//!
//! Models wrap the requested object in prose, code fences, or repeat the template
//! before answering. `JsonCandidates` walks the text and yields every
//! brace-balanced span in order of its opening brace; `extract_first_object`
//! returns the first span that parses as a JSON object.
//!
//! Tie-break: the FIRST parseable span wins, not the last or the most complete.
//! A stray parseable fragment ahead of the real answer shadows it; the validator
//! then rejects it and the attempt is retried.

use serde_json::{Map, Value};

/// Lazy iterator over brace-balanced `{...}` spans of `text`.
///
/// Braces inside JSON string literals do not count toward the balance. Every
/// opening brace that has a matching close yields one span, so nested objects are
/// yielded after their parent. Cloning the iterator restarts from the clone point.
#[derive(Debug, Clone)]
pub struct JsonCandidates<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> JsonCandidates<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for JsonCandidates<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while self.pos < self.text.len() {
            let start = self.pos + self.text[self.pos..].find('{')?;
            // '{' is one byte, so start + 1 is a char boundary.
            self.pos = start + 1;

            if let Some(end) = balanced_end(&self.text[start..]) {
                return Some(&self.text[start..start + end]);
            }
        }
        None
    }
}

/// Byte length of the balanced span at the start of `s` (which begins with `{`),
/// or `None` if the braces never close.
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Returns the first candidate span that parses as a JSON object.
pub fn extract_first_object(text: &str) -> Option<Map<String, Value>> {
    JsonCandidates::new(text).find_map(|candidate| serde_json::from_str(candidate).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_braces_yields_nothing() {
        assert_eq!(JsonCandidates::new("I refuse to answer that.").count(), 0);
        assert!(extract_first_object("I refuse to answer that.").is_none());
    }

    #[test]
    fn test_object_surrounded_by_prose() {
        let text = "Sure! Here is the assessment:\n{\"severity\": 2}\nHope that helps.";
        let obj = extract_first_object(text).unwrap();
        assert_eq!(obj["severity"], 2);
    }

    #[test]
    fn test_object_inside_code_fence_with_newlines() {
        let text = "```json\n{\n  \"Q1\": \"N/A\",\n  \"severity\": 0\n}\n```";
        let obj = extract_first_object(text).unwrap();
        assert_eq!(obj["Q1"], "N/A");
        assert_eq!(obj["severity"], 0);
    }

    #[test]
    fn test_braces_inside_strings_do_not_break_balance() {
        let text = r#"{"Q1": "they wrote {sad face} here", "severity": 1}"#;
        let spans: Vec<_> = JsonCandidates::new(text).collect();
        assert_eq!(spans[0], text);
        let obj = extract_first_object(text).unwrap();
        assert_eq!(obj["Q1"], "they wrote {sad face} here");
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let text = r#"{"Q1": "she said \"bye}\"", "severity": 3}"#;
        let obj = extract_first_object(text).unwrap();
        assert_eq!(obj["severity"], 3);
    }

    #[test]
    fn test_spans_are_yielded_in_order_of_appearance() {
        let text = "a {\"x\": 1} b {\"y\": 2} c";
        let spans: Vec<_> = JsonCandidates::new(text).collect();
        assert_eq!(spans, vec!["{\"x\": 1}", "{\"y\": 2}"]);
    }

    #[test]
    fn test_nested_spans_follow_their_parent() {
        let text = r#"{"outer": {"inner": 1}}"#;
        let spans: Vec<_> = JsonCandidates::new(text).collect();
        assert_eq!(spans, vec![text, r#"{"inner": 1}"#]);
    }

    #[test]
    fn test_unparseable_template_echo_is_skipped() {
        // The prompt's own template is not valid JSON, so an echo of it is skipped.
        let text = "{\n  \"severity\": integer (0-6)\n}\nAnswer: {\"severity\": 4}";
        let obj = extract_first_object(text).unwrap();
        assert_eq!(obj["severity"], 4);
    }

    #[test]
    fn test_first_parseable_wins_over_later_complete_object() {
        let text = concat!(
            "Draft: {\"severity\": 5}\n",
            "Final: {\"Q1\": \"a\", \"Q2\": \"b\", \"Q3\": \"c\", ",
            "\"Q4\": \"d\", \"Q5\": \"e\", \"Q6\": \"f\", \"severity\": 2}"
        );
        let obj = extract_first_object(text).unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["severity"], 5);
    }

    #[test]
    fn test_unclosed_brace_falls_through_to_later_object() {
        let text = "{ oops never closed ... {\"severity\": 1}";
        let obj = extract_first_object(text).unwrap();
        assert_eq!(obj["severity"], 1);
    }

    #[test]
    fn test_iterator_is_restartable_via_clone() {
        let text = "{\"a\": 1} {\"b\": 2}";
        let mut iter = JsonCandidates::new(text);
        let saved = iter.clone();
        assert_eq!(iter.next(), Some("{\"a\": 1}"));
        let replay: Vec<_> = saved.collect();
        assert_eq!(replay.len(), 2);
        assert_eq!(iter.next(), Some("{\"b\": 2}"));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_stray_closing_brace_is_ignored() {
        let text = "} } {\"severity\": 0}";
        assert_eq!(extract_first_object(text).unwrap()["severity"], 0);
    }

    #[test]
    fn test_multibyte_text_around_object() {
        let text = "Évaluation — résultat: {\"Q1\": \"triste 😢\", \"severity\": 1} ✓";
        let obj = extract_first_object(text).unwrap();
        assert_eq!(obj["Q1"], "triste 😢");
    }
}
