// Severity assessment prompt templates.
// All prompts sent to the inference service are defined here.

pub const TASK_FRAMING: &str = "\
Evaluate this post step by step and assign it a severity on a scale of 0-6, \
where 0 means the post is not related to suicide, \
and 1-6 depending on the metrics below where 1 is for the first question and 6 for the last.";

/// The six C-SSRS screening questions. Severity N maps to question N.
pub const CSSRS_RUBRIC: &str = "\
COLUMBIA-SUICIDE SEVERITY RATING SCALE metrics:
1) Have you wished you were dead or wished you could go to sleep and not wake up? Severity: 1
2) Have you actually had any thoughts about killing yourself? Severity: 2
3) Have you been thinking about how you might do this? Severity: 3
4) Have you had these thoughts and had some intention of acting on them? Severity: 4
5) Have you started to work out or worked out the details of how to kill yourself? Did you intend to carry out this plan? Severity: 5
6) Have you done anything, started to do anything, or prepared to do anything to end your life? Severity: 6";

pub const OUTPUT_FORMAT: &str = r#"Respond with ONLY the completed JSON object in the following template:

{
  "Q1": "Reasoning that fulfills this criteria or \"N/A\"",
  "Q2": "Reasoning that fulfills this criteria or \"N/A\"",
  "Q3": "Reasoning that fulfills this criteria or \"N/A\"",
  "Q4": "Reasoning that fulfills this criteria or \"N/A\"",
  "Q5": "Reasoning that fulfills this criteria or \"N/A\"",
  "Q6": "Reasoning that fulfills this criteria or \"N/A\"",
  "severity": integer (0-6)
}"#;

pub const ASSESSMENT_PROMPT_TEMPLATE: &str = "\
{task_framing}

{rubric}

{output_format}
---

post: {post}
---
";

/// Short single-field prompt used by the latency check.
pub const SMOKE_PROMPT_TEMPLATE: &str = "\
Evaluate this post for suicide severity (0-6). Post: {post}
Respond with ONLY JSON: {\"severity\": int}";

pub const SMOKE_SAMPLE_POST: &str =
    "I feel a bit sad today, but I am going to watch a movie to cheer myself up.";

/// Builds the full assessment prompt for one post. Deterministic: the same
/// post text always produces the same prompt.
pub fn build_assessment_prompt(post: &str) -> String {
    // `{post}` is substituted last so placeholder-like text inside a post is left alone.
    ASSESSMENT_PROMPT_TEMPLATE
        .replace("{task_framing}", TASK_FRAMING)
        .replace("{rubric}", CSSRS_RUBRIC)
        .replace("{output_format}", OUTPUT_FORMAT)
        .replace("{post}", post)
}

pub fn build_smoke_prompt(post: &str) -> String {
    SMOKE_PROMPT_TEMPLATE.replace("{post}", post)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        let post = "I can't sleep and I keep thinking about it";
        assert_eq!(build_assessment_prompt(post), build_assessment_prompt(post));
    }

    #[test]
    fn test_prompt_contains_all_sections_and_post() {
        let prompt = build_assessment_prompt("hello world");
        assert!(prompt.starts_with(TASK_FRAMING));
        assert!(prompt.contains(CSSRS_RUBRIC));
        assert!(prompt.contains(OUTPUT_FORMAT));
        assert!(prompt.ends_with("post: hello world\n---\n"));
    }

    #[test]
    fn test_prompt_lists_every_template_key() {
        let prompt = build_assessment_prompt("x");
        for key in ["\"Q1\"", "\"Q2\"", "\"Q3\"", "\"Q4\"", "\"Q5\"", "\"Q6\"", "\"severity\""] {
            assert!(prompt.contains(key), "prompt missing {key}");
        }
    }

    #[test]
    fn test_rubric_maps_severities_positionally() {
        for n in 1..=6 {
            let line = CSSRS_RUBRIC
                .lines()
                .find(|l| l.starts_with(&format!("{n})")))
                .expect("rubric line missing");
            assert!(line.ends_with(&format!("Severity: {n}")));
        }
    }

    #[test]
    fn test_empty_post_still_builds() {
        let prompt = build_assessment_prompt("");
        assert!(prompt.ends_with("post: \n---\n"));
    }

    #[test]
    fn test_placeholders_inside_post_are_not_expanded() {
        let prompt = build_assessment_prompt("my {rubric} is {post}");
        assert!(prompt.contains("post: my {rubric} is {post}\n"));
    }

    #[test]
    fn test_smoke_prompt_embeds_post() {
        let prompt = build_smoke_prompt(SMOKE_SAMPLE_POST);
        assert!(prompt.contains(SMOKE_SAMPLE_POST));
        assert!(prompt.ends_with("{\"severity\": int}"));
    }
}
