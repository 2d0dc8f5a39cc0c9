use super::*;

#[test]
fn default_template_renders_every_placeholder() {
    let rendered = InstructionTemplate::default()
        .render(&InstructionVars::default())
        .expect("render");

    assert!(!rendered.contains("{{"));
    assert!(rendered.starts_with("You are CursorGenie"));
    assert!(rendered.contains("\"content\": \"string (max 300 chars)\""));
    assert!(rendered.contains("- GET /patients/:id: Fetch single patient"));
    assert!(rendered.contains("Cursor.IDE format (async functions, hooks, Tailwind)"));
    assert!(rendered.ends_with("No markdown, no explanations."));
}

#[test]
fn single_braces_stay_literal() {
    let template = InstructionTemplate::new("{ \"limit\": {{ max_content_chars }} }");
    let vars = InstructionVars {
        max_content_chars: 120,
        ..InstructionVars::default()
    };
    assert_eq!(template.render(&vars).expect("render"), "{ \"limit\": 120 }");
}

#[test]
fn unknown_placeholder_is_rejected() {
    let err = InstructionTemplate::new("hello {{ audience }}")
        .render(&InstructionVars::default())
        .expect_err("should fail");
    assert_eq!(err, TemplateError::UnknownPlaceholder("audience".into()));
    assert_eq!(
        err.to_string(),
        "unknown placeholder `{{audience}}` in instruction template"
    );
}

#[test]
fn unterminated_placeholder_reports_position() {
    let err = InstructionTemplate::new("ok {{persona}} then {{oops")
        .render(&InstructionVars::default())
        .expect_err("should fail");
    assert_eq!(err, TemplateError::Unterminated(20));
}
