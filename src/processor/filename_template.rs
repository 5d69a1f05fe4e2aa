use crate::error::TemplateError;
use crate::models::event::DetectionEvent;

// {field} or {field:spec}; {{ and }} are literal braces.
pub fn render(template: &str, event: &DetectionEvent) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut placeholder = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, '{')) | None => return Err(TemplateError::UnbalancedBrace(offset)),
                        Some((_, ch)) => placeholder.push(ch),
                    }
                }
                let (name, spec) = match placeholder.split_once(':') {
                    Some((name, spec)) => (name, Some(spec)),
                    None => (placeholder.as_str(), None),
                };
                out.push_str(&event.template_field(name, spec)?);
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(TemplateError::UnbalancedBrace(offset)),
            _ => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::epoch_to_utc;

    fn event() -> DetectionEvent {
        DetectionEvent {
            time: epoch_to_utc(1700000000.0),
            camera: "driveway".to_string(),
            label: "person".to_string(),
            current_zones: vec![],
            entered_zones: vec!["front_yard".to_string()],
        }
    }

    #[test]
    fn test_render_fields() {
        let rendered = render("/var/cache/frigate/{camera}-{label}-{time:%s}.jpg", &event()).unwrap();
        assert_eq!(rendered, "/var/cache/frigate/driveway-person-1700000000.jpg");

        let rendered = render("{entered_zones}/{{literal}}", &event()).unwrap();
        assert_eq!(rendered, "front_yard/{literal}");
    }

    #[test]
    fn test_unknown_field() {
        assert_eq!(
            render("{camera}-{score}.jpg", &event()),
            Err(TemplateError::UnknownField("score".to_string()))
        );
        assert_eq!(render("{}.jpg", &event()), Err(TemplateError::UnknownField(String::new())));
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(render("{camera", &event()), Err(TemplateError::UnbalancedBrace(0)));
        assert_eq!(render("a}b", &event()), Err(TemplateError::UnbalancedBrace(1)));
        assert_eq!(render("x{ca{mera}", &event()), Err(TemplateError::UnbalancedBrace(1)));
    }
}
