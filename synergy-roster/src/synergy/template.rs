use regex::Captures;
use synergy_roster_utils::regex;

use super::schema::{FocusKey, JobGuid};

/// A request body with `{{.FocusKey}}` and `{{.JobGUID}}` placeholders.
///
/// Rendering never touches the template itself; every call produces a fresh
/// string. Substitution is a single pass, so a value is never expanded again
/// and text that merely resembles a value is left alone.
#[derive(Clone, Copy, Debug)]
pub struct Template {
    name: &'static str,
    text: &'static str,
}

impl Template {
    pub const fn new(name: &'static str, text: &'static str) -> Self {
        Self { name, text }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn render(&self, focus_key: &FocusKey, job_guid: Option<&JobGuid>) -> String {
        let rendered = regex!(r"\{\{\.(\w+)\}\}").replace_all(self.text, |caps: &Captures| {
            match (&caps[1], job_guid) {
                ("FocusKey", _) => focus_key.to_string(),
                ("JobGUID", Some(guid)) => guid.to_string(),
                _ => caps[0].to_owned(),
            }
        });
        rendered.into_owned()
    }
}

pub const STAFF_EMAILS_QUERY: Template = Template::new(
    "staff_emails_query",
    include_str!("templates/staff_emails_query.xml"),
);
pub const STAFF_BO_PROPERTIES: Template = Template::new(
    "staff_bo_properties",
    include_str!("templates/staff_bo_properties.xml"),
);
pub const STU415_REPORT: Template = Template::new(
    "stu415_report",
    include_str!("templates/stu415_report.xml"),
);
pub const JOB_STATUS: Template =
    Template::new("job_status", include_str!("templates/job_status.xml"));
pub const JOB_RESULTS: Template =
    Template::new("job_results", include_str!("templates/job_results.xml"));

#[cfg(test)]
mod tests {
    use super::*;

    fn focus_key() -> FocusKey {
        FocusKey::new("FK-1".to_owned()).unwrap()
    }

    fn guid() -> JobGuid {
        JobGuid::try_from("0C3D8B0A-5E0F-4C34-9A2B-1F3E5D7C9B11".to_owned()).unwrap()
    }

    #[test]
    fn every_placeholder_occurrence_is_replaced() {
        let template = Template::new(
            "t",
            r#"<A FOCUS_KEY="{{.FocusKey}}"><B FOCUS_KEY="{{.FocusKey}}" JOB_GUID="{{.JobGUID}}"/></A>"#,
        );
        assert_eq!(
            template.render(&focus_key(), Some(&guid())),
            r#"<A FOCUS_KEY="FK-1"><B FOCUS_KEY="FK-1" JOB_GUID="0C3D8B0A-5E0F-4C34-9A2B-1F3E5D7C9B11"/></A>"#
        );
    }

    #[test]
    fn unrelated_text_is_untouched() {
        let template = Template::new(
            "t",
            "FocusKey JobGUID {{FocusKey}} {{.Unknown}} {{.JobGUID}} {{.FocusKey}}",
        );
        assert_eq!(
            template.render(&focus_key(), None),
            "FocusKey JobGUID {{FocusKey}} {{.Unknown}} {{.JobGUID}} FK-1"
        );
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        let sneaky = FocusKey::new("{{.JobGUID}}".to_owned()).unwrap();
        let template = Template::new("t", "{{.FocusKey}}/{{.JobGUID}}");
        assert_eq!(
            template.render(&sneaky, Some(&guid())),
            "{{.JobGUID}}/0C3D8B0A-5E0F-4C34-9A2B-1F3E5D7C9B11"
        );
    }

    #[test]
    fn rendering_does_not_mutate_the_template() {
        let first = JOB_STATUS.render(&focus_key(), Some(&guid()));
        let other_key = FocusKey::new("FK-2".to_owned()).unwrap();
        let second = JOB_STATUS.render(&other_key, Some(&guid()));
        assert!(first.contains(r#"FOCUS_KEY="FK-1""#));
        assert!(second.contains(r#"FOCUS_KEY="FK-2""#));
        assert!(JOB_STATUS.text.contains("{{.FocusKey}}"));
    }

    #[test]
    fn shipped_templates_carry_the_focus_key() {
        for template in [
            STAFF_EMAILS_QUERY,
            STAFF_BO_PROPERTIES,
            STU415_REPORT,
            JOB_STATUS,
            JOB_RESULTS,
        ] {
            let rendered = template.render(&focus_key(), Some(&guid()));
            assert!(rendered.contains("FK-1"), "{}", template.name());
            assert!(!rendered.contains("{{."), "{}", template.name());
        }
    }
}
