//! Submission search with independent, AND-combined filters.
//!
//! All comparisons are case-insensitive. `model` and `organization` are
//! substring matches while `method` is an exact match; callers rely on that
//! asymmetry, so "Direct" does not select "Direct Prompting".
//!
//! `model`, `method` and the head of the free-text blob read the evaluation
//! record's own names, not the metadata display names.

use serde::{Deserialize, Serialize};

use crate::domain::Submission;

/// Filters applied to a submission list. Unset filters are ignored; empty
/// strings and an empty tag list count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFilter {
    pub query: Option<String>,
    pub model: Option<String>,
    pub method: Option<String>,
    pub organization: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SubmissionFilter {
    /// Filter that matches every submission.
    pub fn all() -> Self {
        Self::default()
    }

    /// Free-text match over model, method and the full metadata document.
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = Some(method.to_string());
        self
    }

    pub fn with_organization(mut self, organization: &str) -> Self {
        self.organization = Some(organization.to_string());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        provided(&self.query).is_none()
            && provided(&self.model).is_none()
            && provided(&self.method).is_none()
            && provided(&self.organization).is_none()
            && self.tags.is_empty()
    }

    /// Whether `sub` satisfies every provided filter.
    pub fn matches(&self, sub: &Submission) -> bool {
        if let Some(model) = provided(&self.model) {
            if !contains_ignore_case(&sub.record_model, model) {
                return false;
            }
        }
        if let Some(method) = provided(&self.method) {
            if sub.record_method.to_lowercase() != method.to_lowercase() {
                return false;
            }
        }
        if let Some(org) = provided(&self.organization) {
            let sub_org = sub.metadata.organization.as_deref().unwrap_or("");
            if !contains_ignore_case(sub_org, org) {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().all(|t| sub.metadata.has_tag(t)) {
            return false;
        }
        if let Some(query) = provided(&self.query) {
            if !contains_ignore_case(&search_blob(sub), query) {
                return false;
            }
        }
        true
    }
}

fn provided(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().filter(|s| !s.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Text searched by free-text queries: the record's model and method and the
/// metadata document as compact JSON.
pub fn search_blob(sub: &Submission) -> String {
    format!(
        "{} {} {}",
        sub.record_model, sub.record_method, sub.metadata.document
    )
}

/// Submissions matching `filter`, in input order.
pub fn filter_submissions<'a>(
    submissions: &'a [Submission],
    filter: &SubmissionFilter,
) -> Vec<&'a Submission> {
    submissions.iter().filter(|s| filter.matches(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvaluationRecord, SubmissionId, SubmissionMetadata};

    fn submission(id: &str, model: &str, method: &str, yaml: &str) -> Submission {
        let record = EvaluationRecord::default()
            .with_model(model)
            .with_method(method);
        let meta = SubmissionMetadata::from_yaml(id, yaml).expect("metadata");
        Submission::build(SubmissionId::new(id), "design2code", &record, Some(meta))
    }

    fn sample() -> Vec<Submission> {
        vec![
            submission("20250101_a", "GPT-4", "Direct", "tags: [baseline]\n"),
            submission(
                "20250102_b",
                "GPT-4",
                "Direct",
                "tags: [baseline, vision]\nsubmission:\n  organization: OpenAI Research\n",
            ),
            submission(
                "20250103_c",
                "GPT-4 Turbo",
                "Direct Prompting",
                "notes: uses layout hints\n",
            ),
            submission(
                "20250104_d",
                "Claude 3.5 Sonnet",
                "DCGen",
                "submission:\n  organization: Anthropic\ntags: [Vision]\n",
            ),
        ]
    }

    fn ids(found: &[&Submission]) -> Vec<String> {
        found.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_returns_all_in_order() {
        let subs = sample();
        let filter = SubmissionFilter::all();
        assert!(filter.is_empty());
        assert_eq!(
            ids(&filter_submissions(&subs, &filter)),
            vec!["20250101_a", "20250102_b", "20250103_c", "20250104_d"]
        );
    }

    #[test]
    fn test_tag_filter_requires_every_tag() {
        let subs = sample()[..2].to_vec();
        let found = filter_submissions(&subs, &SubmissionFilter::all().with_tag("vision"));
        assert_eq!(ids(&found), vec!["20250102_b"]);
    }

    #[test]
    fn test_tag_filter_is_subset_not_intersection() {
        let subs = sample();
        let filter = SubmissionFilter::all().with_tags(["baseline", "vision"]);
        assert_eq!(ids(&filter_submissions(&subs, &filter)), vec!["20250102_b"]);
    }

    #[test]
    fn test_tag_filter_ignores_case() {
        let subs = sample();
        let found = filter_submissions(&subs, &SubmissionFilter::all().with_tag("VISION"));
        assert_eq!(ids(&found), vec!["20250102_b", "20250104_d"]);
    }

    #[test]
    fn test_method_is_exact_match() {
        let subs = sample();
        let found = filter_submissions(&subs, &SubmissionFilter::all().with_method("direct"));
        assert_eq!(ids(&found), vec!["20250101_a", "20250102_b"]);
        assert!(!ids(&found).contains(&"20250103_c".to_string()));
    }

    #[test]
    fn test_model_is_substring_match() {
        let subs = sample();
        let found = filter_submissions(&subs, &SubmissionFilter::all().with_model("gpt"));
        assert_eq!(ids(&found), vec!["20250101_a", "20250102_b", "20250103_c"]);
        let turbo = filter_submissions(&subs, &SubmissionFilter::all().with_model("turbo"));
        assert_eq!(ids(&turbo), vec!["20250103_c"]);
    }

    #[test]
    fn test_filters_read_record_names_not_metadata_names() {
        let subs = vec![submission(
            "20250101_a",
            "gpt-4o",
            "direct",
            "model:\n  name: GPT-4o Omni\nmethod:\n  name: Direct Prompting\n",
        )];
        assert_eq!(subs[0].display_name, "GPT-4o Omni (Direct prompting)");

        let by_method = SubmissionFilter::all().with_method("direct");
        assert_eq!(ids(&filter_submissions(&subs, &by_method)), vec!["20250101_a"]);
        let by_display_method = SubmissionFilter::all().with_method("direct prompting");
        assert!(filter_submissions(&subs, &by_display_method).is_empty());

        let by_display_model = SubmissionFilter::all().with_model("gpt-4o omni");
        assert!(filter_submissions(&subs, &by_display_model).is_empty());
        let by_model = SubmissionFilter::all().with_model("GPT-4O");
        assert_eq!(ids(&filter_submissions(&subs, &by_model)), vec!["20250101_a"]);
    }

    #[test]
    fn test_blob_leads_with_record_names() {
        let sub = submission("20250101_a", "gpt-4o", "direct", "model:\n  name: Omni\n");
        assert!(search_blob(&sub).starts_with("gpt-4o direct {"));
        assert!(search_blob(&sub).contains("Omni"));
    }

    #[test]
    fn test_organization_substring() {
        let subs = sample();
        let filter = SubmissionFilter::all().with_organization("openai");
        assert_eq!(ids(&filter_submissions(&subs, &filter)), vec!["20250102_b"]);
    }

    #[test]
    fn test_organization_absent_never_matches() {
        let subs = sample();
        let found = filter_submissions(&subs, &SubmissionFilter::all().with_organization("a"));
        assert_eq!(ids(&found), vec!["20250102_b", "20250104_d"]);
    }

    #[test]
    fn test_query_searches_metadata_document() {
        let subs = sample();
        let filter = SubmissionFilter::all().with_query("LAYOUT HINTS");
        assert_eq!(ids(&filter_submissions(&subs, &filter)), vec!["20250103_c"]);
    }

    #[test]
    fn test_query_matches_model_and_method_names() {
        let subs = sample();
        let found = filter_submissions(&subs, &SubmissionFilter::all().with_query("dcgen"));
        assert_eq!(ids(&found), vec!["20250104_d"]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let subs = sample();
        let filter = SubmissionFilter::all().with_model("gpt-4").with_tag("vision");
        assert_eq!(ids(&filter_submissions(&subs, &filter)), vec!["20250102_b"]);

        let none = SubmissionFilter::all().with_model("claude").with_method("direct");
        assert!(filter_submissions(&subs, &none).is_empty());
    }

    #[test]
    fn test_empty_strings_are_ignored() {
        let subs = sample();
        let filter = SubmissionFilter::all()
            .with_model("")
            .with_method("")
            .with_query("");
        assert!(filter.is_empty());
        assert_eq!(filter_submissions(&subs, &filter).len(), 4);
    }
}
