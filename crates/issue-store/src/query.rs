//! Filter and update types for issue operations.
//!
//! Each recognized field has its own typed slot; `None` means the field
//! takes no part in the operation.

use crate::model::Issue;
use crate::util::format_timestamp;

/// Exact-match filter for finding issues. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub project: Option<String>,
    pub id: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    /// Compared against the ISO-8601 rendering of the stored timestamp.
    pub created_on: Option<String>,
    /// Compared against the ISO-8601 rendering of the stored timestamp.
    pub updated_on: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub open: Option<bool>,
    pub status_text: Option<String>,
}

impl IssueFilter {
    /// Filter that selects every issue of one project.
    #[must_use]
    pub fn for_project(project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            ..Default::default()
        }
    }

    /// Whether `issue` satisfies every set field.
    ///
    /// `id` is compared as given; callers normalize it first.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        fn eq(want: Option<&String>, have: &str) -> bool {
            want.is_none_or(|w| w == have)
        }

        eq(self.project.as_ref(), &issue.project)
            && eq(self.id.as_ref(), &issue.id)
            && eq(self.issue_title.as_ref(), &issue.issue_title)
            && eq(self.issue_text.as_ref(), &issue.issue_text)
            && eq(self.created_by.as_ref(), &issue.created_by)
            && eq(self.assigned_to.as_ref(), &issue.assigned_to)
            && eq(self.status_text.as_ref(), &issue.status_text)
            && self.open.is_none_or(|open| open == issue.open)
            && self
                .created_on
                .as_ref()
                .is_none_or(|ts| *ts == format_timestamp(&issue.created_on))
            && self
                .updated_on
                .as_ref()
                .is_none_or(|ts| *ts == format_timestamp(&issue.updated_on))
    }
}

/// Fields to change on an existing issue. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueUpdate {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl IssueUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }

    /// Names of the fields this update touches.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.issue_title.is_some() {
            names.push("issue_title");
        }
        if self.issue_text.is_some() {
            names.push("issue_text");
        }
        if self.created_by.is_some() {
            names.push("created_by");
        }
        if self.assigned_to.is_some() {
            names.push("assigned_to");
        }
        if self.status_text.is_some() {
            names.push("status_text");
        }
        if self.open.is_some() {
            names.push("open");
        }
        names
    }
}
