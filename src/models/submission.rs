use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::collection::FieldErrors;

/// A franchise application from the same email inside this window is refused.
pub const DUPLICATE_WINDOW_HOURS: i64 = 24;

/// Where a public form submission came from. Each kind has its own table and
/// status vocabulary; transitions between statuses are unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Contact,
    Franchise,
}

impl SubmissionKind {
    pub fn table(self) -> &'static str {
        match self {
            SubmissionKind::Contact => "contact_submissions",
            SubmissionKind::Franchise => "franchise_applications",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            SubmissionKind::Contact => "contacts",
            SubmissionKind::Franchise => "franchise",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "contacts" => Some(SubmissionKind::Contact),
            "franchise" => Some(SubmissionKind::Franchise),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubmissionKind::Contact => "联系表单",
            SubmissionKind::Franchise => "加盟申请",
        }
    }

    /// (status, label) pairs, first one is the status new submissions start with.
    pub fn statuses(self) -> &'static [(&'static str, &'static str)] {
        match self {
            SubmissionKind::Contact => &[("unread", "未读"), ("read", "已读"), ("replied", "已回复")],
            SubmissionKind::Franchise => &[
                ("pending", "待处理"),
                ("contacted", "已联系"),
                ("rejected", "已拒绝"),
                ("partnered", "已合作"),
            ],
        }
    }

    pub fn initial_status(self) -> &'static str {
        self.statuses()[0].0
    }

    /// Status counted by the admin badge (unread contacts, pending applications).
    pub fn badge_status(self) -> &'static str {
        self.initial_status()
    }

    pub fn is_valid_status(self, status: &str) -> bool {
        self.statuses().iter().any(|(s, _)| *s == status)
    }

    pub fn status_label(self, status: &str) -> &str {
        self.statuses()
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, l)| *l)
            .unwrap_or(status)
    }

    /// Saving notes on a contact message implies it has been read.
    pub fn status_after_notes(self) -> Option<&'static str> {
        match self {
            SubmissionKind::Contact => Some("read"),
            SubmissionKind::Franchise => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub id: i64,
    pub kind: SubmissionKind,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Franchise applications only.
    pub city: Option<String>,
    pub message: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub message: String,
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^1[3-9]\d{9}$").expect("valid phone regex"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

pub const MAX_MESSAGE_CHARS: usize = 1000;

impl NewSubmission {
    pub fn normalized(&self) -> Self {
        NewSubmission {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().replace([' ', '-'], ""),
            city: self
                .city
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            message: self.message.trim().to_string(),
        }
    }

    /// Per-field validation for the public forms. Expects normalized input.
    pub fn validate(&self, kind: SubmissionKind) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let name_len = self.name.chars().count();
        if name_len < 2 {
            errors.insert("name".into(), "姓名至少需要2个字符".into());
        } else if name_len > 50 {
            errors.insert("name".into(), "姓名不能超过50个字符".into());
        }

        if !phone_re().is_match(&self.phone) {
            errors.insert("phone".into(), "请输入有效的手机号码".into());
        }

        if !email_re().is_match(&self.email) {
            errors.insert("email".into(), "请输入有效的邮箱地址".into());
        }

        let msg_len = self.message.chars().count();
        match kind {
            SubmissionKind::Contact => {
                if msg_len < 10 {
                    errors.insert("message".into(), "留言至少需要10个字符".into());
                }
            }
            SubmissionKind::Franchise => {
                if self.city.is_none() {
                    errors.insert("city".into(), "请填写意向城市".into());
                }
            }
        }
        if msg_len > MAX_MESSAGE_CHARS {
            errors.insert("message".into(), format!("留言不能超过{}个字符", MAX_MESSAGE_CHARS));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// List filter shared by the admin table and the CSV export.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub status: Option<String>,
    pub search: Option<String>,
}

impl SubmissionFilter {
    pub fn matches(&self, s: &Submission) -> bool {
        if let Some(ref st) = self.status {
            if st != "all" && !st.is_empty() && &s.status != st {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => {
                let q = q.to_lowercase();
                s.name.to_lowercase().contains(&q)
                    || s.email.to_lowercase().contains(&q)
                    || s.phone.contains(&q)
                    || s.message.to_lowercase().contains(&q)
                    || s.city.as_deref().map(|c| c.to_lowercase().contains(&q)).unwrap_or(false)
            }
        }
    }
}
