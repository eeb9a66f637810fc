use chrono::NaiveDate;

use crate::models::submission::{Submission, SubmissionKind};

const BOM: &str = "\u{FEFF}";

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn row(fields: &[&str]) -> String {
    fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(",")
}

pub fn headers(kind: SubmissionKind) -> &'static [&'static str] {
    match kind {
        SubmissionKind::Contact => &["姓名", "邮箱", "电话", "留言", "状态", "备注", "提交时间"],
        SubmissionKind::Franchise => &["姓名", "电话", "邮箱", "城市", "留言", "状态", "备注", "提交时间"],
    }
}

/// UTF-8 CSV: BOM, header row, every field quoted.
pub fn submissions_csv(kind: SubmissionKind, rows: &[Submission]) -> String {
    let mut out = String::from(BOM);
    out.push_str(&row(headers(kind)));
    for s in rows {
        let status = kind.status_label(&s.status);
        let notes = s.notes.as_deref().unwrap_or("");
        let line = match kind {
            SubmissionKind::Contact => row(&[
                s.name.as_str(),
                s.email.as_str(),
                s.phone.as_str(),
                s.message.as_str(),
                status,
                notes,
                s.created_at.as_str(),
            ]),
            SubmissionKind::Franchise => row(&[
                s.name.as_str(),
                s.phone.as_str(),
                s.email.as_str(),
                s.city.as_deref().unwrap_or(""),
                s.message.as_str(),
                status,
                notes,
                s.created_at.as_str(),
            ]),
        };
        out.push('\n');
        out.push_str(&line);
    }
    out
}

pub fn file_prefix(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Contact => "contact_submissions",
        SubmissionKind::Franchise => "franchise_applications",
    }
}

pub fn file_name(kind: SubmissionKind, date: NaiveDate) -> String {
    format!("{}_{}.csv", file_prefix(kind), date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(message: &str) -> Submission {
        Submission {
            id: 1,
            kind: SubmissionKind::Contact,
            name: "王先生".into(),
            email: "wang@example.com".into(),
            phone: "13800138000".into(),
            city: None,
            message: message.into(),
            status: "unread".into(),
            notes: None,
            created_at: "2024-05-01 10:00:00".into(),
            updated_at: "2024-05-01 10:00:00".into(),
        }
    }

    #[test]
    fn starts_with_bom_and_header() {
        let csv = submissions_csv(SubmissionKind::Contact, &[]);
        assert!(csv.starts_with('\u{FEFF}'));
        assert_eq!(csv.trim_start_matches('\u{FEFF}'), "\"姓名\",\"邮箱\",\"电话\",\"留言\",\"状态\",\"备注\",\"提交时间\"");
    }

    #[test]
    fn every_field_is_quoted_and_quotes_doubled() {
        let csv = submissions_csv(SubmissionKind::Contact, &[sub("他说\"很好吃\",下次再来\n谢谢")]);
        let body = csv.splitn(2, '\n').nth(1).unwrap();
        assert!(body.starts_with("\"王先生\",\"wang@example.com\",\"13800138000\","));
        assert!(body.contains("\"他说\"\"很好吃\"\",下次再来\n谢谢\""));
        assert!(body.contains("\"未读\""));
        assert!(body.ends_with("\"2024-05-01 10:00:00\""));
    }

    #[test]
    fn file_name_carries_date() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(file_name(SubmissionKind::Franchise, d), "franchise_applications_2024-03-09.csv");
        assert_eq!(file_name(SubmissionKind::Contact, d), "contact_submissions_2024-03-09.csv");
    }
}
