//! CSV projection of a lead worklist
//!
//! Values come out raw. Field quoting is the caller's job and is passed in to
//! [`LeadExport::render`].

use crate::domain::Lead;

pub const EXPORT_COLUMNS: [&str; 8] = [
    "First Name",
    "Last Name",
    "Company",
    "Email",
    "Phone",
    "Status",
    "Source",
    "Industry",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadExport {
    pub rows: Vec<[String; 8]>,
}

impl LeadExport {
    pub fn project<'a>(leads: impl IntoIterator<Item = &'a Lead>) -> Self {
        Self {
            rows: leads.into_iter().map(row).collect(),
        }
    }

    /// Header plus one line per lead, each field passed through `quote`.
    pub fn render(&self, quote: impl Fn(&str) -> String) -> String {
        let mut out = join_line(EXPORT_COLUMNS.iter().copied(), &quote);
        for row in &self.rows {
            out.push_str(&join_line(row.iter().map(String::as_str), &quote));
        }
        out
    }
}

fn row(lead: &Lead) -> [String; 8] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    [
        lead.first_name.clone(),
        lead.last_name.clone(),
        lead.company.clone(),
        text(&lead.email),
        text(&lead.phone),
        lead.status().label().to_string(),
        text(&lead.lead_source),
        text(&lead.industry),
    ]
}

fn join_line<'a>(fields: impl Iterator<Item = &'a str>, quote: &impl Fn(&str) -> String) -> String {
    let mut line = fields.map(quote).collect::<Vec<_>>().join(",");
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use uuid::Uuid;

    use super::*;
    use crate::domain::NewLead;

    #[test]
    fn rows_follow_fixed_column_order() -> TestResult {
        let lead = Lead::new(
            Uuid::now_v7(),
            NewLead {
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                company: "Navy, Inc".to_string(),
                email: Some("grace@navy.test".to_string()),
                lead_source: Some("Referral".to_string()),
                ..NewLead::default()
            },
        )?;

        let export = LeadExport::project([&lead]);

        assert_eq!(
            export.rows[0],
            [
                "Grace",
                "Hopper",
                "Navy, Inc",
                "grace@navy.test",
                "",
                "New",
                "Referral",
                ""
            ]
            .map(str::to_string)
        );

        let raw = export.render(|field| field.to_string());
        assert_eq!(
            raw,
            "First Name,Last Name,Company,Email,Phone,Status,Source,Industry\n\
             Grace,Hopper,Navy, Inc,grace@navy.test,,New,Referral,\n"
        );

        Ok(())
    }
}
