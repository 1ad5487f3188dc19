use serde::{Deserialize, Serialize};

use crate::models::{
    from_object, null_as_default, require_non_empty, Document, DocumentKind, MalformedInputError,
};
use crate::render::escape::{escape_latex, escape_opt};
use crate::render::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub name: String,
    /// Passed through unescaped, like `linkedin` and `github`.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientInfo {
    pub name: Option<String>,
    pub title: Option<String>,
    pub company: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverLetterData {
    pub candidate: CandidateInfo,
    pub recipient: RecipientInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    pub job_title: Option<String>,
    /// One rendered paragraph each, in order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body_paragraphs: Vec<String>,
}

impl Document for CoverLetterData {
    const KIND: DocumentKind = DocumentKind::CoverLetter;

    fn from_raw(raw: &serde_json::Value) -> Result<Self, MalformedInputError> {
        let data: CoverLetterData = from_object(raw, "cover letter")?;
        require_non_empty(&data.candidate.name, "candidate.name")?;
        Ok(data)
    }

    fn escape_fields(&self) -> Self {
        let c = &self.candidate;
        let r = &self.recipient;
        CoverLetterData {
            candidate: CandidateInfo {
                name: escape_latex(&c.name),
                email: c.email.clone(),
                phone: escape_opt(c.phone.as_deref()),
                linkedin: c.linkedin.clone(),
                github: c.github.clone(),
                location: escape_opt(c.location.as_deref()),
            },
            recipient: RecipientInfo {
                name: escape_opt(r.name.as_deref()),
                title: escape_opt(r.title.as_deref()),
                company: escape_latex(&r.company),
                address: escape_opt(r.address.as_deref()),
            },
            date: escape_latex(&self.date),
            job_title: escape_opt(self.job_title.as_deref()),
            body_paragraphs: self.body_paragraphs.iter().map(|p| escape_latex(p)).collect(),
        }
    }

    fn schema() -> Value {
        let present = || Some(String::new());
        CoverLetterData {
            candidate: CandidateInfo {
                name: String::new(),
                email: present(),
                phone: present(),
                linkedin: present(),
                github: present(),
                location: present(),
            },
            recipient: RecipientInfo {
                name: present(),
                title: present(),
                company: String::new(),
                address: present(),
            },
            date: String::new(),
            job_title: present(),
            body_paragraphs: vec![String::new()],
        }
        .bindings()
    }

    fn bindings(&self) -> Value {
        let c = &self.candidate;
        let r = &self.recipient;
        Value::record([
            (
                "candidate",
                Value::record([
                    ("name", Value::from(c.name.as_str())),
                    ("email", Value::from(&c.email)),
                    ("phone", Value::from(&c.phone)),
                    ("linkedin", Value::from(&c.linkedin)),
                    ("github", Value::from(&c.github)),
                    ("location", Value::from(&c.location)),
                ]),
            ),
            (
                "recipient",
                Value::record([
                    ("name", Value::from(&r.name)),
                    ("title", Value::from(&r.title)),
                    ("company", Value::from(r.company.as_str())),
                    ("address", Value::from(&r.address)),
                ]),
            ),
            ("date", Value::from(self.date.as_str())),
            ("job_title", Value::from(&self.job_title)),
            ("body_paragraphs", Value::strings(&self.body_paragraphs)),
        ])
    }
}
