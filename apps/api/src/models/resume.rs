use serde::{Deserialize, Serialize};

use crate::models::{
    from_object, null_as_default, require_non_empty, Document, DocumentKind, MalformedInputError,
};
use crate::render::escape::{escape_latex, escape_opt};
use crate::render::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub phone: Option<String>,
    /// Passed through unescaped: used as an `\href` target.
    pub email: Option<String>,
    /// Passed through unescaped: used as an `\href` target.
    pub linkedin: Option<String>,
    /// Passed through unescaped: used as an `\href` target.
    pub github: Option<String>,
    pub location: Option<String>,
}

/// Missing keys resolve to empty strings rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub school: String,
    pub location: String,
    pub degree: String,
    pub dates: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub company: String,
    pub location: String,
    pub title: String,
    pub dates: String,
    /// Display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub technologies: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

/// Absent categories are left out of the rendered skills block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    pub languages: Option<String>,
    pub frameworks: Option<String>,
    pub tools: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeData {
    pub contact: ContactInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Skills,
}

fn escape_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| escape_latex(s)).collect()
}

impl ContactInfo {
    fn escape_fields(&self) -> Self {
        ContactInfo {
            name: escape_latex(&self.name),
            phone: escape_opt(self.phone.as_deref()),
            email: self.email.clone(),
            linkedin: self.linkedin.clone(),
            github: self.github.clone(),
            location: escape_opt(self.location.as_deref()),
        }
    }

    fn bindings(&self) -> Value {
        Value::record([
            ("name", Value::from(self.name.as_str())),
            ("phone", Value::from(&self.phone)),
            ("email", Value::from(&self.email)),
            ("linkedin", Value::from(&self.linkedin)),
            ("github", Value::from(&self.github)),
            ("location", Value::from(&self.location)),
        ])
    }
}

impl Education {
    fn escape_fields(&self) -> Self {
        Education {
            school: escape_latex(&self.school),
            location: escape_latex(&self.location),
            degree: escape_latex(&self.degree),
            dates: escape_latex(&self.dates),
        }
    }

    fn bindings(&self) -> Value {
        Value::record([
            ("school", Value::from(self.school.as_str())),
            ("location", Value::from(self.location.as_str())),
            ("degree", Value::from(self.degree.as_str())),
            ("dates", Value::from(self.dates.as_str())),
        ])
    }
}

impl Experience {
    fn escape_fields(&self) -> Self {
        Experience {
            company: escape_latex(&self.company),
            location: escape_latex(&self.location),
            title: escape_latex(&self.title),
            dates: escape_latex(&self.dates),
            bullets: escape_all(&self.bullets),
        }
    }

    fn bindings(&self) -> Value {
        Value::record([
            ("company", Value::from(self.company.as_str())),
            ("location", Value::from(self.location.as_str())),
            ("title", Value::from(self.title.as_str())),
            ("dates", Value::from(self.dates.as_str())),
            ("bullets", Value::strings(&self.bullets)),
        ])
    }
}

impl Project {
    fn escape_fields(&self) -> Self {
        Project {
            name: escape_latex(&self.name),
            technologies: escape_latex(&self.technologies),
            bullets: escape_all(&self.bullets),
        }
    }

    fn bindings(&self) -> Value {
        Value::record([
            ("name", Value::from(self.name.as_str())),
            ("technologies", Value::from(self.technologies.as_str())),
            ("bullets", Value::strings(&self.bullets)),
        ])
    }
}

impl Skills {
    fn escape_fields(&self) -> Self {
        Skills {
            languages: escape_opt(self.languages.as_deref()),
            frameworks: escape_opt(self.frameworks.as_deref()),
            tools: escape_opt(self.tools.as_deref()),
        }
    }

    fn bindings(&self) -> Value {
        Value::record([
            ("languages", Value::from(&self.languages)),
            ("frameworks", Value::from(&self.frameworks)),
            ("tools", Value::from(&self.tools)),
        ])
    }
}

impl Document for ResumeData {
    const KIND: DocumentKind = DocumentKind::Resume;

    fn from_raw(raw: &serde_json::Value) -> Result<Self, MalformedInputError> {
        let data: ResumeData = from_object(raw, "resume")?;
        require_non_empty(&data.contact.name, "contact.name")?;
        Ok(data)
    }

    fn escape_fields(&self) -> Self {
        ResumeData {
            contact: self.contact.escape_fields(),
            education: self.education.iter().map(Education::escape_fields).collect(),
            experience: self.experience.iter().map(Experience::escape_fields).collect(),
            projects: self.projects.iter().map(Project::escape_fields).collect(),
            skills: self.skills.escape_fields(),
        }
    }

    fn schema() -> Value {
        let present = || Some(String::new());
        ResumeData {
            contact: ContactInfo {
                name: String::new(),
                phone: present(),
                email: present(),
                linkedin: present(),
                github: present(),
                location: present(),
            },
            education: vec![Education::default()],
            experience: vec![Experience {
                bullets: vec![String::new()],
                ..Experience::default()
            }],
            projects: vec![Project {
                bullets: vec![String::new()],
                ..Project::default()
            }],
            skills: Skills {
                languages: present(),
                frameworks: present(),
                tools: present(),
            },
        }
        .bindings()
    }

    fn bindings(&self) -> Value {
        Value::record([
            ("contact", self.contact.bindings()),
            (
                "education",
                Value::Seq(self.education.iter().map(Education::bindings).collect()),
            ),
            (
                "experience",
                Value::Seq(self.experience.iter().map(Experience::bindings).collect()),
            ),
            (
                "projects",
                Value::Seq(self.projects.iter().map(Project::bindings).collect()),
            ),
            ("skills", self.skills.bindings()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_raw() -> serde_json::Value {
        json!({
            "contact": { "name": "Ada Lovelace" },
            "education": [{
                "school": "University of London",
                "location": "London",
                "degree": "B.Sc. Mathematics",
                "dates": "1840 -- 1843"
            }],
            "experience": [{
                "company": "Analytical Engines",
                "location": "London",
                "title": "Programmer",
                "dates": "1843",
                "bullets": ["Wrote the first published program"]
            }]
        })
    }

    // ── parsing ─────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_minimal_applies_defaults() {
        let data = ResumeData::from_raw(&minimal_raw()).unwrap();
        assert_eq!(data.contact.name, "Ada Lovelace");
        assert_eq!(data.contact.phone, None);
        assert_eq!(data.education.len(), 1);
        assert_eq!(data.experience[0].bullets.len(), 1);
        assert!(data.projects.is_empty());
        assert_eq!(data.skills, Skills::default());
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let mut raw = minimal_raw();
        raw["summary"] = json!("ignored");
        raw["contact"]["website"] = json!("ada.dev");
        assert!(ResumeData::from_raw(&raw).is_ok());
    }

    #[test]
    fn test_parse_missing_entry_fields_default_to_empty() {
        let raw = json!({
            "contact": { "name": "Ada" },
            "education": [{ "school": "UCL" }],
            "projects": [{ "name": "Engine" }]
        });
        let data = ResumeData::from_raw(&raw).unwrap();
        assert_eq!(data.education[0].school, "UCL");
        assert_eq!(data.education[0].degree, "");
        assert_eq!(data.projects[0].technologies, "");
        assert!(data.projects[0].bullets.is_empty());
    }

    #[test]
    fn test_parse_missing_contact_name() {
        let raw = json!({ "contact": { "email": "a@b.c" } });
        let err = ResumeData::from_raw(&raw).unwrap_err();
        assert!(err.0.contains("name"));
    }

    #[test]
    fn test_parse_missing_contact() {
        assert!(ResumeData::from_raw(&json!({ "education": [] })).is_err());
    }

    #[test]
    fn test_parse_blank_contact_name() {
        let raw = json!({ "contact": { "name": "   " } });
        let err = ResumeData::from_raw(&raw).unwrap_err();
        assert!(err.0.contains("contact.name must not be empty"));
    }

    #[test]
    fn test_parse_experience_not_a_sequence() {
        let raw = json!({ "contact": { "name": "Ada" }, "experience": "lots" });
        assert!(ResumeData::from_raw(&raw).is_err());
    }

    #[test]
    fn test_parse_bullet_wrong_type() {
        let raw = json!({
            "contact": { "name": "Ada" },
            "experience": [{ "company": "X", "bullets": ["ok", 42] }]
        });
        assert!(ResumeData::from_raw(&raw).is_err());
    }

    #[test]
    fn test_parse_skills_wrong_type() {
        let raw = json!({ "contact": { "name": "Ada" }, "skills": ["Rust"] });
        assert!(ResumeData::from_raw(&raw).is_err());
    }

    #[test]
    fn test_parse_null_optional_is_absent() {
        let raw = json!({ "contact": { "name": "Ada", "phone": null } });
        let data = ResumeData::from_raw(&raw).unwrap();
        assert_eq!(data.contact.phone, None);
    }

    #[test]
    fn test_parse_null_containers_take_defaults() {
        let raw = json!({
            "contact": { "name": "Ada" },
            "education": null,
            "experience": [{ "company": "X", "bullets": null }],
            "projects": null,
            "skills": null
        });
        let data = ResumeData::from_raw(&raw).unwrap();
        assert!(data.education.is_empty());
        assert!(data.experience[0].bullets.is_empty());
        assert!(data.projects.is_empty());
        assert_eq!(data.skills, Skills::default());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(ResumeData::from_raw(&json!("resume")).is_err());
        assert!(ResumeData::from_raw(&json!(null)).is_err());
    }

    // ── escaping ────────────────────────────────────────────────────────────

    #[test]
    fn test_escape_produces_new_record() {
        let raw = json!({
            "contact": {
                "name": "A&B Smith",
                "phone": "+1 #555",
                "email": "a_b@example.com",
                "github": "github.com/a_b"
            },
            "experience": [{
                "company": "R&D Labs",
                "bullets": ["Grew revenue 30%", "Cut costs by $1M"]
            }],
            "skills": { "languages": "C#, F#" }
        });
        let original = ResumeData::from_raw(&raw).unwrap();
        let escaped = original.escaped();
        let e = escaped.get();

        assert_eq!(e.contact.name, "A\\&B Smith");
        assert_eq!(e.contact.phone.as_deref(), Some("+1 \\#555"));
        // URL-like fields pass through untouched.
        assert_eq!(e.contact.email.as_deref(), Some("a_b@example.com"));
        assert_eq!(e.contact.github.as_deref(), Some("github.com/a_b"));
        assert_eq!(e.experience[0].company, "R\\&D Labs");
        assert_eq!(
            e.experience[0].bullets,
            vec!["Grew revenue 30\\%", "Cut costs by \\$1M"]
        );
        assert_eq!(e.skills.languages.as_deref(), Some("C\\#, F\\#"));
        assert_eq!(e.skills.tools, None);

        // The source record is untouched.
        assert_eq!(original.contact.name, "A&B Smith");
    }

    #[test]
    fn test_bindings_expose_absent_optionals() {
        let data = ResumeData::from_raw(&minimal_raw()).unwrap();
        let bindings = data.bindings();
        assert_eq!(
            bindings.get_path(&["contact", "phone"]).unwrap(),
            &Value::Absent
        );
        assert_eq!(
            bindings.get_path(&["skills", "tools"]).unwrap(),
            &Value::Absent
        );
        assert_eq!(
            bindings.get_path(&["projects"]).unwrap(),
            &Value::Seq(vec![])
        );
    }
}
