use std::collections::HashSet;
use std::path::Path;

use anyhow::Context as _;
use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub summary: String,
    #[serde(default)]
    pub about: Option<String>,
    pub links: Links,
    /// Category key to skill labels, in file order.
    #[serde(default)]
    pub skills: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub internships: Vec<Internship>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Links {
    pub github: String,
    pub linkedin: String,
    pub leetcode: String,
    pub hackerrank: String,
    #[serde(default)]
    pub cv: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Internship {
    pub org: String,
    pub date: String,
    #[serde(default)]
    pub points: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub name: String,
    pub date: String,
    #[serde(default)]
    pub tech: Vec<String>,
    pub role: String,
    pub desc: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Education {
    pub degree: String,
    pub org: String,
    pub date: String,
    pub detail: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("duplicate {list} entry {key:?}")]
    DuplicateKey { list: String, key: String },
    #[error("profile field `{0}` is empty")]
    EmptyField(&'static str),
}

impl Profile {
    pub fn from_json(bytes: &[u8]) -> anyhow::Result<Self> {
        let profile: Profile = serde_json::from_slice(bytes).context("parse profile json")?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json(&bytes).with_context(|| format!("load profile {}", path.display()))
    }

    /// Name and email must be present. Display keys must be unique within each list.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::EmptyField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(ProfileError::EmptyField("email"));
        }

        unique("projects", self.projects.iter().map(|p| p.name.as_str()))?;
        unique("internships", self.internships.iter().map(|i| i.org.as_str()))?;
        unique("education", self.education.iter().map(|e| e.degree.as_str()))?;
        unique("certifications", self.certifications.iter().map(String::as_str))?;
        unique("achievements", self.achievements.iter().map(String::as_str))?;
        for (category, labels) in &self.skills {
            unique(&format!("skills.{category}"), labels.iter().map(String::as_str))?;
        }
        for p in &self.projects {
            unique(&format!("projects[{}].tech", p.name), p.tech.iter().map(String::as_str))?;
        }
        Ok(())
    }
}

fn unique<'a>(list: &str, keys: impl Iterator<Item = &'a str>) -> Result<(), ProfileError> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(ProfileError::DuplicateKey {
                list: list.to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
  "name": "Ada",
  "title": "Engineer",
  "location": "London",
  "phone": "+44 20 7946 0000",
  "email": "ada@example.com",
  "summary": "Builds engines.",
  "links": {
    "github": "https://github.com/ada",
    "linkedin": "https://linkedin.com/in/ada",
    "leetcode": "https://leetcode.com/u/ada",
    "hackerrank": "https://hackerrank.com/profile/ada"
  },
  "skills": { "web": ["HTML"], "languages": ["Rust", "C"] }
}"#;

    #[test]
    fn keeps_skill_category_order() {
        let p = Profile::from_json(MINIMAL.as_bytes()).unwrap();
        let keys: Vec<_> = p.skills.keys().map(String::as_str).collect();
        assert_eq!(keys, ["web", "languages"]);
        assert!(p.projects.is_empty());
        assert!(p.links.cv.is_none());
    }

    #[test]
    fn rejects_duplicate_project_names() {
        let mut p = Profile::from_json(MINIMAL.as_bytes()).unwrap();
        let project = Project {
            name: "Engine".into(),
            date: "1843".into(),
            tech: vec![],
            role: "Author".into(),
            desc: "Notes".into(),
            link: None,
        };
        p.projects = vec![project.clone(), project];
        assert_eq!(
            p.validate(),
            Err(ProfileError::DuplicateKey {
                list: "projects".into(),
                key: "Engine".into()
            })
        );
    }

    #[test]
    fn rejects_duplicate_skill_in_category() {
        let json = MINIMAL.replace(r#"["Rust", "C"]"#, r#"["Rust", "Rust"]"#);
        let err = Profile::from_json(json.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("skills.languages"));
    }

    #[test]
    fn same_skill_in_two_categories_is_fine() {
        let json = MINIMAL.replace(r#"["HTML"]"#, r#"["Rust"]"#);
        assert!(Profile::from_json(json.as_bytes()).is_ok());
    }

    #[test]
    fn rejects_blank_name_and_email() {
        let mut p = Profile::from_json(MINIMAL.as_bytes()).unwrap();
        p.name = "  ".into();
        assert_eq!(p.validate(), Err(ProfileError::EmptyField("name")));

        let json = MINIMAL.replace("ada@example.com", "");
        let err = Profile::from_json(json.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("email"));
    }
}
