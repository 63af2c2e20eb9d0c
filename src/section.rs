use std::fmt;
use std::str::FromStr;

/// Page sections in document order. Each one is both the element `id` and the
/// value the scroll tracker reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionId {
    Home,
    About,
    Skills,
    Projects,
    Experience,
    Education,
    Certs,
    Contact,
}

impl SectionId {
    pub const ALL: [SectionId; 8] = [
        SectionId::Home,
        SectionId::About,
        SectionId::Skills,
        SectionId::Projects,
        SectionId::Experience,
        SectionId::Education,
        SectionId::Certs,
        SectionId::Contact,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionId::Home => "home",
            SectionId::About => "about",
            SectionId::Skills => "skills",
            SectionId::Projects => "projects",
            SectionId::Experience => "experience",
            SectionId::Education => "education",
            SectionId::Certs => "certs",
            SectionId::Contact => "contact",
        }
    }

    pub fn anchor(self) -> String {
        format!("#{}", self.as_str())
    }

    /// Navigation bar label. `Home` is reached through the brand link and has none.
    pub fn nav_label(self) -> Option<&'static str> {
        match self {
            SectionId::Home => None,
            SectionId::About => Some("About"),
            SectionId::Skills => Some("Skills"),
            SectionId::Projects => Some("Projects"),
            SectionId::Experience => Some("Internships"),
            SectionId::Education => Some("Education"),
            SectionId::Certs => Some("Certifications"),
            SectionId::Contact => Some("Contact"),
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown section identifier {0:?}")]
pub struct UnknownSection(pub String);

impl FromStr for SectionId {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_parse_back() {
        for id in SectionId::ALL {
            assert_eq!(id.as_str().parse::<SectionId>().unwrap(), id);
        }
        assert!("hero".parse::<SectionId>().is_err());
    }

    #[test]
    fn only_home_lacks_nav_label() {
        let unlabeled: Vec<_> = SectionId::ALL
            .into_iter()
            .filter(|id| id.nav_label().is_none())
            .collect();
        assert_eq!(unlabeled, vec![SectionId::Home]);
        assert_eq!(SectionId::Experience.nav_label(), Some("Internships"));
        assert_eq!(SectionId::Certs.anchor(), "#certs");
    }
}
