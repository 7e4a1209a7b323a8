use serde::{Deserialize, Serialize};

/// Languages the assistant can be asked to reply in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Hi,
    Bn,
    Ta,
    Te,
    Mr,
    Gu,
    Kn,
    Ml,
    Pa,
    Or,
}

impl Language {
    pub const ALL: [Language; 11] = [
        Language::En,
        Language::Hi,
        Language::Bn,
        Language::Ta,
        Language::Te,
        Language::Mr,
        Language::Gu,
        Language::Kn,
        Language::Ml,
        Language::Pa,
        Language::Or,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Bn => "bn",
            Language::Ta => "ta",
            Language::Te => "te",
            Language::Mr => "mr",
            Language::Gu => "gu",
            Language::Kn => "kn",
            Language::Ml => "ml",
            Language::Pa => "pa",
            Language::Or => "or",
        }
    }

    /// Name of the language in its own script.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "हिन्दी",
            Language::Bn => "বাংলা",
            Language::Ta => "தமிழ்",
            Language::Te => "తెలుగు",
            Language::Mr => "मराठी",
            Language::Gu => "ગુજરાતી",
            Language::Kn => "ಕನ್ನಡ",
            Language::Ml => "മലയാളം",
            Language::Pa => "ਪੰਜਾਬੀ",
            Language::Or => "ଓଡ଼ିଆ",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| {
                let codes: Vec<_> = Language::ALL.iter().map(|l| l.code()).collect();
                format!(
                    "unknown language '{}' (expected one of: {})",
                    s,
                    codes.join(", ")
                )
            })
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
