use serde::{Deserialize, Serialize};

/// Government schemes the assistant can help with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    #[serde(rename = "pmJanDhan")]
    PmJanDhan,
    #[serde(rename = "pmAwas")]
    PmAwas,
    #[serde(rename = "ayushmanBharat")]
    AyushmanBharat,
    #[serde(rename = "mgnrega")]
    Mgnrega,
    #[serde(rename = "pmUjjwala")]
    PmUjjwala,
    #[serde(rename = "betiBachao")]
    BetiBachao,
    #[serde(rename = "pmKisan")]
    PmKisan,
    #[serde(rename = "nfsa")]
    Nfsa,
    #[serde(rename = "swachhBharat")]
    SwachhBharat,
    #[serde(rename = "pmMudra")]
    PmMudra,
    #[serde(rename = "others", other)]
    Others,
}

impl Scheme {
    pub const ALL: [Scheme; 11] = [
        Scheme::PmJanDhan,
        Scheme::PmAwas,
        Scheme::AyushmanBharat,
        Scheme::Mgnrega,
        Scheme::PmUjjwala,
        Scheme::BetiBachao,
        Scheme::PmKisan,
        Scheme::Nfsa,
        Scheme::SwachhBharat,
        Scheme::PmMudra,
        Scheme::Others,
    ];

    /// Unknown keys resolve to [`Scheme::Others`]
    pub fn resolve(key: &str) -> Self {
        Scheme::ALL
            .into_iter()
            .find(|s| s.key() == key.trim())
            .unwrap_or(Scheme::Others)
    }

    pub fn key(&self) -> &'static str {
        match self {
            Scheme::PmJanDhan => "pmJanDhan",
            Scheme::PmAwas => "pmAwas",
            Scheme::AyushmanBharat => "ayushmanBharat",
            Scheme::Mgnrega => "mgnrega",
            Scheme::PmUjjwala => "pmUjjwala",
            Scheme::BetiBachao => "betiBachao",
            Scheme::PmKisan => "pmKisan",
            Scheme::Nfsa => "nfsa",
            Scheme::SwachhBharat => "swachhBharat",
            Scheme::PmMudra => "pmMudra",
            Scheme::Others => "others",
        }
    }

    /// Full English name, used in assistant prompts
    pub fn full_name(&self) -> &'static str {
        match self {
            Scheme::PmJanDhan => "Pradhan Mantri Jan Dhan Yojana",
            Scheme::PmAwas => "Pradhan Mantri Awas Yojana",
            Scheme::AyushmanBharat => "Ayushman Bharat – PM Jan Arogya Yojana",
            Scheme::Mgnrega => "Mahatma Gandhi National Rural Employment Guarantee Act (MGNREGA)",
            Scheme::PmUjjwala => "Pradhan Mantri Ujjwala Yojana",
            Scheme::BetiBachao => "Beti Bachao Beti Padhao",
            Scheme::PmKisan => "Pradhan Mantri Kisan Samman Nidhi (PM-KISAN)",
            Scheme::Nfsa => "National Food Security Act (NFSA)",
            Scheme::SwachhBharat => "Swachh Bharat Mission",
            Scheme::PmMudra => "Pradhan Mantri Mudra Yojana",
            Scheme::Others => "general government scheme",
        }
    }
}

/// How the user wants to apply for a scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationMode {
    #[default]
    Online,
    Offline,
}

impl ApplicationMode {
    /// Anything other than `offline` is treated as online
    pub fn resolve(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("offline") {
            ApplicationMode::Offline
        } else {
            ApplicationMode::Online
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationMode::Online => "online",
            ApplicationMode::Offline => "offline",
        }
    }
}
