use serde::{Deserialize, Serialize};

/// A country as known to the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub qid: String,
    /// ISO 3166-1 alpha-3 code, when the country has one.
    pub code: Option<String>,
    pub label: String,
}

impl Country {
    /// Creates a country. An empty code is stored as `None`.
    pub fn new(
        qid: impl Into<String>,
        code: Option<impl Into<String>>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            qid: qid.into(),
            code: code.map(Into::into).filter(|c| !c.is_empty()),
            label: label.into(),
        }
    }
}

/// A place, always attached to an existing country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub qid: String,
    pub country_qid: String,
    pub label: String,
}

impl Place {
    /// Creates a place belonging to `country_qid`.
    pub fn new(
        qid: impl Into<String>,
        country_qid: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            qid: qid.into(),
            country_qid: country_qid.into(),
            label: label.into(),
        }
    }
}

/// A free-text place description seen in an external source.
///
/// `text` is always in canonical form. A description starts out unresolved
/// (`place_qid == None`) and is resolved or flagged by a separate triage pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDescription {
    pub text: String,
    pub place_qid: Option<String>,
    /// Set when the description could not be confidently resolved.
    pub has_error: bool,
}

impl PlaceDescription {
    /// Creates a freshly registered, unresolved description.
    pub fn unresolved(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            place_qid: None,
            has_error: false,
        }
    }

    /// Returns the resolved place QID, unless the description is flagged.
    pub fn usable_place_qid(&self) -> Option<&str> {
        if self.has_error {
            return None;
        }
        self.place_qid.as_deref()
    }

    /// Returns true if this description still needs human review.
    pub fn needs_review(&self) -> bool {
        self.has_error || self.place_qid.is_none()
    }
}

/// A Wikipedia language edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Language code, e.g. "nl".
    pub code: String,
    /// QID of the Wikipedia project for this language.
    pub wikipedia_qid: Option<String>,
    /// Display rank; unranked languages are left out of sorted listings.
    pub sort_order: Option<i64>,
}

impl Language {
    /// Creates an unranked language without a linked Wikipedia project.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            wikipedia_qid: None,
            sort_order: None,
        }
    }

    /// Sets the Wikipedia project QID.
    pub fn with_wikipedia_qid(mut self, qid: impl Into<String>) -> Self {
        self.wikipedia_qid = Some(qid.into());
        self
    }

    /// Sets the display rank.
    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = Some(sort_order);
        self
    }
}
