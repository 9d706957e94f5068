use serde::{Deserialize, Serialize};

/// An event that social-media content is drafted for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Event title.
    #[serde(default)]
    pub name: String,
    /// What the event is about.
    #[serde(default)]
    pub about: String,
    /// Free-form date, as typed by the organizer.
    #[serde(default)]
    pub date: String,
    /// Free-form time.
    #[serde(default)]
    pub time: String,
    /// Where the event takes place.
    #[serde(default)]
    pub venue: String,
}

impl EventDetails {
    /// Create an event with just a name and a description.
    pub fn new(name: impl Into<String>, about: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: about.into(),
            ..Self::default()
        }
    }

    /// Query used to retrieve organization knowledge for this event.
    ///
    /// Returns `None` when both descriptive fields are blank.
    pub fn retrieval_query(&self) -> Option<String> {
        let query = format!("{} {}", self.about.trim(), self.name.trim());
        let query = query.trim();
        (!query.is_empty()).then(|| query.to_string())
    }

    /// Structured fields as `(label, value)` pairs, in display order.
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("name", self.name.as_str()),
            ("about", self.about.as_str()),
            ("date", self.date.as_str()),
            ("time", self.time.as_str()),
            ("venue", self.venue.as_str()),
        ]
    }
}
