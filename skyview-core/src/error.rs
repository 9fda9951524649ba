/// Failures surfaced by parsers, collaborators and the presenter.
///
/// Every variant carries owned data only, so a copy can be kept in a
/// [`View`](crate::presenter::View) while the original is returned to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeatherError {
    /// Payload is missing a required field, or a field has the wrong type.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Reverse geocoding produced no address candidates.
    #[error("No address found for {latitude},{longitude}")]
    GeocodeUnavailable { latitude: f64, longitude: f64 },

    /// Transport-level failure or non-success status from an HTTP collaborator.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// Preference store could not be read or written.
    #[error("Preference store unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl WeatherError {
    pub(crate) fn malformed(what: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        WeatherError::MalformedResponse(format!("{what}: {err}"))
    }
}
