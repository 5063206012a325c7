use oneonone_core::Error;

/// Map a Google API failure onto the core error kinds.
///
/// The client only exposes errors as text, so the status is matched there.
pub(crate) fn from_api(context: &str, err: impl std::fmt::Display) -> Error {
    let message = format!("{}: {}", context, err);

    if ["401", "403", "Unauthorized", "invalid_grant", "unauthorized_client"]
        .iter()
        .any(|needle| message.contains(needle))
    {
        Error::Auth(message)
    } else {
        Error::Provider(message)
    }
}

/// Collapse an anyhow chain into a core error, keeping typed errors intact.
pub(crate) fn from_anyhow(err: anyhow::Error) -> Error {
    match err.downcast::<Error>() {
        Ok(core) => core,
        Err(other) => Error::Provider(format!("{:#}", other)),
    }
}
