use std::borrow::Cow;

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// Remote job identifier returned by an asynchronous provider
pub type JobId = String;
