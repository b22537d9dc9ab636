/// Marker trait for intent objects.
///
/// Intents carry either a command issued by an owner of the state
/// (begin a load) or the outcome of work it started (articles arrived,
/// the request failed, the request was abandoned).
pub trait Intent: Send + 'static {}
