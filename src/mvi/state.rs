/// Marker trait for state handed to observers.
///
/// States are cloned out to observers and compared to detect no-op
/// transitions, so they must be `Clone + PartialEq`.
pub trait ViewState: Clone + PartialEq + Default + Send + 'static {}
