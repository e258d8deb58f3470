//! Effect trait - ties a payload `type` string to a Rust type.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Effect binds a payload shape to its `type` discriminator.
///
/// # Example
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Fetch {
///     url: String,
/// }
///
/// impl Effect for Fetch {
///     const TYPE: &'static str = "http.fetch";
/// }
/// ```
///
/// A payload `{ "type": "http.fetch", "url": "..." }` is claimed by the
/// handler registered for `Fetch` and decoded into it.
pub trait Effect: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TYPE: &'static str;
}
