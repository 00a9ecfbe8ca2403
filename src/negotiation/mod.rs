//! Content negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! Accept-* header value
//!     → weighted.rs (split into WeightedValue, default q=1)
//!     → one negotiator per dimension:
//!         - media_type.rs (Accept)
//!         - language.rs   (Accept-Language)
//!         - charset.rs    (Accept-Charset)
//!         - encoding.rs   (Accept-Encoding)
//!     → Some(choice) or None ("not acceptable", answered with 406)
//! ```
//!
//! # Design Decisions
//! - Negotiators are pure: server-supported set in, client preferences in
//! - `None` is an ordinary outcome, not an error
//! - Iteration order of the server-supported set is significant and stable

pub mod charset;
pub mod encoding;
pub mod language;
pub mod media_type;
pub mod weighted;

pub use charset::{Charset, CharsetChoice, CharsetNegotiator};
pub use encoding::{EncodingNegotiator, IDENTITY};
pub use language::{LanguageNegotiator, LanguageTag};
pub use media_type::{MediaType, MediaTypeNegotiator};
pub use weighted::WeightedValue;
