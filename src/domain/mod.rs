//! Domain models and types for Sigilo.
//!
//! The domain layer provides:
//! - **Span model** ([`Span`], [`PiiCategory`], [`SpanSource`], [`ResolvedSpanSet`])
//! - **Session model** ([`Session`], [`SessionId`])
//! - **Error types** ([`SigiloError`])
//! - **Result type alias** ([`Result`])
//!
//! Offsets throughout are byte offsets into the source text, always on
//! UTF-8 character boundaries; a span always slices the original text to
//! exactly its recorded surface form.

pub mod errors;
pub mod result;
pub mod session;
pub mod span;

pub use errors::SigiloError;
pub use result::Result;
pub use session::{Session, SessionId};
pub use span::{PiiCategory, ResolvedSpanSet, Span, SpanSource};
