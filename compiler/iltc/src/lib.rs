//! The ilt translator session.
//!
//! Wires the type relations and the rewrite pass into a driver that
//! translates many member bodies against one frozen [`TypePool`]:
//!
//! ```text
//! metadata reader ──► TypePoolBuilder ──► Arc<TypePool>
//!                                             │
//! decompiler ──► MemberBody* ──► Translator::translate_all ──► emitter
//!                                   (rayon, one shared AssignabilityCache)
//! ```
//!
//! [`TypePool`]: ilt_ir::TypePool

mod config;
mod logging;
mod session;

pub use config::{parse_translator_options, ConfigError, TranslatorConfig, THREADS_ENV};
pub use logging::{init_tracing, LOG_ENV, LOG_FORMAT_ENV};
pub use session::{MemberBody, TranslationReport, Translator};
