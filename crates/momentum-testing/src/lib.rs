//! Testing utilities and harness for Momentum

pub mod document;
pub mod engine;
pub mod runtime;

pub use document::TestDocument;
pub use engine::{AnimateCall, TestEngine};
pub use runtime::TestRuntime;

pub mod prelude {
    pub use crate::document::TestDocument;
    pub use crate::engine::{AnimateCall, TestEngine};
    pub use crate::runtime::TestRuntime;
}
