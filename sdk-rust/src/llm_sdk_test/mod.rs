//! Test doubles for code that depends on a [`LanguageModel`](crate::LanguageModel).

mod model;

pub use model::{MockGenerateResult, MockLanguageModel};
