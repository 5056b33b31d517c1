//! CLI library components for survey-recode.

#![allow(missing_docs)]

pub mod logging;
pub mod pipeline;
