//! studyquiz-report: Results page generation.

pub mod html;
