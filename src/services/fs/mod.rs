pub mod dedupe;
pub mod ops;
