pub mod bind;
pub mod common;
pub mod inspect;
pub mod selectors;
