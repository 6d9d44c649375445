//! Data access layer

pub mod user_props;

pub use user_props::UserPropsRepository;
