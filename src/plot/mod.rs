pub(crate) mod builder;
pub(crate) mod scale;
pub(crate) mod spec;
