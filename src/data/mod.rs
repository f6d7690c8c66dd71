pub(crate) mod basemap;
pub(crate) mod point;
pub(crate) mod random_walk;
pub(crate) mod storms;
