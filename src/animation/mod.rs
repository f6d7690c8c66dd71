pub(crate) mod anim;
pub(crate) mod ease;
pub(crate) mod eval;
pub(crate) mod spec;
