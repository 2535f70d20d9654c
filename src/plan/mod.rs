//! Stitch plan input model and the flattened index the playback engine walks.

pub(crate) mod index;
pub(crate) mod model;
