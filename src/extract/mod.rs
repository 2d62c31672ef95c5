pub(crate) mod bbox;
pub(crate) mod extractor;
