pub(crate) mod boundaries;
pub(crate) mod choropleth;
pub(crate) mod handlers;
