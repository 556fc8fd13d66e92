pub mod assessment;
pub mod post;
