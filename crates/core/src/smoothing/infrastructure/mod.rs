pub mod eased_crossfade;
pub mod linear_crossfade;
