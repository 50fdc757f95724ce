mod list;
mod show;
mod synth;
mod validate;

pub use list::*;
pub use show::*;
pub use synth::*;
pub use validate::*;
