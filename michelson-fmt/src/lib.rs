//! Printers for the script language: S-form text and J-form JSON, plus the
//! textual normalizations the action pipeline applies before handing script
//! text to the sandbox client.

mod jprint;
mod normalize;
mod sprint;

pub use jprint::print_json;
pub use normalize::replace_big_maps;
pub use sprint::print;
