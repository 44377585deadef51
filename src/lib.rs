pub mod domain;
pub mod infra;
pub mod run;
mod util;


pub use self::run::run;
