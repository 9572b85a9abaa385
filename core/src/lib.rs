pub mod analysis;
pub mod annotation;
pub mod parser;
pub mod scope;
pub mod token;
pub mod util;
pub mod val;

pub use analysis::{Analysis, analyze};
pub use scope::{Env, GlobalScope, Resolved};
pub use val::{Value, ValueKind};
