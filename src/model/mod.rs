mod common;
mod goal;
mod match_detail;
mod matchlist;
mod team;

pub use common::*;
pub use goal::*;
pub use match_detail::*;
pub use matchlist::*;
pub use team::*;
