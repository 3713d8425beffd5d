mod matching;

pub use matching::*;
