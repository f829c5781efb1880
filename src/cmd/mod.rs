pub mod run;
pub mod scrub;
