extern crate bio;
extern crate bio_types;
extern crate csv;
extern crate flate2;
extern crate linked_hash_map;
extern crate log;
extern crate multimap;
extern crate rayon;

pub mod seq;
pub mod mutation;
pub mod gene;
pub mod io;
pub mod site;
pub mod config;
pub mod pipeline;
pub mod error;

pub mod constants;

pub use crate::error::{Error, Result};
