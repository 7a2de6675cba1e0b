/// The live location of the sleigh: recording it, reading it and streaming it
pub mod location;
