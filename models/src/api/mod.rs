/// All endpoints that relate to the Santa sleigh tour
pub mod santa_tour;
