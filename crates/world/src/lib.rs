mod catalog;
mod chunk;
mod object;
mod region;
mod region_cache;
mod spatial;
mod voronoi;
mod world;

pub use catalog::*;
pub use chunk::*;
pub use object::*;
pub use region::*;
pub use region_cache::*;
pub use spatial::*;
pub use voronoi::*;
pub use world::*;
