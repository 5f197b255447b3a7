/*-------------------------------------------------------------------------------------------------
  Core Modules
-------------------------------------------------------------------------------------------------*/

pub mod category;
pub mod client;
pub mod errors;
pub mod feeds;
pub mod lookup;
pub mod prefix;
pub mod refresh;
pub mod registry;
pub mod snapshot;
pub mod source;
pub mod transport;
pub mod utils;
