//! xMatters API service implementations.

mod devices;
mod groups;
mod people;
mod roster;
mod service_catalog;
mod sites;
mod templates;

pub use devices::*;
pub use groups::*;
pub use people::*;
pub use roster::*;
pub use service_catalog::*;
pub use sites::*;
pub use templates::*;
