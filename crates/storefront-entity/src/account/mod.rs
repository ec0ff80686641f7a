//! Account entity: customers and admins sharing one session scheme.

pub mod model;
pub mod profile;
pub mod role;

pub use model::{Account, PublicAccount};
pub use profile::{AccountProfile, AdminProfile, CustomerProfile};
pub use role::{AccountRole, AdminAccess};
