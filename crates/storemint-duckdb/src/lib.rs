mod backend;
mod resources;
mod schema;
mod tenants;

pub use backend::DuckDbBackend;
pub use resources::{CreateOrderParams, CreateStaffParams, Order, StaffMember};
pub use tenants::CreateTenantParams;
