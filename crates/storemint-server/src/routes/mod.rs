pub mod health;
pub mod orders;
pub mod staff;
pub mod tenants;
pub mod usage;
