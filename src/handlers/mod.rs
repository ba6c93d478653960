//! HTTP handlers, one module per resource. Handlers translate between the
//! wire and the services; business rules live in `crate::services`.

pub mod availability_handlers;
pub mod catway_handlers;
pub mod health_handlers;
pub mod reservation_handlers;
pub mod user_handlers;
