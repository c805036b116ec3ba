pub mod message_routes;
pub mod system_routes;
