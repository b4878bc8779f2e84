mod jwt_middleware;
mod request_logger;

pub use jwt_middleware::AuthMiddleware;
pub use jwt_middleware::AuthenticatedUser;
pub use request_logger::RequestLogger;
