mod auth;
mod health_check;

pub use auth::{
    change_current_password, get_current_user, login_user, logout_user, refresh_access_token,
    register_user,
};
pub use health_check::health_check;
