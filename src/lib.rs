//! Embeddable-comments service: credential and session core plus the thin
//! web layer that drives it.

pub mod config;
pub mod db;
pub mod error;
pub mod state;

pub mod crypto {
    pub mod password;
    pub mod random;
}

pub mod models {
    pub mod audit;
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod session;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod session;
}

pub mod handlers {
    pub mod auth;
    pub mod pages;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
}
