use std::sync::Arc;

use clap::Parser;

use crate::{api::Limiters, limiter::Limiter};

#[derive(Parser)]
pub struct LimiterArgs {
    /// Requests per client across all routes.
    #[clap(long = "global-limit", env = "GLOBAL_LIMIT", default_value = "1000")]
    global_limit: u32,

    #[clap(long = "global-window", env = "GLOBAL_WINDOW", default_value = "1min")]
    global_window: humantime::Duration,

    /// Requests per client to the supplier and rate routes.
    #[clap(long = "api-limit", env = "API_LIMIT", default_value = "100")]
    api_limit: u32,

    #[clap(long = "api-window", env = "API_WINDOW", default_value = "1min")]
    api_window: humantime::Duration,

    /// Login attempts per client.
    #[clap(long = "auth-limit", env = "AUTH_LIMIT", default_value = "5")]
    auth_limit: u32,

    #[clap(long = "auth-window", env = "AUTH_WINDOW", default_value = "5min")]
    auth_window: humantime::Duration,
}

impl LimiterArgs {
    pub fn limiters(&self) -> Limiters {
        Limiters {
            global: Arc::new(Limiter::new("global", self.global_limit, self.global_window.into())),
            api: Arc::new(Limiter::new("api", self.api_limit, self.api_window.into())),
            auth: Arc::new(Limiter::new("auth", self.auth_limit, self.auth_window.into())),
        }
    }
}
