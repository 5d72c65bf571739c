use crate::auth::LoginFlow;
use crate::calc::CalcConfig;
use crate::model::Registry;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub registry: Registry,
    pub calc_config: CalcConfig,
    /// Set by auth.adminLogin; gates the admin surface (hierarchy edits,
    /// account management, configuration, cycle advance, archives).
    pub admin_authenticated: bool,
    /// The login attempt currently in flight, if any.
    pub login: LoginFlow,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            registry: Registry::new(),
            calc_config: CalcConfig::default(),
            admin_authenticated: false,
            login: LoginFlow::LoggedOut,
        }
    }
}
