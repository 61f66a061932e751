use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub payments: PaymentConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub organization: OrganizationConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    /// Terminal location the card readers are registered under.
    pub location_id: Option<String>,
}

/// Fixed membership pricing, in cents.
#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub individual_membership_cents: i64,
    pub household_membership_cents: i64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            individual_membership_cents: 3500,
            household_membership_cents: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub from_email: Option<String>,
    /// Operational inbox that receives the internal notification for every
    /// settled payment.
    pub notification_email: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_refresh_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrganizationConfig {
    pub name: String,
    pub logo: String,
    pub website: String,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            name: "Community Organization".to_string(),
            logo: "/static/logo.png".to_string(),
            website: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuditConfig {
    /// Directory the monthly transaction CSV files are appended under.
    pub log_dir: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_dir: "audit".to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("email.smtp_server", "smtp.gmail.com")?
            .set_default("email.smtp_port", 587)?
            .set_default("email.notification_email", "")?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with TALLYBOX__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("TALLYBOX").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            stripe: StripeConfig::default(),
            payments: PaymentConfig::default(),
            email: EmailConfig {
                smtp_server: "smtp.gmail.com".to_string(),
                smtp_port: 587,
                from_email: None,
                notification_email: String::new(),
                google_client_id: None,
                google_client_secret: None,
                google_refresh_token: None,
            },
            organization: OrganizationConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}
